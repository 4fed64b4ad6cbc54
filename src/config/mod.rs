//! Configuration-driven logger construction and reloading

pub mod factory;
pub mod global;
pub mod registry;
pub mod reloading;
pub mod section;

pub use factory::{
    definition_name, ContextProviderFactory, LogProviderFactory, ProviderRegistry, LOGGER_TYPE,
};
pub use registry::{find_definition, LoggingConfiguration, LoggingConfigurationBuilder, SECTION_NAME};
pub use reloading::ReloadingLogger;
pub use section::ConfigSection;
