//! Diagnostic helpers built on top of a logger handle

pub mod step_logger;

pub use step_logger::{CheckpointStep, Step, StepLogger, ValueStep, STEP_REPORT_KEY};
