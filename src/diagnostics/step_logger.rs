//! Step timing report
//!
//! A [`StepLogger`] collects steps while a unit of work runs and emits a
//! single entry describing them when it finishes. The entry is emitted
//! exactly once: by [`StepLogger::finish`], by [`StepLogger::flush`], or when
//! the step logger is dropped, whichever happens first.

use crate::core::{CallerInfo, DispatchMode, LogDispatch, LogEntry, LogLevel, Result};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Extended property holding the report text
pub const STEP_REPORT_KEY: &str = "StepReport";

/// Message used when none is given
pub const DEFAULT_STEP_MESSAGE: &str = "Step Report";

/// One line of a step report
///
/// The report writes a `-` before each step; a step appends its text and a
/// trailing newline.
pub trait Step: Send {
    fn add_to_report(&self, report: &mut String);
}

/// A named value
#[derive(Debug, Clone)]
pub struct ValueStep {
    pub name: String,
    pub value: String,
}

impl Step for ValueStep {
    fn add_to_report(&self, report: &mut String) {
        report.push_str(&format!("{}: {}\n", self.name, self.value));
    }
}

/// Time elapsed between the start of the step logger and a point of interest
#[derive(Debug, Clone)]
pub struct CheckpointStep {
    pub label: String,
    pub elapsed: Duration,
}

impl Step for CheckpointStep {
    fn add_to_report(&self, report: &mut String) {
        report.push_str(&format!("{}: {:?}\n", self.label, self.elapsed));
    }
}

/// Collects steps and logs them as one entry
///
/// # Example
///
/// ```
/// use rust_logger_core::prelude::*;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<()> {
/// let memory = MemoryLogProvider::new();
/// let logger: Arc<dyn LogDispatch> = Arc::new(Logger::builder().provider(memory.clone()).build());
///
/// let mut steps = StepLogger::begin(logger, LogLevel::Info, Some("import"), Some(DispatchMode::Blocking), None);
/// steps.add_value("rows", 120);
/// steps.add_checkpoint("parsed");
/// steps.finish().await?;
///
/// let entry = &memory.entries()[0];
/// assert!(entry.extended_properties.contains_key(STEP_REPORT_KEY));
/// # Ok(())
/// # }
/// ```
pub struct StepLogger {
    logger: Arc<dyn LogDispatch>,
    level: LogLevel,
    message: Option<String>,
    mode: Option<DispatchMode>,
    caller: Option<CallerInfo>,
    steps: Vec<Box<dyn Step>>,
    started: Instant,
    finished: bool,
}

impl StepLogger {
    /// Start timing
    ///
    /// `mode` applies to [`finish`](Self::finish); `flush` and `Drop` always
    /// dispatch detached.
    pub fn begin(
        logger: Arc<dyn LogDispatch>,
        level: LogLevel,
        message: Option<&str>,
        mode: Option<DispatchMode>,
        caller: Option<CallerInfo>,
    ) -> Self {
        Self {
            logger,
            level,
            message: message.map(String::from),
            mode,
            caller,
            steps: Vec::new(),
            started: Instant::now(),
            finished: false,
        }
    }

    pub fn add_step<S: Step + 'static>(&mut self, step: S) {
        self.steps.push(Box::new(step));
    }

    pub fn add_value(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        self.add_step(ValueStep {
            name: name.into(),
            value: value.to_string(),
        });
    }

    /// Record the time elapsed so far under `label`
    pub fn add_checkpoint(&mut self, label: impl Into<String>) {
        let elapsed = self.elapsed();
        self.add_step(CheckpointStep {
            label: label.into(),
            elapsed,
        });
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Emit the report using the mode given at `begin`
    pub async fn finish(mut self) -> Result<()> {
        match self.take_entry() {
            Some(entry) => {
                let logger = Arc::clone(&self.logger);
                let (mode, caller) = (self.mode, self.caller.clone());
                logger.log(entry, mode, caller).await
            }
            None => Ok(()),
        }
    }

    /// Emit the report in the background; later calls do nothing
    pub fn flush(&mut self) {
        if let Some(entry) = self.take_entry() {
            self.logger.log_detached(entry, self.caller.clone());
        }
    }

    fn take_entry(&mut self) -> Option<LogEntry> {
        if self.finished {
            return None;
        }
        self.finished = true;

        let mut report = String::new();
        for step in &self.steps {
            report.push('-');
            step.add_to_report(&mut report);
        }
        report.push_str(&format!("Total Elapsed: {:?}\n", self.elapsed()));

        let message = self.message.as_deref().unwrap_or(DEFAULT_STEP_MESSAGE);
        Some(LogEntry::new(self.level, message).with_property(STEP_REPORT_KEY, report))
    }
}

impl Drop for StepLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

impl fmt::Debug for StepLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepLogger")
            .field("logger", &self.logger.name())
            .field("level", &self.level)
            .field("steps", &self.steps.len())
            .field("finished", &self.finished)
            .finish()
    }
}
