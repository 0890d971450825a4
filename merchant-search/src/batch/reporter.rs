use std::sync::Mutex;

use tracing::{error, info, warn};

/// Operator-facing progress output of a batch run.
pub trait BatchReporter: Send + Sync {
    fn success(&self, message: &str);

    fn warning(&self, message: &str);

    fn error(&self, message: &str);
}

/// Reports through the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl BatchReporter for LogReporter {
    fn success(&self, message: &str) {
        info!("{}", message);
    }

    fn warning(&self, message: &str) {
        warn!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Success,
    Warning,
    Error,
}

/// Collects reported lines in order.
#[derive(Debug, Default)]
pub struct BatchReport {
    lines: Mutex<Vec<(ReportLevel, String)>>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(ReportLevel, String)> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self, level: ReportLevel) -> usize {
        self.lines().iter().filter(|(l, _)| *l == level).count()
    }

    fn push(&self, level: ReportLevel, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((level, message.to_string()));
    }
}

impl BatchReporter for BatchReport {
    fn success(&self, message: &str) {
        self.push(ReportLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.push(ReportLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.push(ReportLevel::Error, message);
    }
}
