use std::fmt;

use crate::error::ProbeError;

/// Verdict of a run, ordered from best to worst.
///
/// `Unknown` is terminal: it marks a run that could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    /// Exit code expected by Nagios-compatible monitoring systems.
    pub fn exit_code(self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
            Severity::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accumulated outcome of the checks of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    severity: Severity,
    messages: Vec<String>,
}

impl RunResult {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            messages: vec![message.into()],
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(Severity::Ok, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_aborted(&self) -> bool {
        self.severity == Severity::Unknown
    }

    /// Raises the severity. Never lowers it.
    pub fn escalate(&mut self, severity: Severity) {
        self.severity = self.severity.max(severity);
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn merge(&mut self, other: RunResult) {
        self.escalate(other.severity);
        self.messages.extend(other.messages);
    }

    pub fn abort(&mut self, error: &ProbeError) {
        self.escalate(Severity::Unknown);
        self.push(format!("{}: {error}", Severity::Unknown));
    }

    /// Final status text. A clean run is prefixed with a confirmation.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.messages.len() + 1);
        if self.severity == Severity::Ok {
            lines.push("All fine :).");
        }
        lines.extend(self.messages.iter().map(String::as_str));
        lines.join("\n")
    }

    pub fn exit_code(&self) -> i32 {
        self.severity.exit_code()
    }
}
