//! Non-fatal findings reported alongside emitted source.

use std::fmt;

use strum::Display;

/// Client-interface method excluded because it does not return a bare `Task`
pub const NON_TASK_CALLBACK: &str = "HPG001";

/// Severity of a [`Diagnostic`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Severity {
    /// Something was skipped that the user probably expected to be generated
    Warning,
}

/// A finding made while synthesizing one hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Stable identifier, e.g. `HPG001`
    pub code: &'static str,
    /// Severity
    pub severity: Severity,
    /// Canonical name of the hub the finding belongs to
    pub hub: String,
    /// Human readable description
    pub message: String,
}

impl Diagnostic {
    /// A client-interface method that was left out of the callback surface
    #[must_use]
    pub fn non_task_callback(hub: &str, client: &str, method: &str, return_type: &str) -> Self {
        Diagnostic {
            code: NON_TASK_CALLBACK,
            severity: Severity::Warning,
            hub: hub.to_string(),
            message: format!(
                "The client method \"{}.{}\" returns \"{}\" instead of \"System.Threading.Tasks.Task\" and was not bound",
                client, method, return_type
            ),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: [{}] {}", self.severity, self.code, self.hub, self.message)
    }
}
