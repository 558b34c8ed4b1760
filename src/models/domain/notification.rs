use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    pub visible: bool,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Notification {
            severity,
            message: message.into(),
            visible: true,
        }
    }

    /// The empty slot: nothing shown.
    pub fn hidden() -> Self {
        Notification {
            severity: Severity::Info,
            message: String::new(),
            visible: false,
        }
    }
}

impl Default for Notification {
    fn default() -> Self {
        Notification::hidden()
    }
}
