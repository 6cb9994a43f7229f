use std::fmt;

/// Everything that can go wrong outside a server-side rejection.
///
/// Rejections reported by the generation server are ordinary results, not
/// errors; they reach the status line through the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// No usable reply from the generation server
    Transport(String),
    /// A form value or command the controller refuses
    InvalidInput(String),
    /// Preferences or settings could not be written
    Storage(String),
    Clipboard(String),
    /// Unusable endpoint or settings
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.message())
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn title(&self) -> &'static str {
        match self {
            AppError::Transport(_) => "Server unreachable",
            AppError::InvalidInput(_) => "Invalid input",
            AppError::Storage(_) => "Could not save",
            AppError::Clipboard(_) => "Clipboard unavailable",
            AppError::Config(_) => "Bad configuration",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Transport(msg)
            | AppError::InvalidInput(msg)
            | AppError::Storage(msg)
            | AppError::Clipboard(msg)
            | AppError::Config(msg) => msg,
        }
    }

    /// A hint for the user, when there is something they can do about it.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Transport(_) => Some("Check that the generation server is running and try again"),
            AppError::InvalidInput(_) => Some("Type `help` to see accepted commands and values"),
            AppError::Storage(_) => Some("Check disk space and permissions of the config directory"),
            AppError::Clipboard(_) => None,
            AppError::Config(_) => Some("Check settings.json or BUTTER_FLOW_ENDPOINT"),
        }
    }

    /// Message plus hint, as shown on the status line.
    pub fn status_line(&self) -> String {
        match self.suggested_action() {
            Some(action) => format!("{} ({})", self.message(), action),
            None => self.message().to_string(),
        }
    }
}
