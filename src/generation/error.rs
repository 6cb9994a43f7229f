use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    InvalidEndpoint(String),
    Unreachable(String),
    Timeout,
    HttpStatus(u16),
    Malformed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::InvalidEndpoint(endpoint) => {
                write!(f, "Invalid generation endpoint: {}", endpoint)
            }
            TransportError::Unreachable(message) => {
                write!(f, "Generation server unreachable: {}", message)
            }
            TransportError::Timeout => write!(f, "Generation request timed out"),
            TransportError::HttpStatus(code) => {
                write!(f, "Generation server returned HTTP {}", code)
            }
            TransportError::Malformed(message) => {
                write!(f, "Malformed generation response: {}", message)
            }
        }
    }
}

impl std::error::Error for TransportError {}

impl From<TransportError> for crate::errors::AppError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::InvalidEndpoint(_) => crate::errors::AppError::Config(error.to_string()),
            other => crate::errors::AppError::Transport(other.to_string()),
        }
    }
}
