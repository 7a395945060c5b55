//! Error taxonomy for rate acquisition, storage and conversion.

use thiserror::Error;

pub type Result<T, E = RateError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum RateError {
    /// Caller input that can be corrected: non-positive amount, unknown code.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No rate data is available at all.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Upstream feed unreachable, timed out or answered with a non-success status.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Unparseable feed or corrupt persisted snapshot.
    #[error("Data format error: {0}")]
    DataFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RateError {
    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            RateError::InvalidArgument(msg) => msg.clone(),
            RateError::InvalidState(_) => {
                "No exchange rate data available, please refresh".to_string()
            }
            RateError::ExternalService(_) => {
                "Exchange rate service is unavailable, please try again later".to_string()
            }
            RateError::DataFormat(_) => {
                "Exchange rate data is corrupted, please refresh".to_string()
            }
            RateError::Io(_) => {
                "Failed to read or save exchange rate data, check the data directory and refresh again"
                    .to_string()
            }
        }
    }

    /// Whether retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, RateError::ExternalService(_))
    }
}
