//! Error types for report persistence and notification delivery

use thiserror::Error;

/// Errors from the side-effect collaborators
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Mail gateway configuration is missing or invalid
    #[error("mail gateway configuration error: {0}")]
    Config(String),

    /// The gateway accepted the connection but refused the delivery
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Network or HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Report write failed
    #[error("report write failed: {0}")]
    Io(#[from] std::io::Error),
}
