use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Unknown client: {0}")]
    UnknownClient(String),

    /// The in-process application failed while handling a request.
    #[error("Application error on {method} {path}: {message}")]
    Application {
        method: String,
        path: String,
        message: String,
    },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
