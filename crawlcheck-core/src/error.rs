use crawlcheck_scanner::ScanError;
use std::error::Error as StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Need some initial paths")]
    NoInitialPaths,

    #[error("Need some rules")]
    NoRules,

    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unknown rule preset: {0}")]
    UnknownPreset(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("HTTP status {status_code} was not allowed by any rule")]
    HttpStatus { status_code: u16 },

    #[error("Response to {method} {path} rejected by check '{handler}'")]
    UnexpectedResponse {
        method: String,
        path: String,
        handler: String,
    },

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Exceeded the request budget after {count} request(s)")]
    TooManyRequests { count: usize },

    #[error("Encountered {count} exception(s) whilst crawling")]
    CapturedFailures { count: usize },

    #[error(transparent)]
    Client(ScanError),
}

impl CrawlError {
    /// Whether capture mode records this error and carries on, rather than
    /// aborting the run.
    pub fn is_capturable(&self) -> bool {
        matches!(
            self,
            CrawlError::HttpStatus { .. }
                | CrawlError::UnexpectedResponse { .. }
                | CrawlError::UnsupportedMethod(_)
                | CrawlError::Client(_)
        )
    }

    /// Whether the error stems from how the crawl was set up.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CrawlError::NoInitialPaths
                | CrawlError::NoRules
                | CrawlError::InvalidSelector { .. }
                | CrawlError::InvalidPattern { .. }
                | CrawlError::UnknownPreset(_)
                | CrawlError::Config(_)
        ) || matches!(self, CrawlError::Client(ScanError::UnknownClient(_)))
    }
}

impl From<ScanError> for CrawlError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::InvalidSelector { selector, reason } => {
                CrawlError::InvalidSelector { selector, reason }
            }
            other => CrawlError::Client(other),
        }
    }
}

/// Renders `err` and each of its sources, outermost first.
pub fn error_trace(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut trace = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        trace.push(cause.to_string());
        source = cause.source();
    }
    trace
}

pub type Result<T> = std::result::Result<T, CrawlError>;
