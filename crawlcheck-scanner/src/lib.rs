pub mod client;
pub mod error;
pub mod extract;
pub mod response;

pub use client::{
    AppRequest, ClientAdapter, HttpClient, MemoryApp, WrappedClient, detect_and_wrap_client,
};
pub use error::ScanError;
pub use extract::{Candidate, Extractor};
pub use response::Response;

/// Request fields; keys are unique and ordering carries no meaning.
pub type Params = std::collections::BTreeMap<String, String>;
