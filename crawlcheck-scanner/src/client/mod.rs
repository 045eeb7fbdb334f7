mod http;
mod memory;

pub use http::HttpClient;
pub use memory::{AppRequest, MemoryApp, RouteHandler};

use crate::Params;
use crate::error::{Result, ScanError};
use crate::extract::{Candidate, Extractor};
use crate::response::Response;
use url::Url;

/// Target name that selects the [`ClientAdapter::Dummy`] adapter.
pub const DUMMY_TARGET: &str = "dummy";

/// The closed set of clients the crawler knows how to drive.
#[derive(Debug, Clone)]
pub enum ClientAdapter {
    /// A running application reached over HTTP.
    Http(HttpClient),
    /// An application living in the test process.
    Memory(MemoryApp),
    /// Accepts construction, refuses every request.
    Dummy,
}

impl ClientAdapter {
    /// Picks the adapter able to drive `target`: `http(s)://` URLs get an
    /// HTTP client bound to that base, `dummy` gets the inert adapter.
    pub fn detect(target: &str) -> Result<Self> {
        if target == DUMMY_TARGET {
            return Ok(ClientAdapter::Dummy);
        }

        match Url::parse(target) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                Ok(ClientAdapter::Http(HttpClient::new(target)?))
            }
            _ => Err(ScanError::UnknownClient(target.to_string())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClientAdapter::Http(_) => "http",
            ClientAdapter::Memory(_) => "memory",
            ClientAdapter::Dummy => "dummy",
        }
    }

    pub async fn get(&self, path: &str, fields: &Params) -> Result<Response> {
        match self {
            ClientAdapter::Http(client) => client.get(path, fields).await,
            ClientAdapter::Memory(app) => app.handle("GET", path, fields),
            ClientAdapter::Dummy => Err(ScanError::Unsupported(format!(
                "dummy client cannot GET {}",
                path
            ))),
        }
    }

    pub async fn post(&self, path: &str, fields: &Params) -> Result<Response> {
        match self {
            ClientAdapter::Http(client) => client.post(path, fields).await,
            ClientAdapter::Memory(app) => app.handle("POST", path, fields),
            ClientAdapter::Dummy => Err(ScanError::Unsupported(format!(
                "dummy client cannot POST {}",
                path
            ))),
        }
    }
}

impl From<HttpClient> for ClientAdapter {
    fn from(client: HttpClient) -> Self {
        ClientAdapter::Http(client)
    }
}

impl From<MemoryApp> for ClientAdapter {
    fn from(app: MemoryApp) -> Self {
        ClientAdapter::Memory(app)
    }
}

/// An adapter paired with the extractor for its responses: everything the
/// traversal engine needs from a client.
#[derive(Debug)]
pub struct WrappedClient {
    adapter: ClientAdapter,
    extractor: Extractor,
}

impl WrappedClient {
    pub fn new<S: AsRef<str>>(adapter: ClientAdapter, ignore_css_selectors: &[S]) -> Result<Self> {
        Ok(Self {
            adapter,
            extractor: Extractor::new(ignore_css_selectors)?,
        })
    }

    pub fn kind(&self) -> &'static str {
        self.adapter.kind()
    }

    pub async fn get(&self, path: &str, fields: &Params) -> Result<Response> {
        self.adapter.get(path, fields).await
    }

    pub async fn post(&self, path: &str, fields: &Params) -> Result<Response> {
        self.adapter.post(path, fields).await
    }

    pub fn is_valid_for_extraction(&self, response: &Response) -> bool {
        self.extractor.is_valid_for_extraction(response)
    }

    pub fn extract<A: AsRef<str>>(
        &self,
        response: &Response,
        element_names: Option<&[&str]>,
        attr_names: &[A],
    ) -> Vec<Candidate> {
        self.extractor.extract(response, element_names, attr_names)
    }

    pub fn extract_forms(&self, base_path: &str, response: &Response) -> Vec<Candidate> {
        self.extractor.extract_forms(base_path, response)
    }
}

/// Detects the adapter for `target` and wraps it with the ignore selectors.
pub fn detect_and_wrap_client<S: AsRef<str>>(
    target: &str,
    ignore_css_selectors: &[S],
) -> Result<WrappedClient> {
    WrappedClient::new(ClientAdapter::detect(target)?, ignore_css_selectors)
}
