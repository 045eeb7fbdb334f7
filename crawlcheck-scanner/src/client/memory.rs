use crate::Params;
use crate::error::{Result, ScanError};
use crate::response::Response;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::debug;
use url::{Url, form_urlencoded};

/// A request as received by a [`MemoryApp`] route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRequest {
    pub method: String,
    pub path: String,
    pub params: Params,
}

/// Route handler; an `Err` plays the part of an exception escaping the
/// application.
pub type RouteHandler =
    Arc<dyn Fn(&AppRequest) -> std::result::Result<Response, String> + Send + Sync>;

/// An in-process application driven without a network, in the spirit of a
/// framework's test client.
///
/// Routes are keyed by method and exact path. Absolute URLs are answered by
/// their path, query strings are merged with submitted fields, and every
/// request is kept in a log for later assertions.
#[derive(Clone, Default)]
pub struct MemoryApp {
    routes: HashMap<(String, String), RouteHandler>,
    log: Arc<Mutex<Vec<AppRequest>>>,
}

impl MemoryApp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<F>(mut self, method: &str, path: &str, handler: F) -> Self
    where
        F: Fn(&AppRequest) -> std::result::Result<Response, String> + Send + Sync + 'static,
    {
        self.routes.insert(
            (method.to_uppercase(), path.to_string()),
            Arc::new(handler),
        );
        self
    }

    /// Serves a fixed HTML document for `GET path`.
    pub fn page(self, path: &str, html: impl Into<String>) -> Self {
        let html = html.into();
        self.route("GET", path, move |_| Ok(Response::html(200, html.clone())))
    }

    /// Serves a fixed response for `GET path`.
    pub fn respond(self, path: &str, response: Response) -> Self {
        self.route("GET", path, move |_| Ok(response.clone()))
    }

    pub fn handle(&self, method: &str, target: &str, fields: &Params) -> Result<Response> {
        let method = method.to_uppercase();
        let (path, mut params) = split_target(target);
        params.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));

        let request = AppRequest {
            method: method.clone(),
            path: path.clone(),
            params,
        };
        debug!("{} {} handled in process", method, path);
        if let Ok(mut log) = self.log.lock() {
            log.push(request.clone());
        }

        match self.routes.get(&(method.clone(), path.clone())) {
            Some(handler) => handler(&request).map_err(|message| ScanError::Application {
                method,
                path,
                message,
            }),
            None if self.routes.keys().any(|(_, p)| *p == path) => Ok(Response::html(
                405,
                "<h1>Method Not Allowed</h1>",
            )),
            None => Ok(Response::html(404, "<h1>Not Found</h1>")),
        }
    }

    /// Every request seen so far, oldest first.
    pub fn requests(&self) -> Vec<AppRequest> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Requests to `path`, optionally narrowed by method.
    pub fn lookup_requests(&self, path: &str, method: Option<&str>) -> Vec<AppRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .filter(|r| method.is_none_or(|m| r.method.eq_ignore_ascii_case(m)))
            .collect()
    }
}

impl fmt::Debug for MemoryApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryApp")
            .field("routes", &self.routes.len())
            .finish()
    }
}

fn split_target(target: &str) -> (String, Params) {
    let (path, query) = match Url::parse(target) {
        Ok(url) => (url.path().to_string(), url.query().map(str::to_string)),
        Err(_) => match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        },
    };

    let params = query
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let path = if path.is_empty() { "/".to_string() } else { path };
    (path, params)
}
