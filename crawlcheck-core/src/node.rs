use crawlcheck_scanner::{Candidate, Params};
use std::collections::BTreeSet;
use std::fmt;

// HTML elements
pub const ANCHOR: &str = "a";
pub const AREA: &str = "area";
pub const LINK: &str = "link";
pub const FORM: &str = crawlcheck_scanner::extract::FORM;

// HTML attributes
pub const HREF: &str = "href";
pub const SRC: &str = "src";

// HTTP methods
pub const GET: &str = "GET";
pub const POST: &str = "POST";

/// A requestable unit: method, path and the fields sent with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub path: String,
    pub method: String,
    pub params: Params,
    /// Tag name of the element the node was found in; `None` for seeds.
    pub source: Option<String>,
    pub requested: bool,
    pub status_code: Option<u16>,
    /// Fields left out of [`Node::id`], e.g. CSRF tokens.
    pub ignored_form_fields: BTreeSet<String>,
}

/// Deduplication key of a [`Node`]: the request it would actually make,
/// minus ignored form fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub method: String,
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl Node {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: GET.to_string(),
            params: Params::new(),
            source: None,
            requested: false,
            status_code: None,
            ignored_form_fields: BTreeSet::new(),
        }
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_uppercase();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_ignored_form_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_form_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_candidate(candidate: Candidate) -> Self {
        Self::new(candidate.path)
            .with_method(&candidate.method)
            .with_source(candidate.source)
            .with_params(candidate.params)
    }

    pub fn id(&self) -> NodeId {
        NodeId {
            method: self.method.clone(),
            path: self.path.clone(),
            params: self
                .params
                .iter()
                .filter(|(field, _)| !self.ignored_form_fields.contains(*field))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if !self.params.is_empty() {
            write!(f, " {:?}", self.params)?;
        }
        if let Some(source) = &self.source {
            write!(f, " (from <{}>)", source)?;
        }
        Ok(())
    }
}
