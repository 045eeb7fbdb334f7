use serde::{Deserialize, Serialize};

/// Content types whose bodies are searched for links and forms.
pub const HTML_CONTENT_TYPES: &[&str] = &["text/html"];

/// A response as seen by the traversal engine, independent of the adapter
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl Response {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            content_type: None,
            body: String::new(),
        }
    }

    pub fn html(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.into(),
        }
    }

    /// A redirect whose body links to the target, the way web frameworks
    /// render them for clients that don't follow redirects.
    pub fn redirect(status_code: u16, location: &str) -> Self {
        Self::html(
            status_code,
            format!(
                "<!doctype html>\n<title>Redirecting...</title>\n<h1>Redirecting...</h1>\n\
                 <p>You should be redirected automatically to the target URL: \
                 <a href=\"{location}\">{location}</a>. If not, click the link.</p>"
            ),
        )
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// The declared media type without parameters such as `charset`.
    pub fn media_type(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .map(|ct| ct.split(';').next().unwrap_or_default().trim())
    }
}

/// True when the media type part of `content_type` is an HTML document.
pub fn acceptable_content_type(content_type: &str) -> bool {
    let media_type = content_type.split(';').next().unwrap_or_default().trim();
    HTML_CONTENT_TYPES
        .iter()
        .any(|html| media_type.eq_ignore_ascii_case(html))
}
