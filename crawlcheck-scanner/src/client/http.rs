use crate::Params;
use crate::error::{Result, ScanError};
use crate::response::Response;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Talks to a running application over HTTP.
///
/// Relative paths are joined onto the base URL, absolute ones are requested
/// as they are. Redirects are reported rather than followed so that 3xx
/// codes reach the status checks.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, 10)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("crawlcheck/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Self::with_client(client, base_url)
    }

    /// Wraps an already configured client, e.g. one carrying a session cookie.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ScanError::UnknownClient(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    pub async fn get(&self, path: &str, fields: &Params) -> Result<Response> {
        let url = self.resolve(path)?;
        debug!("GET {}", url);
        let mut request = self.client.get(url);
        if !fields.is_empty() {
            request = request.query(fields);
        }
        Self::into_response(request.send().await?).await
    }

    pub async fn post(&self, path: &str, fields: &Params) -> Result<Response> {
        let url = self.resolve(path)?;
        debug!("POST {}", url);
        let mut request = self.client.post(url);
        if !fields.is_empty() {
            request = request.form(fields);
        }
        Self::into_response(request.send().await?).await
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn into_response(response: reqwest::Response) -> Result<Response> {
        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        Ok(Response {
            status_code,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string_contains, method, path, query_param},
    };

    #[tokio::test]
    async fn test_get_reports_status_and_content_type() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_string("<a href=\"/a\">a</a>"),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(&mock_server.uri()).unwrap();
        let response = client.get("/", &Params::new()).await.unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.media_type(), Some("text/html"));
        assert!(response.text().contains("/a"));
    }

    #[tokio::test]
    async fn test_error_statuses_are_not_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(&mock_server.uri()).unwrap();
        let missing = client.get("/missing", &Params::new()).await.unwrap();
        let broken = client.get("/broken", &Params::new()).await.unwrap();

        assert_eq!(missing.status_code, 404);
        assert_eq!(broken.status_code, 500);
    }

    #[tokio::test]
    async fn test_redirects_are_not_followed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(&mock_server.uri()).unwrap();
        let response = client.get("/old", &Params::new()).await.unwrap();
        assert_eq!(response.status_code, 301);
    }

    #[tokio::test]
    async fn test_get_fields_become_query_string() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "rust"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(&mock_server.uri()).unwrap();
        let mut fields = Params::new();
        fields.insert("q".to_string(), "rust".to_string());

        let response = client.get("/search", &fields).await.unwrap();
        assert_eq!(response.status_code, 200);
    }

    #[tokio::test]
    async fn test_post_fields_become_form_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/comment"))
            .and(body_string_contains("body=hello"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(&mock_server.uri()).unwrap();
        let mut fields = Params::new();
        fields.insert("body".to_string(), "hello".to_string());

        let response = client.post("/comment", &fields).await.unwrap();
        assert_eq!(response.status_code, 201);
    }

    #[test]
    fn test_non_http_base_url_is_rejected() {
        assert!(matches!(
            HttpClient::new("ftp://example.com"),
            Err(ScanError::UnknownClient(_))
        ));
        assert!(matches!(
            HttpClient::new("not a url"),
            Err(ScanError::InvalidUrl(_))
        ));
    }
}
