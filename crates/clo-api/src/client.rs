//! HTTP client for the CLO API
//!
//! Every request carries the bearer token. Successful bodies use the
//! `{ "code": …, "result": … }` envelope; anything that is not a 2xx is
//! decoded into [`ApiError::Status`].

use crate::error::{ApiError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for [`ApiClient`]
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `https://api.clo.ru`
    pub base_url: String,

    /// Bearer token issued in the user area
    pub token: String,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// CLO API client
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiError::InvalidConfig("base URL is empty".to_string()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got {}",
                base_url
            )));
        }
        if config.token.trim().is_empty() {
            return Err(ApiError::InvalidConfig("token is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("clo-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: config.token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a single entity wrapped in the result envelope
    pub(crate) async fn get_result<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let envelope: Envelope<T> = self.get_json(path).await?;
        Ok(envelope.result)
    }

    /// GET a list wrapped in the list envelope
    pub(crate) async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let envelope: ListEnvelope<T> = self.get_json(path).await?;
        Ok(envelope.result)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        tracing::debug!("GET {}", path);
        let request = self.http.get(self.url(path));
        let response = self.execute(request).await?;
        decode(response).await
    }

    /// POST a body and decode the result envelope
    pub(crate) async fn post_result<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!("POST {}", path);
        let request = self.http.post(self.url(path)).json(body);
        let response = self.execute(request).await?;
        let envelope: Envelope<T> = decode(response).await?;
        Ok(envelope.result)
    }

    /// POST a body, ignoring whatever the API answers on success
    pub(crate) async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        tracing::debug!("POST {}", path);
        let request = self.http.post(self.url(path)).json(body);
        self.execute(request).await?;
        Ok(())
    }

    pub(crate) async fn patch_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        tracing::debug!("PATCH {}", path);
        let request = self.http.patch(self.url(path)).json(body);
        self.execute(request).await?;
        Ok(())
    }

    pub(crate) async fn delete_unit(&self, path: &str) -> Result<()> {
        tracing::debug!("DELETE {}", path);
        let request = self.http.delete(self.url(path));
        self.execute(request).await?;
        Ok(())
    }

    pub(crate) async fn delete_with_body<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        tracing::debug!("DELETE {}", path);
        let request = self.http.delete(self.url(path)).json(body);
        self.execute(request).await?;
        Ok(())
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), &body))
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Build a status error from a failed response body
///
/// The API reports errors as `{ "code": 404, "title": "…", "error": […] }`,
/// but proxies in front of it answer with plain text; both are handled.
fn status_error(http_status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => {
            let code = parsed.code.unwrap_or(http_status);
            let message = parsed
                .message
                .or(parsed.title)
                .or_else(|| parsed.error.and_then(|e| e.into_iter().find_map(|d| d.message)))
                .unwrap_or_else(|| format!("HTTP {}", http_status));
            ApiError::status(code, message)
        }
        Err(_) => {
            let message = if body.trim().is_empty() {
                format!("HTTP {}", http_status)
            } else {
                body.trim().to_string()
            };
            ApiError::status(http_status, message)
        }
    }
}

// ============ Envelopes ============

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    result: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<Vec<ErrorDetail>>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Identifier returned by every create call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Created {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_rejects_empty_settings() {
        assert!(ApiClient::new(ClientConfig::new("", "token")).is_err());
        assert!(ApiClient::new(ClientConfig::new("https://api.clo.ru", " ")).is_err());
        assert!(ApiClient::new(ClientConfig::new("api.clo.ru", "token")).is_err());
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new(ClientConfig::new("https://api.clo.ru/", "token")).unwrap();
        assert_eq!(client.base_url(), "https://api.clo.ru");
        assert_eq!(
            client.url("/v2/servers/1/detail"),
            "https://api.clo.ru/v2/servers/1/detail"
        );
    }

    #[test]
    fn test_status_error_from_json_body() {
        let err = status_error(404, r#"{"code": 404, "title": "Not Found"}"#);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "CLO API error 404 (not found): Not Found");
    }

    #[test]
    fn test_status_error_prefers_detail_message() {
        let err = status_error(
            400,
            r#"{"code": 400, "error": [{"message": "size should be at least 10"}]}"#,
        );
        assert_eq!(err.kind(), Some(ErrorKind::Client));
        assert!(err.to_string().ends_with("size should be at least 10"));
    }

    #[test]
    fn test_status_error_from_plain_text() {
        let err = status_error(502, "Bad Gateway\n");
        assert_eq!(err.kind(), Some(ErrorKind::Server));
        assert!(err.to_string().ends_with("Bad Gateway"));

        let empty = status_error(503, "");
        assert!(empty.to_string().ends_with("HTTP 503"));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = ClientConfig::new("https://api.clo.ru", "super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
