use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;

use super::error::HttpError;
use super::retry::{with_backoff, RetryError, RetryPolicy};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON client for the identity provider with per-request timeout and
/// back-off on transient failures.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    timeout: Duration,
    retry: RetryPolicy,
}

#[derive(Default)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
    headers: HeaderMap,
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Header sent with every request
    pub fn header(mut self, name: &str, value: &str) -> anyhow::Result<Self> {
        self.headers.insert(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_str(value)?,
        );
        Ok(self)
    }

    pub fn build(self) -> anyhow::Result<HttpClient> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(self.headers)
            .build()?;

        Ok(HttpClient {
            inner,
            timeout,
            retry: self.retry.unwrap_or_default(),
        })
    }
}

/// Best readable explanation of a failed response: the JSON `message` or
/// `error` field, a short plain body, or the status line.
fn failure_message(status: reqwest::StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error"]
                .iter()
                .find_map(|key| json.get(key)?.as_str().map(str::to_string))
        });

    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() && body.len() < 500 => body.trim().to_string(),
        None => status.to_string(),
    }
}

async fn read_body(response: Response) -> Result<String, HttpError> {
    let status = response.status();
    let body = response.text().await.map_err(HttpError::from)?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(HttpError::status(status.as_u16(), failure_message(status, &body)))
    }
}

async fn fetch_json<R: DeserializeOwned>(request: RequestBuilder) -> Result<R, HttpError> {
    let response = request.send().await.map_err(HttpError::from)?;
    let body = read_body(response).await?;
    serde_json::from_str(&body).map_err(|e| HttpError::Decode(e.to_string()))
}

async fn fetch_nothing(request: RequestBuilder) -> Result<(), HttpError> {
    let response = request.send().await.map_err(HttpError::from)?;
    read_body(response).await.map(|_| ())
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    fn request(&self, method: Method, url: &str, bearer: Option<&str>) -> RequestBuilder {
        let request = self.inner.request(method, url).timeout(self.timeout);
        match bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET a JSON document on behalf of the holder of `token`
    pub async fn get_json_with_bearer<R>(&self, url: &str, token: &str) -> Result<R, RetryError>
    where
        R: DeserializeOwned,
    {
        debug!("GET {}", url);
        with_backoff(&self.retry, || {
            fetch_json(self.request(Method::GET, url, Some(token)))
        })
        .await
    }

    /// POST `body` as JSON and decode the JSON answer
    pub async fn post_json<T, R>(&self, url: &str, body: &T) -> Result<R, RetryError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        debug!("POST {}", url);
        with_backoff(&self.retry, || {
            fetch_json(self.request(Method::POST, url, None).json(body))
        })
        .await
    }

    /// POST without body, only the status matters
    pub async fn post_with_bearer(&self, url: &str, token: &str) -> Result<(), RetryError> {
        debug!("POST {}", url);
        with_backoff(&self.retry, || {
            fetch_nothing(self.request(Method::POST, url, Some(token)))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Whoami {
        email: String,
    }

    fn client() -> HttpClient {
        HttpClient::builder()
            .timeout(Duration::from_secs(2))
            .retry_policy(RetryPolicy::single_attempt())
            .build()
            .unwrap()
    }

    #[test]
    fn test_failure_message_sources() {
        let status = reqwest::StatusCode::UNAUTHORIZED;
        assert_eq!(failure_message(status, r#"{"error":"expired"}"#), "expired");
        assert_eq!(failure_message(status, "plain text\n"), "plain text");
        assert_eq!(failure_message(status, ""), "401 Unauthorized");
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/whoami"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"email": "ada@cbank.example"})),
            )
            .mount(&server)
            .await;

        let me: Whoami = client()
            .get_json_with_bearer(&format!("{}/whoami", server.uri()), "abc123")
            .await
            .unwrap();
        assert_eq!(me.email, "ada@cbank.example");
    }

    #[tokio::test]
    async fn test_default_header_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .and(header("x-client", "integra"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        HttpClient::builder()
            .header("x-client", "integra")
            .unwrap()
            .build()
            .unwrap()
            .post_with_bearer(&format!("{}/api/auth/logout", server.uri()), "t")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejection_keeps_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Wrong password"})),
            )
            .mount(&server)
            .await;

        let err = client()
            .post_json::<_, Whoami>(
                &format!("{}/login", server.uri()),
                &serde_json::json!({"email": "ada@cbank.example"}),
            )
            .await
            .unwrap_err();

        assert!(err.is_rejection());
        assert_eq!(err.last_error().to_string(), "HTTP 401: Wrong password");
    }

    #[tokio::test]
    async fn test_html_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/whoami"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let err = client()
            .get_json_with_bearer::<Whoami>(&format!("{}/whoami", server.uri()), "t")
            .await
            .unwrap_err();

        assert!(err.last_error().is_decode());
    }
}
