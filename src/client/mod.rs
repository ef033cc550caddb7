//! HTTP client for the Nutrical API.
//!
//! Attaches bearer auth, reloads the token from its [`TokenStore`] when the
//! in-memory one is missing, retries transient failures per [`RetryPolicy`],
//! and reports network loss and 401s through [`ClientHooks`].

pub mod retry;
pub mod token;

use reqwest::{header, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::database::models::{DietarySettings, DietarySettingsPatch};

pub use retry::RetryPolicy;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};

pub const DEFAULT_USER_AGENT: &str = "Nutrical-Mobile";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No internet connection: {0}")]
    Network(#[source] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Http { status: StatusCode, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Reactions to failures the user has to see.
pub trait ClientHooks: Send + Sync {
    /// Transport failed, before a response or while reading its body.
    fn on_network_error(&self, _error: &reqwest::Error) {}

    /// Server rejected the session; the app should send the user to login.
    fn on_unauthorized(&self) {}
}

/// Hooks that only log.
pub struct LoggingHooks;

impl ClientHooks for LoggingHooks {
    fn on_network_error(&self, error: &reqwest::Error) {
        tracing::error!("No internet connection, please check your network settings: {}", error);
    }

    fn on_unauthorized(&self) {
        tracing::error!("Unauthorized access, redirecting to login");
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub user_agent: String,
    /// Token given explicitly by the caller; storage is consulted when absent.
    pub token: Option<String>,
    pub retry: RetryPolicy,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        // Paths are joined relative to the base, so it must end in '/'
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            base_url: Url::parse(&base)?,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(10),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Value,
}

pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenStore>,
    hooks: Arc<dyn ClientHooks>,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        tokens: Arc<dyn TokenStore>,
        hooks: Arc<dyn ClientHooks>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            http,
            config,
            tokens,
            hooks,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(Method::GET, path, None).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(Method::DELETE, path, None).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.send(Method::POST, path, Some(serde_json::to_value(body)?)).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.send(Method::PUT, path, Some(serde_json::to_value(body)?)).await
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.send(Method::PATCH, path, Some(serde_json::to_value(body)?)).await
    }

    /// GET users/dietary-settings
    pub async fn dietary_settings(&self) -> Result<DietarySettings, ClientError> {
        self.get("users/dietary-settings").await
    }

    /// PATCH users/dietary-settings
    pub async fn update_dietary_settings(
        &self,
        patch: &DietarySettingsPatch,
    ) -> Result<Vec<DietarySettings>, ClientError> {
        self.patch("users/dietary-settings", patch).await
    }

    /// Token for the next request: the in-memory one unless it looks stale,
    /// in which case storage is re-read.
    fn bearer_token(&self) -> String {
        match self.config.token.as_deref() {
            Some(token) if !looks_stale(token) => token.to_string(),
            explicit => self
                .tokens
                .load()
                .filter(|t| !looks_stale(t))
                .or_else(|| explicit.map(str::to_string))
                .unwrap_or_default(),
        }
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.config.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, ClientError> {
        let url = self.url(path)?;
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header(header::AUTHORIZATION, format!("Bearer {}", self.bearer_token()));
            if let Some(body) = &body {
                request = request.json(body);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    if self.config.retry.retries_transport(&method, &e, attempt) {
                        let delay = self.config.retry.delay(attempt, None);
                        tracing::debug!("{} {} failed ({}), retrying in {:?}", method, url, e, delay);
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    self.hooks.on_network_error(&e);
                    return Err(ClientError::Network(e));
                }
            };

            let status = response.status();
            if self.config.retry.retries_status(&method, status, attempt) {
                let delay = self.config.retry.delay(attempt, Some(response.headers()));
                tracing::debug!("{} {} returned {}, retrying in {:?}", method, url, status, delay);
                tokio::time::sleep(delay).await;
                continue;
            }

            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    // Connection dropped mid-body
                    self.hooks.on_network_error(&e);
                    return Err(ClientError::Network(e));
                }
            };
            return self.decode(status, &text);
        }
    }

    fn decode<T: DeserializeOwned>(&self, status: StatusCode, text: &str) -> Result<T, ClientError> {
        let envelope = serde_json::from_str::<Envelope>(text).ok();

        if !status.is_success() || envelope.as_ref().is_some_and(|e| e.error) {
            if status == StatusCode::UNAUTHORIZED {
                self.hooks.on_unauthorized();
            }
            let message = envelope
                .map(|e| match e.message {
                    Value::String(s) => s,
                    Value::Null => status.canonical_reason().unwrap_or("request failed").to_string(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| text.to_string());
            return Err(ClientError::Http { status, message });
        }

        let envelope = envelope.ok_or_else(|| ClientError::Decode(format!("expected JSON envelope, got: {}", text)))?;
        serde_json::from_value(envelope.data).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// A missing or blank token cannot authenticate anything.
fn looks_stale(token: &str) -> bool {
    token.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHooks {
        network: AtomicUsize,
        unauthorized: AtomicUsize,
    }

    impl ClientHooks for CountingHooks {
        fn on_network_error(&self, _error: &reqwest::Error) {
            self.network.fetch_add(1, Ordering::SeqCst);
        }

        fn on_unauthorized(&self) {
            self.unauthorized.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            backoff_base: Duration::from_millis(1),
            backoff_max: Duration::from_millis(5),
            ..RetryPolicy::default()
        }
    }

    fn client(base_url: &str, token: Option<&str>, stored: Option<&str>) -> (ApiClient, Arc<CountingHooks>) {
        let mut config = ClientConfig::new(base_url).unwrap().with_retry(fast_retry());
        if let Some(token) = token {
            config = config.with_token(token);
        }
        let hooks = Arc::new(CountingHooks::default());
        let client = ApiClient::new(
            config,
            Arc::new(MemoryTokenStore::new(stored.map(str::to_string))),
            hooks.clone(),
        )
        .unwrap();
        (client, hooks)
    }

    fn settings_json() -> Value {
        json!({
            "userId": "00000000-0000-0000-0000-000000000000",
            "waterGoal": 2000,
            "calorieGoal": "1780",
            "fatGoal": "356",
            "proteinGoal": "356",
            "carbsGoal": "1068"
        })
    }

    #[tokio::test]
    async fn sends_bearer_and_user_agent_and_unwraps_data() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/users/dietary-settings")
                .header("authorization", "Bearer tok-1")
                .header("user-agent", "Nutrical-Mobile");
            then.status(200).json_body(json!({ "error": false, "data": settings_json() }));
        });

        let (client, _) = client(&server.base_url(), Some("tok-1"), None);
        let settings = client.dietary_settings().await.unwrap();

        mock.assert();
        assert_eq!(settings.water_goal, 2000);
        assert_eq!(settings.calorie_goal.to_string(), "1780");
    }

    #[tokio::test]
    async fn stale_token_is_reloaded_from_storage() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/users/dietary-settings").header("authorization", "Bearer stored-token");
            then.status(200).json_body(json!({ "error": false, "data": settings_json() }));
        });

        let (client, _) = client(&server.base_url(), Some("  "), Some("stored-token"));
        client.dietary_settings().await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn patch_sends_numbers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/users/dietary-settings")
                .json_body(json!({ "waterGoal": 3000 }));
            then.status(200).json_body(json!({ "error": false, "data": [settings_json()] }));
        });

        let (client, _) = client(&server.base_url(), Some("tok"), None);
        let patch = DietarySettingsPatch {
            water_goal: Some(3000),
            ..Default::default()
        };
        let rows = client.update_dietary_settings(&patch).await.unwrap();

        mock.assert();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn transient_status_retried_twice_then_surfaced() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH).path("/users/dietary-settings");
            then.status(503).json_body(json!({ "error": true, "message": "down" }));
        });

        let (client, hooks) = client(&server.base_url(), Some("tok"), None);
        let err = client
            .update_dietary_settings(&DietarySettingsPatch::default())
            .await
            .unwrap_err();

        assert_eq!(mock.calls(), 3);
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert!(err.to_string().contains("down"));
        assert_eq!(hooks.unauthorized.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/users/dietary-settings");
            then.status(404).json_body(json!({ "error": true, "message": "User not found" }));
        });

        let (client, _) = client(&server.base_url(), Some("tok"), None);
        let err = client.dietary_settings().await.unwrap_err();

        assert_eq!(mock.calls(), 1);
        assert!(matches!(err, ClientError::Http { status, ref message } if status == StatusCode::NOT_FOUND && message == "User not found"));
    }

    #[tokio::test]
    async fn unauthorized_triggers_login_hook() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users/dietary-settings");
            then.status(401).json_body(json!({ "error": true, "message": "Unauthorized" }));
        });

        let (client, hooks) = client(&server.base_url(), None, None);
        let err = client.dietary_settings().await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(hooks.unauthorized.load(Ordering::SeqCst), 1);
        assert_eq!(hooks.network.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn connection_refused_is_a_network_error() {
        // Nothing listens on this port
        let port = portpicker::pick_unused_port().unwrap();
        let (client, hooks) = client(&format!("http://127.0.0.1:{}", port), Some("tok"), None);

        let err = client.dietary_settings().await.unwrap_err();

        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(hooks.network.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn truncated_body_is_a_network_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Promise 512 bytes, send a few, then hang up
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 512\r\n\r\n{\"error\":false")
                .await;
            let _ = socket.shutdown().await;
        });

        let (client, hooks) = client(&format!("http://{}", addr), Some("tok"), None);
        let err = client.dietary_settings().await.unwrap_err();

        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(hooks.network.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn paths_join_under_base_prefix() {
        let (client, _) = client("http://localhost:3000/api", None, None);
        assert_eq!(
            client.url("/users/dietary-settings").unwrap().as_str(),
            "http://localhost:3000/api/users/dietary-settings"
        );
    }
}
