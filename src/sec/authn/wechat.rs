use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gate_lib::ids;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use url::Url;

use crate::options::Options;

/// upper bound for a single exchange with the wechat server
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const USER_PATH: &str = "/api/wechat/user";

/// body returned by the wechat server. missing fields take their zero value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("verification code is empty")]
    InvalidParameter,

    #[error("invalid wechat server address: {0}")]
    Address(#[from] url::ParseError),

    #[error("failed to reach wechat server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("undecodable response from wechat server: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("wechat server rejected the code: {0}")]
    Rejected(String),

    #[error("wechat server returned an empty identity")]
    Expired,
}

/// one round trip to the service that knows which wechat account a code
/// belongs to
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange(&self, code: &str) -> Result<Envelope, ResolveError>;
}

/// talks to the wechat server over http. the address and token are read
/// from the options on every call so changes apply without a restart
#[derive(Debug)]
pub struct HttpProvider {
    client: reqwest::Client,
    options: Arc<Options>,
}

impl HttpProvider {
    pub fn new(options: Arc<Options>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(HttpProvider { client, options })
    }

    fn user_url(address: &str, code: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(address.trim_end_matches('/'))?;

        {
            let path = format!("{}{USER_PATH}", url.path().trim_end_matches('/'));
            url.set_path(&path);
        }

        url.query_pairs_mut().append_pair("code", code);

        Ok(url)
    }
}

#[async_trait]
impl IdentityProvider for HttpProvider {
    async fn exchange(&self, code: &str) -> Result<Envelope, ResolveError> {
        let (address, token) = self.options.with_snapshot(|snapshot| (
            snapshot.typed.wechat_server_address.clone(),
            snapshot.typed.wechat_server_token.clone(),
        ));

        let url = Self::user_url(&address, code)?;

        tracing::debug!(host = url.host_str(), "requesting wechat identity");

        let response = self.client.get(url)
            .header(AUTHORIZATION, token)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            tracing::warn!(%status, "wechat server responded with non success status");
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

/// turns a verification code into the wechat id it was issued for
pub struct Resolver {
    provider: Arc<dyn IdentityProvider>,
}

impl Resolver {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Resolver { provider }
    }

    /// exactly one exchange per call. codes are single use so a failed
    /// exchange is never repeated
    pub async fn resolve(&self, code: &str) -> Result<ids::WeChatId, ResolveError> {
        if code.is_empty() {
            return Err(ResolveError::InvalidParameter);
        }

        let envelope = self.provider.exchange(code).await?;

        if !envelope.success {
            return Err(ResolveError::Rejected(envelope.message));
        }

        if envelope.data.is_empty() {
            return Err(ResolveError::Expired);
        }

        Ok(envelope.data)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use std::net::SocketAddr;

    use axum::Router;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use gate_lib::options as keys;

    use super::*;
    use crate::options::Dependencies;
    use crate::test::{FakeProvider, MemoryOptionStore};

    #[derive(Debug, Deserialize)]
    struct CodeQuery {
        code: String,
    }

    async fn user(headers: HeaderMap, Query(query): Query<CodeQuery>) -> (StatusCode, String) {
        let authorized = headers.get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "server-token")
            .unwrap_or(false);

        if !authorized {
            return (StatusCode::OK, r#"{"success":false,"message":"unauthorized"}"#.into());
        }

        let body = match query.code.as_str() {
            "abc123" => r#"{"success":true,"message":"","data":"wx_42"}"#,
            "expired" => r#"{"success":true,"data":""}"#,
            "rejected" => r#"{"success":false,"message":"过期"}"#,
            "garbage" => "<html>not json</html>",
            "a b&c" => r#"{"success":true,"data":"wx_escaped"}"#,
            _ => r#"{"success":false,"message":"unknown code"}"#,
        };

        (StatusCode::OK, body.into())
    }

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(2)).await;

        r#"{"success":true,"data":"wx_slow"}"#
    }

    async fn spawn_server() -> SocketAddr {
        let router = Router::new()
            .route("/api/wechat/user", get(user))
            .route("/slow/api/wechat/user", get(slow));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().expect("failed to get test listener address");

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server failed");
        });

        addr
    }

    async fn provider_for(address: String, timeout: Duration) -> HttpProvider {
        let options = Arc::new(Options::new(
            Arc::new(MemoryOptionStore::default()),
            Dependencies::default()
        ));

        options.set(keys::WECHAT_SERVER_ADDRESS, &address).await.unwrap();
        options.set(keys::WECHAT_SERVER_TOKEN, "server-token").await.unwrap();

        HttpProvider::new(options, timeout).expect("failed to create provider")
    }

    #[test]
    fn user_url_joins_path_and_escapes_code() {
        let url = HttpProvider::user_url("http://127.0.0.1:3000/", "a b&c").unwrap();

        assert_eq!(url.as_str(), "http://127.0.0.1:3000/api/wechat/user?code=a+b%26c");

        let nested = HttpProvider::user_url("https://example.com/wechat", "x").unwrap();

        assert_eq!(nested.as_str(), "https://example.com/wechat/api/wechat/user?code=x");

        assert!(HttpProvider::user_url("", "x").is_err());
    }

    #[tokio::test]
    async fn http_provider_exchanges_codes() {
        let addr = spawn_server().await;
        let provider = provider_for(format!("http://{addr}"), DEFAULT_TIMEOUT).await;
        let resolver = Resolver::new(Arc::new(provider));

        assert_eq!(resolver.resolve("abc123").await.unwrap(), "wx_42");
        assert_eq!(resolver.resolve("a b&c").await.unwrap(), "wx_escaped");

        match resolver.resolve("rejected").await {
            Err(ResolveError::Rejected(msg)) => assert_eq!(msg, "过期"),
            other => panic!("unexpected result: {other:?}"),
        }

        assert!(matches!(resolver.resolve("expired").await, Err(ResolveError::Expired)));
        assert!(matches!(resolver.resolve("garbage").await, Err(ResolveError::Malformed(_))));
    }

    #[tokio::test]
    async fn http_provider_sends_token_from_options() {
        let addr = spawn_server().await;
        let provider = provider_for(format!("http://{addr}"), DEFAULT_TIMEOUT).await;

        provider.options.set(keys::WECHAT_SERVER_TOKEN, "rotated").await.unwrap();

        let envelope = provider.exchange("abc123").await.unwrap();

        assert!(!envelope.success);
        assert_eq!(envelope.message, "unauthorized");
    }

    #[tokio::test]
    async fn http_provider_times_out() {
        let addr = spawn_server().await;
        let provider = provider_for(
            format!("http://{addr}/slow"),
            Duration::from_millis(200)
        ).await;

        let started = std::time::Instant::now();
        let result = provider.exchange("abc123").await;

        match result {
            Err(ResolveError::Transport(err)) => assert!(err.is_timeout()),
            other => panic!("unexpected result: {other:?}"),
        }

        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn http_provider_unreachable() {
        // bind and drop to find a port nothing listens on
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let provider = provider_for(format!("http://{addr}"), DEFAULT_TIMEOUT).await;

        assert!(matches!(provider.exchange("abc123").await, Err(ResolveError::Transport(_))));
    }

    #[tokio::test]
    async fn empty_code_never_reaches_provider() {
        let provider = Arc::new(FakeProvider::new());
        let resolver = Resolver::new(provider.clone());

        assert!(matches!(resolver.resolve("").await, Err(ResolveError::InvalidParameter)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn resolve_validates_envelope() {
        let provider = Arc::new(FakeProvider::new()
            .with("abc123", Envelope { success: true, message: String::new(), data: "wx_42".into() })
            .with("empty", Envelope { success: true, ..Default::default() })
            .with("no", Envelope { success: false, message: "过期".into(), data: "wx_42".into() }));
        let resolver = Resolver::new(provider.clone());

        assert_eq!(resolver.resolve("abc123").await.unwrap(), "wx_42");
        assert!(matches!(resolver.resolve("empty").await, Err(ResolveError::Expired)));
        assert!(matches!(resolver.resolve("no").await, Err(ResolveError::Rejected(m)) if m == "过期"));
        assert_eq!(provider.calls(), 3);
    }

    #[test]
    fn envelope_fields_default() {
        let envelope: Envelope = serde_json::from_str(r#"{"success":true}"#).unwrap();

        assert_eq!(envelope, Envelope { success: true, ..Default::default() });
    }
}
