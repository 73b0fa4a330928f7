//! Outbound HTTP for the oracle providers and citation link checks.
//!
//! - JSON POSTs with bearer or query-parameter keys
//! - Retries 429/5xx with exponential backoff and `Retry-After` support,
//!   unless a request opts out
//! - Secrets are never logged: query keys are redacted and transport errors
//!   are stripped of their URL
//! - [`HttpClient::probe`] answers "does this URL resolve?" for link checks
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), retries and final errors.

use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;

/// User agent sent on every outbound request.
pub const NOFAKE_USER_AGENT: &str = "Mozilla/5.0 (compatible; NoFake-CitationBot/1.0)";

const SECRET_QUERY_KEYS: &[&str] = &["key", "api_key", "access_token", "token", "secret"];
const SNIPPET_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// Status code of an API error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// How a request proves who it is.
///
/// ```
/// use nofake_http::Auth;
/// use std::borrow::Cow;
///
/// let gemini = Auth::Query { name: "key", value: Cow::Borrowed("demo") };
/// assert!(matches!(gemini, Auth::Query { name: "key", .. }));
/// ```
#[derive(Clone, Debug, Default)]
pub enum Auth<'a> {
    /// `Authorization: Bearer <token>` (OpenAI)
    Bearer(&'a str),
    /// Key in the query string (Gemini's `?key=`)
    Query { name: &'a str, value: Cow<'a, str> },
    #[default]
    None,
}

impl Auth<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::Query { .. } => "query",
            Auth::None => "none",
        }
    }
}

/// Per-request overrides of the client defaults.
///
/// ```
/// use nofake_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     retries: Some(0),
///     ..Default::default()
/// };
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Auth<'a>,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL. Relative paths are joined
    /// onto it, so a base with a path component must end with `/`.
    ///
    /// ```no_run
    /// use nofake_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com/v1/")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.max_retries, 2);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(NOFAKE_USER_AGENT)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 2,
        })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// POST JSON using optional Bearer auth and the client defaults.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let opts = RequestOpts {
            auth: bearer.map(Auth::Bearer).unwrap_or_default(),
            ..Default::default()
        };
        self.post_json_opts(path, body, opts).await
    }

    /// POST JSON with per-request options.
    pub async fn post_json_opts<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;
        let body = serde_json::to_vec(body).map_err(|e| HttpError::Build(e.to_string()))?;
        self.send_with_retries(url, body, opts).await
    }

    /// Send a single `HEAD` to an absolute URL and report whether it answered
    /// with a non-error status. Never retries and never fails: every
    /// transport problem reads as "unreachable".
    pub async fn probe(&self, url: &str) -> bool {
        let Ok(url) = Url::parse(url) else {
            return false;
        };
        let host_path = host_path(&url);
        let started = Instant::now();

        match self
            .inner
            .head(url)
            .timeout(self.default_timeout)
            .header(USER_AGENT, NOFAKE_USER_AGENT)
            .send()
            .await
        {
            Ok(resp) => {
                let status = resp.status();
                let reachable = status.is_success() || status.is_redirection();
                tracing::debug!(
                    %host_path,
                    %status,
                    reachable,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "http.probe"
                );
                reachable
            }
            Err(err) => {
                tracing::debug!(%host_path, error = %err.without_url(), "http.probe.failed");
                false
            }
        }
    }

    async fn send_with_retries<T>(
        &self,
        url: Url,
        body: Vec<u8>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let bearer = match &opts.auth {
            Auth::Bearer(tok) => Some(sanitize_api_key(tok)?),
            _ => None,
        };
        let query: Option<(&str, &str)> = match &opts.auth {
            Auth::Query { name, value } => Some((*name, value.as_ref())),
            _ => None,
        };
        let redacted_q = query.map(|(k, v)| redact_pair(k, v));
        let req_id = uuid::Uuid::new_v4().simple().to_string();
        let mut attempt = 0usize;

        loop {
            let mut rb = self
                .inner
                .post(url.clone())
                .timeout(timeout)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone());
            if let Some(pair) = query {
                rb = rb.query(&[pair]);
            }
            if let Some(tok) = &bearer {
                rb = rb.bearer_auth(tok);
            }

            tracing::debug!(
                req_id = %req_id,
                attempt = attempt + 1,
                max_retries,
                host_path = %host_path(&url),
                query = ?redacted_q,
                timeout_ms = timeout.as_millis() as u64,
                auth_kind = opts.auth.kind(),
                body_len = body.len(),
                "http.request.start"
            );

            let started = Instant::now();
            let sent = match rb.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let headers = resp.headers().clone();
                    resp.bytes().await.map(|b| (status, headers, b))
                }
                Err(err) => Err(err),
            };

            let (status, headers, bytes) = match sent {
                Ok(parts) => parts,
                Err(err) => {
                    // The URL may carry a query key.
                    let message = err.without_url().to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff(attempt);
                        tracing::warn!(
                            req_id = %req_id,
                            attempt,
                            backoff_ms = delay.as_millis() as u64,
                            message = %message,
                            "http.retrying.network"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(req_id = %req_id, attempt, message = %message, "http.network_error");
                    return Err(HttpError::Network(message));
                }
            };

            let request_id = headers
                .get("x-request-id")
                .or_else(|| headers.get("x-goog-request-id"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();
            let snippet = snip_body(&bytes);

            tracing::debug!(
                req_id = %req_id,
                %status,
                duration_ms = started.elapsed().as_millis() as u64,
                body_len = bytes.len(),
                x_request_id = %request_id,
                "http.response.headers"
            );
            tracing::trace!(req_id = %req_id, body_snippet = %snippet, "http.response.body_snippet");

            if status.is_success() {
                return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                    tracing::warn!(req_id = %req_id, serde_err = %e, "http.response.decode_error");
                    HttpError::Decode(e.to_string(), snippet)
                });
            }

            let message = extract_error_message(&bytes);
            let is_429 = status == StatusCode::TOO_MANY_REQUESTS;
            if (is_429 || status.is_server_error()) && attempt < max_retries {
                attempt += 1;
                let delay = match retry_after_delay_secs(&headers) {
                    Some(secs) => Duration::from_secs(secs),
                    None if is_429 => backoff(attempt).max(Duration::from_millis(1100)),
                    None => backoff(attempt),
                };
                tracing::warn!(
                    req_id = %req_id,
                    %status,
                    attempt,
                    backoff_ms = delay.as_millis() as u64,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(req_id = %req_id, %status, message = %message, "http.error");
            return Err(HttpError::Api {
                status,
                message,
                request_id,
            });
        }
    }
}

fn backoff(attempt: usize) -> Duration {
    Duration::from_millis(200u64.saturating_mul(1 << (attempt.saturating_sub(1)).min(10)))
}

fn host_path(url: &Url) -> String {
    format!("{}{}", url.host_str().unwrap_or("-"), url.path())
}

fn redact_pair(key: &str, value: &str) -> (String, String) {
    let shown = if SECRET_QUERY_KEYS.contains(&key.to_ascii_lowercase().as_str()) {
        "<redacted>".to_string()
    } else {
        value.to_string()
    };
    (key.to_string(), shown)
}

/// `{"error":{"message":..}}` (Google, OpenAI), else a flat `message`,
/// `detail` or `error` string, else the raw body snippet.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }
    #[derive(Deserialize)]
    struct Detail {
        message: String,
    }
    #[derive(Deserialize)]
    struct Flat {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<Envelope>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Flat>(body) {
        if let Some(found) = [m.message, m.detail, m.error].into_iter().find(|c| !c.is_empty()) {
            return found;
        }
    }
    snip_body(body)
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .parse()
        .ok()
}

fn snip_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.chars().count() > SNIPPET_CHARS {
        let mut snip: String = text.chars().take(SNIPPET_CHARS).collect();
        snip.push_str("...");
        snip
    } else {
        text.into_owned()
    }
}

/// Strip quotes and whitespace a pasted key often carries, and reject bytes
/// that cannot go into an `Authorization` header.
fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    HeaderValue::from_str(&format!("Bearer {s}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}
