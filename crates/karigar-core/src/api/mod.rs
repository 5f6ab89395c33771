//! Session-aware HTTP client for the karigar booking API.
//!
//! Wraps outbound calls with bearer-token attachment and a single
//! refresh-and-replay pass on 401 responses. The session store is injected;
//! there is no ambient global state. Concurrent 401s coalesce behind one
//! token exchange.

mod error;

pub mod auth;
pub mod bookings;
pub mod payments;
pub mod services;

pub use error::ApiError;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::session::SessionStore;

/// Token refresh endpoint. Called outside the normal pipeline: no bearer
/// header, no replay.
const REFRESH_PATH: &str = "/auth/token/refresh/";

/// An outbound call captured as a value, so the 401 path can replay it
/// without mutating shared request state.
struct Call {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

/// One delivery of a call. `retried` is set after the single
/// refresh-and-replay pass; a 401 on a retried delivery is final.
struct Attempt<'a> {
    call: &'a Call,
    retried: bool,
}

enum RefreshOutcome {
    /// A fresh access token is in the store; replay the call.
    Refreshed,
    /// No refresh token available; the original 401 stands.
    NoRefreshToken,
    /// The exchange failed; the session has been cleared.
    Failed,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// HTTP client with bearer attachment and 401 refresh-and-replay.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: SessionStore,
    /// Serializes refresh attempts so concurrent 401s trigger one exchange.
    refresh_gate: Mutex<()>,
}

impl ApiClient {
    /// Creates a client against the given base URL with a default HTTP stack.
    pub fn new(base_url: impl Into<String>, store: SessionStore) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, store)
    }

    /// Creates a client with a caller-provided `reqwest::Client`
    /// (for timeouts, proxies, etc.).
    pub fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        store: SessionStore,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            store,
            refresh_gate: Mutex::new(()),
        }
    }

    /// The session store this client reads tokens from.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.execute(Call {
            method: Method::GET,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(key, value)| ((*key).to_string(), value.clone()))
                .collect(),
            body: None,
        })
        .await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(Call {
            method: Method::POST,
            path: path.to_string(),
            query: Vec::new(),
            body: Some(serde_json::to_value(body)?),
        })
        .await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(Call {
            method: Method::PUT,
            path: path.to_string(),
            query: Vec::new(),
            body: Some(serde_json::to_value(body)?),
        })
        .await
    }

    async fn execute<T: DeserializeOwned>(&self, call: Call) -> Result<T, ApiError> {
        let mut attempt = Attempt {
            call: &call,
            retried: false,
        };

        loop {
            let access = self.store.load().map(|session| session.access_token);
            let response = self.send(attempt.call, access.as_deref()).await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED && !attempt.retried {
                let body = read_body(response).await;
                match self.refresh_access(access.as_deref()).await {
                    RefreshOutcome::Refreshed => {
                        attempt.retried = true;
                        continue;
                    }
                    RefreshOutcome::NoRefreshToken => {
                        if let Err(err) = self.store.clear() {
                            tracing::warn!(error = %err, "failed to clear session");
                        }
                        return Err(ApiError::Http {
                            status: status.as_u16(),
                            body,
                        });
                    }
                    RefreshOutcome::Failed => {
                        return Err(ApiError::SessionExpired {
                            status: status.as_u16(),
                            body,
                        });
                    }
                }
            }

            if !status.is_success() {
                return Err(ApiError::Http {
                    status: status.as_u16(),
                    body: read_body(response).await,
                });
            }
            return response.json().await.map_err(ApiError::Decode);
        }
    }

    async fn send(
        &self,
        call: &Call,
        access: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, call.path);
        let mut request = self.http.request(call.method.clone(), &url);
        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }
        if let Some(token) = access {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// Exchanges the stored refresh token for a new access token.
    ///
    /// Serialized by `refresh_gate`: the first 401 performs the exchange and
    /// waiters that find the token already rotated skip the network call.
    /// Any exchange failure clears the whole session.
    async fn refresh_access(&self, used_access: Option<&str>) -> RefreshOutcome {
        let _gate = self.refresh_gate.lock().await;

        let Some(session) = self.store.load() else {
            return RefreshOutcome::NoRefreshToken;
        };
        if session.refresh_token.is_empty() {
            return RefreshOutcome::NoRefreshToken;
        }
        if used_access.is_some_and(|used| used != session.access_token) {
            tracing::debug!("access token already rotated by a concurrent refresh");
            return RefreshOutcome::Refreshed;
        }

        tracing::debug!("access token rejected, exchanging refresh token");
        let url = format!("{}{REFRESH_PATH}", self.base_url);
        let response = match self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refresh": session.refresh_token }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed, clearing session");
                let _ = self.store.clear();
                return RefreshOutcome::Failed;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                status = response.status().as_u16(),
                "refresh token rejected, clearing session"
            );
            let _ = self.store.clear();
            return RefreshOutcome::Failed;
        }

        let payload: RefreshResponse = match response.json().await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "malformed refresh response, clearing session");
                let _ = self.store.clear();
                return RefreshOutcome::Failed;
            }
        };

        if let Err(err) = self.store.update_access(&payload.access) {
            tracing::warn!(error = %err, "failed to persist refreshed access token");
        }
        RefreshOutcome::Refreshed
    }
}

/// Reads a response body as JSON, falling back to a string value for
/// non-JSON payloads.
async fn read_body(response: reqwest::Response) -> Value {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

/// List endpoints return either a bare array or a paginated envelope,
/// depending on server pagination settings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListResponse<T> {
    Paginated { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> ListResponse<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Paginated { results } => results,
            ListResponse::Plain(items) => items,
        }
    }
}

/// Decimal fields cross the wire as strings; tolerate bare numbers too.
pub(crate) mod decimal {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Number(number) => format!("{number:.2}"),
        })
    }
}
