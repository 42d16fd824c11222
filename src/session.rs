use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode, header, request::Parts};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::config::{AppConfig, Env};

/// Header accepted by [`LocalBypassProvider`] as a ready-made tenant session.
pub const LOCAL_BYPASS_HEADER: &str = "x-church-id";

/// Session
///
/// The authenticated actor as reported by the authentication provider.
/// `church_id` scopes every CMS request to one church; a session without it
/// is not usable by the dashboard.
///
/// Fields this service does not read are kept in `extra`, so a session
/// serializes back to the same JSON the provider sent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    /// Tenant identifier of the church the actor administers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub church_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    /// Provider-specific fields (roles, access tokens, ...).
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Tenant identifier, if present and non-empty.
    pub fn tenant(&self) -> Option<&str> {
        self.church_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// SessionUser
///
/// Display identity of the signed-in member. Every field is optional because
/// providers differ in what they expose.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Anything else the provider reports about the user (`image`, ...).
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Map<String, Value>,
}

/// Claims
///
/// Payload of a signed session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the member's id at the auth provider.
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "churchId", default)]
    pub church_id: Option<String>,
    /// Expiration Time. Always validated.
    pub exp: usize,
    /// Issued At.
    pub iat: usize,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Session {
            user: Some(SessionUser {
                id: Some(claims.sub),
                name: claims.name,
                email: claims.email,
                ..SessionUser::default()
            }),
            church_id: claims.church_id,
            expires: DateTime::<Utc>::from_timestamp(claims.exp as i64, 0),
            ..Session::default()
        }
    }
}

/// SessionError
///
/// The session could not be resolved at all. This is distinct from "no session":
/// an unauthenticated visitor is `Ok(None)`, a broken auth provider is an error.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("session provider unreachable: {0}")]
    Unreachable(String),

    #[error("session provider answered with status {0}")]
    Upstream(StatusCode),

    #[error("session provider returned an unreadable body: {0}")]
    InvalidResponse(String),
}

/// SessionProvider
///
/// Resolves the session for the request described by `parts`. Implementations
/// may suspend while they validate cookies or call out to an auth service.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn resolve(&self, parts: &Parts) -> Result<Option<Session>, SessionError>;
}

/// SessionState
///
/// Shared handle to the configured provider.
pub type SessionState = Arc<dyn SessionProvider>;

/// build_session_provider
///
/// Picks the provider for the given configuration: the remote provider when
/// `auth_session_url` is set, local token verification otherwise. The result
/// is wrapped in [`LocalBypassProvider`] only when `local_bypass` was opted
/// into and the environment is `Local`.
pub fn build_session_provider(config: &AppConfig) -> Result<SessionState, reqwest::Error> {
    let base: SessionState = match &config.auth_session_url {
        Some(url) => Arc::new(RemoteSessionProvider::new(url, config.auth_timeout)?),
        None => Arc::new(JwtSessionProvider::new(
            &config.jwt_secret,
            &config.session_cookie,
        )),
    };

    if config.local_bypass && config.env == Env::Local {
        return Ok(Arc::new(LocalBypassProvider::new(base)));
    }

    Ok(base)
}

// 1. Signed token sessions

/// JwtSessionProvider
///
/// Verifies an HS256 session token carried in the session cookie or in an
/// `Authorization: Bearer` header. The cookie is tried first; when it does not
/// verify, the bearer token still gets its turn.
#[derive(Clone)]
pub struct JwtSessionProvider {
    decoding_key: DecodingKey,
    validation: Validation,
    cookie_name: String,
}

impl JwtSessionProvider {
    pub fn new(secret: &str, cookie_name: &str) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            cookie_name: cookie_name.to_string(),
        }
    }

    /// Candidate tokens in the order they are tried: cookie, then bearer.
    fn tokens_from_headers(&self, headers: &HeaderMap) -> Vec<String> {
        let cookie = CookieJar::from_headers(headers)
            .get(&self.cookie_name)
            .map(|cookie| cookie.value().to_string());

        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer ").map(str::to_owned));

        cookie.into_iter().chain(bearer).collect()
    }

    fn verify(&self, token: &str) -> Option<Session> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims.into()),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                    kind => tracing::debug!(?kind, "session token rejected"),
                }
                None
            }
        }
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn resolve(&self, parts: &Parts) -> Result<Option<Session>, SessionError> {
        // Any token we cannot trust means "not signed in", never a provider failure.
        Ok(self
            .tokens_from_headers(&parts.headers)
            .iter()
            .find_map(|token| self.verify(token)))
    }
}

// 2. External auth service sessions

/// RemoteSessionProvider
///
/// Asks an external auth service for the current session (`GET <url>`),
/// forwarding the caller's cookies and bearer token. The endpoint answers with
/// a session object, `{}` or `null`.
#[derive(Clone)]
pub struct RemoteSessionProvider {
    client: reqwest::Client,
    url: String,
}

impl RemoteSessionProvider {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl SessionProvider for RemoteSessionProvider {
    async fn resolve(&self, parts: &Parts) -> Result<Option<Session>, SessionError> {
        let mut request = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "application/json");

        for name in [header::COOKIE, header::AUTHORIZATION] {
            if let Some(value) = parts.headers.get(&name) {
                request = request.header(name, value.clone());
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| SessionError::Unreachable(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Ok(None),
            status => return Err(SessionError::Upstream(status)),
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SessionError::Unreachable(e.to_string()))?;

        serde_json::from_slice::<Option<Session>>(&body)
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))
    }
}

// 3. Local development bypass

/// LocalBypassProvider
///
/// Development convenience: a request carrying `x-church-id` is treated as a
/// signed-in member of that church. Everything else falls through to the
/// wrapped provider. Only constructed when `APP_ENV=local` is set explicitly.
pub struct LocalBypassProvider {
    inner: SessionState,
}

impl LocalBypassProvider {
    pub fn new(inner: SessionState) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl SessionProvider for LocalBypassProvider {
    async fn resolve(&self, parts: &Parts) -> Result<Option<Session>, SessionError> {
        if let Some(church_id) = parts
            .headers
            .get(LOCAL_BYPASS_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            tracing::debug!(church_id, "local session bypass");
            return Ok(Some(Session {
                user: Some(SessionUser {
                    id: Some("local-dev".to_string()),
                    name: Some("Local Developer".to_string()),
                    ..SessionUser::default()
                }),
                church_id: Some(church_id.to_string()),
                ..Session::default()
            }));
        }

        self.inner.resolve(parts).await
    }
}

// 4. Fixed outcome (tests)

/// StaticSessionProvider
///
/// Returns the same outcome for every request and counts how often it was asked.
pub struct StaticSessionProvider {
    outcome: Result<Option<Session>, SessionError>,
    calls: AtomicUsize,
}

impl StaticSessionProvider {
    pub fn new(outcome: Result<Option<Session>, SessionError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    /// A provider that always reports the given session.
    pub fn signed_in(session: Session) -> Self {
        Self::new(Ok(Some(session)))
    }

    /// A provider that never finds a session.
    pub fn anonymous() -> Self {
        Self::new(Ok(None))
    }

    /// A provider whose every call fails.
    pub fn failing(error: SessionError) -> Self {
        Self::new(Err(error))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn resolve(&self, _parts: &Parts) -> Result<Option<Session>, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
