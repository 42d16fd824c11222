use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    config::AppConfig,
    session::{Session, SessionError, SessionProvider, SessionState},
};

/// AccessDecision
///
/// Outcome of the access guard. The guard never performs the redirect itself;
/// the HTTP layer turns `Redirect` into a response.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessDecision {
    /// The session carries a tenant and may be used by protected code.
    Authorized(Session),
    /// No usable session. Send the visitor to this path.
    Redirect(String),
}

impl AccessDecision {
    /// Converts the decision into the session, or into the rejection that sends
    /// the visitor away.
    pub fn into_session(self) -> Result<Session, GuardRejection> {
        match self {
            AccessDecision::Authorized(session) => Ok(session),
            AccessDecision::Redirect(path) => Err(GuardRejection::Redirect(path)),
        }
    }
}

/// evaluate
///
/// The decision step of the guard. A session is authorized only when it
/// carries a non-empty tenant identifier; it is then returned unchanged.
pub fn evaluate(session: Option<Session>, login_path: &str) -> AccessDecision {
    match session {
        Some(session) if session.tenant().is_some() => AccessDecision::Authorized(session),
        _ => AccessDecision::Redirect(login_path.to_string()),
    }
}

/// require_auth
///
/// Resolves the session for `parts` through `provider` and applies [`evaluate`].
/// A provider failure is returned as the error, never mapped to a decision.
pub async fn require_auth(
    provider: &dyn SessionProvider,
    parts: &Parts,
    login_path: &str,
) -> Result<AccessDecision, SessionError> {
    let session = provider.resolve(parts).await?;
    let decision = evaluate(session, login_path);

    match &decision {
        AccessDecision::Authorized(session) => {
            tracing::debug!(church_id = session.tenant(), "session authorized")
        }
        AccessDecision::Redirect(path) => {
            tracing::debug!(uri = %parts.uri, redirect = %path, "no tenant session, redirecting")
        }
    }

    Ok(decision)
}

/// GuardRejection
///
/// Why a protected request did not reach its handler.
#[derive(Debug)]
pub enum GuardRejection {
    Redirect(String),
    Unavailable(SessionError),
}

impl From<SessionError> for GuardRejection {
    fn from(error: SessionError) -> Self {
        GuardRejection::Unavailable(error)
    }
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            GuardRejection::Redirect(path) => Redirect::temporary(&path).into_response(),
            GuardRejection::Unavailable(error) => {
                tracing::error!(%error, "session resolution failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Authentication service unavailable",
                )
                    .into_response()
            }
        }
    }
}

/// CmsSession
///
/// Extractor for the authorized session of a CMS request.
///
/// Behind the `require_session` layer the session is already in the request
/// extensions and is reused as is. Anywhere else the extractor runs the guard
/// itself, so a handler taking `CmsSession` can never run without a tenant.
#[derive(Debug, Clone)]
pub struct CmsSession(pub Session);

impl<S> FromRequestParts<S> for CmsSession
where
    S: Send + Sync,
    SessionState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(CmsSession(session.clone()));
        }

        let provider = SessionState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let session = require_auth(provider.as_ref(), parts, &config.login_path)
            .await?
            .into_session()?;

        Ok(CmsSession(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN: &str = "/cms/login";

    fn session_for(church_id: Option<&str>) -> Session {
        Session {
            church_id: church_id.map(str::to_string),
            ..Session::default()
        }
    }

    #[test]
    fn no_session_redirects_to_login() {
        assert_eq!(
            evaluate(None, LOGIN),
            AccessDecision::Redirect(LOGIN.to_string())
        );
    }

    #[test]
    fn empty_tenant_redirects_to_login() {
        assert_eq!(
            evaluate(Some(session_for(Some(""))), LOGIN),
            AccessDecision::Redirect(LOGIN.to_string())
        );
    }

    #[test]
    fn missing_tenant_redirects_to_login() {
        assert_eq!(
            evaluate(Some(session_for(None)), LOGIN),
            AccessDecision::Redirect(LOGIN.to_string())
        );
    }

    #[test]
    fn tenant_session_is_returned_unchanged() {
        let session = session_for(Some("abc123"));
        assert_eq!(
            evaluate(Some(session.clone()), LOGIN),
            AccessDecision::Authorized(session)
        );
    }

    #[test]
    fn redirect_decision_becomes_rejection() {
        let rejection = AccessDecision::Redirect(LOGIN.to_string())
            .into_session()
            .unwrap_err();
        assert!(matches!(rejection, GuardRejection::Redirect(path) if path == LOGIN));
    }
}
