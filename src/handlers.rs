use crate::{
    auth::CmsSession,
    config::AppConfig,
    models::{DashboardSection, LoginPage, Section},
    session::Session,
};
use axum::{Json, extract::State};

/// Builds the placeholder page for `section`, scoped to the session's church.
fn section_page(section: Section, session: &Session) -> Json<DashboardSection> {
    // CmsSession only exists for sessions with a tenant.
    let church_id = session.tenant().unwrap_or_default();
    Json(DashboardSection::new(section, church_id))
}

/// get_login_page
///
/// [Public Route] Describes the login destination unauthenticated visitors are sent to.
/// Mounted at `CMS_LOGIN_PATH` (default `/cms/login`), and not mounted at all when
/// that setting points at an external login page.
#[utoipa::path(
    get,
    path = "/cms/login",
    description = "Served at the configured CMS_LOGIN_PATH; `/cms/login` is the default.",
    responses((status = 200, description = "Login page", body = LoginPage))
)]
pub async fn get_login_page(State(config): State<AppConfig>) -> Json<LoginPage> {
    let provider = if config.auth_session_url.is_some() {
        "remote"
    } else {
        "token"
    };

    Json(LoginPage {
        title: "Sign in to the church CMS".to_string(),
        login_path: config.login_path,
        provider: provider.to_string(),
    })
}

/// get_dashboard
///
/// [Protected Route] Dashboard home.
#[utoipa::path(
    get,
    path = "/cms",
    responses(
        (status = 200, description = "Dashboard", body = DashboardSection),
        (status = 307, description = "Redirect to the configured login path"),
        (status = 503, description = "Authentication service unavailable")
    )
)]
pub async fn get_dashboard(CmsSession(session): CmsSession) -> Json<DashboardSection> {
    section_page(Section::Dashboard, &session)
}

/// get_messages
///
/// [Protected Route] Messages area.
#[utoipa::path(
    get,
    path = "/cms/messages",
    responses(
        (status = 200, description = "Messages", body = DashboardSection),
        (status = 307, description = "Redirect to the configured login path"),
        (status = 503, description = "Authentication service unavailable")
    )
)]
pub async fn get_messages(CmsSession(session): CmsSession) -> Json<DashboardSection> {
    section_page(Section::Messages, &session)
}

/// get_events
///
/// [Protected Route] Events area.
#[utoipa::path(
    get,
    path = "/cms/events",
    responses(
        (status = 200, description = "Events", body = DashboardSection),
        (status = 307, description = "Redirect to the configured login path"),
        (status = 503, description = "Authentication service unavailable")
    )
)]
pub async fn get_events(CmsSession(session): CmsSession) -> Json<DashboardSection> {
    section_page(Section::Events, &session)
}

/// get_media
///
/// [Protected Route] Media area.
#[utoipa::path(
    get,
    path = "/cms/media",
    responses(
        (status = 200, description = "Media", body = DashboardSection),
        (status = 307, description = "Redirect to the configured login path"),
        (status = 503, description = "Authentication service unavailable")
    )
)]
pub async fn get_media(CmsSession(session): CmsSession) -> Json<DashboardSection> {
    section_page(Section::Media, &session)
}

/// get_website
///
/// [Protected Route] Website theme area.
#[utoipa::path(
    get,
    path = "/cms/website",
    responses(
        (status = 200, description = "Website theme", body = DashboardSection),
        (status = 307, description = "Redirect to the configured login path"),
        (status = 503, description = "Authentication service unavailable")
    )
)]
pub async fn get_website(CmsSession(session): CmsSession) -> Json<DashboardSection> {
    section_page(Section::Website, &session)
}

/// get_session
///
/// [Protected Route] Returns the authorized session exactly as the provider reported it.
#[utoipa::path(
    get,
    path = "/cms/session",
    responses(
        (status = 200, description = "Current session", body = Session),
        (status = 307, description = "Redirect to the configured login path"),
        (status = 503, description = "Authentication service unavailable")
    )
)]
pub async fn get_session(CmsSession(session): CmsSession) -> Json<Session> {
    Json(session)
}
