use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Every path registered below. The login path is checked against this list
/// so it can never point back into the guarded area.
pub const PROTECTED_PATHS: &[&str] = &[
    "/cms",
    "/cms/messages",
    "/cms/events",
    "/cms/media",
    "/cms/website",
    "/cms/session",
];

/// Authenticated Router Module
///
/// The CMS dashboard. Every route here sits behind the `require_session`
/// layer, which runs the access guard once per request and stores the
/// authorized session in the request extensions for the handlers below.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /cms
        // Dashboard home.
        .route("/cms", get(handlers::get_dashboard))
        // GET /cms/messages
        .route("/cms/messages", get(handlers::get_messages))
        // GET /cms/events
        .route("/cms/events", get(handlers::get_events))
        // GET /cms/media
        .route("/cms/media", get(handlers::get_media))
        // GET /cms/website
        // Website theme settings.
        .route("/cms/website", get(handlers::get_website))
        // GET /cms/session
        // The session the guard authorized, for the front end's own use.
        .route("/cms/session", get(handlers::get_session))
}
