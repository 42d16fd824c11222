use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Paths owned by built-in routes (health check, API documentation). A
/// login path may neither equal one of these nor sit below it.
pub const RESERVED_PREFIXES: &[&str] = &["/health", "/swagger-ui", "/api-docs"];

/// Public Router Module
///
/// Endpoints reachable without a session. The login route must stay here,
/// otherwise an unauthenticated visitor would be redirected to a page that
/// redirects again.
///
/// `login_route` is `None` when the login page is hosted by the auth provider
/// (or the configured path is unusable); nothing is registered for it then.
pub fn public_routes(login_route: Option<&str>) -> Router<AppState> {
    let router = Router::new()
        // GET /health
        // Liveness check for the process manager and load balancer.
        .route("/health", get(|| async { "ok" }));

    match login_route {
        // GET /cms/login (or the configured local login path)
        Some(path) => router.route(path, get(handlers::get_login_page)),
        None => router,
    }
}
