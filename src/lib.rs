use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod session;

pub mod routes;
use auth::CmsSession;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use session::{Session, SessionState, StaticSessionProvider, build_session_provider};

/// ApiDoc
///
/// OpenAPI document for the CMS endpoints, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_login_page, handlers::get_dashboard, handlers::get_messages,
        handlers::get_events, handlers::get_media, handlers::get_website,
        handlers::get_session
    ),
    components(
        schemas(
            models::Section, models::DashboardSection, models::LoginPage,
            session::Session, session::SessionUser,
        )
    ),
    tags(
        (name = "church-cms", description = "Church CMS API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable state: the session provider the guard consults and the
/// loaded configuration.
#[derive(Clone)]
pub struct AppState {
    /// Resolves the session of each request.
    pub sessions: SessionState,
    pub config: AppConfig,
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// require_session
///
/// Layout layer of the CMS. Extracting `CmsSession` runs the access guard; a
/// visitor without a tenant session is redirected (or gets a 503 when the
/// provider is down) before any page handler runs. On success the session is
/// stored in the request extensions so the pages below read it without
/// resolving it again.
async fn require_session(
    CmsSession(session): CmsSession,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(session);
    next.run(request).await
}

/// create_router
///
/// Assembles the routes, the session layer, and the observability layers.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name used to correlate every log line of one request.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Swagger UI and the generated OpenAPI JSON.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: health check, plus the login page when it is served locally.
        .merge(public::public_routes(state.config.login_route()))
        // CMS Routes: guarded by `require_session`. route_layer keeps the guard off
        // unmatched paths, so unknown URLs still answer 404.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_session,
            )),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with that id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer (outermost)
        .layer(cors)
}

/// trace_span_logger
///
/// Span for every request, tagged with the `x-request-id` set above so all log
/// lines of one request correlate.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
