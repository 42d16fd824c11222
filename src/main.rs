use church_cms::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    session::build_session_provider,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initializes logging, picks the session provider and
/// serves the CMS.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise a development-friendly default.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "church_cms=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Session provider
    let sessions = build_session_provider(&config)
        .expect("FATAL: Failed to build the session provider HTTP client.");

    match &config.auth_session_url {
        Some(url) => tracing::info!(%url, "Resolving sessions through the external auth service"),
        None => tracing::info!(cookie = %config.session_cookie, "Resolving sessions from signed tokens"),
    }
    if config.local_bypass {
        tracing::warn!("Local session bypass enabled (x-church-id header)");
    }
    match config.login_route() {
        Some(path) => tracing::info!(%path, "Serving the login page locally"),
        None => tracing::info!(login = %config.login_path, "Login page hosted externally"),
    }

    // 4. Router and server
    let addr = config.bind_addr();
    let app = create_router(AppState { sessions, config });

    let listener = TcpListener::bind(&addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener.");

    tracing::info!("Listening on {}", addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
