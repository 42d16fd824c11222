use reqwest::Url;
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::routes::{authenticated::PROTECTED_PATHS, public::RESERVED_PREFIXES};

/// Secret used to sign local session tokens when `AUTH_SECRET` is not set.
pub const LOCAL_AUTH_SECRET: &str = "church-cms-local-session-secret";

/// Route visitors are sent to when they have no usable session.
pub const DEFAULT_LOGIN_PATH: &str = "/cms/login";

/// AppConfig
///
/// Holds the service configuration. Loaded once at start-up and treated as
/// immutable afterwards; handlers and extractors pull it from the shared state via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the secret fallback and log format.
    pub env: Env,
    // Header session bypass (x-church-id). Only ever true when APP_ENV=local was set explicitly.
    pub local_bypass: bool,
    // HS256 secret used to verify session tokens.
    pub jwt_secret: String,
    // Session endpoint of an external auth service. When present it replaces local token checks.
    pub auth_session_url: Option<String>,
    // Upper bound on a single call to the external session endpoint.
    pub auth_timeout: Duration,
    // Name of the cookie carrying the session token.
    pub session_cookie: String,
    // Redirect target for unauthenticated visitors: a local path or an http(s) URL.
    pub login_path: String,
    // TCP port the HTTP listener binds to.
    pub port: u16,
}

/// Env
///
/// Runtime context. `Local` allows the development secret fallback and pretty logs,
/// `Production` requires every secret to be provided explicitly.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// LoginTarget
///
/// Where the login destination lives.
#[derive(Debug, PartialEq)]
pub enum LoginTarget<'a> {
    /// A path served by this service (registered as a public route).
    Local(&'a str),
    /// A page hosted elsewhere, typically by the auth provider.
    External(&'a str),
}

/// LoginPathError
///
/// A login destination the service cannot honour.
#[derive(Debug, Error, PartialEq)]
pub enum LoginPathError {
    #[error("login path `{0}` must be an absolute path or an http(s) URL")]
    Malformed(String),

    #[error("login path `{0}` is a protected CMS route; visitors would be redirected to it forever")]
    Protected(String),

    #[error("login path `{0}` collides with a built-in route")]
    Reserved(String),
}

/// parse_login_path
///
/// Classifies a configured login destination. Local paths must be plain
/// (no route parameters, query or fragment) and must not shadow a protected
/// or built-in route.
pub fn parse_login_path(path: &str) -> Result<LoginTarget<'_>, LoginPathError> {
    if !path.starts_with('/') {
        return match Url::parse(path) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
                Ok(LoginTarget::External(path))
            }
            _ => Err(LoginPathError::Malformed(path.to_string())),
        };
    }

    if path.starts_with("//") || path.contains(['{', '}', '*', '?', '#']) {
        return Err(LoginPathError::Malformed(path.to_string()));
    }

    if PROTECTED_PATHS.contains(&path) {
        return Err(LoginPathError::Protected(path.to_string()));
    }

    if RESERVED_PREFIXES
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)))
    {
        return Err(LoginPathError::Reserved(path.to_string()));
    }

    Ok(LoginTarget::Local(path))
}

impl Default for AppConfig {
    /// Safe, non-panicking configuration for tests.
    fn default() -> Self {
        Self {
            env: Env::Local,
            local_bypass: false,
            jwt_secret: LOCAL_AUTH_SECRET.to_string(),
            auth_session_url: None,
            auth_timeout: Duration::from_millis(5000),
            session_cookie: "cms_session".to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            port: 3000,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// `APP_ENV` unset means `Local` without the header bypass; `APP_ENV=local`
    /// additionally enables the bypass; any other value is treated as `Production`.
    ///
    /// # Panics
    /// Panics in `Production` when `AUTH_SECRET` is missing, when `CMS_LOGIN_PATH`
    /// is not a usable login destination, and when a numeric variable (`PORT`,
    /// `AUTH_TIMEOUT_MS`) is present but unparsable. The service must not start
    /// with a configuration it cannot honour.
    pub fn load() -> Self {
        // 1. Environment
        // Only an explicit "local" opts into the bypass, so a deployment that forgets
        // APP_ENV never accepts header sessions.
        let (env, local_bypass) = match env::var("APP_ENV").ok().as_deref() {
            None => (Env::Local, false),
            Some("local") => (Env::Local, true),
            Some(_) => (Env::Production, false),
        };

        // 2. Token secret (mandatory outside Local)
        let jwt_secret = match env {
            Env::Production => {
                env::var("AUTH_SECRET").expect("FATAL: AUTH_SECRET must be set in production.")
            }
            Env::Local => env::var("AUTH_SECRET").unwrap_or_else(|_| LOCAL_AUTH_SECRET.to_string()),
        };

        // 3. External session endpoint
        let auth_session_url = env::var("AUTH_SESSION_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let auth_timeout = env::var("AUTH_TIMEOUT_MS")
            .ok()
            .map(|ms| {
                ms.parse::<u64>()
                    .expect("FATAL: AUTH_TIMEOUT_MS must be a number of milliseconds")
            })
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(5000));

        // 4. Login destination, validated before the router is built from it.
        let login_path =
            env::var("CMS_LOGIN_PATH").unwrap_or_else(|_| DEFAULT_LOGIN_PATH.to_string());
        if let Err(e) = parse_login_path(&login_path) {
            panic!("FATAL: CMS_LOGIN_PATH is invalid: {}", e);
        }

        // 5. Listener
        let port = env::var("PORT")
            .ok()
            .map(|p| p.parse::<u16>().expect("FATAL: PORT must be a valid port number"))
            .unwrap_or(3000);

        Self {
            env,
            local_bypass,
            jwt_secret,
            auth_session_url,
            auth_timeout,
            session_cookie: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "cms_session".to_string()),
            login_path,
            port,
        }
    }

    /// The login path to serve locally, if the configured destination is a valid local path.
    pub fn login_route(&self) -> Option<&str> {
        match parse_login_path(&self.login_path) {
            Ok(LoginTarget::Local(path)) => Some(path),
            _ => None,
        }
    }

    /// Socket address the HTTP listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_login_path_is_local() {
        assert_eq!(
            parse_login_path(DEFAULT_LOGIN_PATH),
            Ok(LoginTarget::Local("/cms/login"))
        );
    }

    #[test]
    fn external_login_page_is_accepted() {
        assert_eq!(
            parse_login_path("https://auth.example.org/login"),
            Ok(LoginTarget::External("https://auth.example.org/login"))
        );
    }

    #[test]
    fn relative_or_odd_paths_are_malformed() {
        for path in ["login", "", "ftp://auth.example.org/login", "/cms/{id}", "/login?next=1", "//evil.example"] {
            assert!(
                matches!(parse_login_path(path), Err(LoginPathError::Malformed(_))),
                "{:?} should be malformed",
                path
            );
        }
    }

    #[test]
    fn protected_routes_cannot_be_the_login_path() {
        for path in ["/cms", "/cms/messages", "/cms/session"] {
            assert_eq!(
                parse_login_path(path),
                Err(LoginPathError::Protected(path.to_string()))
            );
        }
    }

    #[test]
    fn built_in_routes_cannot_be_the_login_path() {
        for path in ["/health", "/swagger-ui", "/swagger-ui/login", "/api-docs/openapi.json"] {
            assert_eq!(
                parse_login_path(path),
                Err(LoginPathError::Reserved(path.to_string()))
            );
        }
    }

    #[test]
    fn external_login_is_not_served_locally() {
        let config = AppConfig {
            login_path: "https://auth.example.org/login".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.login_route(), None);
    }
}
