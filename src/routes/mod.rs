/// Router Module Index
///
/// Routing is split by access level so the guard is applied once, at the
/// module boundary, instead of per handler.

/// Routes reachable without a session (health check, login descriptor).
pub mod public;

/// CMS dashboard routes. Wrapped in the `require_session` layer.
pub mod authenticated;
