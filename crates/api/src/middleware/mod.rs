//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. CORS (answers preflight before anything else runs)
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//! 5. Auth gate (protected routes only, via `route_layer`)

pub mod auth;
pub mod cors;
pub mod request_id;

pub use auth::{CurrentUser, require_auth};
pub use cors::cors_layer;
pub use request_id::request_id_middleware;
