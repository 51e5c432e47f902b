//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! Authentication is not a layer: handlers opt in through the
//! [`RequireUser`] / [`RequireAdmin`] extractors.

pub mod auth;
pub mod context;
pub mod request_id;

pub use auth::{AuthRejection, RequireAdmin, RequireUser};
pub use context::{RequestContext, request_origin};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
