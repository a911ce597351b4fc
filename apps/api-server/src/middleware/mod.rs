//! Middleware and request extractors.

pub mod auth;
pub mod error;
pub mod rate_limit;
pub mod request_id;

pub use auth::{Identity, OptionalIdentity};
pub use error::{AppError, AppResult};
pub use rate_limit::RateLimitMiddleware;
pub use request_id::{RequestId, RequestIdMiddleware};
