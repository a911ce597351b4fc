//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod activity;
mod auth;
mod clock;
mod media;
mod rate_limit;
mod repository;

pub use activity::ActivityLog;
pub use auth::{AuthError, PasswordService, TokenClaims, TokenService, TokenSubject};
pub use clock::{Clock, SystemClock};
pub use media::{MediaError, MediaStorage};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{
    AdminRepository, AuthorRepository, BaseRepository, CategoryRepository, MediaRepository,
    PostRepository, TagRepository,
};
