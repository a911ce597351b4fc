//! # Quillpress Infrastructure
//!
//! Concrete implementations of the ports defined in `quillpress-core`.
//! This crate contains database, media storage, and authentication integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `rate-limit` - Login throttling via governor

pub mod database;
pub mod media;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use database::memory::{
    InMemoryActivityLog, InMemoryAdminRepository, InMemoryAuthorRepository,
    InMemoryCategoryRepository, InMemoryMediaRepository, InMemoryPostRepository,
    InMemoryTagRepository,
};
pub use database::DatabaseConnections;
pub use media::{InMemoryMediaStorage, LocalMediaStorage};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
