//! Persistence: SeaORM repositories for PostgreSQL plus in-memory fallbacks.

mod connections;
pub mod memory;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::{DatabaseConfig, DatabaseConnections};

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresActivityLog, PostgresAdminRepository, PostgresAuthorRepository,
    PostgresCategoryRepository, PostgresMediaRepository, PostgresPostRepository,
    PostgresTagRepository,
};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
