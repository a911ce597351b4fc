//! # Quillpress Shared
//!
//! Wire types shared between the API server and its clients.
//! Kept free of server-side crates so a front end can depend on it directly.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
