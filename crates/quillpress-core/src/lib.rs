//! # Quillpress Core
//!
//! The domain layer of Quillpress: the post lifecycle state machine, the
//! authorization policy for authors and administrators, and the ports that
//! infrastructure implements. No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError, ValidationErrors};
