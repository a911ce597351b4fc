//! Media storage backends.

mod local;
mod memory;

pub use local::LocalMediaStorage;
pub use memory::InMemoryMediaStorage;

use quillpress_core::ports::MediaError;

/// Reject keys that could escape the storage root.
fn checked_key(key: &str) -> Result<&str, MediaError> {
    let escapes = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if escapes {
        return Err(MediaError::InvalidKey(key.to_string()));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_key() {
        assert!(checked_key("post/media/photo.png").is_ok());
        assert!(checked_key("../etc/passwd").is_err());
        assert!(checked_key("/absolute").is_err());
        assert!(checked_key("a//b").is_err());
        assert!(checked_key("").is_err());
    }
}
