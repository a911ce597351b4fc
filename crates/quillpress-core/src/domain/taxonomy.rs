use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationErrors;

const MAX_NAME_LEN: usize = 255;

/// Category - groups posts one-to-many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        }
    }
}

/// Tag - labels posts many-to-many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        }
    }
}

/// Trim and check a category or tag name.
pub fn normalize_label(raw: &str) -> Result<String, ValidationErrors> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationErrors::single("name", "The name field is required."));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationErrors::single(
            "name",
            format!("The name may not be greater than {MAX_NAME_LEN} characters."),
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Rust  ").unwrap(), "Rust");
        assert!(normalize_label("   ").unwrap_err().contains("name"));
        assert!(normalize_label(&"x".repeat(256)).is_err());
    }
}
