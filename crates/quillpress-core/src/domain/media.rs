use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationErrors;

/// Largest accepted image, in kibibytes.
pub const MAX_IMAGE_KIB: usize = 2048;

/// Named media collection attached to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCollection {
    /// Single-file collection: storing a new image replaces the old one.
    FeaturedImage,
    Gallery,
}

impl MediaCollection {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaCollection::FeaturedImage => "featured_image",
            MediaCollection::Gallery => "gallery",
        }
    }

    pub fn is_single_file(self) -> bool {
        matches!(self, MediaCollection::FeaturedImage)
    }
}

impl fmt::Display for MediaCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaCollection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured_image" => Ok(MediaCollection::FeaturedImage),
            "gallery" => Ok(MediaCollection::Gallery),
            other => Err(format!("unknown media collection '{other}'")),
        }
    }
}

/// A stored file attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: Uuid,
    pub post_id: Uuid,
    pub collection: MediaCollection,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    /// Opaque key understood by the media storage backend.
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}

/// An uploaded image that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate raw upload bytes as an image of acceptable size.
    ///
    /// The MIME type is sniffed from the content; the declared type is ignored.
    pub fn validate(field: &str, file_name: &str, bytes: Vec<u8>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let mime_type = sniff_image(&bytes);
        if mime_type.is_none() {
            errors.add(field, format!("The {field} must be an image."));
        }
        if bytes.len() > MAX_IMAGE_KIB * 1024 {
            errors.add(
                field,
                format!("The {field} may not be greater than {MAX_IMAGE_KIB} kilobytes."),
            );
        }

        match mime_type {
            Some(mime_type) if errors.is_empty() => Ok(Self {
                file_name: sanitize_file_name(file_name, mime_type),
                mime_type,
                bytes,
            }),
            _ => Err(errors),
        }
    }

    pub fn size(&self) -> i64 {
        i64::try_from(self.bytes.len()).unwrap_or(i64::MAX)
    }
}

fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .map(|kind| kind.mime_type())
}

fn sanitize_file_name(raw: &str, mime_type: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        let ext = mime_type.rsplit('/').next().unwrap_or("bin");
        format!("image.{ext}")
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_accepts_png() {
        let upload = ImageUpload::validate("featured_image", "cover.png", PNG.to_vec()).unwrap();
        assert_eq!(upload.mime_type, "image/png");
        assert_eq!(upload.file_name, "cover.png");
    }

    #[test]
    fn test_rejects_non_image() {
        let err = ImageUpload::validate("featured_image", "notes.txt", b"hello".to_vec()).unwrap_err();
        assert!(err.contains("featured_image"));
    }

    #[test]
    fn test_rejects_oversized_image() {
        let mut bytes = PNG.to_vec();
        bytes.resize(MAX_IMAGE_KIB * 1024 + 1, 0);
        let err = ImageUpload::validate("featured_image", "big.png", bytes).unwrap_err();
        assert_eq!(err.fields()["featured_image"].len(), 1);
    }

    #[test]
    fn test_sanitizes_file_name() {
        let upload =
            ImageUpload::validate("gallery_image", "../../etc/pa ss?.png", PNG.to_vec()).unwrap();
        assert_eq!(upload.file_name, "pass.png");

        let upload = ImageUpload::validate("gallery_image", "///", PNG.to_vec()).unwrap();
        assert_eq!(upload.file_name, "image.png");
    }

    #[test]
    fn test_detects_webp() {
        let mut bytes = b"RIFF\0\0\0\0WEBPVP8 ".to_vec();
        bytes.extend_from_slice(&[0; 8]);
        assert_eq!(sniff_image(&bytes), Some("image/webp"));
    }

    #[test]
    fn test_detects_avif() {
        let mut bytes = vec![0, 0, 0, 0x1c];
        bytes.extend_from_slice(b"ftypavif");
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes.extend_from_slice(b"avifmif1miaf");
        assert_eq!(sniff_image(&bytes), Some("image/avif"));
    }

    #[test]
    fn test_non_image_formats_are_refused() {
        assert_eq!(sniff_image(b"%PDF-1.7\n"), None);
        assert_eq!(sniff_image(b"PK\x03\x04rest-of-zip"), None);
    }
}
