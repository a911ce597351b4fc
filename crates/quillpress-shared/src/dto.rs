//! Data Transfer Objects - request/response types for the API.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// -------------------------------------------------------------------------
// Accounts
// -------------------------------------------------------------------------

/// Request to register a new author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public profile of an author or administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// `author` or `admin`.
    pub guard: String,
    pub created_at: DateTime<Utc>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: AccountResponse,
}

// -------------------------------------------------------------------------
// Posts
// -------------------------------------------------------------------------

/// An uploaded image, base64 encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePayload {
    pub file_name: String,
    /// Standard base64, optionally prefixed with a `data:<mime>;base64,` header.
    pub data: String,
}

/// Create or update a post. Every field is validated server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
    pub writer: Option<String>,
    pub visibility: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<Uuid>>,
    /// Honoured on create only.
    pub slug: Option<String>,
    pub featured_image: Option<ImagePayload>,
}

/// Add an image to a post's gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImageRequest {
    pub image: ImagePayload,
}

/// Filters on an author's own posts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostListQuery {
    pub status: Option<String>,
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Filters on the moderation queue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminPostListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
}

/// A post with its relations resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_name: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub writer: String,
    pub visibility: String,
    pub status: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: Option<CategoryResponse>,
    pub tags: Vec<TagResponse>,
    pub featured_image: Option<String>,
    pub gallery: Vec<String>,
}

/// Compact post representation used in statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub last_page: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCountsResponse {
    pub draft: u64,
    pub pending: u64,
    pub published: u64,
    pub archived: u64,
}

/// Moderation queue page plus counts over every post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminPostListResponse {
    pub posts: PageResponse<PostResponse>,
    pub counts: StatusCountsResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopAuthorResponse {
    pub author_id: Uuid,
    pub name: String,
    pub post_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total: u64,
    pub by_status: StatusCountsResponse,
    pub created_this_month: u64,
    pub top_authors: Vec<TopAuthorResponse>,
    pub recent_posts: Vec<PostSummaryResponse>,
    /// Posts created per day over the last 30 days, zero-filled.
    pub daily_trend: BTreeMap<NaiveDate, u64>,
}

// -------------------------------------------------------------------------
// Taxonomy and audit log
// -------------------------------------------------------------------------

/// Create a category or tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub id: Uuid,
    pub description: String,
    pub subject_id: Uuid,
    pub causer_id: Option<Uuid>,
    pub causer_name: String,
    pub properties: Value,
    pub created_at: DateTime<Utc>,
}
