use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{
    Administrator, Author, Category, Media, Page, PageRequest, Post, PostFilter, StatusCounts, Tag,
    TagChanges,
};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `NotFound` when it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Author repository with domain-specific methods.
#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    /// Find an author by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError>;
}

/// Administrator repository.
#[async_trait]
pub trait AdminRepository: BaseRepository<Administrator, Uuid> {
    async fn find_by_email(&self, email: &str) -> Result<Option<Administrator>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories ordered by name.
    async fn all(&self) -> Result<Vec<Category>, RepoError>;

    /// Case-insensitive lookup by name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    /// All tags ordered by name.
    async fn all(&self) -> Result<Vec<Tag>, RepoError>;

    /// Case-insensitive lookup by name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepoError>;

    /// The subset of `ids` that exist, ordered by name.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError>;
}

/// Post repository.
///
/// `delete` also removes the post's tag associations.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Insert a post and its tag associations atomically.
    async fn insert_with_tags(&self, post: Post, tag_ids: &[Uuid]) -> Result<Post, RepoError>;

    /// Update a post and apply tag association changes atomically.
    async fn update_with_tags(&self, post: Post, changes: &TagChanges) -> Result<Post, RepoError>;

    /// IDs of the tags attached to a post.
    async fn tag_ids(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError>;

    /// Filtered listing, newest first.
    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError>;

    /// Published public posts, most recently published first.
    async fn feed(&self) -> Result<Vec<Post>, RepoError>;

    /// Counts per status over the whole table.
    async fn count_by_status(&self) -> Result<StatusCounts, RepoError>;

    /// Number of posts created at or after `since`.
    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64, RepoError>;

    /// Authors with the most posts, ties broken by author ID ascending.
    async fn top_authors(&self, limit: u64) -> Result<Vec<(Uuid, u64)>, RepoError>;

    /// The most recently created posts.
    async fn recent(&self, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Posts created per UTC calendar day at or after `since`.
    async fn daily_counts_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(NaiveDate, u64)>, RepoError>;
}

/// Media association repository.
#[async_trait]
pub trait MediaRepository: BaseRepository<Media, Uuid> {
    /// Every media row attached to a post, oldest first.
    async fn for_post(&self, post_id: Uuid) -> Result<Vec<Media>, RepoError>;
}
