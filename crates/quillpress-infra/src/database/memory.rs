//! In-memory repositories - used as fallback when no database is configured.
//!
//! Data is lost on process restart. Every table sits behind an async
//! `RwLock`, so readers never block the executor.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quillpress_core::domain::{
    Activity, Administrator, Author, Category, Media, Page, PageRequest, Post, PostFilter,
    PostStatus, SearchScope, StatusCounts, Tag, TagChanges, Visibility,
};
use quillpress_core::error::RepoError;
use quillpress_core::ports::{
    ActivityLog, AdminRepository, AuthorRepository, BaseRepository, CategoryRepository,
    MediaRepository, PostRepository, TagRepository,
};

/// A row that can live in an [`InMemoryTable`].
pub trait Record: Clone + Send + Sync + 'static {
    fn key(&self) -> Uuid;

    /// Value that must be unique across the table, if any.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

impl Record for Author {
    fn key(&self) -> Uuid {
        self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }
}

impl Record for Administrator {
    fn key(&self) -> Uuid {
        self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }
}

impl Record for Category {
    fn key(&self) -> Uuid {
        self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.name.to_lowercase())
    }
}

impl Record for Tag {
    fn key(&self) -> Uuid {
        self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.name.to_lowercase())
    }
}

impl Record for Post {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Record for Media {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// A keyed table behind an async lock.
pub struct InMemoryTable<T> {
    rows: RwLock<HashMap<Uuid, T>>,
}

impl<T: Record> InMemoryTable<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    async fn find_first(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<T> {
        let rows = self.rows.read().await;
        rows.values().find(|row| predicate(row)).cloned()
    }

    async fn filtered(&self, mut predicate: impl FnMut(&T) -> bool) -> Vec<T> {
        let rows = self.rows.read().await;
        rows.values().filter(|row| predicate(row)).cloned().collect()
    }

    fn check_unique(rows: &HashMap<Uuid, T>, entity: &T) -> Result<(), RepoError> {
        let Some(unique) = entity.unique_key() else {
            return Ok(());
        };
        let taken = rows
            .values()
            .any(|row| row.key() != entity.key() && row.unique_key().as_ref() == Some(&unique));
        if taken {
            return Err(RepoError::Constraint(format!("duplicate key '{unique}'")));
        }
        Ok(())
    }
}

impl<T: Record> Default for InMemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> BaseRepository<T, Uuid> for InMemoryTable<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).cloned())
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&entity.key()) {
            return Err(RepoError::Constraint("duplicate primary key".to_string()));
        }
        Self::check_unique(&rows, &entity)?;
        rows.insert(entity.key(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&entity.key()) {
            return Err(RepoError::NotFound);
        }
        Self::check_unique(&rows, &entity)?;
        rows.insert(entity.key(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut rows = self.rows.write().await;
        rows.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

/// In-memory author repository.
pub type InMemoryAuthorRepository = InMemoryTable<Author>;

/// In-memory administrator repository.
pub type InMemoryAdminRepository = InMemoryTable<Administrator>;

/// In-memory category repository.
pub type InMemoryCategoryRepository = InMemoryTable<Category>;

/// In-memory tag repository.
pub type InMemoryTagRepository = InMemoryTable<Tag>;

/// In-memory media repository.
pub type InMemoryMediaRepository = InMemoryTable<Media>;

#[async_trait]
impl AuthorRepository for InMemoryAuthorRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError> {
        Ok(self.find_first(|author| author.email == email).await)
    }
}

#[async_trait]
impl AdminRepository for InMemoryAdminRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Administrator>, RepoError> {
        Ok(self.find_first(|admin| admin.email == email).await)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn all(&self) -> Result<Vec<Category>, RepoError> {
        let mut categories = self.filtered(|_| true).await;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let name = name.to_lowercase();
        Ok(self.find_first(|c| c.name.to_lowercase() == name).await)
    }
}

#[async_trait]
impl TagRepository for InMemoryTagRepository {
    async fn all(&self) -> Result<Vec<Tag>, RepoError> {
        let mut tags = self.filtered(|_| true).await;
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepoError> {
        let name = name.to_lowercase();
        Ok(self.find_first(|t| t.name.to_lowercase() == name).await)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError> {
        let mut tags = self.filtered(|t| ids.contains(&t.id)).await;
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn for_post(&self, post_id: Uuid) -> Result<Vec<Media>, RepoError> {
        let mut media = self.filtered(|m| m.post_id == post_id).await;
        media.sort_by_key(|m| (m.created_at, m.id));
        Ok(media)
    }
}

/// In-memory post repository with its tag join table.
///
/// The join table lock is always taken before the post table lock.
pub struct InMemoryPostRepository {
    posts: InMemoryTable<Post>,
    post_tags: RwLock<BTreeSet<(Uuid, Uuid)>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            posts: InMemoryTable::new(),
            post_tags: RwLock::new(BTreeSet::new()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
}

fn matches_filter(post: &Post, filter: &PostFilter, needle: Option<&str>) -> bool {
    if filter.owner_id.is_some_and(|owner| post.user_id != owner) {
        return false;
    }
    if filter.status.is_some_and(|status| post.status != status) {
        return false;
    }
    if filter
        .category_id
        .is_some_and(|category| post.category_id != Some(category))
    {
        return false;
    }
    match needle {
        None => true,
        Some(needle) => {
            post.title.to_lowercase().contains(needle)
                || (filter.search_scope == SearchScope::TitleOrContent
                    && post.content.to_lowercase().contains(needle))
        }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        self.posts.find_by_id(id).await
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.posts.insert(post).await
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        self.posts.update(post).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut links = self.post_tags.write().await;
        self.posts.delete(id).await?;
        links.retain(|(post_id, _)| *post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert_with_tags(&self, post: Post, tag_ids: &[Uuid]) -> Result<Post, RepoError> {
        let mut links = self.post_tags.write().await;
        let post = self.posts.insert(post).await?;
        links.extend(tag_ids.iter().map(|tag_id| (post.id, *tag_id)));
        Ok(post)
    }

    async fn update_with_tags(&self, post: Post, changes: &TagChanges) -> Result<Post, RepoError> {
        let mut links = self.post_tags.write().await;
        let post = self.posts.update(post).await?;
        for tag_id in &changes.detach {
            links.remove(&(post.id, *tag_id));
        }
        links.extend(changes.attach.iter().map(|tag_id| (post.id, *tag_id)));
        Ok(post)
    }

    async fn tag_ids(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let links = self.post_tags.read().await;
        Ok(links
            .iter()
            .filter(|(id, _)| *id == post_id)
            .map(|(_, tag_id)| *tag_id)
            .collect())
    }

    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let needle = filter.needle();
        let mut posts = self
            .posts
            .filtered(|post| matches_filter(post, filter, needle.as_deref()))
            .await;
        newest_first(&mut posts);

        let total = posts.len() as u64;
        let items = posts
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.per_page as usize)
            .collect();
        Ok(Page::new(items, total, page))
    }

    async fn feed(&self) -> Result<Vec<Post>, RepoError> {
        let mut posts = self
            .posts
            .filtered(|post| {
                post.status == PostStatus::Published && post.visibility == Visibility::Public
            })
            .await;
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(posts)
    }

    async fn count_by_status(&self) -> Result<StatusCounts, RepoError> {
        let rows = self.posts.rows.read().await;
        let mut counts = StatusCounts::default();
        for post in rows.values() {
            counts.add(post.status, 1);
        }
        Ok(counts)
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64, RepoError> {
        let rows = self.posts.rows.read().await;
        Ok(rows.values().filter(|p| p.created_at >= since).count() as u64)
    }

    async fn top_authors(&self, limit: u64) -> Result<Vec<(Uuid, u64)>, RepoError> {
        let rows = self.posts.rows.read().await;
        let mut per_author: BTreeMap<Uuid, u64> = BTreeMap::new();
        for post in rows.values() {
            *per_author.entry(post.user_id).or_default() += 1;
        }

        let mut ranked: Vec<(Uuid, u64)> = per_author.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit as usize);
        Ok(ranked)
    }

    async fn recent(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let mut posts = self.posts.filtered(|_| true).await;
        newest_first(&mut posts);
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn daily_counts_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(NaiveDate, u64)>, RepoError> {
        let rows = self.posts.rows.read().await;
        let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for post in rows.values().filter(|p| p.created_at >= since) {
            *per_day.entry(post.created_at.date_naive()).or_default() += 1;
        }
        Ok(per_day.into_iter().collect())
    }
}

/// In-memory activity log.
#[derive(Default)]
pub struct InMemoryActivityLog {
    entries: RwLock<Vec<Activity>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn record(&self, activity: Activity) -> Result<(), RepoError> {
        self.entries.write().await.push(activity);
        Ok(())
    }

    async fn latest(&self, limit: u64) -> Result<Vec<Activity>, RepoError> {
        let entries = self.entries.read().await;
        let mut latest: Vec<Activity> = entries.iter().rev().cloned().collect();
        latest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        latest.truncate(limit as usize);
        Ok(latest)
    }
}
