//! Post boundary operations: listing, authoring, moderation, statistics.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    Activity, AuthorPostCount, Category, Causer, ImageUpload, Media, MediaCollection, Moderation,
    Page, PageRequest, Permission, Post, PostContent, PostFilter, PostStats, PostStatus,
    Principal, RECENT_POSTS, SearchScope, StatusCounts, TOP_AUTHORS, Tag, TagChanges,
    TrackedAttributes, Visibility, fill_trend, month_start, trend_start,
};
use crate::error::{DomainError, ValidationErrors};
use crate::ports::{
    ActivityLog, AdminRepository, AuthorRepository, CategoryRepository, Clock, MediaRepository,
    MediaStorage, PostRepository, TagRepository,
};

const MAX_TITLE_LEN: usize = 255;
const MAX_WRITER_LEN: usize = 255;

/// A file received from the presentation layer, not yet validated.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Raw create/update input. Every field is checked by the service.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
    pub writer: Option<String>,
    pub visibility: Option<String>,
    pub tags: Option<Vec<Uuid>>,
    /// Only honoured on create.
    pub slug: Option<String>,
    pub featured_image: Option<UploadedFile>,
}

/// Filters an author may apply to their own posts.
#[derive(Debug, Clone, Default)]
pub struct AuthorPostQuery {
    /// `None` or `"all"` for every status.
    pub status: Option<String>,
    pub category_id: Option<Uuid>,
    /// Matched against title and content.
    pub search: Option<String>,
}

/// Filters an administrator may apply across all posts.
#[derive(Debug, Clone, Default)]
pub struct AdminPostQuery {
    pub status: Option<String>,
    /// Matched against the title only.
    pub search: Option<String>,
}

/// A post with its relations resolved for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub post: Post,
    pub author_name: String,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub featured_image: Option<String>,
    pub gallery: Vec<String>,
}

/// Administrator listing plus per-status counts over the whole table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminPostListing {
    pub posts: Page<PostView>,
    pub counts: StatusCounts,
}

/// Storage collaborators of [`PostService`].
#[derive(Clone)]
pub struct PostServicePorts {
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    pub admins: Arc<dyn AdminRepository>,
    pub media: Arc<dyn MediaRepository>,
    pub storage: Arc<dyn MediaStorage>,
    pub activity: Arc<dyn ActivityLog>,
    pub clock: Arc<dyn Clock>,
}

/// The post lifecycle and its query surface.
pub struct PostService {
    ports: PostServicePorts,
}

impl PostService {
    pub fn new(ports: PostServicePorts) -> Self {
        Self { ports }
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// The author's own posts.
    pub async fn list_for_author(
        &self,
        principal: &Principal,
        query: AuthorPostQuery,
        page: PageRequest,
    ) -> Result<Page<PostView>, DomainError> {
        let author_id = match principal {
            Principal::Author(actor) => actor.id,
            Principal::Administrator(_) => {
                return Err(DomainError::forbidden(
                    "administrators list posts through the moderation queue",
                ));
            }
        };

        let filter = PostFilter {
            owner_id: Some(author_id),
            status: parse_status_filter(query.status.as_deref())?,
            category_id: query.category_id,
            search: query.search,
            search_scope: SearchScope::TitleOrContent,
        };
        let page = self.ports.posts.list(&filter, page).await?;
        self.view_page(page).await
    }

    /// Every post, with per-status counts.
    pub async fn list_for_admin(
        &self,
        principal: &Principal,
        query: AdminPostQuery,
        page: PageRequest,
    ) -> Result<AdminPostListing, DomainError> {
        ensure_administrator(principal)?;

        let filter = PostFilter {
            status: parse_status_filter(query.status.as_deref())?,
            search: query.search,
            search_scope: SearchScope::Title,
            ..PostFilter::all()
        };
        let page = self.ports.posts.list(&filter, page).await?;
        let counts = self.ports.posts.count_by_status().await?;

        Ok(AdminPostListing {
            posts: self.view_page(page).await?,
            counts,
        })
    }

    /// A single post. Anonymous callers only see publicly readable posts.
    pub async fn show(&self, principal: Option<&Principal>, id: Uuid) -> Result<PostView, DomainError> {
        let post = self.find(id).await?;
        ensure_readable(principal, &post)?;
        self.view(post).await
    }

    /// Published public posts, most recently published first.
    pub async fn feed(&self) -> Result<Vec<PostView>, DomainError> {
        let posts = self.ports.posts.feed().await?;
        let mut views = Vec::with_capacity(posts.len());
        for post in posts.into_iter().filter(Post::is_in_feed) {
            views.push(self.view(post).await?);
        }
        Ok(views)
    }

    /// Aggregate statistics over the whole table.
    pub async fn stats(&self, principal: &Principal) -> Result<PostStats, DomainError> {
        ensure_administrator(principal)?;
        let now = self.ports.clock.now();
        let posts = &self.ports.posts;

        let by_status = posts.count_by_status().await?;
        let created_this_month = posts.count_created_since(month_start(now)).await?;

        let mut top_authors = Vec::new();
        for (author_id, post_count) in posts.top_authors(TOP_AUTHORS).await? {
            let name = self
                .ports
                .authors
                .find_by_id(author_id)
                .await?
                .map(|a| a.name)
                .unwrap_or_default();
            top_authors.push(AuthorPostCount {
                author_id,
                name,
                post_count,
            });
        }

        let recent_posts = posts.recent(RECENT_POSTS).await?;
        let raw_trend = posts.daily_counts_since(trend_start(now)).await?;

        Ok(PostStats {
            total: by_status.total(),
            by_status,
            created_this_month,
            top_authors,
            recent_posts,
            daily_trend: fill_trend(now, &raw_trend),
        })
    }

    /// A media file and its bytes, authorized like the post it belongs to.
    pub async fn media_file(
        &self,
        principal: Option<&Principal>,
        media_id: Uuid,
    ) -> Result<(Media, Vec<u8>), DomainError> {
        let media = self
            .ports
            .media
            .find_by_id(media_id)
            .await?
            .ok_or(DomainError::not_found("media", media_id))?;
        let post = self.find(media.post_id).await?;
        ensure_readable(principal, &post)?;

        let bytes = self
            .ports
            .storage
            .read(&media.storage_key)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok((media, bytes))
    }

    /// Latest audit log entries.
    pub async fn activities(
        &self,
        principal: &Principal,
        limit: u64,
    ) -> Result<Vec<Activity>, DomainError> {
        ensure_administrator(principal)?;
        Ok(self.ports.activity.latest(limit).await?)
    }

    // ---------------------------------------------------------------------
    // Author writes
    // ---------------------------------------------------------------------

    /// Submit a new post. It always starts out pending.
    pub async fn create(&self, principal: &Principal, draft: PostDraft) -> Result<PostView, DomainError> {
        let author_id = principal.require_author(Permission::CreatePosts)?;
        let author = self
            .ports
            .authors
            .find_by_id(author_id)
            .await?
            .ok_or(DomainError::not_found("author", author_id))?;

        let checked = self.validate(&draft, &author.name).await?;
        let post = Post::submit(
            author_id,
            checked.content,
            draft.slug.as_deref(),
            self.ports.clock.now(),
        );
        let staged = self
            .stage_optional(post.id, MediaCollection::FeaturedImage, checked.featured_image)
            .await?;

        let post = match self.ports.posts.insert_with_tags(post, &checked.tag_ids).await {
            Ok(post) => post,
            Err(e) => {
                self.abandon(staged.as_ref()).await;
                return Err(e.into());
            }
        };

        if let Some(media) = staged {
            let storage_key = media.storage_key.clone();
            if let Err(e) = self.link(media).await {
                self.abandon_key(&storage_key).await;
                if let Err(cleanup) = self.ports.posts.delete(post.id).await {
                    tracing::error!(post_id = %post.id, error = %cleanup, "Failed to roll back post");
                }
                return Err(e);
            }
        }

        tracing::info!(post_id = %post.id, author_id = %author_id, "Post submitted for approval");
        self.audit(Activity::created(&post, self.causer(principal).await))
            .await;
        self.view(post).await
    }

    /// Replace a post's content and send it back for approval.
    ///
    /// Tags are replaced wholesale: omitting them detaches every tag.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        draft: PostDraft,
    ) -> Result<PostView, DomainError> {
        let mut post = self.find(id).await?;
        principal.require_access(&post, Permission::EditPosts)?;

        let checked = self.validate(&draft, &post.writer).await?;
        let before = TrackedAttributes::from(&post);
        post.revise(checked.content, self.ports.clock.now());

        let current = self.ports.posts.tag_ids(id).await?;
        let changes = TagChanges::between(&current, &checked.tag_ids);
        let staged = self
            .stage_optional(id, MediaCollection::FeaturedImage, checked.featured_image)
            .await?;

        let post = match self.ports.posts.update_with_tags(post, &changes).await {
            Ok(post) => post,
            Err(e) => {
                self.abandon(staged.as_ref()).await;
                return Err(e.into());
            }
        };

        if let Some(media) = staged {
            let storage_key = media.storage_key.clone();
            if let Err(e) = self.link(media).await {
                self.abandon_key(&storage_key).await;
                return Err(e);
            }
        }

        tracing::info!(
            post_id = %post.id,
            detached = changes.detach.len(),
            attached = changes.attach.len(),
            "Post updated and resubmitted for approval"
        );
        if let Some(activity) = Activity::updated(&before, &post, self.causer(principal).await) {
            self.audit(activity).await;
        }
        self.view(post).await
    }

    /// Add an image to the post's gallery. Counts as an edit.
    pub async fn add_gallery_image(
        &self,
        principal: &Principal,
        id: Uuid,
        file: UploadedFile,
    ) -> Result<PostView, DomainError> {
        let mut post = self.find(id).await?;
        principal.require_access(&post, Permission::EditPosts)?;

        let upload = ImageUpload::validate("gallery_image", &file.file_name, file.bytes)
            .map_err(DomainError::Validation)?;
        let media = self.stage(post.id, MediaCollection::Gallery, upload).await?;
        let storage_key = media.storage_key.clone();
        if let Err(e) = self.link(media).await {
            self.abandon_key(&storage_key).await;
            return Err(e);
        }

        post.resubmit(self.ports.clock.now());
        let post = self.ports.posts.update(post).await?;
        tracing::info!(post_id = %post.id, "Gallery image added, post resubmitted");
        self.view(post).await
    }

    /// Remove a post with its tag associations and media.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), DomainError> {
        let post = self.find(id).await?;
        principal.require_access(&post, Permission::DeletePosts)?;

        let media = self.ports.media.for_post(id).await?;
        for item in &media {
            self.ports.media.delete(item.id).await?;
        }
        self.ports.posts.delete(id).await?;

        for item in &media {
            if let Err(e) = self.ports.storage.clear(&item.storage_key).await {
                tracing::warn!(media_id = %item.id, error = %e, "Failed to remove media file");
            }
        }

        tracing::info!(post_id = %id, actor_id = %principal.id(), "Post deleted");
        self.audit(Activity::deleted(&post, self.causer(principal).await))
            .await;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Moderation
    // ---------------------------------------------------------------------

    /// Publish a post, whatever its current status.
    pub async fn approve(&self, principal: &Principal, id: Uuid) -> Result<PostView, DomainError> {
        self.moderate(principal, id, Moderation::Approve).await
    }

    /// Archive a post, taking it out of the feed if it was published.
    pub async fn reject(&self, principal: &Principal, id: Uuid) -> Result<PostView, DomainError> {
        self.moderate(principal, id, Moderation::Reject).await
    }

    /// Send a post back to the moderation queue from any status.
    pub async fn set_pending(&self, principal: &Principal, id: Uuid) -> Result<PostView, DomainError> {
        self.moderate(principal, id, Moderation::SetPending).await
    }

    async fn moderate(
        &self,
        principal: &Principal,
        id: Uuid,
        action: Moderation,
    ) -> Result<PostView, DomainError> {
        let permission = match action {
            Moderation::Approve => Permission::ApprovePosts,
            Moderation::Reject => Permission::RejectPosts,
            Moderation::SetPending => Permission::SetPostPending,
        };
        principal.require_administrator(permission)?;

        let mut post = self.find(id).await?;
        let from = post.status;
        post.moderate(action, self.ports.clock.now());
        let post = self.ports.posts.update(post).await?;

        tracing::info!(
            post_id = %post.id,
            admin_id = %principal.id(),
            from = %from,
            to = %post.status,
            "Post moderated"
        );
        self.view(post).await
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    async fn find(&self, id: Uuid) -> Result<Post, DomainError> {
        self.ports
            .posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("post", id))
    }

    async fn validate(&self, draft: &PostDraft, default_writer: &str) -> Result<CheckedDraft, DomainError> {
        let mut errors = ValidationErrors::new();

        let title = draft.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            errors.add("title", "The title field is required.");
        } else if title.chars().count() > MAX_TITLE_LEN {
            errors.add(
                "title",
                format!("The title may not be greater than {MAX_TITLE_LEN} characters."),
            );
        }

        let content = draft.content.as_deref().unwrap_or_default();
        if content.trim().is_empty() {
            errors.add("content", "The content field is required.");
        }

        let writer = match draft.writer.as_deref().map(str::trim) {
            Some(w) if !w.is_empty() => w.to_string(),
            _ => default_writer.to_string(),
        };
        if writer.chars().count() > MAX_WRITER_LEN {
            errors.add(
                "writer",
                format!("The writer may not be greater than {MAX_WRITER_LEN} characters."),
            );
        }

        let visibility = match draft.visibility.as_deref() {
            None | Some("") => {
                errors.add("visibility", "The visibility field is required.");
                None
            }
            Some(raw) => match raw.parse::<Visibility>() {
                Ok(v) => Some(v),
                Err(_) => {
                    errors.add("visibility", "The selected visibility is invalid.");
                    None
                }
            },
        };

        if let Some(category_id) = draft.category_id {
            if self.ports.categories.find_by_id(category_id).await?.is_none() {
                errors.add("category_id", "The selected category is invalid.");
            }
        }

        let mut tag_ids: Vec<Uuid> = draft.tags.clone().unwrap_or_default();
        tag_ids.sort();
        tag_ids.dedup();
        if !tag_ids.is_empty() {
            let found = self.ports.tags.find_many(&tag_ids).await?;
            for missing in tag_ids.iter().filter(|id| !found.iter().any(|t| t.id == **id)) {
                errors.add("tags", format!("The selected tag {missing} is invalid."));
            }
        }

        let featured_image = match &draft.featured_image {
            Some(file) => {
                match ImageUpload::validate("featured_image", &file.file_name, file.bytes.clone()) {
                    Ok(upload) => Some(upload),
                    Err(image_errors) => {
                        for (field, messages) in image_errors.into_fields() {
                            for message in messages {
                                errors.add(field.clone(), message);
                            }
                        }
                        None
                    }
                }
            }
            None => None,
        };

        errors.into_result()?;
        let visibility = visibility.ok_or_else(|| {
            DomainError::Validation(ValidationErrors::single(
                "visibility",
                "The visibility field is required.",
            ))
        })?;

        Ok(CheckedDraft {
            content: PostContent {
                title: title.to_string(),
                content: content.to_string(),
                category_id: draft.category_id,
                writer,
                visibility,
            },
            tag_ids,
            featured_image,
        })
    }

    /// Write an image to storage without recording it. Nothing in the
    /// database refers to the file until [`Self::link`] succeeds.
    async fn stage(
        &self,
        post_id: Uuid,
        collection: MediaCollection,
        upload: ImageUpload,
    ) -> Result<Media, DomainError> {
        let media_id = Uuid::new_v4();
        let storage_key = format!("{post_id}/{media_id}/{}", upload.file_name);
        self.ports
            .storage
            .store(&storage_key, &upload.bytes)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        Ok(Media {
            id: media_id,
            post_id,
            collection,
            size: upload.size(),
            file_name: upload.file_name,
            mime_type: upload.mime_type.to_string(),
            storage_key,
            created_at: self.ports.clock.now(),
        })
    }

    async fn stage_optional(
        &self,
        post_id: Uuid,
        collection: MediaCollection,
        upload: Option<ImageUpload>,
    ) -> Result<Option<Media>, DomainError> {
        match upload {
            Some(upload) => Ok(Some(self.stage(post_id, collection, upload).await?)),
            None => Ok(None),
        }
    }

    /// Record a staged file against its post. Single-file collections drop
    /// their previous file once the new row is in place; that cleanup only
    /// logs on failure.
    async fn link(&self, media: Media) -> Result<Media, DomainError> {
        let previous: Vec<Media> = if media.collection.is_single_file() {
            self.ports
                .media
                .for_post(media.post_id)
                .await?
                .into_iter()
                .filter(|m| m.collection == media.collection)
                .collect()
        } else {
            Vec::new()
        };

        let media = self.ports.media.insert(media).await?;

        for old in previous {
            if let Err(e) = self.ports.media.delete(old.id).await {
                tracing::warn!(media_id = %old.id, error = %e, "Failed to unlink replaced media");
                continue;
            }
            self.abandon_key(&old.storage_key).await;
        }
        Ok(media)
    }

    async fn abandon(&self, staged: Option<&Media>) {
        if let Some(media) = staged {
            self.abandon_key(&media.storage_key).await;
        }
    }

    async fn abandon_key(&self, storage_key: &str) {
        if let Err(e) = self.ports.storage.clear(storage_key).await {
            tracing::warn!(storage_key, error = %e, "Failed to remove media file");
        }
    }

    async fn view(&self, post: Post) -> Result<PostView, DomainError> {
        let author_name = self
            .ports
            .authors
            .find_by_id(post.user_id)
            .await?
            .map(|a| a.name)
            .unwrap_or_else(|| post.writer.clone());

        let category = match post.category_id {
            Some(id) => self.ports.categories.find_by_id(id).await?,
            None => None,
        };

        let tag_ids = self.ports.posts.tag_ids(post.id).await?;
        let tags = if tag_ids.is_empty() {
            Vec::new()
        } else {
            self.ports.tags.find_many(&tag_ids).await?
        };

        let media = self.ports.media.for_post(post.id).await?;
        let featured_image = media
            .iter()
            .rev()
            .find(|m| m.collection == MediaCollection::FeaturedImage)
            .map(|m| self.ports.storage.url(m));
        let gallery = media
            .iter()
            .filter(|m| m.collection == MediaCollection::Gallery)
            .map(|m| self.ports.storage.url(m))
            .collect();

        Ok(PostView {
            post,
            author_name,
            category,
            tags,
            featured_image,
            gallery,
        })
    }

    async fn view_page(&self, page: Page<Post>) -> Result<Page<PostView>, DomainError> {
        let mut views = Vec::with_capacity(page.items.len());
        for post in page.items.iter().cloned() {
            views.push(self.view(post).await?);
        }
        Ok(Page {
            items: views,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn causer(&self, principal: &Principal) -> Option<Causer> {
        let id = principal.id();
        let name = match principal {
            Principal::Author(_) => self.ports.authors.find_by_id(id).await.ok().flatten().map(|a| a.name),
            Principal::Administrator(_) => self.ports.admins.find_by_id(id).await.ok().flatten().map(|a| a.name),
        }?;
        Some(Causer {
            id,
            kind: principal.kind(),
            name,
        })
    }

    /// The audit log is an observer: failing to record never fails the write.
    async fn audit(&self, activity: Activity) {
        let description = activity.description.clone();
        if let Err(e) = self.ports.activity.record(activity).await {
            tracing::warn!(activity = %description, error = %e, "Failed to record activity");
        }
    }
}

struct CheckedDraft {
    content: PostContent,
    tag_ids: Vec<Uuid>,
    featured_image: Option<ImageUpload>,
}

/// `None` and `"all"` mean no status filter.
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<PostStatus>, DomainError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value.parse::<PostStatus>().map(Some).map_err(|_| {
            DomainError::Validation(ValidationErrors::single(
                "status",
                "The selected status is invalid.",
            ))
        }),
    }
}

fn ensure_administrator(principal: &Principal) -> Result<(), DomainError> {
    if principal.is_administrator() {
        Ok(())
    } else {
        Err(DomainError::forbidden("administrator access required"))
    }
}

fn ensure_readable(principal: Option<&Principal>, post: &Post) -> Result<(), DomainError> {
    let readable = match principal {
        Some(principal) => principal.can_read(post),
        None => post.is_publicly_readable(),
    };
    if readable {
        Ok(())
    } else {
        Err(DomainError::forbidden("post is not visible to you"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some("all")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("draft")).unwrap(),
            Some(PostStatus::Draft)
        );
        assert!(matches!(
            parse_status_filter(Some("deleted")),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_anonymous_reads_only_public_posts() {
        let post = Post::submit(
            Uuid::new_v4(),
            PostContent {
                title: "Hello".to_string(),
                content: "Body".to_string(),
                category_id: None,
                writer: "Ada".to_string(),
                visibility: Visibility::Public,
            },
            None,
            chrono::Utc::now(),
        );
        assert!(ensure_readable(None, &post).is_err());
        assert!(ensure_readable(Some(&Principal::administrator(Uuid::new_v4())), &post).is_ok());
    }
}
