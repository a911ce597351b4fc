//! Post lifecycle driven through `PostService` on the in-memory adapters.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use uuid::Uuid;

use quillpress_core::domain::{
    Author, Category, MAX_PAGE, Media, PageRequest, PostFilter, PostStatus, Principal, Tag,
    Visibility,
};
use quillpress_core::error::DomainError;
use quillpress_core::ports::{BaseRepository, Clock, MediaError, MediaStorage, PostRepository};
use quillpress_core::services::{
    AdminPostQuery, AuthorPostQuery, PostDraft, PostService, PostServicePorts, UploadedFile,
};
use quillpress_infra::{
    InMemoryActivityLog, InMemoryAdminRepository, InMemoryAuthorRepository,
    InMemoryCategoryRepository, InMemoryMediaRepository, InMemoryMediaStorage,
    InMemoryPostRepository, InMemoryTagRepository,
};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

/// Clock the test moves by hand.
struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    fn advance(&self, by: TimeDelta) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// In-memory storage whose writes can be switched off.
#[derive(Default)]
struct SwitchableStorage {
    inner: InMemoryMediaStorage,
    writes_fail: AtomicBool,
}

impl SwitchableStorage {
    fn fail_writes(&self) {
        self.writes_fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaStorage for SwitchableStorage {
    async fn store(&self, key: &str, bytes: &[u8]) -> Result<(), MediaError> {
        if self.writes_fail.load(Ordering::SeqCst) {
            return Err(MediaError::Io("disk full".to_string()));
        }
        self.inner.store(key, bytes).await
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, MediaError> {
        self.inner.read(key).await
    }

    async fn clear(&self, key: &str) -> Result<(), MediaError> {
        self.inner.clear(key).await
    }

    fn url(&self, media: &Media) -> String {
        self.inner.url(media)
    }
}

struct Harness {
    service: PostService,
    clock: Arc<ManualClock>,
    posts: Arc<InMemoryPostRepository>,
    authors: Arc<InMemoryAuthorRepository>,
    categories: Arc<InMemoryCategoryRepository>,
    tags: Arc<InMemoryTagRepository>,
    storage: Arc<SwitchableStorage>,
    admin: Principal,
}

impl Harness {
    fn new() -> Self {
        let clock = Arc::new(ManualClock(Mutex::new(
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
        )));
        let posts = Arc::new(InMemoryPostRepository::new());
        let authors = Arc::new(InMemoryAuthorRepository::new());
        let categories = Arc::new(InMemoryCategoryRepository::new());
        let tags = Arc::new(InMemoryTagRepository::new());
        let storage = Arc::new(SwitchableStorage::default());

        let service = PostService::new(PostServicePorts {
            posts: posts.clone(),
            categories: categories.clone(),
            tags: tags.clone(),
            authors: authors.clone(),
            admins: Arc::new(InMemoryAdminRepository::new()),
            media: Arc::new(InMemoryMediaRepository::new()),
            storage: storage.clone(),
            activity: Arc::new(InMemoryActivityLog::new()),
            clock: clock.clone(),
        });

        Self {
            service,
            clock,
            posts,
            authors,
            categories,
            tags,
            storage,
            admin: Principal::administrator(Uuid::new_v4()),
        }
    }

    async fn writer(&self, name: &str) -> Principal {
        let author = Author::new(
            name.to_string(),
            format!("{}@example.com", name.to_lowercase()),
            "hash".to_string(),
        );
        let author = self.authors.insert(author).await.unwrap();
        Principal::author(author.id)
    }

    async fn tag(&self, name: &str) -> Uuid {
        self.tags.insert(Tag::new(name.to_string())).await.unwrap().id
    }

    async fn create(&self, writer: &Principal, title: &str, visibility: &str) -> Uuid {
        self.clock.advance(TimeDelta::minutes(1));
        self.service
            .create(writer, draft(title, visibility))
            .await
            .unwrap()
            .post
            .id
    }

    async fn status(&self, id: Uuid) -> (PostStatus, Option<DateTime<Utc>>) {
        let post = self.posts.find_by_id(id).await.unwrap().unwrap();
        (post.status, post.published_at)
    }
}

fn draft(title: &str, visibility: &str) -> PostDraft {
    PostDraft {
        title: Some(title.to_string()),
        content: Some(format!("All about {title}")),
        visibility: Some(visibility.to_string()),
        ..PostDraft::default()
    }
}

fn png(name: &str) -> UploadedFile {
    UploadedFile {
        file_name: name.to_string(),
        bytes: PNG.to_vec(),
    }
}

#[tokio::test]
async fn test_new_post_is_pending_with_slug() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;

    let view = h
        .service
        .create(&writer, draft("Hello World", "public"))
        .await
        .unwrap();

    assert_eq!(view.post.status, PostStatus::Pending);
    assert_eq!(view.post.published_at, None);
    assert_eq!(view.post.slug, "hello-world");
    assert_eq!(view.post.writer, "Ada");
    assert_eq!(view.author_name, "Ada");
}

#[tokio::test]
async fn test_approve_publishes_at_approval_time() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let id = h.create(&writer, "Hello", "public").await;

    h.clock.advance(TimeDelta::hours(2));
    let approved_at = h.clock.now();
    h.service.approve(&h.admin, id).await.unwrap();

    assert_eq!(h.status(id).await, (PostStatus::Published, Some(approved_at)));
}

#[tokio::test]
async fn test_reject_archives_without_publishing() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let id = h.create(&writer, "Hello", "public").await;

    h.service.reject(&h.admin, id).await.unwrap();

    assert_eq!(h.status(id).await, (PostStatus::Archived, None));
}

#[tokio::test]
async fn test_approve_and_reject_from_any_status() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let id = h.create(&writer, "Hello", "public").await;
    h.service.reject(&h.admin, id).await.unwrap();

    h.clock.advance(TimeDelta::minutes(5));
    let approved = h.service.approve(&h.admin, id).await.unwrap();
    assert_eq!(approved.post.status, PostStatus::Published);
    assert_eq!(approved.post.published_at, Some(h.clock.now()));

    h.service.reject(&h.admin, id).await.unwrap();
    assert_eq!(h.status(id).await, (PostStatus::Archived, None));
    assert!(h.service.feed().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_pending_from_any_status() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let published = h.create(&writer, "One", "public").await;
    let archived = h.create(&writer, "Two", "public").await;
    let pending = h.create(&writer, "Three", "public").await;
    h.service.approve(&h.admin, published).await.unwrap();
    h.service.reject(&h.admin, archived).await.unwrap();

    for id in [published, archived, pending] {
        h.service.set_pending(&h.admin, id).await.unwrap();
        assert_eq!(h.status(id).await, (PostStatus::Pending, None));
    }
}

#[tokio::test]
async fn test_authors_cannot_moderate() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let id = h.create(&writer, "Hello", "public").await;

    assert!(matches!(
        h.service.approve(&writer, id).await,
        Err(DomainError::Forbidden(_))
    ));
    assert!(matches!(
        h.service.reject(&writer, id).await,
        Err(DomainError::Forbidden(_))
    ));
    assert!(matches!(
        h.service.set_pending(&writer, id).await,
        Err(DomainError::Forbidden(_))
    ));
    assert_eq!(h.status(id).await, (PostStatus::Pending, None));
}

#[tokio::test]
async fn test_edit_resets_to_pending_and_leaves_feed() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let id = h.create(&writer, "Hello", "public").await;
    h.service.approve(&h.admin, id).await.unwrap();

    let feed = h.service.feed().await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].post.id, id);

    let view = h
        .service
        .update(&writer, id, draft("Hello v2", "public"))
        .await
        .unwrap();

    assert_eq!(view.post.title, "Hello v2");
    assert_eq!(view.post.slug, "hello");
    assert_eq!(h.status(id).await, (PostStatus::Pending, None));
    assert!(h.service.feed().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_replaces_tags_wholesale() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let rust = h.tag("rust").await;
    let web = h.tag("web").await;

    let created = h
        .service
        .create(
            &writer,
            PostDraft {
                tags: Some(vec![rust, web]),
                ..draft("Hello", "public")
            },
        )
        .await
        .unwrap();
    assert_eq!(created.tags.len(), 2);

    let id = created.post.id;
    let view = h
        .service
        .update(
            &writer,
            id,
            PostDraft {
                tags: Some(vec![]),
                ..draft("Hello", "public")
            },
        )
        .await
        .unwrap();

    assert!(view.tags.is_empty());
    assert!(h.posts.tag_ids(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_removes_post_and_tags() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let rust = h.tag("rust").await;
    let id = h
        .service
        .create(
            &writer,
            PostDraft {
                tags: Some(vec![rust]),
                featured_image: Some(png("cover.png")),
                ..draft("Hello", "public")
            },
        )
        .await
        .unwrap()
        .post
        .id;

    h.service.delete(&writer, id).await.unwrap();

    assert!(matches!(
        h.service.show(Some(&writer), id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(h.posts.tag_ids(id).await.unwrap().is_empty());
    assert!(h.storage.inner.is_empty().await);
}

#[tokio::test]
async fn test_unknown_post_is_not_found() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let missing = Uuid::new_v4();

    assert!(matches!(
        h.service.approve(&h.admin, missing).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        h.service.update(&writer, missing, draft("x", "public")).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        h.service.delete(&h.admin, missing).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_feed_only_holds_published_public_posts() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let public = h.create(&writer, "Public", "public").await;
    let unlisted = h.create(&writer, "Unlisted", "unlisted").await;
    let private = h.create(&writer, "Private", "private").await;
    let _pending = h.create(&writer, "Pending", "public").await;
    let later = h.create(&writer, "Later", "public").await;
    for id in [public, unlisted, private] {
        h.service.approve(&h.admin, id).await.unwrap();
    }
    h.clock.advance(TimeDelta::minutes(5));
    h.service.approve(&h.admin, later).await.unwrap();

    let feed = h.service.feed().await.unwrap();

    let ids: Vec<Uuid> = feed.iter().map(|v| v.post.id).collect();
    assert_eq!(ids, vec![later, public]);
    assert!(feed.iter().all(|v| v.post.status == PostStatus::Published
        && v.post.visibility == Visibility::Public));
}

#[tokio::test]
async fn test_show_respects_ownership_and_visibility() {
    let h = Harness::new();
    let owner = h.writer("Ada").await;
    let other = h.writer("Grace").await;
    let unlisted = h.create(&owner, "Unlisted", "unlisted").await;
    let private = h.create(&owner, "Private", "private").await;

    // Pending posts are only visible to the owner and administrators.
    assert!(h.service.show(Some(&owner), unlisted).await.is_ok());
    assert!(h.service.show(Some(&h.admin), unlisted).await.is_ok());
    assert!(matches!(
        h.service.show(None, unlisted).await,
        Err(DomainError::Forbidden(_))
    ));

    h.service.approve(&h.admin, unlisted).await.unwrap();
    h.service.approve(&h.admin, private).await.unwrap();

    assert!(h.service.show(None, unlisted).await.is_ok());
    assert!(h.service.show(Some(&other), unlisted).await.is_ok());
    assert!(matches!(
        h.service.show(Some(&other), private).await,
        Err(DomainError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_only_owner_may_edit_or_delete() {
    let h = Harness::new();
    let owner = h.writer("Ada").await;
    let other = h.writer("Grace").await;
    let id = h.create(&owner, "Hello", "public").await;

    assert!(matches!(
        h.service.update(&other, id, draft("Mine now", "public")).await,
        Err(DomainError::Forbidden(_))
    ));
    assert!(matches!(
        h.service.delete(&other, id).await,
        Err(DomainError::Forbidden(_))
    ));
    assert!(matches!(
        h.service.update(&h.admin, id, draft("Edited", "public")).await,
        Err(DomainError::Forbidden(_))
    ));

    // Administrators may delete any post.
    h.service.delete(&h.admin, id).await.unwrap();
}

#[tokio::test]
async fn test_validation_reports_every_field() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;

    let result = h
        .service
        .create(
            &writer,
            PostDraft {
                title: Some("   ".to_string()),
                content: None,
                category_id: Some(Uuid::new_v4()),
                writer: Some("w".repeat(256)),
                visibility: Some("secret".to_string()),
                tags: Some(vec![Uuid::new_v4()]),
                slug: None,
                featured_image: Some(UploadedFile {
                    file_name: "notes.txt".to_string(),
                    bytes: b"plain text".to_vec(),
                }),
            },
        )
        .await;

    let Err(DomainError::Validation(errors)) = result else {
        panic!("expected validation failure");
    };
    for field in [
        "title",
        "content",
        "category_id",
        "writer",
        "visibility",
        "tags",
        "featured_image",
    ] {
        assert!(errors.contains(field), "missing error for {field}");
    }
    assert_eq!(h.posts.list(&PostFilter::all(), PageRequest::default()).await.unwrap().total, 0);
}

#[tokio::test]
async fn test_featured_image_is_replaced_and_gallery_grows() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let id = h
        .service
        .create(
            &writer,
            PostDraft {
                featured_image: Some(png("first.png")),
                ..draft("Hello", "public")
            },
        )
        .await
        .unwrap()
        .post
        .id;
    h.service.approve(&h.admin, id).await.unwrap();

    let view = h
        .service
        .update(
            &writer,
            id,
            PostDraft {
                featured_image: Some(png("second.png")),
                ..draft("Hello", "public")
            },
        )
        .await
        .unwrap();
    assert!(view.featured_image.is_some());
    assert_eq!(h.storage.inner.len().await, 1);

    h.service.approve(&h.admin, id).await.unwrap();
    h.service.add_gallery_image(&writer, id, png("a.png")).await.unwrap();
    let view = h
        .service
        .add_gallery_image(&writer, id, png("b.png"))
        .await
        .unwrap();

    assert_eq!(view.gallery.len(), 2);
    assert_eq!(h.storage.inner.len().await, 3);
    // A gallery upload is an edit.
    assert_eq!(h.status(id).await, (PostStatus::Pending, None));
}

#[tokio::test]
async fn test_media_download_follows_post_visibility() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let id = h.create(&writer, "Hello", "public").await;
    h.service.add_gallery_image(&writer, id, png("a.png")).await.unwrap();

    let view = h.service.show(Some(&writer), id).await.unwrap();
    let media_id: Uuid = view.gallery[0]
        .rsplit('/')
        .next()
        .unwrap()
        .parse()
        .unwrap();

    assert!(matches!(
        h.service.media_file(None, media_id).await,
        Err(DomainError::Forbidden(_))
    ));

    h.service.approve(&h.admin, id).await.unwrap();
    let (media, bytes) = h.service.media_file(None, media_id).await.unwrap();
    assert_eq!(media.mime_type, "image/png");
    assert_eq!(bytes, PNG);
}

#[tokio::test]
async fn test_activity_log_tracks_title_and_category_only() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let id = h.create(&writer, "Hello", "public").await;

    // Content-only edit is not logged.
    h.clock.advance(TimeDelta::minutes(1));
    h.service
        .update(
            &writer,
            id,
            PostDraft {
                content: Some("New body".to_string()),
                ..draft("Hello", "public")
            },
        )
        .await
        .unwrap();

    let category = h
        .categories
        .insert(Category::new("Rust".to_string()))
        .await
        .unwrap();
    h.clock.advance(TimeDelta::minutes(1));
    h.service
        .update(
            &writer,
            id,
            PostDraft {
                category_id: Some(category.id),
                ..draft("Hello again", "public")
            },
        )
        .await
        .unwrap();
    h.clock.advance(TimeDelta::minutes(1));
    h.service.delete(&writer, id).await.unwrap();

    let entries = h.service.activities(&h.admin, 50).await.unwrap();
    let descriptions: Vec<&str> = entries.iter().map(|a| a.description.as_str()).collect();
    assert_eq!(descriptions, vec!["deleted", "updated", "created"]);
    assert!(entries.iter().all(|a| a.subject_id == id));
    assert_eq!(entries[1].causer_name(), "Ada");
    assert_eq!(entries[1].properties["old"]["title"], "Hello");
    assert_eq!(entries[1].properties["attributes"]["title"], "Hello again");

    assert!(matches!(
        h.service.activities(&writer, 50).await,
        Err(DomainError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_stats_breakdown_and_trend() {
    let h = Harness::new();
    let ada = h.writer("Ada").await;
    let grace = h.writer("Grace").await;

    let mut ids = Vec::new();
    for i in 0..4 {
        ids.push(h.create(&ada, &format!("Ada {i}"), "public").await);
    }
    for i in 0..2 {
        ids.push(h.create(&grace, &format!("Grace {i}"), "public").await);
    }
    for id in &ids[..3] {
        h.service.approve(&h.admin, *id).await.unwrap();
    }
    h.service.reject(&h.admin, ids[3]).await.unwrap();

    let stats = h.service.stats(&h.admin).await.unwrap();

    assert_eq!(stats.total, 6);
    assert_eq!(stats.by_status.published, 3);
    assert_eq!(stats.by_status.pending, 2);
    assert_eq!(stats.by_status.archived, 1);
    assert_eq!(stats.by_status.draft, 0);
    assert_eq!(stats.created_this_month, 6);
    assert_eq!(stats.top_authors[0].name, "Ada");
    assert_eq!(stats.top_authors[0].post_count, 4);
    assert_eq!(stats.top_authors[1].post_count, 2);
    assert_eq!(stats.recent_posts.len(), 5);
    assert_eq!(stats.recent_posts[0].id, ids[5]);
    assert_eq!(stats.daily_trend.len(), 30);
    assert_eq!(stats.daily_trend.values().sum::<u64>(), 6);
    assert_eq!(stats.daily_trend[&h.clock.now().date_naive()], 6);

    assert!(matches!(
        h.service.stats(&ada).await,
        Err(DomainError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_listings_filter_and_count() {
    let h = Harness::new();
    let ada = h.writer("Ada").await;
    let grace = h.writer("Grace").await;
    let mine = h.create(&ada, "Rust ownership", "public").await;
    h.create(&ada, "Cooking", "public").await;
    h.create(&grace, "Rust lifetimes", "public").await;
    h.service.approve(&h.admin, mine).await.unwrap();

    let own = h
        .service
        .list_for_author(
            &ada,
            AuthorPostQuery {
                search: Some("rust".to_string()),
                ..AuthorPostQuery::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(own.total, 1);
    assert_eq!(own.items[0].post.id, mine);

    let pending = h
        .service
        .list_for_admin(
            &h.admin,
            AdminPostQuery {
                status: Some("pending".to_string()),
                search: None,
            },
            PageRequest::new(Some(1), Some(1)),
        )
        .await
        .unwrap();
    assert_eq!(pending.posts.total, 2);
    assert_eq!(pending.posts.items.len(), 1);
    assert_eq!(pending.posts.last_page(), 2);
    assert_eq!(pending.counts.published, 1);
    assert_eq!(pending.counts.pending, 2);

    assert!(matches!(
        h.service
            .list_for_admin(
                &h.admin,
                AdminPostQuery {
                    status: Some("deleted".to_string()),
                    search: None,
                },
                PageRequest::default(),
            )
            .await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn test_out_of_range_page_is_empty() {
    let h = Harness::new();
    let ada = h.writer("Ada").await;
    h.create(&ada, "Only post", "public").await;

    let page = h
        .service
        .list_for_author(
            &ada,
            AuthorPostQuery::default(),
            PageRequest::new(Some(u64::MAX), None),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert!(page.items.is_empty());
    assert_eq!(page.page, MAX_PAGE);
}

#[tokio::test]
async fn test_failed_image_write_leaves_posts_untouched() {
    let h = Harness::new();
    let writer = h.writer("Ada").await;
    let id = h.create(&writer, "Hello", "public").await;
    h.service.approve(&h.admin, id).await.unwrap();
    h.storage.fail_writes();

    let created = h
        .service
        .create(
            &writer,
            PostDraft {
                featured_image: Some(png("cover.png")),
                ..draft("Second", "public")
            },
        )
        .await;
    assert!(matches!(created, Err(DomainError::Internal(_))));
    let own = h
        .service
        .list_for_author(&writer, AuthorPostQuery::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(own.total, 1);

    let updated = h
        .service
        .update(
            &writer,
            id,
            PostDraft {
                featured_image: Some(png("cover.png")),
                ..draft("Hello v2", "public")
            },
        )
        .await;
    assert!(matches!(updated, Err(DomainError::Internal(_))));
    let post = h.posts.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(post.title, "Hello");
    assert_eq!(post.status, PostStatus::Published);
    assert!(h.storage.inner.is_empty().await);
}
