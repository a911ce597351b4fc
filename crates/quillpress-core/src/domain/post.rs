use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle stage of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Reserved. Counted and filterable, but nothing transitions into it.
    Draft,
    Pending,
    Published,
    Archived,
}

impl PostStatus {
    pub const ALL: [PostStatus; 4] = [
        PostStatus::Draft,
        PostStatus::Pending,
        PostStatus::Published,
        PostStatus::Archived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "pending" => Ok(PostStatus::Pending),
            "published" => Ok(PostStatus::Published),
            "archived" => Ok(PostStatus::Archived),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

/// Intended audience of a post. Independent of [`PostStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Unlisted,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Unlisted => "unlisted",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            "unlisted" => Ok(Visibility::Unlisted),
            other => Err(format!("unknown visibility '{other}'")),
        }
    }
}

/// Administrative moderation actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moderation {
    Approve,
    Reject,
    SetPending,
}

impl Moderation {
    pub fn as_str(self) -> &'static str {
        match self {
            Moderation::Approve => "approve",
            Moderation::Reject => "reject",
            Moderation::SetPending => "set-pending",
        }
    }

    /// Status the post ends up in. Every action is accepted from every
    /// status, so an administrator can re-approve a rejected post or pull a
    /// published one.
    pub fn target(self) -> PostStatus {
        match self {
            Moderation::Approve => PostStatus::Published,
            Moderation::Reject => PostStatus::Archived,
            Moderation::SetPending => PostStatus::Pending,
        }
    }
}

/// Editable content of a post, as submitted by its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub content: String,
    pub category_id: Option<Uuid>,
    pub writer: String,
    pub visibility: Visibility,
}

/// Post entity - one piece of user-generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub writer: String,
    pub visibility: Visibility,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post submitted for approval.
    ///
    /// The slug is taken from `slug` when given, otherwise derived from the
    /// title. It is never regenerated afterwards.
    pub fn submit(
        user_id: Uuid,
        content: PostContent,
        slug: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        let id = Uuid::new_v4();
        let slug = slug
            .map(slug::slugify)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slug_for(&content.title, id));

        Self {
            id,
            user_id,
            category_id: content.category_id,
            title: content.title,
            slug,
            content: content.content,
            writer: content.writer,
            visibility: content.visibility,
            status: PostStatus::Pending,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the editable content and send the post back for approval.
    pub fn revise(&mut self, content: PostContent, now: DateTime<Utc>) {
        self.title = content.title;
        self.content = content.content;
        self.category_id = content.category_id;
        self.writer = content.writer;
        self.visibility = content.visibility;
        self.resubmit(now);
    }

    /// Reset to `pending` after a change made by the author.
    pub fn resubmit(&mut self, now: DateTime<Utc>) {
        self.status = PostStatus::Pending;
        self.published_at = None;
        self.updated_at = now;
    }

    /// Apply an administrative transition.
    ///
    /// `published_at` is stamped on approval and cleared whenever the post
    /// leaves `published`.
    pub fn moderate(&mut self, action: Moderation, now: DateTime<Utc>) {
        let target = action.target();
        self.published_at = (target == PostStatus::Published).then_some(now);
        self.status = target;
        self.updated_at = now;
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Whether the post belongs in the public feed.
    pub fn is_in_feed(&self) -> bool {
        self.status == PostStatus::Published && self.visibility == Visibility::Public
    }

    /// Whether anyone holding a link may read the post.
    pub fn is_publicly_readable(&self) -> bool {
        self.status == PostStatus::Published
            && matches!(self.visibility, Visibility::Public | Visibility::Unlisted)
    }
}

fn slug_for(title: &str, id: Uuid) -> String {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        let simple = id.simple().to_string();
        format!("post-{}", &simple[..8])
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(title: &str) -> PostContent {
        PostContent {
            title: title.to_string(),
            content: "Body".to_string(),
            category_id: None,
            writer: "Ada".to_string(),
            visibility: Visibility::Public,
        }
    }

    fn published_at_matches_status(post: &Post) -> bool {
        post.published_at.is_some() == (post.status == PostStatus::Published)
    }

    #[test]
    fn test_submit_is_pending_with_slug() {
        let post = Post::submit(Uuid::new_v4(), content("Hello, World!"), None, Utc::now());

        assert_eq!(post.status, PostStatus::Pending);
        assert_eq!(post.published_at, None);
        assert_eq!(post.slug, "hello-world");
    }

    #[test]
    fn test_submit_keeps_explicit_slug() {
        let post = Post::submit(
            Uuid::new_v4(),
            content("Hello"),
            Some("Custom Slug"),
            Utc::now(),
        );
        assert_eq!(post.slug, "custom-slug");
    }

    #[test]
    fn test_submit_falls_back_when_title_has_no_slug() {
        let post = Post::submit(Uuid::new_v4(), content("!!!"), None, Utc::now());
        assert!(post.slug.starts_with("post-"));
        assert_eq!(post.slug.len(), "post-".len() + 8);
    }

    #[test]
    fn test_revise_resets_to_pending_and_keeps_slug() {
        let now = Utc::now();
        let mut post = Post::submit(Uuid::new_v4(), content("Hello"), None, now);
        post.moderate(Moderation::Approve, now);

        post.revise(content("Hello v2"), now);

        assert_eq!(post.status, PostStatus::Pending);
        assert_eq!(post.published_at, None);
        assert_eq!(post.title, "Hello v2");
        assert_eq!(post.slug, "hello");
    }

    #[test]
    fn test_approve_sets_published_at() {
        let now = Utc::now();
        let mut post = Post::submit(Uuid::new_v4(), content("Hello"), None, now);

        post.moderate(Moderation::Approve, now);

        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.published_at, Some(now));
        assert!(post.is_in_feed());
    }

    #[test]
    fn test_reject_leaves_published_at_null() {
        let now = Utc::now();
        let mut post = Post::submit(Uuid::new_v4(), content("Hello"), None, now);

        post.moderate(Moderation::Reject, now);

        assert_eq!(post.status, PostStatus::Archived);
        assert_eq!(post.published_at, None);
    }

    #[test]
    fn test_approve_and_reject_from_any_status() {
        let now = Utc::now();
        let later = now + chrono::TimeDelta::hours(1);
        let mut post = Post::submit(Uuid::new_v4(), content("Hello"), None, now);

        post.moderate(Moderation::Reject, now);
        post.moderate(Moderation::Approve, later);
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.published_at, Some(later));

        post.moderate(Moderation::Approve, now);
        assert_eq!(post.published_at, Some(now));

        post.moderate(Moderation::Reject, later);
        assert_eq!(post.status, PostStatus::Archived);
        assert_eq!(post.published_at, None);
    }

    #[test]
    fn test_set_pending_from_every_status() {
        let now = Utc::now();
        for status in PostStatus::ALL {
            let mut post = Post::submit(Uuid::new_v4(), content("Hello"), None, now);
            post.status = status;
            post.published_at = (status == PostStatus::Published).then_some(now);

            post.moderate(Moderation::SetPending, now);

            assert_eq!(post.status, PostStatus::Pending);
            assert_eq!(post.published_at, None);
        }
    }

    #[test]
    fn test_published_at_tracks_status_across_transitions() {
        let now = Utc::now();
        let mut post = Post::submit(Uuid::new_v4(), content("Hello"), None, now);
        assert!(published_at_matches_status(&post));

        let steps = [
            Moderation::Approve,
            Moderation::SetPending,
            Moderation::Reject,
            Moderation::Approve,
            Moderation::Reject,
            Moderation::SetPending,
            Moderation::Approve,
        ];
        for step in steps {
            post.moderate(step, now);
            assert!(published_at_matches_status(&post), "after {}", step.as_str());
        }

        post.revise(content("Again"), now);
        assert!(published_at_matches_status(&post));
    }

    #[test]
    fn test_visibility_is_orthogonal_to_status() {
        let now = Utc::now();
        let mut post = Post::submit(Uuid::new_v4(), content("Hello"), None, now);
        post.visibility = Visibility::Unlisted;
        post.moderate(Moderation::Approve, now);

        assert!(!post.is_in_feed());
        assert!(post.is_publicly_readable());

        post.visibility = Visibility::Private;
        assert!(!post.is_publicly_readable());
    }

    #[test]
    fn test_parse_status_and_visibility() {
        assert_eq!("archived".parse::<PostStatus>(), Ok(PostStatus::Archived));
        assert!("deleted".parse::<PostStatus>().is_err());
        assert_eq!("unlisted".parse::<Visibility>(), Ok(Visibility::Unlisted));
        assert!("friends".parse::<Visibility>().is_err());
    }
}
