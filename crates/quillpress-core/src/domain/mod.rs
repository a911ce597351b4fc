//! Domain entities - the core business objects.

mod activity;
mod author;
mod media;
mod post;
mod principal;
mod query;
mod stats;
mod tagging;
mod taxonomy;

pub use activity::{Activity, ActivityEvent, Causer, TrackedAttributes};
pub use author::{Administrator, Author};
pub use media::{ImageUpload, MAX_IMAGE_KIB, Media, MediaCollection};
pub use post::{Moderation, Post, PostContent, PostStatus, Visibility};
pub use principal::{Actor, Permission, Principal, PrincipalKind, Role};
pub use query::{
    DEFAULT_PER_PAGE, MAX_PAGE, MAX_PER_PAGE, Page, PageRequest, PostFilter, SearchScope,
};
pub use stats::{
    AuthorPostCount, PostStats, RECENT_POSTS, StatusCounts, TOP_AUTHORS, TREND_DAYS, fill_trend,
    month_start, trend_start,
};
pub use tagging::TagChanges;
pub use taxonomy::{Category, Tag, normalize_label};
