//! Mapping from service results to wire DTOs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quillpress_core::domain::{Activity, Page, Post, PostStats, StatusCounts};
use quillpress_core::services::{
    Account, AdminPostListing, PostDraft, PostView, Session, UploadedFile,
};
use quillpress_shared::dto::{
    AccountResponse, ActivityResponse, AdminPostListResponse, AuthResponse, CategoryResponse,
    ImagePayload, PageResponse, PostRequest, PostResponse, PostSummaryResponse, StatsResponse,
    StatusCountsResponse, TagResponse, TopAuthorResponse,
};

use crate::middleware::AppError;

pub fn account(account: Account) -> AccountResponse {
    AccountResponse {
        id: account.id,
        name: account.name,
        email: account.email,
        guard: account.kind.as_str().to_string(),
        created_at: account.created_at,
    }
}

pub fn session(session: Session) -> AuthResponse {
    AuthResponse {
        access_token: session.token,
        token_type: "Bearer".to_string(),
        expires_in: session.expires_in.max(0) as u64,
        user: account(session.account),
    }
}

pub fn post(view: PostView) -> PostResponse {
    let PostView {
        post,
        author_name,
        category,
        tags,
        featured_image,
        gallery,
    } = view;

    PostResponse {
        id: post.id,
        user_id: post.user_id,
        author_name,
        title: post.title,
        slug: post.slug,
        content: post.content,
        writer: post.writer,
        visibility: post.visibility.as_str().to_string(),
        status: post.status.as_str().to_string(),
        published_at: post.published_at,
        created_at: post.created_at,
        updated_at: post.updated_at,
        category: category.map(|c| CategoryResponse {
            id: c.id,
            name: c.name,
        }),
        tags: tags
            .into_iter()
            .map(|t| TagResponse {
                id: t.id,
                name: t.name,
            })
            .collect(),
        featured_image,
        gallery,
    }
}

pub fn page<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> PageResponse<U> {
    let last_page = page.last_page();
    let page = page.map(f);
    PageResponse {
        data: page.items,
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        last_page,
    }
}

fn counts(counts: StatusCounts) -> StatusCountsResponse {
    StatusCountsResponse {
        draft: counts.draft,
        pending: counts.pending,
        published: counts.published,
        archived: counts.archived,
    }
}

pub fn admin_listing(listing: AdminPostListing) -> AdminPostListResponse {
    AdminPostListResponse {
        posts: page(listing.posts, post),
        counts: counts(listing.counts),
    }
}

fn summary(post: Post) -> PostSummaryResponse {
    PostSummaryResponse {
        id: post.id,
        title: post.title,
        status: post.status.as_str().to_string(),
        created_at: post.created_at,
    }
}

pub fn stats(stats: PostStats) -> StatsResponse {
    StatsResponse {
        total: stats.total,
        by_status: counts(stats.by_status),
        created_this_month: stats.created_this_month,
        top_authors: stats
            .top_authors
            .into_iter()
            .map(|a| TopAuthorResponse {
                author_id: a.author_id,
                name: a.name,
                post_count: a.post_count,
            })
            .collect(),
        recent_posts: stats.recent_posts.into_iter().map(summary).collect(),
        daily_trend: stats.daily_trend,
    }
}

pub fn activity(activity: Activity) -> ActivityResponse {
    ActivityResponse {
        causer_name: activity.causer_name().to_string(),
        causer_id: activity.causer.as_ref().map(|c| c.id),
        id: activity.id,
        description: activity.description,
        subject_id: activity.subject_id,
        properties: activity.properties,
        created_at: activity.created_at,
    }
}

/// Decode an uploaded image. `field` names the input in validation errors.
pub fn uploaded_file(field: &str, payload: ImagePayload) -> Result<UploadedFile, AppError> {
    let encoded = match payload.data.split_once(";base64,") {
        Some((header, data)) if header.starts_with("data:") => data,
        _ => payload.data.as_str(),
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::field(field, format!("The {field} must be base64 encoded.")))?;

    Ok(UploadedFile {
        file_name: payload.file_name,
        bytes,
    })
}

pub fn draft(request: PostRequest) -> Result<PostDraft, AppError> {
    let featured_image = request
        .featured_image
        .map(|image| uploaded_file("featured_image", image))
        .transpose()?;

    Ok(PostDraft {
        title: request.title,
        content: request.content,
        category_id: request.category_id,
        writer: request.writer,
        visibility: request.visibility,
        tags: request.tags,
        slug: request.slug,
        featured_image,
    })
}
