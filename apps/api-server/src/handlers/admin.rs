//! Moderation handlers for administrators.

use actix_web::{HttpResponse, web};
use quillpress_core::domain::PageRequest;
use quillpress_core::services::AdminPostQuery;
use quillpress_shared::ApiResponse;
use quillpress_shared::dto::{ActivityResponse, AdminPostListQuery};
use uuid::Uuid;

use super::views;
use crate::middleware::{AppResult, Identity};
use crate::state::AppState;

const ACTIVITY_LIMIT: u64 = 50;

/// GET /api/admin/posts
pub async fn index(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<AdminPostListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let page = PageRequest::new(query.page, query.per_page);
    let filter = AdminPostQuery {
        status: query.status,
        search: query.search,
    };

    let listing = state
        .posts
        .list_for_admin(&identity.principal, filter, page)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::admin_listing(listing))))
}

/// GET /api/admin/posts/stats
pub async fn stats(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let stats = state.posts.stats(&identity.principal).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::stats(stats))))
}

/// PATCH /api/admin/posts/{id}/approve
pub async fn approve(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.approve(&identity.principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        views::post(post),
        "Post approved and published.",
    )))
}

/// PATCH /api/admin/posts/{id}/reject
pub async fn reject(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.reject(&identity.principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        views::post(post),
        "Post rejected.",
    )))
}

/// PATCH /api/admin/posts/{id}/pending
pub async fn pending(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .set_pending(&identity.principal, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        views::post(post),
        "Post moved back to pending.",
    )))
}

/// DELETE /api/admin/posts/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.posts.delete(&identity.principal, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/admin/activities
pub async fn activities(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let entries: Vec<ActivityResponse> = state
        .posts
        .activities(&identity.principal, ACTIVITY_LIMIT)
        .await?
        .into_iter()
        .map(views::activity)
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(entries)))
}
