//! Author post handlers.

use actix_web::{HttpResponse, web};
use quillpress_core::domain::PageRequest;
use quillpress_core::services::AuthorPostQuery;
use quillpress_shared::ApiResponse;
use quillpress_shared::dto::{GalleryImageRequest, PostListQuery, PostRequest};
use uuid::Uuid;

use super::views;
use crate::middleware::{AppResult, Identity, OptionalIdentity};
use crate::state::AppState;

/// GET /api/posts - the caller's own posts
pub async fn index(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let page = PageRequest::new(query.page, query.per_page);
    let filter = AuthorPostQuery {
        status: query.status,
        category_id: query.category_id,
        search: query.search,
    };

    let posts = state
        .posts
        .list_for_author(&identity.principal, filter, page)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::page(posts, views::post))))
}

/// POST /api/posts
pub async fn store(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let draft = views::draft(body.into_inner())?;
    let post = state.posts.create(&identity.principal, draft).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        views::post(post),
        "Post submitted for review.",
    )))
}

/// GET /api/posts/{id}
pub async fn show(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.show(identity.principal(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::post(post))))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let draft = views::draft(body.into_inner())?;
    let post = state
        .posts
        .update(&identity.principal, path.into_inner(), draft)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        views::post(post),
        "Post updated and resubmitted for review.",
    )))
}

/// DELETE /api/posts/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.posts.delete(&identity.principal, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/posts/{id}/gallery
pub async fn gallery(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<GalleryImageRequest>,
) -> AppResult<HttpResponse> {
    let file = views::uploaded_file("gallery_image", body.into_inner().image)?;
    let post = state
        .posts
        .add_gallery_image(&identity.principal, path.into_inner(), file)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        views::post(post),
        "Image added. The post is pending review again.",
    )))
}
