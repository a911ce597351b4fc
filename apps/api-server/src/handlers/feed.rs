use actix_web::{HttpResponse, web};
use quillpress_shared::ApiResponse;
use quillpress_shared::dto::PostResponse;

use super::views;
use crate::middleware::AppResult;
use crate::state::AppState;

/// GET /api/feed - published public posts, newest first
pub async fn index(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts: Vec<PostResponse> = state
        .posts
        .feed()
        .await?
        .into_iter()
        .map(views::post)
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}
