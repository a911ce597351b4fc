//! Category and tag handlers.

use actix_web::{HttpResponse, web};
use quillpress_shared::ApiResponse;
use quillpress_shared::dto::{CategoryResponse, NameRequest, TagResponse};

use crate::middleware::{AppResult, Identity};
use crate::state::AppState;

/// GET /api/categories
pub async fn categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories: Vec<CategoryResponse> = state
        .taxonomy
        .categories()
        .await?
        .into_iter()
        .map(|c| CategoryResponse {
            id: c.id,
            name: c.name,
        })
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(categories)))
}

/// GET /api/tags
pub async fn tags(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags: Vec<TagResponse> = state
        .taxonomy
        .tags()
        .await?
        .into_iter()
        .map(|t| TagResponse {
            id: t.id,
            name: t.name,
        })
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tags)))
}

/// POST /api/admin/categories
pub async fn create_category(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<NameRequest>,
) -> AppResult<HttpResponse> {
    let category = state
        .taxonomy
        .create_category(&identity.principal, &body.name)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(CategoryResponse {
        id: category.id,
        name: category.name,
    })))
}

/// POST /api/admin/tags
pub async fn create_tag(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<NameRequest>,
) -> AppResult<HttpResponse> {
    let tag = state.taxonomy.create_tag(&identity.principal, &body.name).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(TagResponse {
        id: tag.id,
        name: tag.name,
    })))
}
