use actix_web::http::header::{
    CacheControl, CacheDirective, ContentDisposition, DispositionParam, DispositionType,
};
use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::middleware::{AppResult, OptionalIdentity};
use crate::state::AppState;

/// GET /api/media/{id} - raw bytes, readable by whoever may read the post
pub async fn download(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let (media, bytes) = state
        .posts
        .media_file(identity.principal(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok()
        .content_type(media.mime_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(media.file_name)],
        })
        .insert_header(CacheControl(vec![CacheDirective::Private]))
        .body(bytes))
}
