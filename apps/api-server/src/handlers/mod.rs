//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod feed;
mod health;
mod media;
mod posts;
mod taxonomy;
mod views;

use actix_web::{HttpResponse, error, web};
use quillpress_shared::ErrorResponse;

use crate::middleware::RateLimitMiddleware;

/// JSON extractor limits. Bodies carry base64 images, so the cap sits above
/// the largest accepted upload.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(4 * 1024 * 1024)
        .error_handler(|err, _req| {
            let response =
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(err.to_string()));
            error::InternalError::from_response(err, response).into()
        })
}

/// Malformed query strings are a 400, not a 500.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorResponse::bad_request(err.to_string()));
        error::InternalError::from_response(err, response).into()
    })
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/feed", web::get().to(feed::index))
            .route("/categories", web::get().to(taxonomy::categories))
            .route("/tags", web::get().to(taxonomy::tags))
            .route("/media/{id}", web::get().to(media::download))
            // Author accounts
            .service(
                web::scope("/auth")
                    .service(
                        web::resource("/register")
                            .wrap(RateLimitMiddleware::new("register"))
                            .route(web::post().to(auth::register)),
                    )
                    .service(
                        web::resource("/login")
                            .wrap(RateLimitMiddleware::new("login"))
                            .route(web::post().to(auth::login)),
                    )
                    .route("/me", web::get().to(auth::me)),
            )
            // Author posts
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::index))
                    .route("", web::post().to(posts::store))
                    .route("/{id}", web::get().to(posts::show))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::destroy))
                    .route("/{id}/gallery", web::post().to(posts::gallery)),
            )
            // Administrators
            .service(
                web::scope("/admin")
                    .service(
                        web::resource("/auth/login")
                            .wrap(RateLimitMiddleware::new("admin-login"))
                            .route(web::post().to(auth::admin_login)),
                    )
                    .route("/posts", web::get().to(admin::index))
                    .route("/posts/stats", web::get().to(admin::stats))
                    .route("/posts/{id}", web::delete().to(admin::destroy))
                    .route("/posts/{id}/approve", web::patch().to(admin::approve))
                    .route("/posts/{id}/reject", web::patch().to(admin::reject))
                    .route("/posts/{id}/pending", web::patch().to(admin::pending))
                    .route("/activities", web::get().to(admin::activities))
                    .route("/categories", web::post().to(taxonomy::create_category))
                    .route("/tags", web::post().to(taxonomy::create_tag)),
            ),
    );
}
