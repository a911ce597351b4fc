//! Rate limiting middleware.

use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use futures::future::LocalBoxFuture;
use quillpress_shared::ErrorResponse;

use crate::middleware::RequestId;
use crate::state::AppState;

/// Throttles requests per client IP using the login limiter in [`AppState`].
///
/// `scope` namespaces the keys so several routes can share one limiter
/// without sharing budgets.
pub struct RateLimitMiddleware {
    scope: &'static str,
}

impl RateLimitMiddleware {
    pub fn new(scope: &'static str) -> Self {
        Self { scope }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            scope: self.scope,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    scope: &'static str,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.login_limiter.clone());
        let key = format!(
            "{}:{}",
            self.scope,
            req.connection_info().realip_remote_addr().unwrap_or("unknown")
        );

        Box::pin(async move {
            let Some(limiter) = limiter else {
                tracing::error!("AppState not found in app data, rate limiting disabled");
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            };

            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    let retry_after = result.reset_after.as_secs().max(1);
                    tracing::warn!(key = %key, retry_after, "Rate limit exceeded");

                    let mut error =
                        ErrorResponse::too_many_requests(retry_after).with_instance(req.path());
                    if let Some(id) = req.extensions().get::<RequestId>() {
                        error = error.with_request_id(id.0.clone());
                    }
                    let response = HttpResponse::TooManyRequests()
                        .insert_header(("X-RateLimit-Remaining", "0"))
                        .insert_header(("Retry-After", retry_after.to_string()))
                        .json(error);

                    Ok(req.into_response(response).map_into_right_body())
                }
                Ok(_) => service.call(req).await.map(ServiceResponse::map_into_left_body),
                Err(e) => {
                    // Fail open
                    tracing::error!(error = %e, "Rate limiter error, failing open");
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
            }
        })
    }
}
