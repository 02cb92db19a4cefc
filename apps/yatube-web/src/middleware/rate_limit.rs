//! Rate limiting middleware for the login and signup forms.

use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::Method,
};
use futures::future::LocalBoxFuture;

use yatube_core::ports::RateLimiter;
use yatube_shared::ErrorResponse;

/// Rate limiting middleware factory. Only form submissions (POST) count
/// against the limit; rendering the form is free.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self { limiter }
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
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
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
        let limiter = self.limiter.clone();

        Box::pin(async move {
            if req.method() != Method::POST {
                return Ok(service.call(req).await?.map_into_left_body());
            }

            let key = format!(
                "{}:{}",
                req.path(),
                req.connection_info()
                    .realip_remote_addr()
                    .unwrap_or("unknown")
            );

            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    tracing::warn!(key = %key, "Rate limit exceeded");

                    let retry_after = result.retry_after_secs();
                    let response = HttpResponse::TooManyRequests()
                        .insert_header(("X-RateLimit-Remaining", "0"))
                        .insert_header(("Retry-After", retry_after.to_string()))
                        .json(ErrorResponse::too_many_requests(retry_after));

                    let (http_req, _payload) = req.into_parts();
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                }
                Ok(_) => Ok(service.call(req).await?.map_into_left_body()),
                Err(e) => {
                    // Fail open: a broken limiter must not lock everyone out.
                    tracing::error!(error = %e, "Rate limiter error, failing open");
                    Ok(service.call(req).await?.map_into_left_body())
                }
            }
        })
    }
}
