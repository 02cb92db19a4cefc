//! Cross-site request forgery protection.
//!
//! Unsafe requests must carry an `Origin` (or, failing that, a `Referer`)
//! whose host matches the `Host` the request was sent to. Anything else is
//! answered with the CSRF failure page.

use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
};
use futures::future::LocalBoxFuture;
use url::Url;

use crate::templates;

/// CSRF middleware factory.
#[derive(Default)]
pub struct Csrf;

impl<S, B> Transform<S, ServiceRequest> for Csrf
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = CsrfService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CsrfService {
            service: Rc::new(service),
        }))
    }
}

pub struct CsrfService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for CsrfService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.method().is_safe() || same_origin(&req) {
            let service = Rc::clone(&self.service);
            return Box::pin(async move { Ok(service.call(req).await?.map_into_left_body()) });
        }

        tracing::warn!(
            method = %req.method(),
            path = %req.path(),
            "CSRF verification failed"
        );

        let response = HttpResponse::Forbidden()
            .content_type("text/html; charset=utf-8")
            .body(templates::errors::csrf_failure());
        let (http_req, _payload) = req.into_parts();
        let res = ServiceResponse::new(http_req, response).map_into_right_body();
        Box::pin(async move { Ok(res) })
    }
}

fn same_origin(req: &ServiceRequest) -> bool {
    let headers = req.headers();
    let Some(host) = headers.get(header::HOST).and_then(|h| h.to_str().ok()) else {
        return false;
    };

    let source = headers
        .get(header::ORIGIN)
        .or_else(|| headers.get(header::REFERER))
        .and_then(|h| h.to_str().ok());

    match source {
        Some(source) => origin_matches(source, host),
        None => false,
    }
}

/// Whether `source` (an Origin or Referer value) points at `host`, a
/// `Host` header value that may carry a port.
fn origin_matches(source: &str, host: &str) -> bool {
    let Ok(url) = Url::parse(source) else {
        return false;
    };
    let Some(source_host) = url.host_str() else {
        return false;
    };

    let authority = match url.port() {
        Some(port) => format!("{}:{}", source_host, port),
        None => source_host.to_string(),
    };
    authority.eq_ignore_ascii_case(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_matches() {
        assert!(origin_matches("http://testserver", "testserver"));
        assert!(origin_matches("http://localhost:8080/create/", "localhost:8080"));
        assert!(origin_matches("https://Example.com", "example.com"));
    }

    #[test]
    fn test_origin_mismatch() {
        assert!(!origin_matches("http://evil.example", "testserver"));
        assert!(!origin_matches("http://localhost:9999", "localhost:8080"));
        assert!(!origin_matches("null", "testserver"));
        assert!(!origin_matches("not a url", "testserver"));
    }
}
