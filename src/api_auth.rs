use std::future::{ready, Ready};
use std::rc::Rc;
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse, http::Method,
    body::{BoxBody, EitherBody},
};
use futures::future::LocalBoxFuture;
use log::warn;
use serde_json::json;
use std::task::{Context, Poll};

/// Bearer-token guard for state-changing API calls. Read-only requests and
/// deployments without a configured key pass straight through.
pub struct ApiKey {
    key: Option<Rc<String>>,
}

impl ApiKey {
    pub fn new(key: Option<String>) -> Self {
        ApiKey { key: key.map(Rc::new) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKey
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Transform = ApiKeyMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyMiddleware {
            service,
            key: self.key.clone(),
        }))
    }
}

pub struct ApiKeyMiddleware<S> {
    service: S,
    key: Option<Rc<String>>,
}

fn requires_key(req: &ServiceRequest) -> bool {
    let method = req.method();
    let read_only = *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS;
    req.path().starts_with("/api") && !read_only
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let authorized = match &self.key {
            Some(api_key) if requires_key(&req) => req
                .headers()
                .get("Authorization")
                .and_then(|header| header.to_str().ok())
                .and_then(|header| header.strip_prefix("Bearer "))
                .map(|token| token == api_key.as_str())
                .unwrap_or(false),
            _ => true,
        };

        if authorized {
            let fut = self.service.call(req);
            Box::pin(async move {
                let res: ServiceResponse<B> = fut.await?;
                Ok(res.map_into_left_body())
            })
        } else {
            warn!("Rejected {} {} without a valid API key", req.method(), req.path());
            Box::pin(async move {
                let (http_req, _payload) = req.into_parts();
                let res = HttpResponse::Unauthorized().json(json!({"error": "Chave de API inválida"}));
                Ok(ServiceResponse::new(http_req, res).map_into_right_body())
            })
        }
    }
}
