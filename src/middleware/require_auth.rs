/// Access-token gate
///
/// Wrapped around every protected scope. Verifies the bearer token from the
/// `authorization` header and injects the authenticated user id into
/// request extensions for downstream handlers.
///
/// The check is stateless: the user record is not re-fetched, so handlers
/// must tolerate an id whose user has since been deleted. Missing, expired
/// and malformed tokens all produce the same 401 body.
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::verify_token;
use crate::configuration::JwtSettings;

/// Verified subject user id, available to handlers via `web::ReqData`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Uuid);

pub struct RequireAuth {
    jwt_config: JwtSettings,
}

impl RequireAuth {
    pub fn new(jwt_config: JwtSettings) -> Self {
        Self { jwt_config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequireAuthService {
            service: Rc::new(service),
            jwt_config: self.jwt_config.clone(),
        }))
    }
}

pub struct RequireAuthService<S> {
    service: Rc<S>,
    jwt_config: JwtSettings,
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // `<scheme> <token>`; the scheme word is not inspected
        let token = req
            .headers()
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.split_whitespace().nth(1))
            .map(|t| t.to_string());

        let token = match token {
            Some(token) => token,
            None => {
                tracing::warn!("Protected request without authorization token");
                let response = HttpResponse::Unauthorized().body("Access Denied");
                return Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response("Unauthorized", response)
                        .into())
                });
            }
        };

        if self.jwt_config.secret.is_empty() {
            tracing::error!("Token signing secret is not configured");
            let response = HttpResponse::InternalServerError().body("Server Error");
            return Box::pin(async move {
                Err(actix_web::error::InternalError::from_response(
                    "Server misconfiguration",
                    response,
                )
                .into())
            });
        }

        let user_id = verify_token(&token, &self.jwt_config)
            .ok()
            .and_then(|claims| claims.user_id());

        match user_id {
            Some(user_id) => {
                req.extensions_mut().insert(AuthenticatedUser(user_id));
                tracing::debug!(user_id = %user_id, "Access token accepted");

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            None => {
                // Expired and malformed are indistinguishable to the client
                let response = HttpResponse::Unauthorized().body("Access Denied");
                Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response("Unauthorized", response)
                        .into())
                })
            }
        }
    }
}
