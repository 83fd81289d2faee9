use actix_web::body::EitherBody;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::debug;

use crate::error::AppError;
use crate::league::CallerIdentity;

/// Role claim value that grants league administration
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,   // Subject (user ID)
    pub email: String, // User email
    #[serde(default)]
    pub role: Option<String>,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued at
}

impl Claims {
    pub fn caller(&self) -> CallerIdentity {
        CallerIdentity {
            subject: self.sub.clone(),
            is_admin: self.role.as_deref() == Some(ADMIN_ROLE),
        }
    }
}

/// Bearer-token authentication for the `/api` scope.
///
/// Valid HS256 tokens put the [`CallerIdentity`] derived from their [`Claims`]
/// into the request extensions; everything else is answered with 401.
#[derive(Clone)]
pub struct JwtAuth {
    secret: Rc<str>,
}

impl JwtAuth {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Rc::from(secret),
        }
    }
}

fn verify_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|token_data| token_data.claims)
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            secret: self.secret.clone(),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    secret: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let secret = self.secret.clone();

        Box::pin(async move {
            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "));

            let claims = match token.map(|token| verify_token(&secret, token)) {
                Some(Ok(claims)) => claims,
                Some(Err(err)) => {
                    debug!(error = %err, path = req.path(), "Rejected bearer token");
                    return Ok(unauthorized(req));
                }
                None => {
                    debug!(path = req.path(), "Missing Authorization header");
                    return Ok(unauthorized(req));
                }
            };

            req.extensions_mut().insert(claims.caller());
            let res = svc.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

fn unauthorized<B>(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
    let (req, _pl) = req.into_parts();
    let resp = AppError::Unauthorized.error_response();
    ServiceResponse::new(req, resp).map_into_right_body()
}

/// The authenticated caller, or `Unauthorized` outside the protected scope
pub fn require_caller(req: &HttpRequest) -> Result<CallerIdentity, AppError> {
    req.extensions()
        .get::<CallerIdentity>()
        .cloned()
        .ok_or(AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Option<&str>) -> Claims {
        Claims {
            sub: "user-1".into(),
            email: "user@example.com".into(),
            role: role.map(str::to_string),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_only_admin_role_grants_admin() {
        assert!(claims(Some("admin")).caller().is_admin);
        assert!(!claims(Some("player")).caller().is_admin);
        assert!(!claims(Some("Admin")).caller().is_admin);
        assert!(!claims(None).caller().is_admin);
        assert_eq!(claims(None).caller().subject, "user-1");
    }

    #[test]
    fn test_missing_role_claim_deserializes() {
        let raw = r#"{"sub":"u","email":"e@x.io","exp":10,"iat":1}"#;
        let parsed: Claims = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.role, None);
    }
}
