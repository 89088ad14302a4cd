use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    web, Error, HttpMessage, HttpResponse,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{
    entities::token::Claims,
    errors::AuthError,
    handlers::json_error::json_error,
    repositories::token::TokenServiceRepository,
    AppState,
};

/// Requires a valid bearer token on every non-public route and the director
/// claim under `/admin`. Verified claims are stored in request extensions.
pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if is_public_route(req.path(), req.method().as_str()) {
                return service.call(req).await;
            }

            let claims = match verify_request(&req).await {
                Ok(claims) => claims,
                Err(e) => {
                    tracing::warn!(path = req.path(), "Rejected request: {}", e);
                    let response = match e {
                        AuthError::TokenExpired => json_error(StatusCode::UNAUTHORIZED, "Token has expired"),
                        AuthError::TokenRevoked => json_error(StatusCode::UNAUTHORIZED, "Token has been revoked"),
                        AuthError::MissingJwtService => {
                            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                        }
                        _ => json_error(StatusCode::UNAUTHORIZED, "Missing or invalid credentials"),
                    };
                    return Ok(req.into_response(response));
                }
            };

            if let Err(forbidden_response) = enforce_director_access(req.path(), &claims) {
                return Ok(req.into_response(forbidden_response));
            }

            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}

pub fn is_public_route(path: &str, method: &str) -> bool {
    if method == "OPTIONS" {
        return true;
    }

    matches!(
        (path, method),
        ("/", "GET") |
        ("/api/health", "GET") |
        ("/api/alumni", "GET") |
        ("/api/filters", "GET") |
        ("/auth/signup", "POST") |
        ("/auth/login", "POST") |
        ("/auth/refresh", "POST")
    )
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        })
}

async fn verify_request(req: &ServiceRequest) -> Result<Claims, AuthError> {
    let state = req.app_data::<web::Data<AppState>>()
        .ok_or_else(|| {
            tracing::error!("AppState missing in middleware");
            AuthError::MissingJwtService
        })?
        .clone();

    let token = extract_token(req).ok_or(AuthError::MissingCredentials)?;
    let claims = state.auth_handler.token_service.decode_jwt(&token)?.claims;

    // A deny-list outage should not lock every member out.
    match state.auth_handler.token_service.is_access_revoked(&claims.jti).await {
        Ok(true) => return Err(AuthError::TokenRevoked),
        Ok(false) => {}
        Err(e) => tracing::warn!("Token deny-list check failed: {}", e),
    }

    Ok(claims)
}

fn enforce_director_access(path: &str, claims: &Claims) -> Result<(), HttpResponse> {
    if path.starts_with("/admin") && !claims.director {
        tracing::warn!(user_id = %claims.sub, "Director access required for path: {}", path);
        return Err(json_error(StatusCode::FORBIDDEN, "Director access required"));
    }
    Ok(())
}
