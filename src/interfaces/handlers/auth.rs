use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::entities::token::RefreshTokenRequest;
use crate::entities::user::{LoginUser, LogoutRequest, SignupRequest, UpdatePasswordRequest};
use crate::errors::{AppError, AuthError};
use crate::use_cases::extractors::AuthClaims;
use crate::AppState;

#[post("/signup")]
#[instrument(skip(state, request))]
pub async fn signup(
    state: web::Data<AppState>,
    request: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    let response = state.auth_handler.signup(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[post("/login")]
#[instrument(skip(state, user))]
pub async fn login(
    state: web::Data<AppState>,
    user: web::Json<LoginUser>,
) -> Result<impl Responder, AuthError> {
    let response = state.auth_handler.login(user.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/refresh")]
pub async fn refresh_token(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<impl Responder, AuthError> {
    let tokens = state.auth_handler.refresh_token(&request.refresh_token).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

#[post("/logout")]
pub async fn logout(
    claims: AuthClaims,
    state: web::Data<AppState>,
    body: Option<web::Json<LogoutRequest>>,
) -> Result<impl Responder, AuthError> {
    let supplied_refresh = body.and_then(|b| b.into_inner().refresh_token);

    state.auth_handler
        .logout(&claims.0, supplied_refresh.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Logged out successfully"
    })))
}

#[post("/update-password")]
pub async fn update_password(
    claims: AuthClaims,
    state: web::Data<AppState>,
    request: web::Json<UpdatePasswordRequest>,
) -> Result<impl Responder, AppError> {
    state.auth_handler
        .update_password(&claims.0, request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password updated successfully"
    })))
}

#[get("/session")]
pub async fn session(
    claims: AuthClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let response = state.auth_handler.session(&claims.0).await?;
    Ok(HttpResponse::Ok().json(response))
}
