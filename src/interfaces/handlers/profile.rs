use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::{
    entities::profile::{LinkProfileRequest, MatchProfileRequest, ProfileUpdate},
    errors::AppError,
    use_cases::extractors::AuthClaims,
    AppState,
};

pub async fn get_profile(
    claims: AuthClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let user_id = claims.user_id()?;
    let response = state.profile_handler.get_profile(&user_id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(claims, state, update))]
pub async fn update_profile(
    claims: AuthClaims,
    state: web::Data<AppState>,
    update: web::Json<ProfileUpdate>,
) -> Result<impl Responder, AppError> {
    let user_id = claims.user_id()?;
    let response = state.profile_handler
        .update_profile(&user_id, update.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn match_profile(
    _claims: AuthClaims,
    state: web::Data<AppState>,
    request: web::Json<MatchProfileRequest>,
) -> Result<impl Responder, AppError> {
    let response = state.profile_handler.match_profile(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(claims, state, request))]
pub async fn link_profile(
    claims: AuthClaims,
    state: web::Data<AppState>,
    request: web::Json<LinkProfileRequest>,
) -> Result<impl Responder, AppError> {
    let user_id = claims.user_id()?;
    let response = state.profile_handler
        .link_profile(&user_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(claims, state))]
pub async fn delete_account(
    claims: AuthClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let user_id = claims.user_id()?;
    state.profile_handler.delete_account(&user_id).await?;

    // The access token stays valid until expiry unless revoked here.
    if let Err(e) = state.auth_handler.logout(&claims.0, None).await {
        tracing::warn!("Could not revoke token of deleted account: {}", e);
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Account deleted successfully"
    })))
}
