use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::admin::{AuditLogQuery, ReferralCodeRequest},
    errors::AppError,
    use_cases::extractors::DirectorClaims,
    utils::valid_uuid::valid_uuid,
    AppState,
};

pub async fn get_settings(
    _director: DirectorClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let response = state.admin_handler.settings().await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(director, state, request))]
pub async fn set_referral_code(
    director: DirectorClaims,
    state: web::Data<AppState>,
    request: web::Json<ReferralCodeRequest>,
) -> Result<impl Responder, AppError> {
    let director_id = director.user_id()?;
    let response = state.admin_handler
        .set_referral_code(&director_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn list_members(
    _director: DirectorClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let response = state.admin_handler.members().await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(director, state))]
pub async fn remove_member(
    director: DirectorClaims,
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let director_id = director.user_id()?;
    let target = valid_uuid(&user_id)?;

    let response = state.admin_handler.remove_member(&director_id, &target).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(director, state))]
pub async fn promote_director(
    director: DirectorClaims,
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let director_id = director.user_id()?;
    let target = valid_uuid(&user_id)?;

    let response = state.admin_handler.promote_director(&director_id, &target).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(director, state))]
pub async fn demote_director(
    director: DirectorClaims,
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let director_id = director.user_id()?;
    let target = valid_uuid(&user_id)?;

    let response = state.admin_handler.demote_director(&director_id, &target).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn audit_log(
    _director: DirectorClaims,
    state: web::Data<AppState>,
    query: web::Query<AuditLogQuery>,
) -> Result<impl Responder, AppError> {
    let response = state.admin_handler.audit_log(&query).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn reload_alumni(
    director: DirectorClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let director_id = director.user_id()?;
    let response = state.admin_handler.reload_alumni(&director_id).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn rebuild_embeddings(
    director: DirectorClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let director_id = director.user_id()?;
    let response = state.admin_handler.rebuild_embeddings(&director_id).await?;
    Ok(HttpResponse::Ok().json(response))
}
