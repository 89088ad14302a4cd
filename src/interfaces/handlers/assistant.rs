use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{
        chat::{ChatHistoryQuery, ChatRequest},
        email::GenerateEmailRequest,
        recommendation::RecommendationRequest,
    },
    errors::AppError,
    use_cases::extractors::AuthClaims,
    AppState,
};

#[instrument(skip(claims, state, request))]
pub async fn generate_email(
    claims: AuthClaims,
    state: web::Data<AppState>,
    request: web::Json<GenerateEmailRequest>,
) -> Result<impl Responder, AppError> {
    let user_id = claims.user_id()?;
    let response = state.assistant_handler
        .generate_email(&user_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(claims, state, request))]
pub async fn chat(
    claims: AuthClaims,
    state: web::Data<AppState>,
    request: web::Json<ChatRequest>,
) -> Result<impl Responder, AppError> {
    let user_id = claims.user_id()?;
    let response = state.assistant_handler.chat(&user_id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn chat_history(
    claims: AuthClaims,
    state: web::Data<AppState>,
    query: web::Query<ChatHistoryQuery>,
) -> Result<impl Responder, AppError> {
    let user_id = claims.user_id()?;
    let response = state.assistant_handler
        .chat_history(&user_id, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn new_chat_session(
    claims: AuthClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let user_id = claims.user_id()?;
    let response = state.assistant_handler.new_session(&user_id).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// The body is optional; an empty POST asks for the default page.
#[instrument(skip(claims, state, request))]
pub async fn recommendations(
    claims: AuthClaims,
    state: web::Data<AppState>,
    request: Option<web::Json<RecommendationRequest>>,
) -> Result<impl Responder, AppError> {
    let user_id = claims.user_id()?;
    let request = request.map(web::Json::into_inner).unwrap_or_default();

    let response = state.assistant_handler.recommendations(&user_id, request).await?;
    Ok(HttpResponse::Ok().json(response))
}
