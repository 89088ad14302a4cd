use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{entities::alumni::AlumniQuery, errors::AppError, AppState};

/// `GET /api/alumni`. Parsed by hand because multi-select filters repeat keys.
#[instrument(skip(state, req), fields(query = %req.query_string()))]
pub async fn list_alumni(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let query = AlumniQuery::from_query_string(req.query_string())?;
    let response = state.directory_handler.list_alumni(&query).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn filter_options(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.directory_handler.filter_options())
}
