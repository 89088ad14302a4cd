use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::resume::ResumeUploadForm,
    errors::AppError,
    use_cases::extractors::AuthClaims,
    AppState,
};

#[instrument(skip(claims, state, form))]
pub async fn upload_resume(
    claims: AuthClaims,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<ResumeUploadForm>,
) -> Result<impl Responder, AppError> {
    let user_id = claims.user_id()?;
    let file_name = form.resume.file_name.clone();

    let response = state.resume_handler
        .upload_resume(&user_id, file_name.as_deref(), form.resume.data.to_vec())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}
