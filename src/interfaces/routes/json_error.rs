use actix_multipart::{form::MultipartFormConfig, MultipartError};
use actix_web::{
    web,
    http::StatusCode,
    ResponseError,
    HttpResponse,
    error::{JsonPayloadError, PayloadError, QueryPayloadError},
};
use serde_json::json;

/// Headroom over the resume limit so slightly oversized files still reach
/// the upload check and get its size message.
const UPLOAD_SLACK_BYTES: usize = 1024 * 1024;

/// Malformed JSON bodies and query strings answer with the same
/// `{"success": false, "error": ...}` shape as every other error.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        JsonError::from(err).into()
    }));
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        JsonError::from(err).into()
    }));
}

/// Multipart limits for resume uploads. The file is buffered in memory, so the
/// memory limit must cover the largest accepted resume.
pub fn resume_upload_config(max_resume_bytes: usize) -> MultipartFormConfig {
    let limit = max_resume_bytes + UPLOAD_SLACK_BYTES;

    MultipartFormConfig::default()
        .total_limit(limit)
        .memory_limit(limit)
        .error_handler(move |err, _req| JsonError::from_multipart(err, max_resume_bytes).into())
}

#[derive(Debug)]
pub struct JsonError {
    message: String,
    status: StatusCode
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status).json(json!({ "success": false, "error": self.message }))
    }
}

impl From<JsonPayloadError> for JsonError {
    fn from(err: JsonPayloadError) -> Self {
        let status = match err {
            JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            JsonPayloadError::ContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        };
        JsonError {
            message: format!("Invalid JSON body: {}", err),
            status,
        }
    }
}

impl JsonError {
    fn from_multipart(err: MultipartError, max_resume_bytes: usize) -> Self {
        match err {
            MultipartError::Payload(PayloadError::Overflow) => JsonError {
                message: format!(
                    "File too large. Maximum size is {}MB",
                    max_resume_bytes / (1024 * 1024)
                ),
                status: StatusCode::PAYLOAD_TOO_LARGE,
            },
            other => JsonError {
                status: other.status_code(),
                message: format!("Invalid upload: {}", other),
            },
        }
    }
}

impl From<QueryPayloadError> for JsonError {
    fn from(err: QueryPayloadError) -> Self {
        JsonError {
            message: format!("Invalid query string: {}", err),
            status: StatusCode::BAD_REQUEST,
        }
    }
}
