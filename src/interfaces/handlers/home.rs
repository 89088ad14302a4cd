use actix_web::{get, HttpResponse, Responder};

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Alumni Directory API",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "alumni": "/api/alumni",
            "filters": "/api/filters",
            "health": "/api/health",
            "auth": "/auth",
            "admin": "/admin"
        }
    }))
}
