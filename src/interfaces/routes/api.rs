use actix_web::web;

use crate::handlers::{alumni, assistant, profile, resume, system::health_check};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health_check)
            .service(
                web::resource("/alumni")
                    .route(web::get().to(alumni::list_alumni))
            )
            .service(
                web::resource("/filters")
                    .route(web::get().to(alumni::filter_options))
            )
            .service(
                web::resource("/profile")
                    .route(web::get().to(profile::get_profile))
                    .route(web::put().to(profile::update_profile))
            )
            .service(
                web::resource("/match-profile")
                    .route(web::post().to(profile::match_profile))
            )
            .service(
                web::resource("/link-profile")
                    .route(web::post().to(profile::link_profile))
            )
            .service(
                web::resource("/account")
                    .route(web::delete().to(profile::delete_account))
            )
            .service(
                web::resource("/resume/upload")
                    .route(web::post().to(resume::upload_resume))
            )
            .service(
                web::resource("/generate-email")
                    .route(web::post().to(assistant::generate_email))
            )
            .service(
                web::resource("/chat")
                    .route(web::post().to(assistant::chat))
            )
            .service(
                web::resource("/chat/history")
                    .route(web::get().to(assistant::chat_history))
            )
            .service(
                web::resource("/chat/new")
                    .route(web::post().to(assistant::new_chat_session))
            )
            .service(
                web::resource("/recommendations")
                    .route(web::post().to(assistant::recommendations))
            )
    );
}
