use actix_web::web;

use crate::handlers::{admin, system::admin_health_check};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(admin_health_check)
            .service(
                web::resource("/settings")
                    .route(web::get().to(admin::get_settings))
            )
            .service(
                web::resource("/settings/referral-code")
                    .route(web::put().to(admin::set_referral_code))
            )
            .service(
                web::resource("/members")
                    .route(web::get().to(admin::list_members))
            )
            .service(
                web::resource("/members/{user_id}")
                    .route(web::delete().to(admin::remove_member))
            )
            .service(
                web::resource("/promote-director/{user_id}")
                    .route(web::post().to(admin::promote_director))
            )
            .service(
                web::resource("/demote-director/{user_id}")
                    .route(web::post().to(admin::demote_director))
            )
            .service(
                web::resource("/audit-log")
                    .route(web::get().to(admin::audit_log))
            )
            .service(
                web::resource("/alumni/reload")
                    .route(web::post().to(admin::reload_alumni))
            )
            .service(
                web::resource("/embeddings/rebuild")
                    .route(web::post().to(admin::rebuild_embeddings))
            )
    );
}
