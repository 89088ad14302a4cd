use actix_web::web;

use crate::handlers::home::home;

mod admin;
mod api;
mod auth;
mod json_error;

pub use json_error::resume_upload_config;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);

    cfg.configure(auth::config_routes)
        .configure(api::config_routes)
        .configure(admin::config_routes);

    cfg.configure(json_error::config_routes);
}
