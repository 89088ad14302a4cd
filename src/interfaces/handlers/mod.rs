pub mod admin;
pub mod alumni;
pub mod assistant;
pub mod auth;
pub mod home;
pub mod json_error;
pub mod profile;
pub mod resume;
pub mod system;
