pub mod admin;
pub mod chat;
pub mod embedding;
pub mod profile;
pub mod sqlx_repo;
pub mod token;
pub mod user;
