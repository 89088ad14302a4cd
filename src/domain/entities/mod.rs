pub mod admin;
pub mod alumni;
pub mod chat;
pub mod email;
pub mod profile;
pub mod recommendation;
pub mod resume;
pub mod token;
pub mod user;
