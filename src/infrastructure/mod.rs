pub mod auth;
pub mod cache;
pub mod csv_source;
pub mod db;
pub mod limiter;
pub mod llm;
pub mod pdf;
pub mod utils;
