pub mod redis_service;

pub use redis_service::{RedisService, ACCESS_DENY_PREFIX, REFRESH_DENY_PREFIX};
