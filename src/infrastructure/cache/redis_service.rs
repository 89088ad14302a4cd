use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;

use crate::errors::AuthError;

pub const ACCESS_DENY_PREFIX: &str = "access_deny";
pub const REFRESH_DENY_PREFIX: &str = "refresh_deny";

/// Token deny-list backed by Redis. Entries expire with the token they block.
#[derive(Clone)]
pub struct RedisService {
    pool: Pool,
}

impl RedisService {
    pub fn new(redis_url: &str) -> Result<Self, AuthError> {
        let pool = Config::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| AuthError::RedisOperation(e.to_string()))?;
        Ok(RedisService { pool })
    }

    fn key(prefix: &str, id: &str) -> String {
        format!("{}:{}", prefix, id)
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, AuthError> {
        self.pool
            .get()
            .await
            .map_err(|e| AuthError::RedisOperation(e.to_string()))
    }

    pub async fn revoke(&self, prefix: &str, id: &str, ttl_seconds: u64) -> Result<(), AuthError> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(Self::key(prefix, id), 1, ttl_seconds.max(1))
            .await
            .map_err(|e| AuthError::RedisOperation(e.to_string()))
    }

    pub async fn is_revoked(&self, prefix: &str, id: &str) -> Result<bool, AuthError> {
        let mut conn = self.connection().await?;
        conn.exists::<_, bool>(Self::key(prefix, id))
            .await
            .map_err(|e| AuthError::RedisOperation(e.to_string()))
    }

    pub async fn ping(&self) -> bool {
        let Ok(mut conn) = self.connection().await else {
            return false;
        };
        matches!(
            redis::cmd("PING").query_async::<String>(&mut conn).await,
            Ok(pong) if pong == "PONG"
        )
    }
}
