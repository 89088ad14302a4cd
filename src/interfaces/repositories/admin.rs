use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::admin::{AdminAction, NewAdminAction, PlatformSettings},
    errors::AppError,
    repositories::sqlx_repo::SqlxAdminRepo,
};

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn get_settings(&self) -> Result<PlatformSettings, AppError>;
    async fn set_referral_code(&self, code: &str, updated_by: &Uuid) -> Result<PlatformSettings, AppError>;
    async fn record_action(&self, action: &NewAdminAction) -> Result<(), AppError>;

    /// Most recent entries first.
    async fn list_actions(&self, limit: i64) -> Result<Vec<AdminAction>, AppError>;
}

impl SqlxAdminRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxAdminRepo { pool }
    }
}

#[async_trait]
impl AdminRepository for SqlxAdminRepo {
    async fn get_settings(&self) -> Result<PlatformSettings, AppError> {
        sqlx::query_as::<_, PlatformSettings>(
            "SELECT active_referral_code, updated_by, updated_at FROM platform_settings WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::InternalError("Platform settings are not initialised".into()),
            _ => AppError::from(e),
        })
    }

    async fn set_referral_code(&self, code: &str, updated_by: &Uuid) -> Result<PlatformSettings, AppError> {
        let settings = sqlx::query_as::<_, PlatformSettings>(
            r#"
            INSERT INTO platform_settings (id, active_referral_code, updated_by, updated_at)
            VALUES (1, $1, $2, NOW())
            ON CONFLICT (id) DO UPDATE SET
                active_referral_code = EXCLUDED.active_referral_code,
                updated_by = EXCLUDED.updated_by,
                updated_at = EXCLUDED.updated_at
            RETURNING active_referral_code, updated_by, updated_at
            "#,
        )
        .bind(code)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }

    async fn record_action(&self, action: &NewAdminAction) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO admin_actions (director_user_id, action_type, target_user_id, details)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(action.director_user_id)
        .bind(action.action_type.as_str())
        .bind(action.target_user_id)
        .bind(&action.details)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_actions(&self, limit: i64) -> Result<Vec<AdminAction>, AppError> {
        let actions = sqlx::query_as::<_, AdminAction>(
            r#"
            SELECT id, director_user_id, action_type, target_user_id, details, timestamp
            FROM admin_actions
            ORDER BY timestamp DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(actions)
    }
}
