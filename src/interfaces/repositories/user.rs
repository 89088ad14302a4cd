use async_trait::async_trait;
use uuid::Uuid;
use std::borrow::Cow;

use crate::{
    entities::{
        admin::MemberSummary,
        profile::ProfileInsert,
        user::{AuthUser, UserInsert},
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxUserRepo,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AppError>;
    async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<AuthUser>, AppError>;

    /// Inserts the account and its profile in one transaction.
    async fn create_user_with_profile(&self, user: &UserInsert, profile: &ProfileInsert) -> Result<Uuid, AppError>;

    async fn update_password(&self, id: &Uuid, password_hash: &str) -> Result<(), AppError>;

    /// Removes the account with its profile, chat history and audit rows.
    /// A linked CSV row is hidden from the directory; its id is returned.
    async fn delete_account(&self, id: &Uuid) -> Result<Option<i64>, AppError>;

    async fn list_members(&self) -> Result<Vec<MemberSummary>, AppError>;
}

impl SqlxUserRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxUserRepo { pool }
    }
}

const AUTH_USER_SELECT: &str = r#"
    SELECT u.id, u.email, u.password_hash, COALESCE(p.is_director, FALSE) AS is_director
    FROM users u
    LEFT JOIN user_profiles p ON p.user_id = u.id
"#;

#[async_trait]
impl UserRepository for SqlxUserRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AppError> {
        let user = sqlx::query_as::<_, AuthUser>(&format!("{} WHERE u.email = $1", AUTH_USER_SELECT))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<AuthUser>, AppError> {
        let user = sqlx::query_as::<_, AuthUser>(&format!("{} WHERE u.id = $1", AUTH_USER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create_user_with_profile(&self, user: &UserInsert, profile: &ProfileInsert) -> Result<Uuid, AppError> {
        let mut tx = self.pool.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.code() == Some(Cow::Borrowed("23505")) => {
                AppError::Conflict("An account with this email already exists".to_string())
            }
            _ => AppError::from(e),
        })?;

        sqlx::query(
            r#"
            INSERT INTO user_profiles (
                user_id, full_name, major, graduation_year, location, linkedin_url,
                personal_email, phone, is_director, signup_referral_code
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(&profile.full_name)
        .bind(&profile.major)
        .bind(profile.graduation_year)
        .bind(&profile.location)
        .bind(&profile.linkedin_url)
        .bind(&profile.personal_email)
        .bind(&profile.phone)
        .bind(profile.is_director)
        .bind(&profile.signup_referral_code)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn update_password(&self, id: &Uuid, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn delete_account(&self, id: &Uuid) -> Result<Option<i64>, AppError> {
        let mut tx = self.pool.begin().await?;

        let linked_row = sqlx::query_scalar::<_, Option<i64>>(
            "SELECT csv_source_id FROM user_profiles WHERE user_id = $1 AND is_csv_linked",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .flatten();

        sqlx::query("DELETE FROM chat_sessions WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM admin_actions WHERE target_user_id = $1 OR director_user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM user_profiles WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }

        if let Some(row_id) = linked_row {
            sqlx::query("INSERT INTO deleted_alumni (csv_row_id) VALUES ($1) ON CONFLICT DO NOTHING")
                .bind(row_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(linked_row)
    }

    async fn list_members(&self) -> Result<Vec<MemberSummary>, AppError> {
        let members = sqlx::query_as::<_, MemberSummary>(
            r#"
            SELECT
                u.id AS user_id,
                u.email,
                COALESCE(p.full_name, '') AS full_name,
                p.major,
                p.graduation_year,
                COALESCE(p.is_director, FALSE) AS is_director,
                COALESCE(p.onboarding_completed, FALSE) AS onboarding_completed,
                COALESCE(p.is_csv_linked, FALSE) AS is_csv_linked,
                p.csv_source_id,
                u.created_at
            FROM users u
            LEFT JOIN user_profiles p ON p.user_id = u.id
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}
