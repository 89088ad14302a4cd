use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::chat::{ChatMessage, ChatRole},
    errors::AppError,
    repositories::sqlx_repo::SqlxChatRepo,
};

#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn session_belongs_to(&self, session_id: &Uuid, user_id: &Uuid) -> Result<bool, AppError>;
    async fn create_session(&self, user_id: &Uuid) -> Result<Uuid, AppError>;

    /// The member's most recently active session.
    async fn latest_session(&self, user_id: &Uuid) -> Result<Option<Uuid>, AppError>;

    /// The last `limit` messages of a session, oldest first.
    async fn recent_messages(&self, session_id: &Uuid, limit: i64) -> Result<Vec<ChatMessage>, AppError>;

    /// Stores a question and its answer and marks the session active.
    async fn append_exchange(&self, session_id: &Uuid, question: &str, answer: &str) -> Result<(), AppError>;
}

impl SqlxChatRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxChatRepo { pool }
    }
}

#[async_trait]
impl ChatRepository for SqlxChatRepo {
    async fn session_belongs_to(&self, session_id: &Uuid, user_id: &Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM chat_sessions WHERE id = $1 AND user_id = $2)",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create_session(&self, user_id: &Uuid) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar("INSERT INTO chat_sessions (user_id) VALUES ($1) RETURNING id")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }

    async fn latest_session(&self, user_id: &Uuid) -> Result<Option<Uuid>, AppError> {
        let id: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM chat_sessions WHERE user_id = $1 ORDER BY updated_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    async fn recent_messages(&self, session_id: &Uuid, limit: i64) -> Result<Vec<ChatMessage>, AppError> {
        let mut messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT role, content, created_at
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        messages.reverse();
        Ok(messages)
    }

    async fn append_exchange(&self, session_id: &Uuid, question: &str, answer: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for (role, content) in [(ChatRole::User, question), (ChatRole::Assistant, answer)] {
            sqlx::query("INSERT INTO chat_messages (session_id, role, content) VALUES ($1, $2, $3)")
                .bind(session_id)
                .bind(role.as_str())
                .bind(content)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE chat_sessions SET updated_at = NOW() WHERE id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
