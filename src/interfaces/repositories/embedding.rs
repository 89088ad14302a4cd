use async_trait::async_trait;

use crate::{
    entities::recommendation::AlumniEmbedding,
    errors::AppError,
    repositories::sqlx_repo::SqlxEmbeddingRepo,
};

#[async_trait]
pub trait EmbeddingRepository: Send + Sync {
    async fn all_embeddings(&self) -> Result<Vec<AlumniEmbedding>, AppError>;
    async fn upsert_embedding(&self, csv_row_id: i64, embedding: &[f32], content: &str) -> Result<(), AppError>;
}

impl SqlxEmbeddingRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxEmbeddingRepo { pool }
    }
}

#[async_trait]
impl EmbeddingRepository for SqlxEmbeddingRepo {
    async fn all_embeddings(&self) -> Result<Vec<AlumniEmbedding>, AppError> {
        let rows = sqlx::query_as::<_, AlumniEmbedding>(
            "SELECT csv_row_id, embedding FROM alumni_embeddings ORDER BY csv_row_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn upsert_embedding(&self, csv_row_id: i64, embedding: &[f32], content: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO alumni_embeddings (csv_row_id, embedding, content, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (csv_row_id) DO UPDATE SET
                embedding = EXCLUDED.embedding,
                content = EXCLUDED.content,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(csv_row_id)
        .bind(embedding)
        .bind(content)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
