use serde::{Deserialize, Serialize};

use crate::entities::chat::MemberCard;

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub exclude_ids: Vec<i64>,
    #[serde(default)]
    pub count: Option<usize>,
}

impl RecommendationRequest {
    pub const DEFAULT_COUNT: usize = 10;
    pub const MAX_COUNT: usize = 20;

    pub fn count(&self) -> usize {
        self.count
            .unwrap_or(Self::DEFAULT_COUNT)
            .clamp(1, Self::MAX_COUNT)
    }
}

/// Stored embedding for one CSV row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AlumniEmbedding {
    pub csv_row_id: i64,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub count: usize,
    pub recommendations: Vec<MemberCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
