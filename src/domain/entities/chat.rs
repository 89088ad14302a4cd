use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::alumni::CsvAlumni;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn is_user(&self) -> bool {
        self.role == ChatRole::User.as_str()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000, message = "Message is required"))]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

/// An alumni card attached to a chat answer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MemberCard {
    pub id: String,
    pub csv_row_id: i64,
    pub name: String,
    pub role_title: String,
    pub roles_list: Vec<String>,
    pub headline: String,
    pub company: String,
    pub companies_list: Vec<String>,
    pub company_industry: String,
    pub major: String,
    pub grad_year: String,
    pub location: String,
    pub profile_image_url: String,
    pub linkedin: String,
    pub email: String,
    pub similarity: f64,
}

impl MemberCard {
    pub fn from_row(row: &CsvAlumni, similarity: f64) -> Self {
        MemberCard {
            id: format!("csv_{}", row.row_id),
            csv_row_id: row.row_id,
            name: row.name.clone(),
            role_title: row.role_title.clone(),
            roles_list: row.roles_list.clone(),
            headline: row.headline.clone(),
            company: row.company.clone(),
            companies_list: row.companies_list.clone(),
            company_industry: row.company_industry.clone(),
            major: row.major.clone(),
            grad_year: row.grad_year.clone(),
            location: row.location.clone(),
            profile_image_url: row.profile_image_url.clone(),
            linkedin: row.linkedin.clone(),
            email: row.email.clone(),
            similarity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub session_id: Uuid,
    pub member_cards: Option<Vec<MemberCard>>,
}

#[derive(Debug, Deserialize)]
pub struct ChatHistoryQuery {
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub success: bool,
    pub session_id: Option<Uuid>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub success: bool,
    pub session_id: Uuid,
}
