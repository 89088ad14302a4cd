use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlatformSettings {
    pub active_referral_code: String,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminActionType {
    SetReferralCode,
    RemoveMember,
    PromoteDirector,
    DemoteDirector,
    ReloadAlumni,
    RebuildEmbeddings,
}

impl AdminActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminActionType::SetReferralCode => "SET_REFERRAL_CODE",
            AdminActionType::RemoveMember => "REMOVE_MEMBER",
            AdminActionType::PromoteDirector => "PROMOTE_DIRECTOR",
            AdminActionType::DemoteDirector => "DEMOTE_DIRECTOR",
            AdminActionType::ReloadAlumni => "RELOAD_ALUMNI",
            AdminActionType::RebuildEmbeddings => "REBUILD_EMBEDDINGS",
        }
    }
}

/// Audit log entry to be written.
#[derive(Debug, Clone)]
pub struct NewAdminAction {
    pub director_user_id: Uuid,
    pub action_type: AdminActionType,
    pub target_user_id: Option<Uuid>,
    pub details: JsonValue,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdminAction {
    pub id: Uuid,
    pub director_user_id: Option<Uuid>,
    pub action_type: String,
    pub target_user_id: Option<Uuid>,
    pub details: JsonValue,
    pub timestamp: DateTime<Utc>,
}

/// Row of the director's member list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MemberSummary {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub major: Option<String>,
    pub graduation_year: Option<i32>,
    pub is_director: bool,
    pub onboarding_completed: bool,
    pub is_csv_linked: bool,
    pub csv_source_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReferralCodeRequest {
    #[validate(length(min = 1, max = 100, message = "Referral code cannot be empty"))]
    pub referral_code: String,
}

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    pub limit: Option<i64>,
}

impl AuditLogQuery {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 1000;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

#[derive(Debug, Serialize)]
pub struct ReloadSummary {
    pub success: bool,
    pub rows: usize,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingRebuildSummary {
    pub success: bool,
    pub embedded: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub success: bool,
    pub settings: PlatformSettings,
}

#[derive(Debug, Serialize)]
pub struct MembersResponse {
    pub success: bool,
    pub count: usize,
    pub members: Vec<MemberSummary>,
}

#[derive(Debug, Serialize)]
pub struct AuditLogResponse {
    pub success: bool,
    pub count: usize,
    pub actions: Vec<AdminAction>,
}

/// Outcome of a director action on a member or setting.
#[derive(Debug, Serialize)]
pub struct AdminActionResponse {
    pub success: bool,
    pub message: String,
}

impl AdminActionResponse {
    pub fn new(message: impl Into<String>) -> Self {
        AdminActionResponse {
            success: true,
            message: message.into(),
        }
    }
}
