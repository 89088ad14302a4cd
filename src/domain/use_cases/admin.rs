use std::sync::Arc;

use serde_json::json;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::csv_source::AlumniCsvStore;
use crate::entities::admin::{
    AdminActionResponse, AdminActionType, AuditLogQuery, AuditLogResponse,
    EmbeddingRebuildSummary, MembersResponse, NewAdminAction, ReferralCodeRequest,
    ReloadSummary, SettingsResponse,
};
use crate::entities::profile::UserProfile;
use crate::errors::AppError;
use crate::llm::{EmbeddingTask, LlmClient};
use crate::repositories::{
    admin::AdminRepository, embedding::EmbeddingRepository, profile::ProfileRepository,
    user::UserRepository,
};

/// Director console operations. Every mutation is written to the audit log;
/// a failed audit write is logged and does not undo the action.
pub struct AdminHandler<U, P, A, E, L>
where
    U: UserRepository,
    P: ProfileRepository,
    A: AdminRepository,
    E: EmbeddingRepository,
    L: LlmClient,
{
    pub user_repo: U,
    pub profile_repo: P,
    pub admin_repo: A,
    pub embedding_repo: E,
    pub llm: L,
    pub csv: Arc<AlumniCsvStore>,
}

impl<U, P, A, E, L> AdminHandler<U, P, A, E, L>
where
    U: UserRepository,
    P: ProfileRepository,
    A: AdminRepository,
    E: EmbeddingRepository,
    L: LlmClient,
{
    pub fn new(
        user_repo: U,
        profile_repo: P,
        admin_repo: A,
        embedding_repo: E,
        llm: L,
        csv: Arc<AlumniCsvStore>,
    ) -> Self {
        AdminHandler {
            user_repo,
            profile_repo,
            admin_repo,
            embedding_repo,
            llm,
            csv,
        }
    }

    async fn audit(
        &self,
        director: &Uuid,
        action_type: AdminActionType,
        target_user_id: Option<Uuid>,
        details: serde_json::Value,
    ) {
        let action = NewAdminAction {
            director_user_id: *director,
            action_type,
            target_user_id,
            details,
        };
        if let Err(e) = self.admin_repo.record_action(&action).await {
            tracing::warn!(action = action_type.as_str(), "Failed to write audit log: {}", e);
        }
    }

    async fn require_member(&self, user_id: &Uuid) -> Result<UserProfile, AppError> {
        self.profile_repo
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".into()))
    }

    pub async fn settings(&self) -> Result<SettingsResponse, AppError> {
        Ok(SettingsResponse {
            success: true,
            settings: self.admin_repo.get_settings().await?,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn set_referral_code(&self, director: &Uuid, request: ReferralCodeRequest) -> Result<AdminActionResponse, AppError> {
        request.validate()?;
        let code = request.referral_code.trim();
        if code.is_empty() {
            return Err(AppError::BadRequest("Referral code cannot be empty".into()));
        }

        let settings = self.admin_repo.set_referral_code(code, director).await?;
        self.audit(director, AdminActionType::SetReferralCode, None, json!({ "new_code": code }))
            .await;

        Ok(AdminActionResponse::new(format!(
            "Referral code updated to: {}",
            settings.active_referral_code
        )))
    }

    pub async fn members(&self) -> Result<MembersResponse, AppError> {
        let members = self.user_repo.list_members().await?;
        Ok(MembersResponse {
            success: true,
            count: members.len(),
            members,
        })
    }

    /// Deletes a member the same way self-service account deletion does.
    #[instrument(skip(self))]
    pub async fn remove_member(&self, director: &Uuid, user_id: &Uuid) -> Result<AdminActionResponse, AppError> {
        if director == user_id {
            return Err(AppError::BadRequest(
                "Cannot remove yourself. Use account deletion instead.".into(),
            ));
        }

        let member = self.require_member(user_id).await?;
        let hidden_row = self.user_repo.delete_account(user_id).await?;

        self.audit(
            director,
            AdminActionType::RemoveMember,
            Some(*user_id),
            json!({
                "name": member.full_name,
                "email": member.personal_email,
                "hidden_csv_row": hidden_row,
            }),
        )
        .await;

        Ok(AdminActionResponse::new(format!(
            "Member {} completely removed",
            member.full_name
        )))
    }

    #[instrument(skip(self))]
    pub async fn promote_director(&self, director: &Uuid, user_id: &Uuid) -> Result<AdminActionResponse, AppError> {
        let member = self.require_member(user_id).await?;
        if member.is_director {
            return Err(AppError::BadRequest("User is already a Director".into()));
        }

        self.profile_repo.set_director(user_id, true).await?;
        self.audit(
            director,
            AdminActionType::PromoteDirector,
            Some(*user_id),
            json!({ "name": member.full_name, "email": member.personal_email }),
        )
        .await;

        Ok(AdminActionResponse::new(format!(
            "{} promoted to Director of Operations",
            member.full_name
        )))
    }

    #[instrument(skip(self))]
    pub async fn demote_director(&self, director: &Uuid, user_id: &Uuid) -> Result<AdminActionResponse, AppError> {
        if director == user_id {
            return Err(AppError::BadRequest(
                "Cannot demote yourself. Have another Director demote you.".into(),
            ));
        }

        let member = self.require_member(user_id).await?;
        if !member.is_director {
            return Err(AppError::BadRequest("User is not a Director".into()));
        }

        self.profile_repo.set_director(user_id, false).await?;
        self.audit(
            director,
            AdminActionType::DemoteDirector,
            Some(*user_id),
            json!({ "name": member.full_name, "email": member.personal_email }),
        )
        .await;

        Ok(AdminActionResponse::new(format!(
            "{} demoted from Director of Operations",
            member.full_name
        )))
    }

    pub async fn audit_log(&self, query: &AuditLogQuery) -> Result<AuditLogResponse, AppError> {
        let actions = self.admin_repo.list_actions(query.limit()).await?;
        Ok(AuditLogResponse {
            success: true,
            count: actions.len(),
            actions,
        })
    }

    /// Re-reads the alumni export without a restart.
    #[instrument(skip(self))]
    pub async fn reload_alumni(&self, director: &Uuid) -> Result<ReloadSummary, AppError> {
        let (rows, origin) = self.csv.reload().await;
        let source = origin.to_string();

        self.audit(
            director,
            AdminActionType::ReloadAlumni,
            None,
            json!({ "rows": rows, "source": source }),
        )
        .await;

        Ok(ReloadSummary {
            success: true,
            rows,
            source,
        })
    }

    /// Embeds every visible CSV row and stores the vectors used by chat
    /// fallback search and recommendations. Rows that fail are counted
    /// and skipped.
    #[instrument(skip(self))]
    pub async fn rebuild_embeddings(&self, director: &Uuid) -> Result<EmbeddingRebuildSummary, AppError> {
        let deleted = self.profile_repo.deleted_csv_rows().await?;
        let rows = self.csv.snapshot();

        let mut embedded = 0;
        let mut failed = 0;
        for row in rows.iter().filter(|r| !deleted.contains(&r.row_id)) {
            let content = row.embedding_text();
            let result = match self.llm.embed(&content, EmbeddingTask::Document).await {
                Ok(vector) => self
                    .embedding_repo
                    .upsert_embedding(row.row_id, &vector, &content)
                    .await,
                Err(e) => Err(e.into()),
            };

            match result {
                Ok(()) => embedded += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!(csv_row = row.row_id, "Embedding failed: {}", e);
                }
            }
        }

        tracing::info!(embedded, failed, "Alumni embeddings rebuilt");
        self.audit(
            director,
            AdminActionType::RebuildEmbeddings,
            None,
            json!({ "embedded": embedded, "failed": failed }),
        )
        .await;

        Ok(EmbeddingRebuildSummary {
            success: true,
            embedded,
            failed,
        })
    }
}
