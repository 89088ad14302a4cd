use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::csv_source::AlumniCsvStore;
use crate::directory::{candidate_matches, find_csv_match, CsvMatch};
use crate::entities::alumni::CsvAlumni;
use crate::entities::profile::{
    CsvLink, CsvPrefill, LinkProfileRequest, LinkProfileResponse, LinkedCsvSummary,
    MatchProfileRequest, MatchProfileResponse, MatchType, ProfileResponse, ProfileUpdate,
    UserProfile,
};
use crate::errors::AppError;
use crate::repositories::{profile::ProfileRepository, user::UserRepository};

pub struct ProfileHandler<U, P>
where
    U: UserRepository,
    P: ProfileRepository,
{
    pub user_repo: U,
    pub profile_repo: P,
    pub csv: Arc<AlumniCsvStore>,
}

impl<U, P> ProfileHandler<U, P>
where
    U: UserRepository,
    P: ProfileRepository,
{
    pub fn new(user_repo: U, profile_repo: P, csv: Arc<AlumniCsvStore>) -> Self {
        ProfileHandler { user_repo, profile_repo, csv }
    }

    pub async fn get_profile(&self, user_id: &Uuid) -> Result<ProfileResponse, AppError> {
        let profile = self.profile_repo
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;

        Ok(ProfileResponse {
            success: true,
            message: None,
            profile,
        })
    }

    /// Applies allow-listed fields. Completing onboarding also tries to link
    /// the profile to its CSV row; that step never fails the update.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, user_id: &Uuid, update: ProfileUpdate) -> Result<ProfileResponse, AppError> {
        if update.is_empty() {
            return Err(AppError::BadRequest("No valid fields to update".into()));
        }
        update.validate()?;

        let mut profile = self.profile_repo.update_profile(user_id, &update).await?;

        if update.completes_onboarding() && !profile.is_csv_linked {
            if let Some(linked) = self.auto_link(&profile).await {
                profile = linked;
            }
        }

        Ok(ProfileResponse {
            success: true,
            message: Some("Profile updated successfully".into()),
            profile,
        })
    }

    async fn auto_link(&self, profile: &UserProfile) -> Option<UserProfile> {
        let rows = match self.visible_rows().await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Skipping CSV match for {}: {}", profile.user_id, e);
                return None;
            }
        };

        match find_csv_match(&profile.full_name, profile.personal_email.as_deref(), &rows) {
            CsvMatch::Linked(link) => {
                match self.profile_repo.set_csv_link(&profile.user_id, &link).await {
                    Ok(linked) => {
                        tracing::info!(
                            user_id = %profile.user_id,
                            csv_row = link.csv_source_id,
                            match_type = link.match_type.as_str(),
                            "Linked profile to CSV row"
                        );
                        Some(linked)
                    }
                    Err(e) => {
                        tracing::warn!("Failed to store CSV link for {}: {}", profile.user_id, e);
                        None
                    }
                }
            }
            CsvMatch::Ambiguous(names) => {
                tracing::info!(user_id = %profile.user_id, candidates = ?names, "Ambiguous CSV match; left unlinked");
                None
            }
            CsvMatch::NoMatch => None,
        }
    }

    /// CSV rows that may belong to the member, for confirmation during onboarding.
    pub async fn match_profile(&self, request: MatchProfileRequest) -> Result<MatchProfileResponse, AppError> {
        request.validate()?;

        let rows = self.visible_rows().await?;
        let matches = candidate_matches(&request.full_name, request.email.as_deref(), &rows);
        Ok(MatchProfileResponse {
            success: true,
            count: matches.len(),
            matches,
        })
    }

    /// Links the member to the CSV row they picked and copies its values.
    #[instrument(skip(self, request))]
    pub async fn link_profile(&self, user_id: &Uuid, request: LinkProfileRequest) -> Result<LinkProfileResponse, AppError> {
        let csv_index = request
            .csv_index
            .ok_or_else(|| AppError::BadRequest("csv_index is required".into()))?;
        let row = self.csv.require(csv_index)?;

        // A removed row is skipped by the merge, so linking it would hide the member.
        if self.profile_repo.deleted_csv_rows().await?.contains(&row.row_id) {
            return Err(AppError::NotFound(format!("CSV row {} has been removed", csv_index)));
        }

        let link = CsvLink {
            csv_source_id: row.row_id,
            match_type: MatchType::UserConfirmed,
            confidence: 1.0,
        };
        let prefill = CsvPrefill::from(&row);
        let profile = self.profile_repo.link_csv_row(user_id, &link, &prefill).await?;

        Ok(LinkProfileResponse {
            success: true,
            message: "Profile linked successfully".into(),
            profile,
            csv_data: LinkedCsvSummary {
                name: row.name,
                major: prefill.major,
                graduation_year: prefill.graduation_year,
                companies: prefill.companies.unwrap_or_default(),
                roles: prefill.roles.unwrap_or_default(),
            },
        })
    }

    /// CSV rows not hidden by an account deletion.
    async fn visible_rows(&self) -> Result<Vec<CsvAlumni>, AppError> {
        let deleted = self.profile_repo.deleted_csv_rows().await?;
        Ok(self.csv
            .snapshot()
            .iter()
            .filter(|row| !deleted.contains(&row.row_id))
            .cloned()
            .collect())
    }

    /// Deletes the caller's account. A linked CSV row is hidden from the directory.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, user_id: &Uuid) -> Result<(), AppError> {
        let hidden_row = self.user_repo.delete_account(user_id).await?;
        tracing::info!(hidden_row = ?hidden_row, "Account deleted");
        Ok(())
    }
}
