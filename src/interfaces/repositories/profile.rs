use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::{
        profile::{CsvLink, CsvPrefill, ProfileUpdate, UserProfile},
        resume::ResumeProfileUpdate,
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxProfileRepo,
};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, user_id: &Uuid) -> Result<Option<UserProfile>, AppError>;

    /// Every profile, for merging into the directory view.
    async fn list_profiles(&self) -> Result<Vec<UserProfile>, AppError>;

    /// Applies the fields present in `update`; absent fields keep their value.
    async fn update_profile(&self, user_id: &Uuid, update: &ProfileUpdate) -> Result<UserProfile, AppError>;

    /// Records an automatic match without touching profile content.
    async fn set_csv_link(&self, user_id: &Uuid, link: &CsvLink) -> Result<UserProfile, AppError>;

    /// Records a confirmed match and copies the row's values onto the profile.
    async fn link_csv_row(&self, user_id: &Uuid, link: &CsvLink, prefill: &CsvPrefill) -> Result<UserProfile, AppError>;

    async fn apply_resume(&self, user_id: &Uuid, update: &ResumeProfileUpdate) -> Result<UserProfile, AppError>;

    async fn set_director(&self, user_id: &Uuid, is_director: bool) -> Result<UserProfile, AppError>;

    /// CSV rows hidden from the directory.
    async fn deleted_csv_rows(&self) -> Result<HashSet<i64>, AppError>;
}

impl SqlxProfileRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxProfileRepo { pool }
    }
}

fn not_found(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::NotFound("Profile not found".into()),
        _ => AppError::from(e),
    }
}

#[async_trait]
impl ProfileRepository for SqlxProfileRepo {
    async fn get_profile(&self, user_id: &Uuid) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>, AppError> {
        let profiles = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        Ok(profiles)
    }

    async fn update_profile(&self, user_id: &Uuid, update: &ProfileUpdate) -> Result<UserProfile, AppError> {
        // COALESCE keeps the stored value where the update has none
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles SET
                full_name = COALESCE($1, full_name),
                major = COALESCE($2, major),
                graduation_year = COALESCE($3, graduation_year),
                companies = COALESCE($4, companies),
                roles = COALESCE($5, roles),
                current_company = COALESCE($6, current_company),
                current_title = COALESCE($7, current_title),
                location = COALESCE($8, location),
                linkedin_url = COALESCE($9, linkedin_url),
                personal_email = COALESCE($10, personal_email),
                professional_email = COALESCE($11, professional_email),
                phone = COALESCE($12, phone),
                bio = COALESCE($13, bio),
                career_interests = COALESCE($14, career_interests),
                target_industries = COALESCE($15, target_industries),
                target_companies = COALESCE($16, target_companies),
                profile_image_url = COALESCE($17, profile_image_url),
                onboarding_completed = COALESCE($18, onboarding_completed),
                email_template = COALESCE($19, email_template),
                updated_at = NOW()
            WHERE user_id = $20
            RETURNING *
            "#,
        )
        .bind(&update.full_name)
        .bind(&update.major)
        .bind(update.graduation_year)
        .bind(&update.companies)
        .bind(&update.roles)
        .bind(&update.current_company)
        .bind(&update.current_title)
        .bind(&update.location)
        .bind(&update.linkedin_url)
        .bind(&update.personal_email)
        .bind(&update.professional_email)
        .bind(&update.phone)
        .bind(&update.bio)
        .bind(&update.career_interests)
        .bind(&update.target_industries)
        .bind(&update.target_companies)
        .bind(&update.profile_image_url)
        .bind(update.onboarding_completed)
        .bind(&update.email_template)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found)?;

        Ok(profile)
    }

    async fn set_csv_link(&self, user_id: &Uuid, link: &CsvLink) -> Result<UserProfile, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles SET
                csv_source_id = $1,
                is_csv_linked = TRUE,
                csv_match_type = $2,
                csv_match_confidence = $3,
                updated_at = NOW()
            WHERE user_id = $4
            RETURNING *
            "#,
        )
        .bind(link.csv_source_id)
        .bind(link.match_type.as_str())
        .bind(link.confidence)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found)?;

        Ok(profile)
    }

    async fn link_csv_row(&self, user_id: &Uuid, link: &CsvLink, prefill: &CsvPrefill) -> Result<UserProfile, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles SET
                csv_source_id = $1,
                is_csv_linked = TRUE,
                csv_match_type = $2,
                csv_match_confidence = $3,
                major = COALESCE($4, major),
                graduation_year = COALESCE($5, graduation_year),
                location = COALESCE($6, location),
                linkedin_url = COALESCE($7, linkedin_url),
                companies = COALESCE($8, companies),
                roles = COALESCE($9, roles),
                profile_image_url = COALESCE($10, profile_image_url),
                updated_at = NOW()
            WHERE user_id = $11
            RETURNING *
            "#,
        )
        .bind(link.csv_source_id)
        .bind(link.match_type.as_str())
        .bind(link.confidence)
        .bind(&prefill.major)
        .bind(prefill.graduation_year)
        .bind(&prefill.location)
        .bind(&prefill.linkedin_url)
        .bind(&prefill.companies)
        .bind(&prefill.roles)
        .bind(&prefill.profile_image_url)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found)?;

        Ok(profile)
    }

    async fn apply_resume(&self, user_id: &Uuid, update: &ResumeProfileUpdate) -> Result<UserProfile, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles SET
                raw_resume_text = $1,
                major = COALESCE($2, major),
                graduation_year = COALESCE($3, graduation_year),
                linkedin_url = COALESCE($4, linkedin_url),
                location = COALESCE($5, location),
                personal_email = COALESCE($6, personal_email),
                phone = COALESCE($7, phone),
                bio = COALESCE($8, bio),
                companies = COALESCE($9, companies),
                roles = COALESCE($10, roles),
                career_interests = COALESCE($11, career_interests),
                updated_at = NOW()
            WHERE user_id = $12
            RETURNING *
            "#,
        )
        .bind(&update.raw_resume_text)
        .bind(&update.major)
        .bind(update.graduation_year)
        .bind(&update.linkedin_url)
        .bind(&update.location)
        .bind(&update.personal_email)
        .bind(&update.phone)
        .bind(&update.bio)
        .bind(&update.companies)
        .bind(&update.roles)
        .bind(&update.career_interests)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found)?;

        Ok(profile)
    }

    async fn set_director(&self, user_id: &Uuid, is_director: bool) -> Result<UserProfile, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles SET is_director = $1, updated_at = NOW()
            WHERE user_id = $2
            RETURNING *
            "#,
        )
        .bind(is_director)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found)?;

        Ok(profile)
    }

    async fn deleted_csv_rows(&self) -> Result<HashSet<i64>, AppError> {
        let rows: Vec<i64> = sqlx::query_scalar("SELECT csv_row_id FROM deleted_alumni")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().collect())
    }
}
