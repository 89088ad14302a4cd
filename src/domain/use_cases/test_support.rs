//! Repository and client mocks shared by the use-case tests.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::TokenData;
use mockall::mock;
use uuid::Uuid;

use crate::entities::{
    admin::{AdminAction, MemberSummary, NewAdminAction, PlatformSettings},
    alumni::CsvAlumni,
    chat::ChatMessage,
    profile::{CsvLink, CsvPrefill, ProfileInsert, ProfileUpdate, UserProfile},
    recommendation::AlumniEmbedding,
    resume::ResumeProfileUpdate,
    token::{Claims, RefreshClaims},
    user::{AuthUser, UserInsert},
};
use crate::errors::{AppError, AuthError};
use crate::llm::{EmbeddingTask, LlmClient, LlmError};
use crate::repositories::{
    admin::AdminRepository, chat::ChatRepository, embedding::EmbeddingRepository,
    profile::ProfileRepository, token::TokenServiceRepository, user::UserRepository,
};
use crate::settings::AppConfig;

mock! {
    pub UserRepo {}

    #[async_trait]
    impl UserRepository for UserRepo {
        async fn check_connection(&self) -> Result<(), AppError>;
        async fn get_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AppError>;
        async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<AuthUser>, AppError>;
        async fn create_user_with_profile(&self, user: &UserInsert, profile: &ProfileInsert) -> Result<Uuid, AppError>;
        async fn update_password(&self, id: &Uuid, password_hash: &str) -> Result<(), AppError>;
        async fn delete_account(&self, id: &Uuid) -> Result<Option<i64>, AppError>;
        async fn list_members(&self) -> Result<Vec<MemberSummary>, AppError>;
    }
}

mock! {
    pub ProfileRepo {}

    #[async_trait]
    impl ProfileRepository for ProfileRepo {
        async fn get_profile(&self, user_id: &Uuid) -> Result<Option<UserProfile>, AppError>;
        async fn list_profiles(&self) -> Result<Vec<UserProfile>, AppError>;
        async fn update_profile(&self, user_id: &Uuid, update: &ProfileUpdate) -> Result<UserProfile, AppError>;
        async fn set_csv_link(&self, user_id: &Uuid, link: &CsvLink) -> Result<UserProfile, AppError>;
        async fn link_csv_row(&self, user_id: &Uuid, link: &CsvLink, prefill: &CsvPrefill) -> Result<UserProfile, AppError>;
        async fn apply_resume(&self, user_id: &Uuid, update: &ResumeProfileUpdate) -> Result<UserProfile, AppError>;
        async fn set_director(&self, user_id: &Uuid, is_director: bool) -> Result<UserProfile, AppError>;
        async fn deleted_csv_rows(&self) -> Result<HashSet<i64>, AppError>;
    }
}

mock! {
    pub AdminRepo {}

    #[async_trait]
    impl AdminRepository for AdminRepo {
        async fn get_settings(&self) -> Result<PlatformSettings, AppError>;
        async fn set_referral_code(&self, code: &str, updated_by: &Uuid) -> Result<PlatformSettings, AppError>;
        async fn record_action(&self, action: &NewAdminAction) -> Result<(), AppError>;
        async fn list_actions(&self, limit: i64) -> Result<Vec<AdminAction>, AppError>;
    }
}

mock! {
    pub ChatRepo {}

    #[async_trait]
    impl ChatRepository for ChatRepo {
        async fn session_belongs_to(&self, session_id: &Uuid, user_id: &Uuid) -> Result<bool, AppError>;
        async fn create_session(&self, user_id: &Uuid) -> Result<Uuid, AppError>;
        async fn latest_session(&self, user_id: &Uuid) -> Result<Option<Uuid>, AppError>;
        async fn recent_messages(&self, session_id: &Uuid, limit: i64) -> Result<Vec<ChatMessage>, AppError>;
        async fn append_exchange(&self, session_id: &Uuid, question: &str, answer: &str) -> Result<(), AppError>;
    }
}

mock! {
    pub EmbeddingRepo {}

    #[async_trait]
    impl EmbeddingRepository for EmbeddingRepo {
        async fn all_embeddings(&self) -> Result<Vec<AlumniEmbedding>, AppError>;
        async fn upsert_embedding(&self, csv_row_id: i64, embedding: &[f32], content: &str) -> Result<(), AppError>;
    }
}

mock! {
    pub TokenService {}

    #[async_trait]
    impl TokenServiceRepository for TokenService {
        fn create_jwt(&self, user: &AuthUser) -> Result<String, AuthError>;
        fn create_refresh_jwt(&self, user_id: &Uuid) -> Result<String, AuthError>;
        fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError>;
        fn decode_refresh_jwt(&self, token: &str) -> Result<TokenData<RefreshClaims>, AuthError>;
        async fn revoke_access_token(&self, claims: &Claims) -> Result<(), AuthError>;
        async fn revoke_refresh_token(&self, claims: &RefreshClaims) -> Result<(), AuthError>;
        async fn is_access_revoked(&self, jti: &str) -> Result<bool, AuthError>;
        async fn is_refresh_revoked(&self, jti: &str) -> Result<bool, AuthError>;
    }
}

mock! {
    pub Llm {}

    #[async_trait]
    impl LlmClient for Llm {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
        async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>, LlmError>;
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/alumni_test".into(),
        jwt_secret: "j".repeat(48),
        refresh_token_secret: "r".repeat(48),
        ops_code: "OPS-TEST".into(),
        super_ops_code: "SUPER-OPS-TEST".into(),
        organization_name: "Purdue THINK".into(),
        ..AppConfig::default()
    }
}

pub fn profile(user_id: Uuid, full_name: &str) -> UserProfile {
    UserProfile {
        user_id,
        full_name: full_name.into(),
        personal_email: Some(format!("{}@example.com", full_name.to_lowercase().replace(' ', "."))),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        ..UserProfile::default()
    }
}

pub fn settings(code: &str) -> PlatformSettings {
    PlatformSettings {
        active_referral_code: code.into(),
        updated_by: None,
        updated_at: Utc::now(),
    }
}

pub fn csv_row(row_id: i64, name: &str, role_title: &str, company: &str, grad_year: &str) -> CsvAlumni {
    CsvAlumni {
        row_id,
        name: name.into(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        role_title: role_title.into(),
        company: company.into(),
        grad_year: grad_year.into(),
        companies_list: vec![company.into()],
        roles_list: vec![role_title.into()],
        ..CsvAlumni::default()
    }
}
