use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{directory, entities, use_cases};
pub use interfaces::{handlers, middlewares, repositories, routes};
pub use infrastructure::{auth, cache, csv_source, db, limiter, llm, pdf, utils};

use auth::jwt::JwtService;
use cache::RedisService;
use csv_source::AlumniCsvStore;
use limiter::UsageQuotaStore;
use llm::{GeminiClient, LlmError};
use repositories::sqlx_repo::{
    SqlxAdminRepo, SqlxChatRepo, SqlxEmbeddingRepo, SqlxProfileRepo, SqlxUserRepo,
};
use use_cases::{
    admin::AdminHandler, assistant::AssistantHandler, auth::AuthHandler,
    directory::DirectoryHandler, profile::ProfileHandler, resume::ResumeHandler,
};

pub type AppAuthHandler = AuthHandler<SqlxUserRepo, SqlxProfileRepo, SqlxAdminRepo, JwtService>;
pub type AppDirectoryHandler = DirectoryHandler<SqlxProfileRepo>;
pub type AppProfileHandler = ProfileHandler<SqlxUserRepo, SqlxProfileRepo>;
pub type AppResumeHandler = ResumeHandler<SqlxProfileRepo, GeminiClient>;
pub type AppAssistantHandler =
    AssistantHandler<SqlxProfileRepo, SqlxChatRepo, SqlxEmbeddingRepo, GeminiClient>;
pub type AppAdminHandler =
    AdminHandler<SqlxUserRepo, SqlxProfileRepo, SqlxAdminRepo, SqlxEmbeddingRepo, GeminiClient>;

pub struct AppState {
    pub auth_handler: AppAuthHandler,
    pub directory_handler: AppDirectoryHandler,
    pub profile_handler: AppProfileHandler,
    pub resume_handler: AppResumeHandler,
    pub assistant_handler: AppAssistantHandler,
    pub admin_handler: AppAdminHandler,
    pub csv: Arc<AlumniCsvStore>,
    pub quotas: UsageQuotaStore,
    pub redis: Option<RedisService>,
    pub llm_configured: bool,
}

impl AppState {
    pub fn new(
        config: &settings::AppConfig,
        pool: sqlx::PgPool,
        csv: Arc<AlumniCsvStore>,
    ) -> Result<Self, LlmError> {
        let redis = config.redis_url.as_deref().and_then(|url| {
            RedisService::new(url)
                .map_err(|e| tracing::error!("Redis connection error: {}", e))
                .ok()
        });

        let users = SqlxUserRepo::new(pool.clone());
        let profiles = SqlxProfileRepo::new(pool.clone());
        let admin = SqlxAdminRepo::new(pool.clone());
        let chats = SqlxChatRepo::new(pool.clone());
        let embeddings = SqlxEmbeddingRepo::new(pool);

        let jwt_service = JwtService::new(config, redis.clone());
        let llm = GeminiClient::new(config)?;
        let llm_configured = llm.is_configured();
        let quotas = UsageQuotaStore::new();

        Ok(AppState {
            auth_handler: AuthHandler::new(
                config,
                users.clone(),
                profiles.clone(),
                admin.clone(),
                jwt_service,
            ),
            directory_handler: DirectoryHandler::new(profiles.clone(), csv.clone()),
            profile_handler: ProfileHandler::new(users.clone(), profiles.clone(), csv.clone()),
            resume_handler: ResumeHandler::new(config, profiles.clone(), llm.clone()),
            assistant_handler: AssistantHandler::new(
                config,
                profiles.clone(),
                chats,
                embeddings.clone(),
                llm.clone(),
                csv.clone(),
                quotas.clone(),
            ),
            admin_handler: AdminHandler::new(users, profiles, admin, embeddings, llm, csv.clone()),
            csv,
            quotas,
            redis,
            llm_configured,
        })
    }
}
