use tracing::instrument;
use uuid::Uuid;

use crate::entities::resume::{ParsedResume, ResumeProfileUpdate, ResumeUploadResponse};
use crate::errors::AppError;
use crate::llm::{strip_json_fences, LlmClient};
use crate::pdf::extract_pdf_text;
use crate::repositories::profile::ProfileRepository;
use crate::settings::AppConfig;
use crate::use_cases::prompts::resume_parse_prompt;

pub struct ResumeHandler<P, L>
where
    P: ProfileRepository,
    L: LlmClient,
{
    pub profile_repo: P,
    pub llm: L,
    max_bytes: usize,
    max_size_mb: usize,
}

impl<P, L> ResumeHandler<P, L>
where
    P: ProfileRepository,
    L: LlmClient,
{
    pub fn new(config: &AppConfig, profile_repo: P, llm: L) -> Self {
        ResumeHandler {
            profile_repo,
            llm,
            max_bytes: config.max_resume_bytes(),
            max_size_mb: config.max_resume_size_mb,
        }
    }

    fn check_upload(&self, file_name: Option<&str>, size: usize) -> Result<(), AppError> {
        let name = file_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::BadRequest("No file selected".into()))?;

        if !name.to_lowercase().ends_with(".pdf") {
            return Err(AppError::BadRequest("Only PDF files are allowed".into()));
        }
        if size == 0 {
            return Err(AppError::BadRequest("Uploaded file is empty".into()));
        }
        if size > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {}MB",
                self.max_size_mb
            )));
        }
        Ok(())
    }

    /// Asks the model for structured fields. An unparseable answer yields an
    /// empty resume so the raw text is still stored.
    async fn parse_resume(&self, text: &str) -> Result<ParsedResume, AppError> {
        let answer = self.llm.generate(&resume_parse_prompt(text)).await?;

        match serde_json::from_str::<ParsedResume>(strip_json_fences(&answer)) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                tracing::warn!("Resume parse returned invalid JSON: {}", e);
                Ok(ParsedResume::default())
            }
        }
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_resume(
        &self,
        user_id: &Uuid,
        file_name: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<ResumeUploadResponse, AppError> {
        self.check_upload(file_name, bytes.len())?;

        let text = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
            .await
            .map_err(|e| AppError::InternalError(format!("PDF extraction task failed: {}", e)))??;

        let parsed = self.parse_resume(&text).await?;
        let update = ResumeProfileUpdate::from_parsed(&text, &parsed);
        let profile = self.profile_repo.apply_resume(user_id, &update).await?;

        tracing::info!(
            skills = parsed.skills.len(),
            jobs = parsed.work_experience.len(),
            "Resume parsed"
        );
        Ok(ResumeUploadResponse {
            success: true,
            message: "Resume uploaded and parsed successfully".into(),
            parsed_data: parsed,
            profile,
        })
    }
}
