use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::csv_source::AlumniCsvStore;
use crate::directory::rank_by_similarity;
use crate::directory::search::{is_member_search, keyword_search, MAX_MEMBER_CARDS};
use crate::entities::alumni::{parse_grad_year, CsvAlumni};
use crate::entities::chat::{
    ChatHistoryQuery, ChatHistoryResponse, ChatRequest, ChatResponse, MemberCard,
    NewSessionResponse,
};
use crate::entities::email::{GenerateEmailRequest, GeneratedEmail};
use crate::entities::profile::UserProfile;
use crate::entities::recommendation::{RecommendationRequest, RecommendationResponse};
use crate::errors::AppError;
use crate::limiter::{QuotaKind, UsageQuotaStore};
use crate::llm::{strip_text_fence, EmbeddingTask, LlmClient};
use crate::repositories::{
    chat::ChatRepository, embedding::EmbeddingRepository, profile::ProfileRepository,
};
use crate::settings::AppConfig;
use crate::use_cases::prompts::{chat_prompt, email_prompt, email_subject};

/// Messages loaded as context for a chat turn.
const CHAT_HISTORY_LOAD: i64 = 10;
/// Messages returned by the history endpoint.
const HISTORY_PAGE_LIMIT: i64 = 100;
/// Candidates ranked before seen and future-graduate filtering.
const RECOMMENDATION_POOL: usize = 100;

/// Email drafts, chat advisor and recommendations.
pub struct AssistantHandler<P, C, E, L>
where
    P: ProfileRepository,
    C: ChatRepository,
    E: EmbeddingRepository,
    L: LlmClient,
{
    pub profile_repo: P,
    pub chat_repo: C,
    pub embedding_repo: E,
    pub llm: L,
    pub csv: Arc<AlumniCsvStore>,
    pub quotas: UsageQuotaStore,
    organization_name: String,
    max_email_drafts: u32,
    max_chat_messages: u32,
}

impl<P, C, E, L> AssistantHandler<P, C, E, L>
where
    P: ProfileRepository,
    C: ChatRepository,
    E: EmbeddingRepository,
    L: LlmClient,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &AppConfig,
        profile_repo: P,
        chat_repo: C,
        embedding_repo: E,
        llm: L,
        csv: Arc<AlumniCsvStore>,
        quotas: UsageQuotaStore,
    ) -> Self {
        AssistantHandler {
            profile_repo,
            chat_repo,
            embedding_repo,
            llm,
            csv,
            quotas,
            organization_name: config.organization_name.clone(),
            max_email_drafts: config.max_email_drafts_per_day,
            max_chat_messages: config.max_chat_messages_per_day,
        }
    }

    fn consume(&self, user_id: &Uuid, kind: QuotaKind, limit: u32) -> Result<(), AppError> {
        match self.quotas.try_consume(*user_id, kind, limit) {
            Some(remaining) => {
                tracing::debug!(kind = kind.label(), remaining, "Quota consumed");
                Ok(())
            }
            None => Err(AppError::TooManyRequests(format!(
                "Daily {} limit reached ({} per day)",
                kind.label(),
                limit
            ))),
        }
    }

    async fn require_profile(&self, user_id: &Uuid) -> Result<UserProfile, AppError> {
        self.profile_repo
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User profile not found".into()))
    }

    /// CSV rows that are still visible in the directory.
    async fn visible_rows(&self) -> Result<Vec<CsvAlumni>, AppError> {
        let deleted = self.profile_repo.deleted_csv_rows().await?;
        Ok(self.csv
            .snapshot()
            .iter()
            .filter(|row| !deleted.contains(&row.row_id))
            .cloned()
            .collect())
    }

    #[instrument(skip(self, request))]
    pub async fn generate_email(&self, user_id: &Uuid, request: GenerateEmailRequest) -> Result<GeneratedEmail, AppError> {
        let recipient = request
            .alumni
            .filter(|r| !r.is_empty())
            .ok_or_else(|| AppError::BadRequest("Alumni data required".into()))?;

        let sender = self.require_profile(user_id).await?;
        self.consume(user_id, QuotaKind::EmailDraft, self.max_email_drafts)?;

        let prompt = email_prompt(&sender, &recipient, &self.organization_name);
        let answer = self.llm.generate(&prompt).await?;

        Ok(GeneratedEmail {
            success: true,
            email: strip_text_fence(&answer),
            subject: email_subject(&sender, &self.organization_name),
        })
    }

    async fn resolve_session(&self, user_id: &Uuid, requested: Option<Uuid>) -> Result<Uuid, AppError> {
        if let Some(session_id) = requested {
            if self.chat_repo.session_belongs_to(&session_id, user_id).await? {
                return Ok(session_id);
            }
            tracing::debug!(%session_id, "Unknown chat session; starting a new one");
        }
        self.chat_repo.create_session(user_id).await
    }

    /// Semantic fallback when keyword search finds nobody. Failures are logged
    /// and treated as no results.
    async fn embedding_search(&self, message: &str, own_row: Option<i64>, rows: &[CsvAlumni]) -> Vec<MemberCard> {
        let query = match self.llm.embed(message, EmbeddingTask::Query).await {
            Ok(query) => query,
            Err(e) => {
                tracing::warn!("Chat embedding search unavailable: {}", e);
                return Vec::new();
            }
        };
        let embeddings = match self.embedding_repo.all_embeddings().await {
            Ok(embeddings) => embeddings,
            Err(e) => {
                tracing::warn!("Failed to load alumni embeddings: {}", e);
                return Vec::new();
            }
        };

        let visible: HashSet<i64> = rows.iter().map(|r| r.row_id).collect();
        let mut exclude: HashSet<i64> = embeddings
            .iter()
            .map(|e| e.csv_row_id)
            .filter(|id| !visible.contains(id))
            .collect();
        exclude.extend(own_row);

        rank_by_similarity(&query, &embeddings, &exclude, MAX_MEMBER_CARDS)
            .into_iter()
            .filter_map(|(row_id, similarity)| {
                rows.iter()
                    .find(|r| r.row_id == row_id)
                    .map(|row| MemberCard::from_row(row, similarity))
            })
            .collect()
    }

    async fn find_members(&self, message: &str, profile: Option<&UserProfile>) -> Result<Vec<MemberCard>, AppError> {
        if !is_member_search(message) {
            return Ok(Vec::new());
        }

        let rows = self.visible_rows().await?;
        let cards = keyword_search(message, &rows);
        if !cards.is_empty() {
            return Ok(cards);
        }

        let own_row = profile.and_then(UserProfile::linked_csv_row);
        Ok(self.embedding_search(message, own_row, &rows).await)
    }

    #[instrument(skip(self, request))]
    pub async fn chat(&self, user_id: &Uuid, request: ChatRequest) -> Result<ChatResponse, AppError> {
        request.validate()?;
        let message = request.message.trim();
        if message.is_empty() {
            return Err(AppError::BadRequest("Message is required".into()));
        }

        self.consume(user_id, QuotaKind::ChatMessage, self.max_chat_messages)?;

        let session_id = self.resolve_session(user_id, request.session_id).await?;
        let history = self.chat_repo.recent_messages(&session_id, CHAT_HISTORY_LOAD).await?;

        let profile = match self.profile_repo.get_profile(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Chat continues without profile context: {}", e);
                None
            }
        };

        let members = self.find_members(message, profile.as_ref()).await?;
        let prompt = chat_prompt(
            profile.as_ref(),
            &members,
            &history,
            message,
            &self.organization_name,
        );
        let answer = self.llm.generate(&prompt).await?;
        let answer = answer.trim().to_string();

        self.chat_repo.append_exchange(&session_id, message, &answer).await?;

        Ok(ChatResponse {
            success: true,
            response: answer,
            session_id,
            member_cards: (!members.is_empty()).then_some(members),
        })
    }

    pub async fn chat_history(&self, user_id: &Uuid, query: ChatHistoryQuery) -> Result<ChatHistoryResponse, AppError> {
        let session_id = match query.session_id {
            Some(session_id) => {
                if !self.chat_repo.session_belongs_to(&session_id, user_id).await? {
                    return Err(AppError::NotFound("Chat session not found".into()));
                }
                Some(session_id)
            }
            None => self.chat_repo.latest_session(user_id).await?,
        };

        let messages = match session_id {
            Some(session_id) => self.chat_repo.recent_messages(&session_id, HISTORY_PAGE_LIMIT).await?,
            None => Vec::new(),
        };

        Ok(ChatHistoryResponse {
            success: true,
            session_id,
            messages,
        })
    }

    pub async fn new_session(&self, user_id: &Uuid) -> Result<NewSessionResponse, AppError> {
        let session_id = self.chat_repo.create_session(user_id).await?;
        Ok(NewSessionResponse {
            success: true,
            session_id,
        })
    }

    /// Alumni most similar to the member's profile.
    ///
    /// Ids in `exclude_ids` were already shown; they are only used to fill
    /// the page when too few unseen alumni remain.
    #[instrument(skip(self, request))]
    pub async fn recommendations(&self, user_id: &Uuid, request: RecommendationRequest) -> Result<RecommendationResponse, AppError> {
        let count = request.count();
        let profile = self.require_profile(user_id).await?;

        let embeddings = self.embedding_repo.all_embeddings().await?;
        if embeddings.is_empty() {
            return Ok(RecommendationResponse {
                success: true,
                count: 0,
                recommendations: Vec::new(),
                message: Some("Recommendations are not available yet".into()),
            });
        }

        let query = self.llm.embed(&profile.embedding_text(), EmbeddingTask::Query).await?;
        let rows = self.visible_rows().await?;

        let visible: HashSet<i64> = rows.iter().map(|r| r.row_id).collect();
        let mut exclude: HashSet<i64> = embeddings
            .iter()
            .map(|e| e.csv_row_id)
            .filter(|id| !visible.contains(id))
            .collect();
        exclude.extend(profile.linked_csv_row());

        let current_year = Utc::now().year();
        let candidates: Vec<(&CsvAlumni, f64)> = rank_by_similarity(&query, &embeddings, &exclude, RECOMMENDATION_POOL)
            .into_iter()
            .filter_map(|(row_id, similarity)| {
                rows.iter().find(|r| r.row_id == row_id).map(|row| (row, similarity))
            })
            .filter(|(row, _)| parse_grad_year(&row.grad_year).is_none_or(|year| year <= current_year))
            .collect();

        let seen: HashSet<i64> = request.exclude_ids.iter().copied().collect();
        let (unseen, previously_seen): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|(row, _)| !seen.contains(&row.row_id));

        let recommendations: Vec<MemberCard> = unseen
            .into_iter()
            .chain(previously_seen)
            .take(count)
            .map(|(row, similarity)| MemberCard::from_row(row, similarity))
            .collect();

        let message = recommendations
            .is_empty()
            .then(|| "No recommendations available".to_string());
        Ok(RecommendationResponse {
            success: true,
            count: recommendations.len(),
            recommendations,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::chat::ChatMessage;
    use crate::entities::email::EmailRecipient;
    use crate::entities::recommendation::AlumniEmbedding;
    use crate::llm::LlmError;
    use crate::use_cases::test_support::*;
    use mockall::predicate::eq;

    type Handler = AssistantHandler<MockProfileRepo, MockChatRepo, MockEmbeddingRepo, MockLlm>;

    fn rows() -> Vec<CsvAlumni> {
        vec![
            csv_row(0, "Jordan Kim", "Software Engineer", "Stripe", "2024"),
            csv_row(1, "Priya Shah", "Data Scientist", "Capital One", "2023"),
            csv_row(2, "Miguel Torres", "Product Manager", "Amazon", "2022"),
            csv_row(3, "Avery Chen", "Analyst", "Deloitte", "2099"),
        ]
    }

    fn handler(profiles: MockProfileRepo, chats: MockChatRepo, embeddings: MockEmbeddingRepo, llm: MockLlm) -> Handler {
        AssistantHandler::new(
            &test_config(),
            profiles,
            chats,
            embeddings,
            llm,
            Arc::new(AlumniCsvStore::from_rows(rows())),
            UsageQuotaStore::new(),
        )
    }

    fn profiles_with(user_id: Uuid) -> MockProfileRepo {
        let mut profiles = MockProfileRepo::new();
        profiles
            .expect_get_profile()
            .returning(move |_| Ok(Some(profile(user_id, "Taylor Reed"))));
        profiles.expect_deleted_csv_rows().returning(|| Ok(HashSet::new()));
        profiles
    }

    fn recipient() -> GenerateEmailRequest {
        GenerateEmailRequest {
            alumni: Some(EmailRecipient {
                name: Some("Jordan Kim".into()),
                company: Some("Stripe".into()),
                ..EmailRecipient::default()
            }),
        }
    }

    #[actix_rt::test]
    async fn email_requires_recipient() {
        let result = handler(MockProfileRepo::new(), MockChatRepo::new(), MockEmbeddingRepo::new(), MockLlm::new())
            .generate_email(&Uuid::new_v4(), GenerateEmailRequest { alumni: None })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[actix_rt::test]
    async fn email_strips_fence_and_builds_subject() {
        let user_id = Uuid::new_v4();
        let mut llm = MockLlm::new();
        llm.expect_generate()
            .returning(|_| Ok("```\nHi Jordan,\nCould we chat?\nTaylor\n```".into()));

        let email = handler(profiles_with(user_id), MockChatRepo::new(), MockEmbeddingRepo::new(), llm)
            .generate_email(&user_id, recipient())
            .await
            .unwrap();

        assert_eq!(email.email, "Hi Jordan,\nCould we chat?\nTaylor");
        assert_eq!(email.subject, "Connecting from Purdue THINK - Taylor");
    }

    #[actix_rt::test]
    async fn email_quota_is_enforced() {
        let user_id = Uuid::new_v4();
        let mut llm = MockLlm::new();
        llm.expect_generate().times(10).returning(|_| Ok("Hi Jordan,".into()));

        let handler = handler(profiles_with(user_id), MockChatRepo::new(), MockEmbeddingRepo::new(), llm);
        for _ in 0..10 {
            handler.generate_email(&user_id, recipient()).await.unwrap();
        }

        let result = handler.generate_email(&user_id, recipient()).await;
        assert!(matches!(result, Err(AppError::TooManyRequests(_))));
    }

    #[actix_rt::test]
    async fn chat_with_foreign_session_starts_new_one() {
        let user_id = Uuid::new_v4();
        let foreign = Uuid::new_v4();
        let fresh = Uuid::new_v4();

        let mut chats = MockChatRepo::new();
        chats.expect_session_belongs_to().with(eq(foreign), eq(user_id)).returning(|_, _| Ok(false));
        chats.expect_create_session().returning(move |_| Ok(fresh));
        chats.expect_recent_messages().with(eq(fresh), eq(10)).returning(|_, _| Ok(vec![]));
        chats
            .expect_append_exchange()
            .withf(move |session, question, answer| {
                *session == fresh && question == "How should I prepare for coffee chats?" && answer == "Do your research."
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut llm = MockLlm::new();
        llm.expect_generate().returning(|_| Ok("  Do your research.  ".into()));

        let response = handler(profiles_with(user_id), chats, MockEmbeddingRepo::new(), llm)
            .chat(&user_id, ChatRequest {
                message: "How should I prepare for coffee chats?".into(),
                session_id: Some(foreign),
            })
            .await
            .unwrap();

        assert_eq!(response.session_id, fresh);
        assert_eq!(response.response, "Do your research.");
        assert!(response.member_cards.is_none());
    }

    #[actix_rt::test]
    async fn chat_search_attaches_members_and_lists_them_in_prompt() {
        let user_id = Uuid::new_v4();
        let session = Uuid::new_v4();

        let mut chats = MockChatRepo::new();
        chats.expect_session_belongs_to().returning(|_, _| Ok(true));
        chats.expect_recent_messages().returning(|_, _| {
            Ok(vec![ChatMessage {
                role: "user".into(),
                content: "hello".into(),
                created_at: Utc::now(),
            }])
        });
        chats.expect_append_exchange().returning(|_, _, _| Ok(()));

        let mut llm = MockLlm::new();
        llm.expect_embed().never();
        llm.expect_generate()
            .withf(|prompt| prompt.contains("- Priya Shah (Data Scientist at Capital One)"))
            .returning(|_| Ok("Priya Shah at Capital One is a great contact.".into()));

        let response = handler(profiles_with(user_id), chats, MockEmbeddingRepo::new(), llm)
            .chat(&user_id, ChatRequest {
                message: "Can you find someone who works at capital one?".into(),
                session_id: Some(session),
            })
            .await
            .unwrap();

        let cards = response.member_cards.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Priya Shah");
    }

    #[actix_rt::test]
    async fn chat_falls_back_to_embeddings_and_survives_their_failure() {
        let user_id = Uuid::new_v4();

        let mut chats = MockChatRepo::new();
        chats.expect_create_session().returning(|_| Ok(Uuid::new_v4()));
        chats.expect_recent_messages().returning(|_, _| Ok(vec![]));
        chats.expect_append_exchange().returning(|_, _, _| Ok(()));

        let mut llm = MockLlm::new();
        llm.expect_embed()
            .returning(|_, _| Err(LlmError::Connection("generativelanguage.googleapis.com".into())));
        llm.expect_generate()
            .withf(|prompt| prompt.contains("No members found"))
            .returning(|_| Ok("I couldn't find anyone matching that.".into()));

        let response = handler(profiles_with(user_id), chats, MockEmbeddingRepo::new(), llm)
            .chat(&user_id, ChatRequest {
                message: "find zookeepers".into(),
                session_id: None,
            })
            .await
            .unwrap();

        assert!(response.member_cards.is_none());
    }

    #[actix_rt::test]
    async fn history_rejects_foreign_session() {
        let mut chats = MockChatRepo::new();
        chats.expect_session_belongs_to().returning(|_, _| Ok(false));

        let result = handler(MockProfileRepo::new(), chats, MockEmbeddingRepo::new(), MockLlm::new())
            .chat_history(&Uuid::new_v4(), ChatHistoryQuery { session_id: Some(Uuid::new_v4()) })
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[actix_rt::test]
    async fn history_without_sessions_is_empty() {
        let mut chats = MockChatRepo::new();
        chats.expect_latest_session().returning(|_| Ok(None));
        chats.expect_recent_messages().never();

        let response = handler(MockProfileRepo::new(), chats, MockEmbeddingRepo::new(), MockLlm::new())
            .chat_history(&Uuid::new_v4(), ChatHistoryQuery { session_id: None })
            .await
            .unwrap();

        assert!(response.session_id.is_none());
        assert!(response.messages.is_empty());
    }

    fn embedding_repo() -> MockEmbeddingRepo {
        let mut embeddings = MockEmbeddingRepo::new();
        embeddings.expect_all_embeddings().returning(|| {
            Ok(vec![
                AlumniEmbedding { csv_row_id: 0, embedding: vec![1.0, 0.0] },
                AlumniEmbedding { csv_row_id: 1, embedding: vec![0.9, 0.1] },
                AlumniEmbedding { csv_row_id: 2, embedding: vec![0.5, 0.5] },
                AlumniEmbedding { csv_row_id: 3, embedding: vec![1.0, 0.0] },
            ])
        });
        embeddings
    }

    #[actix_rt::test]
    async fn recommendations_skip_own_row_and_future_graduates() {
        let user_id = Uuid::new_v4();
        let mut profiles = MockProfileRepo::new();
        profiles.expect_get_profile().returning(move |_| {
            let mut own = profile(user_id, "Jordan Kim");
            own.is_csv_linked = true;
            own.csv_source_id = Some(0);
            Ok(Some(own))
        });
        profiles.expect_deleted_csv_rows().returning(|| Ok(HashSet::new()));

        let mut llm = MockLlm::new();
        llm.expect_embed()
            .withf(|_, task| *task == EmbeddingTask::Query)
            .returning(|_, _| Ok(vec![1.0, 0.0]));

        let response = handler(profiles, MockChatRepo::new(), embedding_repo(), llm)
            .recommendations(&user_id, RecommendationRequest::default())
            .await
            .unwrap();

        let ids: Vec<i64> = response.recommendations.iter().map(|c| c.csv_row_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[actix_rt::test]
    async fn recommendations_prefer_unseen_then_refill_with_seen() {
        let user_id = Uuid::new_v4();
        let mut llm = MockLlm::new();
        llm.expect_embed().returning(|_, _| Ok(vec![1.0, 0.0]));

        let request = RecommendationRequest {
            exclude_ids: vec![0],
            count: Some(2),
        };
        let response = handler(profiles_with(user_id), MockChatRepo::new(), embedding_repo(), llm)
            .recommendations(&user_id, request)
            .await
            .unwrap();

        let ids: Vec<i64> = response.recommendations.iter().map(|c| c.csv_row_id).collect();
        assert_eq!(ids, vec![1, 2]);

        let mut llm = MockLlm::new();
        llm.expect_embed().returning(|_, _| Ok(vec![1.0, 0.0]));
        let request = RecommendationRequest {
            exclude_ids: vec![0],
            count: Some(3),
        };
        let response = handler(profiles_with(user_id), MockChatRepo::new(), embedding_repo(), llm)
            .recommendations(&user_id, request)
            .await
            .unwrap();

        let ids: Vec<i64> = response.recommendations.iter().map(|c| c.csv_row_id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[actix_rt::test]
    async fn recommendations_without_embeddings_explain_why() {
        let user_id = Uuid::new_v4();
        let mut embeddings = MockEmbeddingRepo::new();
        embeddings.expect_all_embeddings().returning(|| Ok(vec![]));
        let mut llm = MockLlm::new();
        llm.expect_embed().never();

        let response = handler(profiles_with(user_id), MockChatRepo::new(), embeddings, llm)
            .recommendations(&user_id, RecommendationRequest::default())
            .await
            .unwrap();

        assert_eq!(response.count, 0);
        assert!(response.message.is_some());
    }
}
