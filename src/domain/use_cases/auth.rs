use serde_json::json;
use tracing::instrument;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::entities::admin::{AdminActionType, NewAdminAction};
use crate::entities::token::{AuthResponse, Claims, LoginResponse};
use crate::entities::user::{
    AuthUser, LoginUser, PublicUser, SessionResponse, SignupRequest, SignupResponse,
    UpdatePasswordRequest,
};
use crate::errors::{AppError, AuthError};
use crate::repositories::{
    admin::AdminRepository, profile::ProfileRepository, token::TokenServiceRepository,
    user::UserRepository,
};
use crate::settings::AppConfig;

pub struct AuthHandler<U, P, A, T>
where
    U: UserRepository,
    P: ProfileRepository,
    A: AdminRepository,
    T: TokenServiceRepository,
{
    pub user_repo: U,
    pub profile_repo: P,
    pub admin_repo: A,
    pub token_service: T,
    ops_code: String,
    super_ops_code: String,
}

impl<U, P, A, T> AuthHandler<U, P, A, T>
where
    U: UserRepository,
    P: ProfileRepository,
    A: AdminRepository,
    T: TokenServiceRepository,
{
    pub fn new(config: &AppConfig, user_repo: U, profile_repo: P, admin_repo: A, token_service: T) -> Self {
        AuthHandler {
            user_repo,
            profile_repo,
            admin_repo,
            token_service,
            ops_code: config.ops_code.trim().to_string(),
            super_ops_code: config.super_ops_code.trim().to_string(),
        }
    }

    fn is_director_code(&self, code: &str) -> bool {
        code == self.ops_code || code == self.super_ops_code
    }

    /// Checks the referral code and returns whether it grants director access.
    async fn check_referral_code(&self, code: &str) -> Result<bool, AppError> {
        if self.is_director_code(code) {
            return Ok(true);
        }

        let settings = self.admin_repo.get_settings().await?;
        if code == settings.active_referral_code {
            Ok(false)
        } else {
            Err(AppError::BadRequest(
                "Invalid referral code. Please get the current code from a Director of Operations.".into(),
            ))
        }
    }

    /// Registers a member. Director codes create a director account.
    #[instrument(skip(self, request), fields(email = %request.normalized_email()))]
    pub async fn signup(&self, request: SignupRequest) -> Result<SignupResponse, AppError> {
        request.validate()?;

        let code = request.referral_code.trim();
        let is_director = self.check_referral_code(code).await?;

        let hashed_password = hash_password(&request.password)?;
        let (user, profile) = request.prepare_for_insert(hashed_password, is_director);

        let user_id = self.user_repo.create_user_with_profile(&user, &profile).await?;

        if is_director {
            let action = NewAdminAction {
                director_user_id: user_id,
                action_type: AdminActionType::PromoteDirector,
                target_user_id: Some(user_id),
                details: json!({
                    "reason": "Signed up with a director code",
                    "email": user.email,
                }),
            };
            if let Err(e) = self.admin_repo.record_action(&action).await {
                tracing::warn!("Failed to audit director signup: {}", e);
            }
        }

        tracing::info!(%user_id, is_director, "Member signed up");
        Ok(SignupResponse {
            success: true,
            user_id,
            is_director,
            message: "Account created successfully!".to_string(),
        })
    }

    /// Logs in a user by validating credentials and generating JWTs
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginUser) -> Result<LoginResponse, AuthError> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        let user = self.user_repo.get_user_by_email(&email)
            .await
            .map_err(|e| {
                tracing::warn!("User lookup failed during login: {}", e);
                AuthError::WrongCredentials
            })?
            .ok_or(AuthError::WrongCredentials)?;

        let is_password_valid = verify_password(&request.password, &user.password_hash)
            .map_err(|_| AuthError::WrongCredentials)?;
        if !is_password_valid {
            return Err(AuthError::WrongCredentials);
        }

        let tokens = self.create_auth_response(&user)?;
        let profile = match self.profile_repo.get_profile(&user.id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Profile lookup failed during login: {}", e);
                None
            }
        };

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginResponse {
            success: true,
            tokens,
            profile,
        })
    }

    pub fn create_auth_response(&self, user: &AuthUser) -> Result<AuthResponse, AuthError> {
        let access_token = self.token_service.create_jwt(user)
            .map_err(|e| {
                tracing::warn!("Failed to create JWT: {}", e);
                AuthError::TokenCreation
            })?;

        let refresh_token = self.token_service.create_refresh_jwt(&user.id)
            .map_err(|e| {
                tracing::warn!("Failed to create refresh JWT: {}", e);
                AuthError::TokenCreation
            })?;
        Ok(AuthResponse::new(access_token, refresh_token))
    }

    /// Exchanges a refresh token for a new pair. The used token is revoked.
    #[instrument(skip(self, token))]
    pub async fn refresh_token(&self, token: &str) -> Result<AuthResponse, AuthError> {
        let decoded = self.token_service.decode_refresh_jwt(token)?;
        if self.token_service.is_refresh_revoked(&decoded.claims.jti).await? {
            return Err(AuthError::TokenRevoked);
        }

        let user_id = decoded.claims.user_id()?;
        let user = self.user_repo.get_user_by_id(&user_id)
            .await
            .map_err(|_| AuthError::WrongCredentials)?
            .ok_or(AuthError::WrongCredentials)?;

        let response = self.create_auth_response(&user)?;
        self.token_service.revoke_refresh_token(&decoded.claims).await?;
        Ok(response)
    }

    /// Revokes the access token and, when supplied, the caller's refresh token.
    #[instrument(skip(self, claims, refresh_token), fields(user_id = %claims.sub))]
    pub async fn logout(&self, claims: &Claims, refresh_token: Option<&str>) -> Result<(), AuthError> {
        self.token_service.revoke_access_token(claims).await?;

        if let Some(token) = refresh_token.map(str::trim).filter(|t| !t.is_empty()) {
            let decoded = self.token_service.decode_refresh_jwt(token)?;
            if decoded.claims.sub != claims.sub {
                return Err(AuthError::Forbidden("Refresh token belongs to another user".into()));
            }
            self.token_service.revoke_refresh_token(&decoded.claims).await?;
        }

        tracing::info!("User logged out");
        Ok(())
    }

    #[instrument(skip(self, claims, request), fields(user_id = %claims.sub))]
    pub async fn update_password(&self, claims: &Claims, request: UpdatePasswordRequest) -> Result<(), AppError> {
        request.validate()?;

        let user_id = claims.user_id()?;
        let hashed_password = hash_password(&request.password)?;
        self.user_repo.update_password(&user_id, &hashed_password).await
    }

    pub async fn session(&self, claims: &Claims) -> Result<SessionResponse, AppError> {
        let user_id = claims.user_id()?;
        let user = self.user_repo.get_user_by_id(&user_id)
            .await?
            .ok_or(AppError::UnauthorizedAccess)?;
        let profile = self.profile_repo.get_profile(&user_id).await?;

        Ok(SessionResponse {
            success: true,
            user: PublicUser {
                id: user.id,
                email: user.email,
                is_director: user.is_director,
            },
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtService;
    use crate::entities::token::RefreshClaims;
    use crate::use_cases::test_support::*;
    use jsonwebtoken::{Header, TokenData};
    use mockall::predicate::eq;
    use uuid::Uuid;

    type Handler = AuthHandler<MockUserRepo, MockProfileRepo, MockAdminRepo, JwtService>;

    fn handler(users: MockUserRepo, profiles: MockProfileRepo, admin: MockAdminRepo) -> Handler {
        let config = test_config();
        AuthHandler::new(&config, users, profiles, admin, JwtService::new(&config, None))
    }

    fn signup(code: &str) -> SignupRequest {
        SignupRequest {
            email: "Priya.Shah@Example.com".into(),
            password: "Gr4nite!Harbor#Lantern".into(),
            referral_code: code.into(),
            full_name: "Priya Shah".into(),
            major: None,
            graduation_year: Some(2023),
            location: None,
            linkedin_url: None,
            phone: None,
        }
    }

    #[actix_rt::test]
    async fn signup_with_active_code_creates_member() {
        let mut users = MockUserRepo::new();
        let mut admin = MockAdminRepo::new();
        let user_id = Uuid::new_v4();

        admin.expect_get_settings().returning(|| Ok(settings("THINK2025")));
        admin.expect_record_action().never();
        users
            .expect_create_user_with_profile()
            .withf(|user, profile| user.email == "priya.shah@example.com" && !profile.is_director)
            .returning(move |_, _| Ok(user_id));

        let response = handler(users, MockProfileRepo::new(), admin)
            .signup(signup("THINK2025"))
            .await
            .unwrap();

        assert_eq!(response.user_id, user_id);
        assert!(!response.is_director);
    }

    #[actix_rt::test]
    async fn signup_with_ops_code_creates_director_and_audits() {
        let mut users = MockUserRepo::new();
        let mut admin = MockAdminRepo::new();

        admin.expect_get_settings().never();
        admin
            .expect_record_action()
            .withf(|action| action.action_type == AdminActionType::PromoteDirector)
            .times(1)
            .returning(|_| Ok(()));
        users
            .expect_create_user_with_profile()
            .withf(|_, profile| profile.is_director)
            .returning(|_, _| Ok(Uuid::new_v4()));

        let response = handler(users, MockProfileRepo::new(), admin)
            .signup(signup("OPS-TEST"))
            .await
            .unwrap();

        assert!(response.is_director);
    }

    #[actix_rt::test]
    async fn signup_rejects_wrong_code() {
        let mut users = MockUserRepo::new();
        let mut admin = MockAdminRepo::new();

        admin.expect_get_settings().returning(|| Ok(settings("THINK2025")));
        users.expect_create_user_with_profile().never();

        let result = handler(users, MockProfileRepo::new(), admin)
            .signup(signup("THINK2024"))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[actix_rt::test]
    async fn director_signup_survives_audit_failure() {
        let mut users = MockUserRepo::new();
        let mut admin = MockAdminRepo::new();

        admin
            .expect_record_action()
            .returning(|_| Err(AppError::InternalError("audit table missing".into())));
        users.expect_create_user_with_profile().returning(|_, _| Ok(Uuid::new_v4()));

        let result = handler(users, MockProfileRepo::new(), admin)
            .signup(signup("SUPER-OPS-TEST"))
            .await;

        assert!(result.is_ok());
    }

    #[actix_rt::test]
    async fn login_returns_tokens_and_profile() {
        let mut users = MockUserRepo::new();
        let mut profiles = MockProfileRepo::new();
        let user_id = Uuid::new_v4();
        let hash = hash_password("Gr4nite!Harbor#Lantern").unwrap();

        users
            .expect_get_user_by_email()
            .with(eq("jordan.kim@example.com"))
            .returning(move |email| {
                Ok(Some(AuthUser {
                    id: user_id,
                    email: email.to_string(),
                    password_hash: hash.clone(),
                    is_director: false,
                }))
            });
        profiles
            .expect_get_profile()
            .returning(move |id| Ok(Some(profile(*id, "Jordan Kim"))));

        let response = handler(users, profiles, MockAdminRepo::new())
            .login(LoginUser {
                email: "Jordan.Kim@example.com".into(),
                password: "Gr4nite!Harbor#Lantern".into(),
            })
            .await
            .unwrap();

        assert!(!response.tokens.access_token.is_empty());
        assert_eq!(response.profile.unwrap().user_id, user_id);
    }

    #[actix_rt::test]
    async fn login_with_wrong_password_fails() {
        let mut users = MockUserRepo::new();
        let hash = hash_password("Gr4nite!Harbor#Lantern").unwrap();

        users.expect_get_user_by_email().returning(move |email| {
            Ok(Some(AuthUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
                password_hash: hash.clone(),
                is_director: false,
            }))
        });

        let result = handler(users, MockProfileRepo::new(), MockAdminRepo::new())
            .login(LoginUser {
                email: "jordan.kim@example.com".into(),
                password: "wrong-password".into(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::WrongCredentials)));
    }

    #[actix_rt::test]
    async fn refresh_rejects_revoked_token() {
        let mut tokens = MockTokenService::new();
        tokens.expect_decode_refresh_jwt().returning(|_| {
            Ok(TokenData {
                header: Header::default(),
                claims: RefreshClaims {
                    sub: Uuid::new_v4().to_string(),
                    jti: "used".into(),
                    iat: 0,
                    exp: usize::MAX,
                    token_type: crate::entities::token::TokenType::Refresh,
                },
            })
        });
        tokens.expect_is_refresh_revoked().with(eq("used")).returning(|_| Ok(true));

        let handler = AuthHandler::new(
            &test_config(),
            MockUserRepo::new(),
            MockProfileRepo::new(),
            MockAdminRepo::new(),
            tokens,
        );

        let result = handler.refresh_token("token").await;
        assert!(matches!(result, Err(AuthError::TokenRevoked)));
    }

    #[actix_rt::test]
    async fn refresh_issues_new_pair_for_existing_user() {
        let mut users = MockUserRepo::new();
        let user_id = Uuid::new_v4();
        users.expect_get_user_by_id().returning(move |id| {
            Ok(Some(AuthUser {
                id: *id,
                email: "miguel.torres@example.com".into(),
                password_hash: String::new(),
                is_director: true,
            }))
        });

        let handler = handler(users, MockProfileRepo::new(), MockAdminRepo::new());
        let refresh = handler.token_service.create_refresh_jwt(&user_id).unwrap();

        let response = handler.refresh_token(&refresh).await.unwrap();
        let claims = handler.token_service.decode_jwt(&response.access_token).unwrap().claims;
        assert_eq!(claims.sub, user_id.to_string());
        assert!(claims.director);
    }
}
