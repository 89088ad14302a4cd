use async_trait::async_trait;
use jsonwebtoken::TokenData;
use uuid::Uuid;

use crate::{
    entities::{token::{Claims, RefreshClaims}, user::AuthUser},
    errors::AuthError,
};

#[async_trait]
pub trait TokenServiceRepository: Send + Sync {
    /// Creates a new access JWT for the user
    fn create_jwt(&self, user: &AuthUser) -> Result<String, AuthError>;

    /// Creates a new refresh JWT for the user
    fn create_refresh_jwt(&self, user_id: &Uuid) -> Result<String, AuthError>;

    /// Decodes an access JWT and returns the claims
    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError>;

    /// Decodes a refresh JWT and returns the claims
    fn decode_refresh_jwt(&self, token: &str) -> Result<TokenData<RefreshClaims>, AuthError>;

    /// Blocks an access token until it expires
    async fn revoke_access_token(&self, claims: &Claims) -> Result<(), AuthError>;

    /// Blocks a refresh token until it expires
    async fn revoke_refresh_token(&self, claims: &RefreshClaims) -> Result<(), AuthError>;

    async fn is_access_revoked(&self, jti: &str) -> Result<bool, AuthError>;

    async fn is_refresh_revoked(&self, jti: &str) -> Result<bool, AuthError>;
}
