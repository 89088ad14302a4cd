use async_trait::async_trait;
use jsonwebtoken::{encode, Header, decode, Validation, TokenData, Algorithm};
use chrono::{Utc, Duration};
use uuid::Uuid;
use crate::cache::{RedisService, ACCESS_DENY_PREFIX, REFRESH_DENY_PREFIX};
use crate::entities::token::{Claims, RefreshClaims, TokenType};
use crate::entities::user::AuthUser;
use crate::repositories::token::TokenServiceRepository;
use crate::settings::{AppConfig, JwtKeys};
use crate::errors::AuthError;

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    access_expiration: Duration,
    refresh_expiration: Duration,
    redis: Option<RedisService>,
}

impl JwtService {
    pub fn new(config: &AppConfig, redis: Option<RedisService>) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            access_expiration: Duration::minutes(config.jwt_expiration_minutes),
            refresh_expiration: Duration::days(config.refresh_token_exp_days),
            redis,
        }
    }

    pub fn has_deny_list(&self) -> bool {
        self.redis.is_some()
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation
    }

    async fn deny(&self, prefix: &str, jti: &str, exp: usize) -> Result<(), AuthError> {
        let Some(redis) = &self.redis else {
            tracing::debug!("No token deny-list configured; {} {} expires naturally", prefix, jti);
            return Ok(());
        };

        let now = Utc::now().timestamp() as usize;
        if exp <= now {
            return Ok(());
        }
        redis.revoke(prefix, jti, (exp - now) as u64).await
    }

    async fn denied(&self, prefix: &str, jti: &str) -> Result<bool, AuthError> {
        match &self.redis {
            Some(redis) => redis.is_revoked(prefix, jti).await,
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TokenServiceRepository for JwtService {
    fn create_jwt(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = (now + self.access_expiration).timestamp() as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            jti: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            director: user.is_director,
            exp,
            iat: now.timestamp() as usize,
            token_type: TokenType::Access,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding)
            .map_err(|_| AuthError::TokenCreation)
    }

    fn create_refresh_jwt(&self, user_id: &Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = (now + self.refresh_expiration).timestamp() as usize;

        let claims = RefreshClaims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp,
            iat: now.timestamp() as usize,
            token_type: TokenType::Refresh,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.refresh_encoding)
            .map_err(|_| AuthError::TokenCreation)
    }

    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        let data = decode::<Claims>(token, &self.keys.decoding, &Self::validation())?;
        if data.claims.token_type != TokenType::Access {
            return Err(AuthError::InvalidToken);
        }
        Ok(data)
    }

    fn decode_refresh_jwt(&self, token: &str) -> Result<TokenData<RefreshClaims>, AuthError> {
        let data = decode::<RefreshClaims>(token, &self.keys.refresh_decoding, &Self::validation())?;
        if data.claims.token_type != TokenType::Refresh {
            return Err(AuthError::InvalidToken);
        }
        Ok(data)
    }

    async fn revoke_access_token(&self, claims: &Claims) -> Result<(), AuthError> {
        self.deny(ACCESS_DENY_PREFIX, &claims.jti, claims.exp).await
    }

    async fn revoke_refresh_token(&self, claims: &RefreshClaims) -> Result<(), AuthError> {
        self.deny(REFRESH_DENY_PREFIX, &claims.jti, claims.exp).await
    }

    async fn is_access_revoked(&self, jti: &str) -> Result<bool, AuthError> {
        self.denied(ACCESS_DENY_PREFIX, jti).await
    }

    async fn is_refresh_revoked(&self, jti: &str) -> Result<bool, AuthError> {
        self.denied(REFRESH_DENY_PREFIX, jti).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        let config = AppConfig {
            jwt_secret: "j".repeat(48),
            refresh_token_secret: "r".repeat(48),
            ..AppConfig::default()
        };
        JwtService::new(&config, None)
    }

    fn director() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "ops@example.com".into(),
            password_hash: String::new(),
            is_director: true,
        }
    }

    #[test]
    fn access_token_round_trips_claims() {
        let jwt = service();
        let user = director();

        let token = jwt.create_jwt(&user).unwrap();
        let claims = jwt.decode_jwt(&token).unwrap().claims;

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "ops@example.com");
        assert!(claims.director);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn tokens_are_not_interchangeable() {
        let jwt = service();
        let user = director();

        let access = jwt.create_jwt(&user).unwrap();
        let refresh = jwt.create_refresh_jwt(&user.id).unwrap();

        assert!(jwt.decode_refresh_jwt(&access).is_err());
        assert!(jwt.decode_jwt(&refresh).is_err());
        assert!(jwt.decode_refresh_jwt(&refresh).is_ok());
    }

    #[test]
    fn every_token_gets_a_fresh_id() {
        let jwt = service();
        let id = Uuid::new_v4();
        let a = jwt.decode_refresh_jwt(&jwt.create_refresh_jwt(&id).unwrap()).unwrap();
        let b = jwt.decode_refresh_jwt(&jwt.create_refresh_jwt(&id).unwrap()).unwrap();
        assert_ne!(a.claims.jti, b.claims.jti);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let jwt = service();
        let past = (Utc::now() - Duration::hours(2)).timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            jti: Uuid::new_v4().to_string(),
            email: "late@example.com".into(),
            director: false,
            exp: past,
            iat: past - 60,
            token_type: TokenType::Access,
        };
        let token = encode(&Header::new(JWT_ALGORITHM), &claims, &jwt.keys.encoding).unwrap();

        assert!(matches!(jwt.decode_jwt(&token), Err(AuthError::TokenExpired)));
    }

    #[actix_rt::test]
    async fn revocation_without_redis_is_a_no_op() {
        let jwt = service();
        let token = jwt.create_jwt(&director()).unwrap();
        let claims = jwt.decode_jwt(&token).unwrap().claims;

        assert!(!jwt.has_deny_list());
        jwt.revoke_access_token(&claims).await.unwrap();
        assert!(!jwt.is_access_revoked(&claims.jti).await.unwrap());
    }
}
