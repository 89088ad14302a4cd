use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use jsonwebtoken::{DecodingKey, EncodingKey};
use std::{env, fmt, str::FromStr};
use zeroize::Zeroizing;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub database_url: String,

    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_minutes: i64,

    #[serde(default)]
    pub refresh_token_secret: String,

    #[serde(default = "default_refresh_expiration")]
    pub refresh_token_exp_days: i64,

    /// Local CSV export of the alumni directory.
    #[serde(default = "default_alumni_csv_path")]
    pub alumni_csv_path: String,

    /// Remote CSV export used when the local file is missing.
    #[serde(default)]
    pub alumni_csv_url: Option<String>,

    #[serde(default = "default_ops_code")]
    pub ops_code: String,

    #[serde(default = "default_super_ops_code")]
    pub super_ops_code: String,

    #[serde(default = "default_organization_name")]
    pub organization_name: String,

    #[serde(default)]
    pub gemini_api_key: Option<String>,

    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_max_email_drafts")]
    pub max_email_drafts_per_day: u32,

    #[serde(default = "default_max_chat_messages")]
    pub max_chat_messages_per_day: u32,

    #[serde(default = "default_max_resume_size_mb")]
    pub max_resume_size_mb: usize,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Alumni-Directory-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_jwt_expiration() -> i64 {
    60
}
fn default_refresh_expiration() -> i64 {
    7
}
fn default_alumni_csv_path() -> String {
    "data/alumni.csv".to_string()
}
fn default_ops_code() -> String {
    "OPS".to_string()
}
fn default_super_ops_code() -> String {
    "SUPER_OPS_2025".to_string()
}
fn default_organization_name() -> String {
    "Purdue THINK".to_string()
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}
fn default_max_email_drafts() -> u32 {
    10
}
fn default_max_chat_messages() -> u32 {
    50
}
fn default_max_resume_size_mb() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            database_url: String::new(),
            redis_url: None,
            cors_allowed_origins: default_cors_origins(),
            jwt_secret: String::new(),
            jwt_expiration_minutes: default_jwt_expiration(),
            refresh_token_secret: String::new(),
            refresh_token_exp_days: default_refresh_expiration(),
            alumni_csv_path: default_alumni_csv_path(),
            alumni_csv_url: None,
            ops_code: default_ops_code(),
            super_ops_code: default_super_ops_code(),
            organization_name: default_organization_name(),
            gemini_api_key: None,
            gemini_base_url: default_gemini_base_url(),
            gemini_model: default_gemini_model(),
            embedding_model: default_embedding_model(),
            max_email_drafts_per_day: default_max_email_drafts(),
            max_chat_messages_per_day: default_max_chat_messages(),
            max_resume_size_mb: default_max_resume_size_mb(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Inject critical env values if missing
        config.database_url = fill_or_env(config.database_url, "APP_DATABASE_URL")?;
        config.jwt_secret = fill_or_env(config.jwt_secret, "APP_JWT_SECRET")?;
        config.refresh_token_secret = fill_or_env(config.refresh_token_secret, "APP_REFRESH_TOKEN_SECRET")?;

        if config.redis_url.is_none() {
            config.redis_url = env::var("APP_REDIS_URL").ok();
        }
        if config.gemini_api_key.is_none() {
            config.gemini_api_key = env::var("APP_GEMINI_API_KEY")
                .or_else(|_| env::var("GEMINI_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database_url.trim().is_empty() {
            errors.push("DATABASE_URL cannot be empty");
        }
        if self.jwt_secret.len() < 32 {
            errors.push("JWT_SECRET must be at least 32 characters");
        }
        if self.refresh_token_secret.len() < 32 {
            errors.push("REFRESH_TOKEN_SECRET must be at least 32 characters");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }
        if self.ops_code.trim().is_empty() || self.super_ops_code.trim().is_empty() {
            errors.push("Director referral codes cannot be empty");
        }
        if let Some(csv_url) = &self.alumni_csv_url {
            if url::Url::parse(csv_url).is_err() {
                errors.push("ALUMNI_CSV_URL must be a valid URL");
            }
        }
        if url::Url::parse(&self.gemini_base_url).is_err() {
            errors.push("GEMINI_BASE_URL must be a valid URL");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn max_resume_bytes(&self) -> usize {
        self.max_resume_size_mb * 1024 * 1024
    }
}

fn fill_or_env(current: String, env_key: &str) -> Result<String, ConfigError> {
    if current.trim().is_empty() {
        env::var(env_key).map_err(|_| ConfigError::Message(format!("{env_key} must be set")))
    } else {
        Ok(current)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else if self.len() < 32 {
            "[TOO_SHORT]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self {
            Some(_) => "[REDACTED]",
            None => "[MISSING]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("database_url", &self.database_url.redact())
            .field("redis_url", &self.redis_url.redact())
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_secret", &self.jwt_secret.redact())
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .field("refresh_token_secret", &self.refresh_token_secret.redact())
            .field("refresh_token_exp_days", &self.refresh_token_exp_days)
            .field("alumni_csv_path", &self.alumni_csv_path)
            .field("alumni_csv_url", &self.alumni_csv_url)
            .field("ops_code", &self.ops_code.redact())
            .field("super_ops_code", &self.super_ops_code.redact())
            .field("organization_name", &self.organization_name)
            .field("gemini_api_key", &self.gemini_api_key.redact())
            .field("gemini_model", &self.gemini_model)
            .field("embedding_model", &self.embedding_model)
            .field("max_email_drafts_per_day", &self.max_email_drafts_per_day)
            .field("max_chat_messages_per_day", &self.max_chat_messages_per_day)
            .field("max_resume_size_mb", &self.max_resume_size_mb)
            .finish()
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub refresh_encoding: EncodingKey,
    pub refresh_decoding: DecodingKey,
}

impl From<&AppConfig> for JwtKeys {
    fn from(config: &AppConfig) -> Self {
        let jwt_secret = Zeroizing::new(config.jwt_secret.clone());
        let refresh_secret = Zeroizing::new(config.refresh_token_secret.clone());

        JwtKeys {
            encoding: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("encoding", &"[REDACTED]")
            .field("decoding", &"[REDACTED]")
            .field("refresh_encoding", &"[REDACTED]")
            .field("refresh_decoding", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/alumni".into(),
            jwt_secret: "a".repeat(40),
            refresh_token_secret: "b".repeat(40),
            ..AppConfig::default()
        }
    }

    #[test]
    fn default_config_with_secrets_is_valid() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn short_secrets_are_rejected() {
        let config = AppConfig {
            jwt_secret: "short".into(),
            ..valid_config()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("JWT_SECRET"));
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let config = AppConfig {
            env: AppEnvironment::Production,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn cors_origins_split_on_commas() {
        let config = AppConfig {
            cors_allowed_origins: vec!["https://a.dev, https://b.dev".into(), "".into()],
            ..valid_config()
        };
        assert_eq!(config.cors_origins(), vec!["https://a.dev", "https://b.dev"]);
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = AppConfig {
            gemini_api_key: Some("secret-key".into()),
            ..valid_config()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
        assert!(!debug.contains(&"a".repeat(40)));
    }
}
