use serde::{Serialize, Deserialize};
use validator::Validate;
use uuid::Uuid;

use crate::domain::password::validate_password_strength;
use crate::entities::profile::{ProfileInsert, UserProfile};


/// A user joined with the director flag from their profile.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub is_director: bool,
}

#[derive(Debug)]
pub struct UserInsert {
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(
        length(min = 8, message = "Must be at least 8 characters"),
        custom(
            function = "validate_password_strength",
            message = "Must include uppercase, number, and symbol"
        )
    )]
    pub password: String,

    #[validate(length(min = 1, message = "Referral code is required"))]
    pub referral_code: String,

    #[validate(length(min = 1, max = 200, message = "Full name is required"))]
    pub full_name: String,

    #[serde(default)]
    pub major: Option<String>,

    #[serde(default)]
    #[validate(range(min = 1900, max = 2100, message = "Graduation year is out of range"))]
    pub graduation_year: Option<i32>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub linkedin_url: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,
}

impl SignupRequest {
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    pub fn prepare_for_insert(&self, password_hash: String, is_director: bool) -> (UserInsert, ProfileInsert) {
        let email = self.normalized_email();
        let user = UserInsert {
            email: email.clone(),
            password_hash,
        };
        let profile = ProfileInsert {
            full_name: self.full_name.trim().to_string(),
            major: self.major.clone(),
            graduation_year: self.graduation_year,
            location: self.location.clone(),
            linkedin_url: self.linkedin_url.clone(),
            personal_email: email,
            phone: self.phone.clone(),
            is_director,
            signup_referral_code: self.referral_code.trim().to_string(),
        };
        (user, profile)
    }
}


#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[validate(
        length(min = 8, message = "Must be at least 8 characters"),
        custom(
            function = "validate_password_strength",
            message = "Must include uppercase, number, and symbol"
        )
    )]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub user_id: Uuid,
    pub is_director: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub is_director: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub user: PublicUser,
    pub profile: Option<UserProfile>,
}

#[derive(Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupRequest {
        SignupRequest {
            email: "Jordan.Kim@Example.com".into(),
            password: "Gr4nite!Harbor#Lantern".into(),
            referral_code: " THINK2025 ".into(),
            full_name: " Jordan Kim ".into(),
            major: Some("Computer Science".into()),
            graduation_year: Some(2024),
            location: None,
            linkedin_url: None,
            phone: None,
        }
    }

    #[test]
    fn insert_normalizes_email_and_trims_fields() {
        let (user, profile) = signup().prepare_for_insert("hash".into(), false);
        assert_eq!(user.email, "jordan.kim@example.com");
        assert_eq!(profile.personal_email, "jordan.kim@example.com");
        assert_eq!(profile.full_name, "Jordan Kim");
        assert_eq!(profile.signup_referral_code, "THINK2025");
        assert!(!profile.is_director);
    }

    #[test]
    fn weak_password_fails_validation() {
        let request = SignupRequest {
            password: "password".into(),
            ..signup()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn missing_referral_code_fails_validation() {
        let request = SignupRequest {
            referral_code: "".into(),
            ..signup()
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("referral_code"));
    }
}
