use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::alumni::{parse_grad_year, CsvAlumni};

/// A member's editable profile, one per user account.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub full_name: String,
    pub major: Option<String>,
    pub graduation_year: Option<i32>,
    pub companies: Vec<String>,
    pub roles: Vec<String>,
    pub current_company: Option<String>,
    pub current_title: Option<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    pub personal_email: Option<String>,
    pub professional_email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub career_interests: Vec<String>,
    pub target_industries: Vec<String>,
    pub target_companies: Vec<String>,
    pub profile_image_url: Option<String>,
    pub resume_url: Option<String>,
    #[serde(skip_serializing)]
    pub raw_resume_text: Option<String>,
    pub email_template: Option<String>,
    pub onboarding_completed: bool,
    pub is_director: bool,
    pub signup_referral_code: Option<String>,
    pub csv_source_id: Option<i64>,
    pub is_csv_linked: bool,
    pub csv_match_type: Option<String>,
    pub csv_match_confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// The CSV row this profile represents, if the link is active.
    pub fn linked_csv_row(&self) -> Option<i64> {
        if self.is_csv_linked { self.csv_source_id } else { None }
    }

    pub fn first_name(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or("")
    }

    /// Text describing the member, used as the embedding query for recommendations.
    pub fn embedding_text(&self) -> String {
        let mut parts = Vec::new();

        if !self.full_name.trim().is_empty() {
            parts.push(format!("Name: {}", self.full_name));
        }
        if let Some(major) = non_blank(&self.major) {
            parts.push(format!("Major: {}", major));
        }
        if !self.roles.is_empty() {
            parts.push(format!("Roles: {}", self.roles.join(", ")));
        }
        if !self.companies.is_empty() {
            parts.push(format!("Companies: {}", self.companies.join(", ")));
        }
        if let Some(title) = non_blank(&self.current_title) {
            parts.push(format!("Title: {}", title));
        }
        if let Some(company) = non_blank(&self.current_company) {
            parts.push(format!("Company: {}", company));
        }
        if !self.career_interests.is_empty() {
            parts.push(format!("Interests: {}", self.career_interests.join(", ")));
        }
        if !self.target_industries.is_empty() {
            parts.push(format!("Target Industries: {}", self.target_industries.join(", ")));
        }
        if let Some(bio) = non_blank(&self.bio) {
            parts.push(format!("Bio: {}", bio.chars().take(500).collect::<String>()));
        }
        if let Some(location) = non_blank(&self.location) {
            parts.push(format!("Location: {}", location));
        }

        if parts.is_empty() {
            "Alumni member".to_string()
        } else {
            parts.join("\n")
        }
    }
}

/// Returns the trimmed value when it is present and not blank.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Row written alongside a new user account.
#[derive(Debug, Clone, Default)]
pub struct ProfileInsert {
    pub full_name: String,
    pub major: Option<String>,
    pub graduation_year: Option<i32>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    pub personal_email: String,
    pub phone: Option<String>,
    pub is_director: bool,
    pub signup_referral_code: String,
}

/// Fields a member may change through `PUT /api/profile`. Anything else in
/// the request body is ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 200, message = "Full name must be 1-200 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 200))]
    pub major: Option<String>,

    #[validate(range(min = 1900, max = 2100, message = "Graduation year is out of range"))]
    pub graduation_year: Option<i32>,

    pub companies: Option<Vec<String>>,
    pub roles: Option<Vec<String>>,
    pub current_company: Option<String>,
    pub current_title: Option<String>,
    pub location: Option<String>,

    #[validate(length(max = 500))]
    pub linkedin_url: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub personal_email: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub professional_email: Option<String>,

    #[validate(length(max = 50))]
    pub phone: Option<String>,

    #[validate(length(max = 5000))]
    pub bio: Option<String>,

    pub career_interests: Option<Vec<String>>,
    pub target_industries: Option<Vec<String>>,
    pub target_companies: Option<Vec<String>>,

    #[validate(url(message = "Invalid image URL"))]
    pub profile_image_url: Option<String>,

    pub onboarding_completed: Option<bool>,

    #[validate(length(max = 5000))]
    pub email_template: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.major.is_none()
            && self.graduation_year.is_none()
            && self.companies.is_none()
            && self.roles.is_none()
            && self.current_company.is_none()
            && self.current_title.is_none()
            && self.location.is_none()
            && self.linkedin_url.is_none()
            && self.personal_email.is_none()
            && self.professional_email.is_none()
            && self.phone.is_none()
            && self.bio.is_none()
            && self.career_interests.is_none()
            && self.target_industries.is_none()
            && self.target_companies.is_none()
            && self.profile_image_url.is_none()
            && self.onboarding_completed.is_none()
            && self.email_template.is_none()
    }

    pub fn completes_onboarding(&self) -> bool {
        self.onboarding_completed == Some(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    SingleNameMatch,
    NameAndEmailMatch,
    UserConfirmed,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::SingleNameMatch => "single_name_match",
            MatchType::NameAndEmailMatch => "name_and_email_match",
            MatchType::UserConfirmed => "user_confirmed",
        }
    }
}

/// Link between a profile and the CSV row it represents.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvLink {
    pub csv_source_id: i64,
    pub match_type: MatchType,
    pub confidence: f64,
}

/// Values copied from a CSV row when a member confirms the row is theirs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CsvPrefill {
    pub major: Option<String>,
    pub graduation_year: Option<i32>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    pub companies: Option<Vec<String>>,
    pub roles: Option<Vec<String>>,
    pub profile_image_url: Option<String>,
}

impl From<&CsvAlumni> for CsvPrefill {
    fn from(row: &CsvAlumni) -> Self {
        let text = |v: &str| Some(v.trim().to_string()).filter(|v| !v.is_empty());
        let list = |v: &Vec<String>| Some(v.clone()).filter(|v| !v.is_empty());

        CsvPrefill {
            major: text(&row.major),
            graduation_year: parse_grad_year(&row.grad_year),
            location: text(&row.location),
            linkedin_url: text(&row.linkedin),
            companies: list(&row.companies_list),
            roles: list(&row.roles_list),
            profile_image_url: text(&row.profile_image_url),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct MatchProfileRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Candidate CSV row shown during onboarding.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchCandidate {
    pub csv_index: i64,
    pub name: String,
    pub email: String,
    pub similarity: f64,
    pub email_match: bool,
    pub confidence: f64,
    pub profile_image_url: String,
    pub role_title: String,
    pub roles_list: Vec<String>,
    pub company: String,
    pub companies_list: Vec<String>,
    pub major: String,
    pub grad_year: String,
    pub location: String,
    pub linkedin: String,
}

#[derive(Debug, Serialize)]
pub struct MatchProfileResponse {
    pub success: bool,
    pub count: usize,
    pub matches: Vec<MatchCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct LinkProfileRequest {
    pub csv_index: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LinkedCsvSummary {
    pub name: String,
    pub major: Option<String>,
    pub graduation_year: Option<i32>,
    pub companies: Vec<String>,
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LinkProfileResponse {
    pub success: bool,
    pub message: String,
    pub profile: UserProfile,
    pub csv_data: LinkedCsvSummary,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub profile: UserProfile,
}
