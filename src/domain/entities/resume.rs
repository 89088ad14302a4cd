use actix_multipart::form::{bytes::Bytes, MultipartForm};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// Characters of extracted resume text stored on the profile.
pub const RAW_TEXT_LIMIT: usize = 5000;
/// Skills copied into the profile bio.
pub const BIO_SKILL_LIMIT: usize = 20;

/// Size limits come from the app's `MultipartFormConfig`.
#[derive(MultipartForm)]
pub struct ResumeUploadForm {
    pub resume: Bytes,
}

/// Structured resume as returned by the language model.
///
/// Models return `null`, strings or numbers unpredictably, so every field
/// tolerates missing and mistyped values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedResume {
    #[serde(deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub linkedin_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub major: Option<String>,
    #[serde(deserialize_with = "lenient_year")]
    pub graduation_year: Option<i32>,
    #[serde(deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub work_experience: Vec<WorkExperience>,
    #[serde(deserialize_with = "lenient_list")]
    pub education: Vec<EducationEntry>,
    #[serde(deserialize_with = "lenient_list")]
    pub projects: Vec<ProjectEntry>,
    #[serde(deserialize_with = "lenient_strings")]
    pub clubs: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub courses: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub industries: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkExperience {
    #[serde(deserialize_with = "lenient_string")]
    pub company: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub school: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub degree: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub major: Option<String>,
    #[serde(deserialize_with = "lenient_year")]
    pub graduation_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub technologies: Vec<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(match value {
        JsonValue::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(match value {
        JsonValue::Number(n) => n.as_i64().map(|v| v as i32).or_else(|| n.as_f64().map(|v| v as i32)),
        JsonValue::String(s) => crate::entities::alumni::parse_grad_year(&s),
        _ => None,
    })
    .map(|year| year.filter(|y| (1900..=2100).contains(y)))
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(match value {
        JsonValue::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                JsonValue::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(match value {
        JsonValue::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Profile columns written after a resume is parsed. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeProfileUpdate {
    pub raw_resume_text: String,
    pub major: Option<String>,
    pub graduation_year: Option<i32>,
    pub linkedin_url: Option<String>,
    pub location: Option<String>,
    pub personal_email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub companies: Option<Vec<String>>,
    pub roles: Option<Vec<String>>,
    pub career_interests: Option<Vec<String>>,
}

impl ResumeProfileUpdate {
    pub fn from_parsed(raw_text: &str, parsed: &ParsedResume) -> Self {
        let companies: Vec<String> = parsed
            .work_experience
            .iter()
            .filter_map(|job| job.company.clone())
            .collect();
        let roles: Vec<String> = parsed
            .work_experience
            .iter()
            .filter_map(|job| job.title.clone())
            .collect();

        let bio = if parsed.skills.is_empty() {
            None
        } else {
            let skills: Vec<&str> = parsed
                .skills
                .iter()
                .take(BIO_SKILL_LIMIT)
                .map(String::as_str)
                .collect();
            Some(format!("Skills: {}", skills.join(", ")))
        };

        ResumeProfileUpdate {
            raw_resume_text: raw_text.chars().take(RAW_TEXT_LIMIT).collect(),
            major: parsed.major.clone(),
            graduation_year: parsed.graduation_year,
            linkedin_url: parsed.linkedin_url.clone(),
            location: parsed.location.clone(),
            personal_email: parsed.email.clone(),
            phone: parsed.phone.clone(),
            bio,
            companies: Some(companies).filter(|c| !c.is_empty()),
            roles: Some(roles).filter(|r| !r.is_empty()),
            career_interests: Some(parsed.industries.clone()).filter(|i| !i.is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResumeUploadResponse {
    pub success: bool,
    pub message: String,
    pub parsed_data: ParsedResume,
    pub profile: crate::entities::profile::UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_resume_tolerates_nulls_and_mixed_types() {
        let parsed: ParsedResume = serde_json::from_str(
            r#"{
                "full_name": "Miguel Torres",
                "email": null,
                "graduation_year": "2025",
                "skills": ["Rust", null, "  ", "SQL"],
                "work_experience": [{"company": "Stripe", "title": "Intern"}, "garbage"],
                "industries": null
            }"#,
        )
        .unwrap();

        assert_eq!(parsed.full_name.as_deref(), Some("Miguel Torres"));
        assert_eq!(parsed.email, None);
        assert_eq!(parsed.graduation_year, Some(2025));
        assert_eq!(parsed.skills, vec!["Rust", "SQL"]);
        assert_eq!(parsed.work_experience.len(), 1);
        assert!(parsed.industries.is_empty());
    }

    #[test]
    fn profile_update_maps_experience_and_skills() {
        let parsed = ParsedResume {
            skills: (0..30).map(|i| format!("skill{}", i)).collect(),
            work_experience: vec![
                WorkExperience {
                    company: Some("Stripe".into()),
                    title: Some("Software Engineer Intern".into()),
                    ..Default::default()
                },
                WorkExperience {
                    company: Some("Purdue".into()),
                    title: None,
                    ..Default::default()
                },
            ],
            industries: vec!["Fintech".into()],
            ..Default::default()
        };
        let raw = "x".repeat(RAW_TEXT_LIMIT + 100);

        let update = ResumeProfileUpdate::from_parsed(&raw, &parsed);

        assert_eq!(update.raw_resume_text.len(), RAW_TEXT_LIMIT);
        assert_eq!(update.companies, Some(vec!["Stripe".to_string(), "Purdue".to_string()]));
        assert_eq!(update.roles, Some(vec!["Software Engineer Intern".to_string()]));
        assert_eq!(update.career_interests, Some(vec!["Fintech".to_string()]));
        let bio = update.bio.unwrap();
        assert!(bio.starts_with("Skills: skill0, skill1"));
        assert!(bio.ends_with("skill19"));
    }

    #[test]
    fn empty_parse_leaves_profile_fields_untouched() {
        let update = ResumeProfileUpdate::from_parsed("text", &ParsedResume::default());
        assert_eq!(update.bio, None);
        assert_eq!(update.companies, None);
        assert_eq!(update.major, None);
    }
}
