use serde::{Deserialize, Serialize};

/// The alumni a member wants to contact, as shown on the directory card.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailRecipient {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub role_title: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub company_industry: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl EmailRecipient {
    pub fn is_empty(&self) -> bool {
        present(&self.name).is_none()
            && self.company().is_none()
            && self.role().is_none()
            && self.industry().is_none()
    }

    pub fn name(&self) -> &str {
        present(&self.name).unwrap_or("there")
    }

    pub fn first_name(&self) -> &str {
        self.name().split_whitespace().next().unwrap_or("there")
    }

    pub fn company(&self) -> Option<&str> {
        present(&self.company).or_else(|| present(&self.company_name))
    }

    pub fn role(&self) -> Option<&str> {
        present(&self.role_title).or_else(|| present(&self.headline))
    }

    pub fn industry(&self) -> Option<&str> {
        present(&self.company_industry)
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateEmailRequest {
    #[serde(default)]
    pub alumni: Option<EmailRecipient>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedEmail {
    pub success: bool,
    pub email: String,
    pub subject: String,
}
