use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, FieldError};

/// One normalised row of the alumni CSV export.
///
/// `row_id` is the zero-based position of the row in the source file and is
/// the identifier stored in `deleted_alumni`, `alumni_embeddings` and
/// `user_profiles.csv_source_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CsvAlumni {
    pub row_id: i64,
    pub name: String,
    pub email: String,
    pub professional_email: String,
    pub major: String,
    pub grad_year: String,
    pub company: String,
    pub role_title: String,
    pub headline: String,
    pub company_industry: String,
    pub location: String,
    pub linkedin: String,
    pub phone: String,
    pub profile_image_url: String,
    pub companies_list: Vec<String>,
    pub roles_list: Vec<String>,
    pub schools_list: Vec<String>,
}

impl CsvAlumni {
    /// Text used to build the row's embedding.
    pub fn embedding_text(&self) -> String {
        let parts = [
            ("Name", &self.name),
            ("Current Role", &self.role_title),
            ("Company", &self.company),
            ("Industry", &self.company_industry),
            ("Headline", &self.headline),
            ("Major", &self.major),
            ("Location", &self.location),
        ];

        parts
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(label, value)| format!("{}: {}", label, value.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlumniSource {
    Csv,
    UserProfile,
    NewUser,
}

/// A record in the merged directory view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlumniRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_row_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub professional_email: String,
    pub major: String,
    pub grad_year: String,
    pub company: String,
    pub role_title: String,
    pub headline: String,
    pub company_industry: String,
    pub location: String,
    pub linkedin: String,
    pub phone: String,
    pub profile_image_url: String,
    pub companies_list: Vec<String>,
    pub roles_list: Vec<String>,
    pub schools_list: Vec<String>,
    pub is_linked: bool,
    pub source: AlumniSource,
}

impl AlumniRecord {
    pub fn csv_id(row_id: i64) -> String {
        format!("csv_{}", row_id)
    }

    pub fn from_csv(row: &CsvAlumni) -> Self {
        AlumniRecord {
            id: Self::csv_id(row.row_id),
            csv_row_id: Some(row.row_id),
            name: row.name.clone(),
            email: row.email.clone(),
            professional_email: row.professional_email.clone(),
            major: row.major.clone(),
            grad_year: row.grad_year.clone(),
            company: row.company.clone(),
            role_title: row.role_title.clone(),
            headline: row.headline.clone(),
            company_industry: row.company_industry.clone(),
            location: row.location.clone(),
            linkedin: row.linkedin.clone(),
            phone: row.phone.clone(),
            profile_image_url: row.profile_image_url.clone(),
            companies_list: row.companies_list.clone(),
            roles_list: row.roles_list.clone(),
            schools_list: row.schools_list.clone(),
            is_linked: false,
            source: AlumniSource::Csv,
        }
    }

    /// Graduation year parsed for numeric sorting. Blank or non-numeric years are `None`.
    pub fn grad_year_number(&self) -> Option<i32> {
        parse_grad_year(&self.grad_year)
    }
}

/// Parses "2024", " 2024 " or "2024.0" into 2024.
pub fn parse_grad_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<i32>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i32))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Company,
    RoleTitle,
    GradYear,
    Major,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "company" => Ok(SortKey::Company),
            "role_title" | "title" => Ok(SortKey::RoleTitle),
            "grad_year" | "year" => Ok(SortKey::GradYear),
            "major" => Ok(SortKey::Major),
            other => Err(AppError::ValidationError(vec![FieldError::new(
                "sort_by",
                &format!("Unsupported sort key '{}'", other),
            )])),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(AppError::ValidationError(vec![FieldError::new(
                "order",
                &format!("Unsupported sort order '{}'", other),
            )])),
        }
    }
}

/// Filter and sort parameters for `GET /api/alumni`.
///
/// Multi-select fields take one exact value per repeated key (`major=A&major=B`).
/// Values are never split, since offered options may contain commas.
/// An empty selection places no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlumniQuery {
    pub name: Option<String>,
    pub title: Option<String>,
    pub majors: Vec<String>,
    pub grad_years: Vec<String>,
    pub companies: Vec<String>,
    pub schools: Vec<String>,
    pub industries: Vec<String>,
    pub sort_by: Option<SortKey>,
    pub order: SortOrder,
}

impl AlumniQuery {
    pub fn from_query_string(query: &str) -> Result<Self, AppError> {
        let mut parsed = AlumniQuery::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key.as_ref() {
                "name" => parsed.name = Some(value.to_string()),
                "title" => parsed.title = Some(value.to_string()),
                "major" => parsed.majors.push(value.to_string()),
                "grad_year" | "year" => parsed.grad_years.push(value.to_string()),
                "company" => parsed.companies.push(value.to_string()),
                "school" => parsed.schools.push(value.to_string()),
                "industry" => parsed.industries.push(value.to_string()),
                "sort_by" => parsed.sort_by = Some(value.parse()?),
                "order" => parsed.order = value.parse()?,
                _ => {}
            }
        }

        Ok(parsed)
    }
}

#[derive(Debug, Serialize)]
pub struct AlumniListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<AlumniRecord>,
}

/// Distinct values offered by the directory's filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub majors: Vec<String>,
    pub years: Vec<String>,
    pub companies: Vec<String>,
    pub schools: Vec<String>,
    pub industries: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FilterOptionsResponse {
    pub success: bool,
    pub filters: FilterOptions,
}
