use std::collections::{HashMap, HashSet};
use std::io::Read;

use csv::{ReaderBuilder, StringRecord};

use super::CsvError;
use crate::entities::alumni::{parse_grad_year, CsvAlumni};

/// Column lookup by header name.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        Columns(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_string(), i))
                .collect(),
        )
    }

    fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// First non-missing column among `names`, trimmed. Missing columns read as "".
    fn get(&self, record: &StringRecord, names: &[&str]) -> String {
        names
            .iter()
            .find_map(|name| self.0.get(*name))
            .and_then(|i| record.get(*i))
            .map(clean)
            .unwrap_or_default()
    }
}

/// Blank-like spreadsheet values become empty strings.
fn clean(raw: &str) -> String {
    let value = raw.trim();
    match value {
        "nan" | "NaN" | "null" | "None" => String::new(),
        _ => value.to_string(),
    }
}

fn non_blank(values: &[String]) -> Vec<String> {
    values.iter().filter(|v| !v.is_empty()).cloned().collect()
}

fn normalize_year(raw: &str) -> String {
    parse_grad_year(raw).map(|y| y.to_string()).unwrap_or_default()
}

fn linkedin_row(row_id: i64, cols: &Columns, record: &StringRecord) -> CsvAlumni {
    let job_title = cols.get(record, &["linkedinJobTitle"]);
    let headline = cols.get(record, &["linkedinHeadline"]);
    let company = cols.get(record, &["companyName"]);

    let mut roles_list = non_blank(&[job_title.clone(), cols.get(record, &["linkedinPreviousJobTitle"])]);
    if roles_list.is_empty() && !headline.is_empty() {
        roles_list.push(headline.clone());
    }

    CsvAlumni {
        row_id,
        name: cols.get(record, &["Name"]),
        email: cols.get(record, &["Personal Gmail"]),
        professional_email: cols.get(record, &["professionalEmail"]),
        major: cols.get(record, &["Major"]),
        grad_year: normalize_year(&cols.get(record, &["Grad Yr"])),
        role_title: if cols.has("linkedinJobTitle") { job_title } else { headline.clone() },
        companies_list: non_blank(&[company.clone(), cols.get(record, &["previousCompanyName"])]),
        company,
        company_industry: cols.get(record, &["companyIndustry"]),
        location: cols.get(record, &["location", "linkedinJobLocation"]),
        linkedin: cols.get(record, &["linkedinProfileUrl", "Linkedin"]),
        phone: String::new(),
        profile_image_url: cols.get(record, &["supabaseProfileImageUrl"]),
        headline,
        roles_list,
        schools_list: non_blank(&[
            cols.get(record, &["linkedinSchoolName"]),
            cols.get(record, &["linkedinPreviousSchoolName"]),
        ]),
    }
}

fn simple_row(row_id: i64, cols: &Columns, record: &StringRecord) -> CsvAlumni {
    let company = cols.get(record, &["company"]);
    let role_title = cols.get(record, &["role_title"]);

    CsvAlumni {
        row_id,
        name: cols.get(record, &["name"]),
        email: cols.get(record, &["email"]),
        professional_email: cols.get(record, &["professional_email"]),
        major: cols.get(record, &["major"]),
        grad_year: {
            let raw = cols.get(record, &["grad_year"]);
            parse_grad_year(&raw).map(|y| y.to_string()).unwrap_or(raw)
        },
        companies_list: non_blank(&[company.clone()]),
        roles_list: non_blank(&[role_title.clone()]),
        company,
        role_title,
        headline: cols.get(record, &["headline"]),
        company_industry: cols.get(record, &["company_industry"]),
        location: cols.get(record, &["location"]),
        linkedin: cols.get(record, &["linkedin"]),
        phone: cols.get(record, &["phone"]),
        profile_image_url: cols.get(record, &["profile_image_url"]),
        schools_list: Vec::new(),
    }
}

/// Parses and normalises an alumni export.
///
/// `row_id` is the record's position in the file, counted before duplicates
/// and blank names are dropped, so ids stay stable across reloads.
pub fn load_alumni_csv<R: Read>(reader: R) -> Result<Vec<CsvAlumni>, CsvError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| CsvError::Parse(e.to_string()))?
        .clone();
    let cols = Columns::new(&headers);
    let linkedin_layout = cols.has("Name");

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let row_id = index as i64;
        match record {
            Ok(record) if linkedin_layout => rows.push(linkedin_row(row_id, &cols, &record)),
            Ok(record) => rows.push(simple_row(row_id, &cols, &record)),
            Err(e) => tracing::warn!("Skipping malformed alumni CSV row {}: {}", row_id, e),
        }
    }

    // An export without job titles still has headlines worth showing.
    if linkedin_layout
        && cols.has("linkedinJobTitle")
        && cols.has("linkedinHeadline")
        && rows.iter().all(|r| r.role_title.is_empty())
    {
        for row in rows.iter_mut() {
            row.role_title = row.headline.clone();
        }
    }

    let mut seen = HashSet::new();
    rows.retain(|row| seen.insert((row.name.clone(), row.email.clone())));
    rows.retain(|row| !row.name.trim().is_empty());

    Ok(rows)
}
