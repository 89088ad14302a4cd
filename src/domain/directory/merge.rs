use std::collections::{HashMap, HashSet};

use crate::entities::{
    alumni::{AlumniRecord, AlumniSource, CsvAlumni},
    profile::{non_blank, UserProfile},
};

/// Builds the directory view from CSV rows and member profiles.
///
/// * Rows listed in `deleted_rows` are dropped.
/// * A row linked to a profile takes the profile's values, falling back to
///   the CSV value field by field. When several profiles claim one row, the
///   last in `profiles` order wins.
/// * Profiles that completed onboarding without a link are appended as new cards.
///
/// Output order is CSV order followed by new members in profile order.
pub fn merge_alumni(
    rows: &[CsvAlumni],
    profiles: &[UserProfile],
    deleted_rows: &HashSet<i64>,
) -> Vec<AlumniRecord> {
    let mut csv_links: HashMap<i64, &UserProfile> = HashMap::new();
    let mut new_members = Vec::new();

    for profile in profiles {
        match profile.linked_csv_row() {
            // Later profiles replace earlier claims on the same row.
            Some(row_id) => {
                csv_links.insert(row_id, profile);
            }
            None if profile.onboarding_completed => new_members.push(profile),
            None => {}
        }
    }

    let mut merged = Vec::with_capacity(rows.len() + new_members.len());

    for row in rows {
        if deleted_rows.contains(&row.row_id) {
            continue;
        }

        match csv_links.get(&row.row_id) {
            Some(profile) => merged.push(linked_record(row, profile)),
            None => merged.push(AlumniRecord::from_csv(row)),
        }
    }

    merged.extend(new_members.into_iter().map(new_member_record));
    merged
}

fn pick(profile_value: &Option<String>, fallback: &str) -> String {
    non_blank(profile_value)
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

fn pick_list(profile_values: &[String], fallback: &[String]) -> Vec<String> {
    if profile_values.is_empty() {
        fallback.to_vec()
    } else {
        profile_values.to_vec()
    }
}

fn pick_joined(profile_values: &[String], fallback: &str) -> String {
    if profile_values.is_empty() {
        fallback.to_string()
    } else {
        profile_values.join(", ")
    }
}

fn linked_record(row: &CsvAlumni, profile: &UserProfile) -> AlumniRecord {
    let name = if profile.full_name.trim().is_empty() {
        row.name.clone()
    } else {
        profile.full_name.clone()
    };

    AlumniRecord {
        id: AlumniRecord::csv_id(row.row_id),
        csv_row_id: Some(row.row_id),
        name,
        email: pick(&profile.personal_email, &row.email),
        professional_email: pick(&profile.professional_email, &row.professional_email),
        major: pick(&profile.major, &row.major),
        grad_year: profile
            .graduation_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| row.grad_year.clone()),
        company: pick_joined(&profile.companies, &row.company),
        role_title: pick_joined(&profile.roles, &row.role_title),
        headline: pick(&profile.current_title, &row.headline),
        company_industry: row.company_industry.clone(),
        location: pick(&profile.location, &row.location),
        linkedin: pick(&profile.linkedin_url, &row.linkedin),
        phone: pick(&profile.phone, &row.phone),
        profile_image_url: pick(&profile.profile_image_url, &row.profile_image_url),
        companies_list: pick_list(&profile.companies, &row.companies_list),
        roles_list: pick_list(&profile.roles, &row.roles_list),
        schools_list: row.schools_list.clone(),
        is_linked: true,
        source: AlumniSource::UserProfile,
    }
}

fn new_member_record(profile: &UserProfile) -> AlumniRecord {
    let text = |value: &Option<String>| non_blank(value).unwrap_or("").to_string();

    AlumniRecord {
        id: format!("user_{}", profile.user_id),
        csv_row_id: None,
        name: profile.full_name.clone(),
        email: text(&profile.personal_email),
        professional_email: text(&profile.professional_email),
        major: text(&profile.major),
        grad_year: profile.graduation_year.map(|y| y.to_string()).unwrap_or_default(),
        company: profile.companies.join(", "),
        role_title: profile.roles.join(", "),
        headline: text(&profile.current_title),
        company_industry: String::new(),
        location: text(&profile.location),
        linkedin: text(&profile.linkedin_url),
        phone: text(&profile.phone),
        profile_image_url: text(&profile.profile_image_url),
        companies_list: profile.companies.clone(),
        roles_list: profile.roles.clone(),
        schools_list: Vec::new(),
        is_linked: false,
        source: AlumniSource::NewUser,
    }
}
