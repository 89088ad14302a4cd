use crate::entities::alumni::CsvAlumni;

fn seed_row(
    row_id: i64,
    name: &str,
    role_title: &str,
    company: &str,
    major: &str,
    grad_year: &str,
    handle: &str,
    phone: &str,
) -> CsvAlumni {
    CsvAlumni {
        row_id,
        name: name.to_string(),
        email: format!("{}@example.com", handle.replace('-', ".")),
        major: major.to_string(),
        grad_year: grad_year.to_string(),
        company: company.to_string(),
        role_title: role_title.to_string(),
        linkedin: format!("https://www.linkedin.com/in/{}", handle),
        phone: phone.to_string(),
        companies_list: vec![company.to_string()],
        roles_list: vec![role_title.to_string()],
        ..CsvAlumni::default()
    }
}

/// Directory served when neither the local export nor the remote one loads.
pub fn seed_alumni() -> Vec<CsvAlumni> {
    vec![
        seed_row(0, "Jordan Kim", "Software Engineer", "Stripe", "Computer Science", "2024", "jordan-kim", "(555) 201-0001"),
        seed_row(1, "Priya Shah", "Data Scientist", "Capital One", "Data Science", "2023", "priya-shah", "(555) 201-0002"),
        seed_row(2, "Miguel Torres", "Product Manager", "Amazon", "Industrial Engineering", "2022", "miguel-torres", "(555) 201-0003"),
    ]
}
