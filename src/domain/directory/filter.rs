use std::cmp::Ordering;
use std::collections::HashSet;

use crate::entities::alumni::{parse_grad_year, AlumniQuery, AlumniRecord, SortKey, SortOrder};

/// Lowercased, trimmed selection set. Empty means "no constraint".
struct Selection(HashSet<String>);

impl Selection {
    fn new(values: &[String]) -> Self {
        Selection(
            values
                .iter()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect(),
        )
    }

    fn is_open(&self) -> bool {
        self.0.is_empty()
    }

    fn contains(&self, value: &str) -> bool {
        self.0.contains(&value.trim().to_lowercase())
    }

    fn any<'a>(&self, values: impl IntoIterator<Item = &'a String>) -> bool {
        values.into_iter().any(|v| self.contains(v))
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Applies every filter in `query` and returns the matching records in their
/// original order.
pub fn apply_filters(records: Vec<AlumniRecord>, query: &AlumniQuery) -> Vec<AlumniRecord> {
    let name = query.name.as_deref().map(|n| n.trim().to_lowercase());
    let title = query.title.as_deref().map(|t| t.trim().to_lowercase());
    let majors = Selection::new(&query.majors);
    let companies = Selection::new(&query.companies);
    let schools = Selection::new(&query.schools);
    let industries = Selection::new(&query.industries);
    let years: HashSet<String> = query
        .grad_years
        .iter()
        .map(|y| normalize_year(y))
        .filter(|y| !y.is_empty())
        .collect();

    records
        .into_iter()
        .filter(|record| {
            if let Some(name) = name.as_deref().filter(|n| !n.is_empty()) {
                if !contains_ci(&record.name, name) {
                    return false;
                }
            }

            if let Some(title) = title.as_deref().filter(|t| !t.is_empty()) {
                if !contains_ci(&record.role_title, title) && !contains_ci(&record.headline, title) {
                    return false;
                }
            }

            if !majors.is_open() && !majors.contains(&record.major) {
                return false;
            }

            if !years.is_empty() && !years.contains(&normalize_year(&record.grad_year)) {
                return false;
            }

            if !companies.is_open() {
                let matched = if record.companies_list.is_empty() {
                    companies.contains(&record.company)
                } else {
                    companies.any(&record.companies_list)
                };
                if !matched {
                    return false;
                }
            }

            if !schools.is_open() && !schools.any(&record.schools_list) {
                return false;
            }

            if !industries.is_open() && !industries.contains(&record.company_industry) {
                return false;
            }

            true
        })
        .collect()
}

/// "2024.0" and "2024" select the same cohort.
fn normalize_year(raw: &str) -> String {
    parse_grad_year(raw)
        .map(|y| y.to_string())
        .unwrap_or_else(|| raw.trim().to_lowercase())
}

/// Stable sort of `records` by `key`.
///
/// Graduation year compares numerically with unparseable years last in
/// both directions. Text keys compare case-insensitively with blank values last.
pub fn sort_records(records: &mut [AlumniRecord], key: SortKey, order: SortOrder) {
    match key {
        SortKey::GradYear => {
            records.sort_by(|a, b| nulls_last(a.grad_year_number(), b.grad_year_number(), order));
        }
        _ => {
            records.sort_by(|a, b| nulls_last(text_key(a, key), text_key(b, key), order));
        }
    }
}

fn text_key(record: &AlumniRecord, key: SortKey) -> Option<String> {
    let value = match key {
        SortKey::Name => &record.name,
        SortKey::Company => &record.company,
        SortKey::RoleTitle => &record.role_title,
        SortKey::Major => &record.major,
        SortKey::GradYear => &record.grad_year,
    };
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_lowercase())
    }
}

fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Asc => a.cmp(&b),
            SortOrder::Desc => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filters then sorts when `sort_by` is present.
pub fn run_query(records: Vec<AlumniRecord>, query: &AlumniQuery) -> Vec<AlumniRecord> {
    let mut filtered = apply_filters(records, query);
    if let Some(key) = query.sort_by {
        sort_records(&mut filtered, key, query.order);
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::alumni::{AlumniSource, CsvAlumni};

    fn record(row_id: i64, name: &str, year: &str, company: &str, major: &str) -> AlumniRecord {
        AlumniRecord::from_csv(&CsvAlumni {
            row_id,
            name: name.into(),
            grad_year: year.into(),
            company: company.into(),
            major: major.into(),
            role_title: format!("{} Analyst", company),
            companies_list: if company.is_empty() { vec![] } else { vec![company.into(), "Purdue".into()] },
            schools_list: vec!["Purdue University".into()],
            company_industry: "Technology".into(),
            ..CsvAlumni::default()
        })
    }

    fn sample() -> Vec<AlumniRecord> {
        vec![
            record(0, "Jordan Kim", "2020", "Google", "Computer Science"),
            record(1, "Priya Shah", "", "McKinsey", "Finance"),
            record(2, "Miguel Torres", "2024.0", "Stripe", "Computer Science"),
            record(3, "ana lopez", "2019", "", "Economics"),
        ]
    }

    fn ids(records: &[AlumniRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let query = AlumniQuery { name: Some("KIM".into()), ..Default::default() };
        assert_eq!(ids(&apply_filters(sample(), &query)), vec!["csv_0"]);
    }

    #[test]
    fn title_matches_role_or_headline() {
        let mut records = sample();
        records[3].role_title = String::new();
        records[3].headline = "Product analyst at Meta".into();
        let query = AlumniQuery { title: Some("analyst".into()), ..Default::default() };

        assert_eq!(apply_filters(records, &query).len(), 4);
    }

    #[test]
    fn multi_select_uses_set_membership() {
        let query = AlumniQuery {
            majors: vec!["computer science".into()],
            grad_years: vec!["2024".into()],
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(sample(), &query)), vec!["csv_2"]);
    }

    #[test]
    fn company_matches_any_list_element() {
        let query = AlumniQuery { companies: vec!["Purdue".into()], ..Default::default() };
        assert_eq!(ids(&apply_filters(sample(), &query)), vec!["csv_0", "csv_1", "csv_2"]);
    }

    #[test]
    fn empty_selection_places_no_constraint() {
        let filtered = apply_filters(sample(), &AlumniQuery::default());
        assert_eq!(filtered.len(), 4);
    }

    #[test]
    fn industry_and_school_filters() {
        let mut records = sample();
        records[1].company_industry = "Consulting".into();
        let query = AlumniQuery {
            industries: vec!["consulting".into()],
            schools: vec!["Purdue University".into()],
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(records, &query)), vec!["csv_1"]);
    }

    #[test]
    fn grad_year_sort_puts_nulls_last_both_ways() {
        let mut records = sample();
        sort_records(&mut records, SortKey::GradYear, SortOrder::Asc);
        assert_eq!(ids(&records), vec!["csv_3", "csv_0", "csv_2", "csv_1"]);

        sort_records(&mut records, SortKey::GradYear, SortOrder::Desc);
        assert_eq!(ids(&records), vec!["csv_2", "csv_0", "csv_3", "csv_1"]);
    }

    #[test]
    fn text_sort_is_case_insensitive_with_blanks_last() {
        let mut records = sample();
        sort_records(&mut records, SortKey::Name, SortOrder::Asc);
        assert_eq!(ids(&records), vec!["csv_3", "csv_0", "csv_2", "csv_1"]);

        sort_records(&mut records, SortKey::Company, SortOrder::Desc);
        assert_eq!(ids(&records), vec!["csv_2", "csv_1", "csv_0", "csv_3"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut records = sample();
        sort_records(&mut records, SortKey::Major, SortOrder::Asc);
        assert_eq!(ids(&records), vec!["csv_0", "csv_2", "csv_3", "csv_1"]);
    }

    #[test]
    fn offered_options_with_commas_round_trip_through_query_string() {
        let rows = vec![
            CsvAlumni {
                row_id: 0,
                name: "Dana Reyes".into(),
                company: "Goldman Sachs & Co., LLC".into(),
                companies_list: vec!["Goldman Sachs & Co., LLC".into()],
                major: "Economics, Minor in CS".into(),
                ..CsvAlumni::default()
            },
            CsvAlumni {
                row_id: 1,
                name: "Sam Ortiz".into(),
                company: "LLC".into(),
                companies_list: vec!["LLC".into()],
                major: "Economics".into(),
                ..CsvAlumni::default()
            },
        ];
        let options = crate::directory::options::filter_options(&rows);
        let company = options.companies.iter().find(|c| c.contains(',')).unwrap();
        let major = options.majors.iter().find(|m| m.contains(',')).unwrap();

        let qs = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("company", company)
            .append_pair("major", major)
            .finish();
        let query = AlumniQuery::from_query_string(&qs).unwrap();
        let records = rows.iter().map(AlumniRecord::from_csv).collect();

        assert_eq!(ids(&run_query(records, &query)), vec!["csv_0"]);
    }

    #[test]
    fn run_query_filters_then_sorts() {
        let query = AlumniQuery {
            majors: vec!["Computer Science".into()],
            sort_by: Some(SortKey::GradYear),
            order: SortOrder::Desc,
            ..Default::default()
        };
        let result = run_query(sample(), &query);
        assert_eq!(ids(&result), vec!["csv_2", "csv_0"]);
        assert!(result.iter().all(|r| r.source == AlumniSource::Csv));
    }
}
