use std::collections::BTreeSet;

use crate::entities::alumni::{parse_grad_year, CsvAlumni, FilterOptions};

fn collect<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted distinct values for each filter dropdown.
pub fn filter_options(rows: &[CsvAlumni]) -> FilterOptions {
    let years: BTreeSet<i32> = rows.iter().filter_map(|r| parse_grad_year(&r.grad_year)).collect();

    FilterOptions {
        majors: collect(rows.iter().map(|r| &r.major)),
        years: years.into_iter().map(|y| y.to_string()).collect(),
        companies: collect(rows.iter().flat_map(|r| r.companies_list.iter())),
        schools: collect(rows.iter().flat_map(|r| r.schools_list.iter())),
        industries: collect(rows.iter().map(|r| &r.company_industry)),
    }
}
