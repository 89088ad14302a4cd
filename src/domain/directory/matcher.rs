use similar::TextDiff;

use crate::entities::alumni::CsvAlumni;
use crate::entities::profile::{CsvLink, MatchCandidate, MatchType};

/// Similarity above which a CSV name is considered the same person.
pub const AUTO_LINK_THRESHOLD: f64 = 0.85;
/// Similarity above which a CSV row is offered as a candidate during onboarding.
pub const CANDIDATE_THRESHOLD: f64 = 0.6;
pub const MAX_CANDIDATES: usize = 5;

/// Outcome of matching a new member against the CSV snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum CsvMatch {
    Linked(CsvLink),
    /// Several rows look like the member and none shares their email.
    Ambiguous(Vec<String>),
    NoMatch,
}

pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Character diff ratio of the normalised names: `2 * matches / (len(a) + len(b))`.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (normalize_name(a), normalize_name(b));
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    TextDiff::from_chars(a.as_str(), b.as_str()).ratio() as f64
}

/// Finds the CSV row a new member most likely corresponds to.
pub fn find_csv_match(full_name: &str, email: Option<&str>, rows: &[CsvAlumni]) -> CsvMatch {
    if full_name.trim().is_empty() {
        return CsvMatch::NoMatch;
    }

    let close: Vec<(&CsvAlumni, f64)> = rows
        .iter()
        .map(|row| (row, name_similarity(full_name, &row.name)))
        .filter(|(_, similarity)| *similarity > AUTO_LINK_THRESHOLD)
        .collect();

    match close.as_slice() {
        [] => CsvMatch::NoMatch,
        [(row, similarity)] => CsvMatch::Linked(CsvLink {
            csv_source_id: row.row_id,
            match_type: MatchType::SingleNameMatch,
            confidence: *similarity,
        }),
        several => {
            let email = email.map(normalize_email).filter(|e| !e.is_empty());
            let by_email = email.and_then(|email| {
                several
                    .iter()
                    .find(|(row, _)| normalize_email(&row.email) == email)
            });

            match by_email {
                Some((row, _)) => CsvMatch::Linked(CsvLink {
                    csv_source_id: row.row_id,
                    match_type: MatchType::NameAndEmailMatch,
                    confidence: 1.0,
                }),
                None => CsvMatch::Ambiguous(several.iter().map(|(row, _)| row.name.clone()).collect()),
            }
        }
    }
}

/// Rows shown to a member who is confirming which CSV entry is theirs.
///
/// Email matches come first, then higher confidence.
pub fn candidate_matches(full_name: &str, email: Option<&str>, rows: &[CsvAlumni]) -> Vec<MatchCandidate> {
    let email = email.map(normalize_email).filter(|e| !e.is_empty());

    let mut candidates: Vec<MatchCandidate> = rows
        .iter()
        .filter_map(|row| {
            let similarity = name_similarity(full_name, &row.name);
            let row_email = normalize_email(&row.email);
            let email_match = email
                .as_deref()
                .is_some_and(|e| !row_email.is_empty() && e == row_email);

            if similarity <= CANDIDATE_THRESHOLD && !email_match {
                return None;
            }

            Some(MatchCandidate {
                csv_index: row.row_id,
                name: row.name.clone(),
                email: row_email,
                similarity: (similarity * 100.0).round() / 100.0,
                email_match,
                confidence: if email_match { 1.0 } else { similarity },
                profile_image_url: row.profile_image_url.clone(),
                role_title: if row.role_title.is_empty() {
                    row.headline.clone()
                } else {
                    row.role_title.clone()
                },
                roles_list: row.roles_list.clone(),
                company: row.company.clone(),
                companies_list: row.companies_list.clone(),
                major: row.major.clone(),
                grad_year: row.grad_year.clone(),
                location: row.location.clone(),
                linkedin: row.linkedin.clone(),
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.email_match
            .cmp(&a.email_match)
            .then_with(|| b.confidence.total_cmp(&a.confidence))
    });
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(row_id: i64, name: &str, email: &str) -> CsvAlumni {
        CsvAlumni {
            row_id,
            name: name.into(),
            email: email.into(),
            ..CsvAlumni::default()
        }
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_name("  Jordan   KIM "), "jordan kim");
        assert_eq!(normalize_email(" Jordan@Gmail.com "), "jordan@gmail.com");
    }

    #[test]
    fn similarity_is_one_for_equivalent_names() {
        assert_eq!(name_similarity("Jordan Kim", "jordan  kim"), 1.0);
        assert!(name_similarity("Jordan Kim", "Priya Shah") < 0.5);
    }

    #[test]
    fn single_close_name_links() {
        let rows = vec![row(0, "Jordan Kim", ""), row(1, "Priya Shah", "")];
        match find_csv_match("jordan kim", None, &rows) {
            CsvMatch::Linked(link) => {
                assert_eq!(link.csv_source_id, 0);
                assert_eq!(link.match_type, MatchType::SingleNameMatch);
                assert_eq!(link.confidence, 1.0);
            }
            other => panic!("expected link, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_names_are_resolved_by_email() {
        let rows = vec![
            row(4, "Jordan Kim", "jk1@gmail.com"),
            row(9, "Jordan Kim", "jordan.kim@gmail.com"),
        ];

        let linked = find_csv_match("Jordan Kim", Some("Jordan.Kim@gmail.com"), &rows);
        assert_eq!(
            linked,
            CsvMatch::Linked(CsvLink {
                csv_source_id: 9,
                match_type: MatchType::NameAndEmailMatch,
                confidence: 1.0,
            })
        );

        let ambiguous = find_csv_match("Jordan Kim", Some("other@gmail.com"), &rows);
        assert!(matches!(ambiguous, CsvMatch::Ambiguous(names) if names.len() == 2));
    }

    #[test]
    fn unrelated_or_blank_names_do_not_match() {
        let rows = vec![row(0, "Jordan Kim", "")];
        assert_eq!(find_csv_match("Miguel Torres", None, &rows), CsvMatch::NoMatch);
        assert_eq!(find_csv_match("  ", None, &rows), CsvMatch::NoMatch);
    }

    #[test]
    fn candidates_put_email_matches_first() {
        let rows = vec![
            row(0, "Jordan Kim", "jordan@gmail.com"),
            row(1, "Jordan Kimball", "jk@gmail.com"),
            row(2, "Totally Different", "me@gmail.com"),
            row(3, "Priya Shah", ""),
        ];

        let candidates = candidate_matches("Jordan Kim", Some("ME@gmail.com"), &rows);
        let indices: Vec<i64> = candidates.iter().map(|c| c.csv_index).collect();

        assert_eq!(indices, vec![2, 0, 1]);
        assert!(candidates[0].email_match);
        assert_eq!(candidates[0].confidence, 1.0);
        assert_eq!(candidates[1].similarity, 1.0);
    }

    #[test]
    fn candidates_are_capped() {
        let rows: Vec<CsvAlumni> = (0..8).map(|i| row(i, "Jordan Kim", "")).collect();
        assert_eq!(candidate_matches("Jordan Kim", None, &rows).len(), MAX_CANDIDATES);
    }
}
