use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::entities::alumni::CsvAlumni;
use crate::entities::chat::MemberCard;

pub const MAX_MEMBER_CARDS: usize = 10;

/// Phrases that turn a chat message into a member search.
const SEARCH_KEYWORDS: &[&str] = &[
    "find", "search", "looking for", "who works at", "anyone at", "members at",
    "alumni at", "someone at", "people at", "works in", "who is", "show me",
    "recommend", "suggest",
];

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "find", "search", "looking", "for", "who", "works", "at", "anyone", "members",
        "alumni", "someone", "people", "show", "me", "recommend", "suggest", "in", "the",
        "a", "an", "is", "are", "can", "you", "i", "want", "need", "like", "similar", "to",
        "else",
    ]
    .into_iter()
    .collect()
});

pub fn is_member_search(message: &str) -> bool {
    let message = message.to_lowercase();
    SEARCH_KEYWORDS.iter().any(|kw| message.contains(kw))
}

/// Rows whose first, last or full name appears in the message.
///
/// Name parts shorter than three characters are ignored so initials
/// don't match every message.
pub fn search_by_name(message: &str, rows: &[CsvAlumni]) -> Vec<MemberCard> {
    let message = message.to_lowercase();

    rows.iter()
        .filter(|row| {
            let name = row.name.trim().to_lowercase();
            if name.is_empty() {
                return false;
            }
            let parts: Vec<&str> = name.split_whitespace().collect();
            let first = parts.first().copied().unwrap_or("");
            let last = if parts.len() > 1 { parts[parts.len() - 1] } else { "" };

            message.contains(&name)
                || (first.len() > 2 && message.contains(first))
                || (last.len() > 2 && message.contains(last))
        })
        .take(MAX_MEMBER_CARDS)
        .map(|row| MemberCard::from_row(row, 1.0))
        .collect()
}

/// Meaningful words of the message: stop words and short words removed.
pub fn search_terms(message: &str) -> Vec<String> {
    message
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Scores rows by where the terms appear: role 3, headline 2, company 2, major 1.
/// The card similarity is `score / 10`. Highest first, at most ten.
pub fn search_by_terms(terms: &[String], rows: &[CsvAlumni]) -> Vec<MemberCard> {
    if terms.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(u32, &CsvAlumni)> = rows
        .iter()
        .filter_map(|row| {
            let role = row.role_title.to_lowercase();
            let headline = row.headline.to_lowercase();
            let company = row.company.to_lowercase();
            let major = row.major.to_lowercase();

            let score: u32 = terms
                .iter()
                .map(|term| {
                    let term = term.as_str();
                    let mut s = 0;
                    if role.contains(term) { s += 3; }
                    if headline.contains(term) { s += 2; }
                    if company.contains(term) { s += 2; }
                    if major.contains(term) { s += 1; }
                    s
                })
                .sum();

            (score > 0).then_some((score, row))
        })
        .collect();

    // Stable, so ties keep CSV order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .take(MAX_MEMBER_CARDS)
        .map(|(score, row)| MemberCard::from_row(row, score as f64 / 10.0))
        .collect()
}

/// Name search first, then term scoring. An empty result means the caller
/// should fall back to embeddings.
pub fn keyword_search(message: &str, rows: &[CsvAlumni]) -> Vec<MemberCard> {
    let by_name = search_by_name(message, rows);
    if !by_name.is_empty() {
        return by_name;
    }
    search_by_terms(&search_terms(message), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<CsvAlumni> {
        vec![
            CsvAlumni {
                row_id: 0,
                name: "Jordan Kim".into(),
                role_title: "Software Engineer".into(),
                company: "Google".into(),
                major: "Computer Science".into(),
                ..CsvAlumni::default()
            },
            CsvAlumni {
                row_id: 1,
                name: "Priya Shah".into(),
                role_title: "Consultant".into(),
                headline: "Strategy consultant focused on software".into(),
                company: "McKinsey".into(),
                major: "Finance".into(),
                ..CsvAlumni::default()
            },
            CsvAlumni {
                row_id: 2,
                name: "Miguel Torres".into(),
                role_title: "Product Manager".into(),
                company: "Stripe".into(),
                major: "Industrial Engineering".into(),
                ..CsvAlumni::default()
            },
        ]
    }

    #[test]
    fn detects_search_intent() {
        assert!(is_member_search("Can you FIND someone at Google?"));
        assert!(is_member_search("who works at Stripe"));
        assert!(!is_member_search("How should I follow up after a coffee chat?"));
    }

    #[test]
    fn name_search_matches_first_last_or_full_name() {
        let cards = search_by_name("find me torres please", &rows());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, "csv_2");
        assert_eq!(cards[0].similarity, 1.0);
    }

    #[test]
    fn terms_drop_stop_words_and_short_words() {
        assert_eq!(
            search_terms("Find me a software engineer at Google!"),
            vec!["software", "engineer", "google"]
        );
    }

    #[test]
    fn term_scoring_weights_role_above_major() {
        let cards = search_by_terms(&["engineer".to_string()], &rows());
        let ids: Vec<i64> = cards.iter().map(|c| c.csv_row_id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(cards[0].similarity, 0.3);
        assert_eq!(cards[1].similarity, 0.1);

        let cards = search_by_terms(&["software".to_string()], &rows());
        assert_eq!(cards.iter().map(|c| c.csv_row_id).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn keyword_search_falls_through_to_terms() {
        let cards = keyword_search("looking for a consultant", &rows());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Priya Shah");
        assert_eq!(cards[0].similarity, 0.5);
    }

    #[test]
    fn nothing_found_returns_empty() {
        assert!(keyword_search("search for astronauts", &rows()).is_empty());
    }
}
