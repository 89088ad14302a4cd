//! Pure directory logic: merging, filtering, sorting and matching over the
//! CSV snapshot and member profiles. Nothing here touches I/O.

pub mod filter;
pub mod matcher;
pub mod merge;
pub mod options;
pub mod search;
pub mod similarity;

pub use filter::{apply_filters, run_query, sort_records};
pub use matcher::{candidate_matches, find_csv_match, name_similarity, CsvMatch};
pub use merge::merge_alumni;
pub use options::filter_options;
pub use similarity::{cosine_similarity, rank_by_similarity};
