use derive_more::Display;

pub mod loader;
pub mod seed;
pub mod store;

pub use loader::load_alumni_csv;
pub use store::{AlumniCsvStore, CsvOrigin};

#[derive(Debug, Display)]
pub enum CsvError {
    #[display("Cannot read alumni CSV: {_0}")]
    Io(String),

    #[display("Cannot download alumni CSV: {_0}")]
    Http(String),

    #[display("Malformed alumni CSV: {_0}")]
    Parse(String),

    #[display("Alumni row {_0} not found")]
    RowNotFound(i64),
}

impl std::error::Error for CsvError {}
