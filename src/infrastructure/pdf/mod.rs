pub mod text;

pub use text::{extract_pdf_text, is_pdf, PdfError};
