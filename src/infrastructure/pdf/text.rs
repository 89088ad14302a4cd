use derive_more::Display;

#[derive(Debug, Display, PartialEq)]
pub enum PdfError {
    #[display("File is not a PDF")]
    NotPdf,

    #[display("Could not read PDF: {_0}")]
    Extraction(String),

    #[display("PDF contains no extractable text")]
    NoText,
}

impl std::error::Error for PdfError {}

/// Sniffs the file signature rather than trusting the upload's name.
pub fn is_pdf(bytes: &[u8]) -> bool {
    infer::get(bytes)
        .map(|kind| kind.mime_type() == "application/pdf")
        .unwrap_or(false)
}

/// Text layer of a digital PDF. Scanned documents without a text layer fail
/// with [`PdfError::NoText`].
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, PdfError> {
    if !is_pdf(bytes) {
        return Err(PdfError::NotPdf);
    }

    // The extractor panics on some malformed inputs.
    let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| PdfError::Extraction("malformed document".into()))?
        .map_err(|e| PdfError::Extraction(e.to_string()))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(PdfError::NoText);
    }
    Ok(text.to_string())
}
