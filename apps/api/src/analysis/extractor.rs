//! Resume text extraction — the only module that touches the PDF library.

use thiserror::Error;

/// A binary that could not be converted to text at all. Distinct from an
/// empty extraction result, which is the empty-PDF gate's job.
#[derive(Debug, Error)]
#[error("PDF extraction failed: {0}")]
pub struct ExtractionError(String);

/// Narrow seam over PDF-to-text conversion. The rest of the system never
/// branches on the integration library's shape; it sees bytes in, text out.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// pdf-extract backed extractor. The crate exposes two entry points — a
/// whole-buffer call and a per-page call — and documents that refuse one
/// sometimes still parse through the other, so both are tried in order.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        match pdf_extract::extract_text_from_mem(bytes) {
            Ok(text) => Ok(text),
            Err(whole) => match pdf_extract::extract_text_from_mem_by_pages(bytes) {
                Ok(pages) => Ok(pages.join("\n")),
                Err(paged) => Err(ExtractionError(format!(
                    "{whole}; per-page fallback: {paged}"
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_pdf_bytes_fail_closed() {
        let result = PdfTextExtractor.extract_text(b"this is not a pdf");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_input_fails_closed() {
        assert!(PdfTextExtractor.extract_text(&[]).is_err());
    }

    #[test]
    fn test_error_names_both_entry_points() {
        let err = PdfTextExtractor.extract_text(b"garbage").unwrap_err();
        assert!(err.to_string().contains("per-page fallback"));
    }
}
