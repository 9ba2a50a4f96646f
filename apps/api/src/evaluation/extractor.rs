//! PDF text extraction. Failure is an ordinary outcome: callers get an empty
//! string and skip the file.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

pub trait TextExtractor: Send + Sync {
    /// Returns best-effort plain text, or an empty string if the bytes cannot be read.
    fn extract(&self, bytes: &[u8]) -> String;
}

/// Default extractor backed by the `pdf-extract` crate.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> String {
        if bytes.is_empty() {
            return String::new();
        }

        // pdf-extract panics on some malformed documents instead of returning Err
        match catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        })) {
            Ok(Ok(pages)) => join_pages(&pages),
            Ok(Err(e)) => {
                warn!("Error reading PDF: {e}");
                String::new()
            }
            Err(_) => {
                warn!("PDF parser panicked; treating document as unreadable");
                String::new()
            }
        }
    }
}

/// Joins per-page text with newlines, dropping blank pages, and trims the result.
fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|page| page.as_ref().trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
