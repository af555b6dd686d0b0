//! PDF text extraction.

use std::path::Path;

use crate::extract::ExtractError;

/// Per-page text of a PDF on disk.  Blocking.
pub trait PdfTextExtractor: Send + Sync {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractError>;
}

/// `lopdf`-backed extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl PdfTextExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
        let doc = lopdf::Document::load(path).map_err(|e| ExtractError::Pdf(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(ExtractError::Pdf("document is encrypted".into()));
        }

        let pages = doc.get_pages();
        let mut texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => texts.push(page_text(text)),
                Err(e) => {
                    log::debug!("No extractable text on page {page_number}: {e}");
                    texts.push(String::new());
                }
            }
        }
        Ok(texts)
    }
}

/// lopdf closes every text object with a line break; drop the trailing
/// ones so a page's text ends at its last glyph.
fn page_text(mut text: String) -> String {
    let end = text.trim_end_matches(['\r', '\n']).len();
    text.truncate(end);
    text
}

/// Join page texts with `\n`, skipping pages that produced no text.
/// Whitespace-only pages still count as text.
pub fn join_pages(pages: Vec<String>) -> String {
    pages
        .into_iter()
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
