//! Per-page text extraction with lopdf.

use std::path::Path;

use lopdf::Document;
use tracing::debug;

use econtag_common::error::{EcontagError, Result};

/// Extract text page by page, in document order.
///
/// A page whose content stream cannot be decoded yields an empty string
/// rather than failing the document; the section extractor tolerates
/// empty pages. Only a document that cannot be opened at all is an error.
pub fn extract_page_texts(path: &Path) -> Result<Vec<String>> {
    let doc = Document::load(path)
        .map_err(|e| EcontagError::Pdf(format!("{}: {e}", path.display())))?;

    let pages: Vec<String> = doc
        .get_pages()
        .keys()
        .map(|page_num| doc.extract_text(&[*page_num]).unwrap_or_default())
        .collect();

    debug!(path = %path.display(), n_pages = pages.len(), "PDF text extracted");
    Ok(pages)
}
