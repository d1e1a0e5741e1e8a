//! PDF processing — turns uploaded PDF bytes into a `ParsedDocs` set.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::analysis::error::ServiceError;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Text of a single PDF page. Page numbers start at 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentPage {
    pub page_number: usize,
    pub text: String,
}

/// Extracted text of one uploaded document, passed by reference to the
/// analyzer and the similarity scorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDocs {
    pub source: String,
    pub pages: Vec<DocumentPage>,
}

impl ParsedDocs {
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Builds a document set from per-page text. Blank pages are dropped and
    /// the remaining pages are numbered from 1.
    pub fn from_pages<I, T>(source: &str, pages: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let pages = pages
            .into_iter()
            .map(|page| normalize_whitespace(page.as_ref()))
            .filter(|t| !t.is_empty())
            .enumerate()
            .map(|(i, text)| DocumentPage {
                page_number: i + 1,
                text,
            })
            .collect();

        ParsedDocs {
            source: source.to_string(),
            pages,
        }
    }

    /// Single-page document set from already-extracted text.
    #[cfg(test)]
    pub fn from_text(source: &str, text: &str) -> Self {
        Self::from_pages(source, [text])
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[async_trait]
pub trait PdfProcessor: Send + Sync {
    async fn parse(&self, bytes: Bytes, filename: &str) -> Result<ParsedDocs, ServiceError>;
}

/// Text extraction backed by the `pdf-extract` crate.
pub struct PdfExtractProcessor;

#[async_trait]
impl PdfProcessor for PdfExtractProcessor {
    async fn parse(&self, bytes: Bytes, filename: &str) -> Result<ParsedDocs, ServiceError> {
        check_pdf_bytes(&bytes, filename)?;

        // pdf-extract is CPU-bound and may panic on malformed input.
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| {
            if e.is_panic() {
                ServiceError::Processing(format!("'{filename}' could not be parsed as a PDF."))
            } else {
                ServiceError::Internal(format!("PDF extraction task failed for '{filename}': {e}"))
            }
        })?
        .map_err(|e| {
            ServiceError::Processing(format!("Failed to extract text from '{filename}': {e}"))
        })?;

        let page_count = pages.len();
        let docs = ParsedDocs::from_pages(filename, pages);
        if docs.is_empty() {
            return Err(ServiceError::Processing(format!(
                "No extractable text found in '{filename}'. The PDF may be scanned or image-only."
            )));
        }

        debug!(
            "Extracted {} of {} page(s) from '{}'",
            docs.pages.len(),
            page_count,
            filename
        );
        Ok(docs)
    }
}

fn check_pdf_bytes(bytes: &[u8], filename: &str) -> Result<(), ServiceError> {
    if bytes.is_empty() {
        return Err(ServiceError::Processing(format!("'{filename}' is empty.")));
    }
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    if !bytes[start..].starts_with(PDF_MAGIC) {
        return Err(ServiceError::Processing(format!(
            "'{filename}' is not a valid PDF document."
        )));
    }
    Ok(())
}

fn normalize_whitespace(page: &str) -> String {
    page.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
