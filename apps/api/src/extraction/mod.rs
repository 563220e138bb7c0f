//! Turns an uploaded resume (PDF, DOCX or plain text) into plain text.
//!
//! Format is detected from the filename first and the leading bytes second.
//! PDF pages without a text layer are rendered and run through OCR.

pub mod docx;
pub mod ocr;
pub mod pdf;
pub mod plain;

use std::io::Cursor;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::extraction::ocr::PageOcr;

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Parsing succeeded but nothing but whitespace came out.
    #[error("No text extracted from resume")]
    NoText,

    #[error("PDF parse error: {0}")]
    Pdf(String),

    #[error("DOCX parse error: {0}")]
    Docx(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    /// Extension wins; unknown extensions fall back to content sniffing.
    pub fn detect(filename: &str, bytes: &[u8]) -> Self {
        let name = filename.to_lowercase();
        if name.ends_with(".pdf") {
            return DocumentFormat::Pdf;
        }
        if name.ends_with(".docx") {
            return DocumentFormat::Docx;
        }
        if bytes.starts_with(PDF_MAGIC) {
            return DocumentFormat::Pdf;
        }
        if bytes.starts_with(ZIP_MAGIC) && is_word_container(bytes) {
            return DocumentFormat::Docx;
        }
        DocumentFormat::PlainText
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::PlainText => "text",
        }
    }
}

fn is_word_container(bytes: &[u8]) -> bool {
    zip::ZipArchive::new(Cursor::new(bytes))
        .map(|archive| archive.file_names().any(|name| name == docx::DOCUMENT_PART))
        .unwrap_or(false)
}

/// Stateless apart from the injected OCR backend; cheap to clone.
#[derive(Clone)]
pub struct TextExtractor {
    ocr: Arc<dyn PageOcr>,
    ocr_dpi: u32,
}

impl TextExtractor {
    pub fn new(ocr: Arc<dyn PageOcr>, ocr_dpi: u32) -> Self {
        Self { ocr, ocr_dpi }
    }

    /// Extracts plain text from `bytes`, dispatching on the detected format.
    ///
    /// Returns `ExtractError::NoText` for empty input and for documents whose
    /// extracted text is whitespace only.
    pub fn extract(&self, bytes: &[u8], filename: &str) -> Result<String, ExtractError> {
        if bytes.is_empty() {
            debug!("Empty upload for {filename}");
            return Err(ExtractError::NoText);
        }

        let format = DocumentFormat::detect(filename, bytes);
        info!(
            "Extracting {} ({} bytes) as {}",
            filename,
            bytes.len(),
            format.as_str()
        );

        let text = match format {
            DocumentFormat::Pdf => pdf::extract_text(bytes, self.ocr.as_ref(), self.ocr_dpi)?,
            DocumentFormat::Docx => docx::extract_text(bytes)?,
            DocumentFormat::PlainText => plain::decode_lossy(bytes),
        };

        if text.trim().is_empty() {
            return Err(ExtractError::NoText);
        }
        Ok(text)
    }
}
