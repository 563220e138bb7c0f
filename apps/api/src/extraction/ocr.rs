//! OCR fallback for PDF pages that carry no text layer.
//!
//! `TesseractOcr` shells out to poppler's `pdftoppm` to render a single page and
//! to `tesseract` to recognise it. Both binaries must be on `PATH`. A non-zero
//! exit from either tool is an `ExtractError::Ocr`.

use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Output};

use tracing::{debug, warn};

use crate::extraction::ExtractError;

/// Renders one page of a PDF and returns the recognised text.
pub trait PageOcr: Send + Sync {
    /// `page` is 1-based.
    fn recognize(&self, pdf: &[u8], page: u32, dpi: u32) -> Result<String, ExtractError>;
}

/// Used when OCR is switched off: image-only pages contribute no text.
pub struct NoOcr;

impl PageOcr for NoOcr {
    fn recognize(&self, _pdf: &[u8], page: u32, _dpi: u32) -> Result<String, ExtractError> {
        debug!("OCR disabled, skipping page {page}");
        Ok(String::new())
    }
}

#[derive(Debug, Clone)]
pub struct TesseractOcr {
    lang: String,
    pdftoppm: String,
    tesseract: String,
}

impl TesseractOcr {
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            pdftoppm: "pdftoppm".to_string(),
            tesseract: "tesseract".to_string(),
        }
    }

    /// Overrides the rasteriser and recogniser executables.
    #[cfg(test)]
    pub fn with_programs(
        mut self,
        pdftoppm: impl Into<String>,
        tesseract: impl Into<String>,
    ) -> Self {
        self.pdftoppm = pdftoppm.into();
        self.tesseract = tesseract.into();
        self
    }
}

impl PageOcr for TesseractOcr {
    fn recognize(&self, pdf: &[u8], page: u32, dpi: u32) -> Result<String, ExtractError> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.pdf");
        std::fs::write(&input, pdf)?;

        let prefix = dir.path().join("page");
        let render = run_tool(
            Command::new(&self.pdftoppm)
                .arg("-png")
                .arg("-singlefile")
                .arg("-r")
                .arg(dpi.to_string())
                .arg("-f")
                .arg(page.to_string())
                .arg("-l")
                .arg(page.to_string())
                .arg(&input)
                .arg(&prefix),
            "pdftoppm",
        )?;
        if !render.status.success() {
            return Err(ExtractError::Ocr(format!(
                "pdftoppm failed on page {page}: {}",
                String::from_utf8_lossy(&render.stderr).trim()
            )));
        }

        let image = prefix.with_extension("png");
        if !image.exists() {
            return Err(ExtractError::Ocr(format!(
                "pdftoppm produced no image for page {page}"
            )));
        }

        self.recognize_image(&image, page)
    }
}

impl TesseractOcr {
    fn recognize_image(&self, image: &Path, page: u32) -> Result<String, ExtractError> {
        let output = run_tool(
            Command::new(&self.tesseract)
                .arg(image)
                .arg("stdout")
                .arg("-l")
                .arg(&self.lang),
            "tesseract",
        )?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("tesseract exited with {} on page {page}", output.status);
            return Err(ExtractError::Ocr(format!(
                "tesseract failed on page {page}: {}",
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("OCR recognised {} chars on page {page}", text.len());
        Ok(text)
    }
}

fn run_tool(command: &mut Command, name: &str) -> Result<Output, ExtractError> {
    command.output().map_err(|e| match e.kind() {
        ErrorKind::NotFound => ExtractError::Ocr(format!("{name} is not installed")),
        _ => ExtractError::Ocr(format!("failed to run {name}: {e}")),
    })
}
