use tracing::{debug, info};

use crate::extraction::ocr::PageOcr;
use crate::extraction::ExtractError;

/// Extracts the text layer of every page in order. Pages whose text layer is
/// empty are rendered at `dpi` and handed to `ocr`.
///
/// Each non-empty page contributes its text followed by a newline.
pub fn extract_text(bytes: &[u8], ocr: &dyn PageOcr, dpi: u32) -> Result<String, ExtractError> {
    let layers = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    debug!("PDF has {} pages", layers.len());

    let mut text = String::new();
    let mut ocr_pages = 0usize;
    for (page, layer) in (1u32..).zip(layers) {
        let page_text = if layer.trim().is_empty() {
            ocr_pages += 1;
            info!("Page {page} has no text layer, running OCR at {dpi} DPI");
            ocr.recognize(bytes, page, dpi)?
        } else {
            layer
        };

        let page_text = page_text.trim_end();
        if !page_text.is_empty() {
            text.push_str(page_text);
            text.push('\n');
        }
    }

    if ocr_pages > 0 {
        info!("OCR used on {ocr_pages} page(s)");
    }
    Ok(text)
}
