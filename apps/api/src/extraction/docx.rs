//! DOCX text extraction.
//!
//! Reads `word/document.xml` out of the ZIP container and walks it with a
//! streaming XML reader. Body-level paragraphs come first, then the cells of
//! body-level tables in row-major order, one entry per grid column a cell
//! covers. A vertically merged continuation cell repeats the text of the cell
//! above it. Nested tables are ignored.

use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::extraction::ExtractError;

pub const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let xml = read_document_part(bytes)?;
    let parsed = parse_document(&xml)?;

    let mut text = String::new();
    for line in parsed.paragraphs.iter().chain(parsed.cells.iter()) {
        if !line.trim().is_empty() {
            text.push_str(line);
            text.push('\n');
        }
    }
    Ok(text)
}

fn read_document_part(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(format!("not a DOCX container: {e}")))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::Docx(format!("missing {DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(format!("unreadable {DOCUMENT_PART}: {e}")))?;
    Ok(xml)
}

#[derive(Debug, Default)]
struct ParsedDocument {
    paragraphs: Vec<String>,
    cells: Vec<String>,
}

#[derive(Default)]
struct CellBuilder {
    paragraphs: Vec<String>,
    grid_span: usize,
    v_merge_continue: bool,
}

/// Text of the last cell seen in each grid column of the current table.
#[derive(Default)]
struct TableGrid {
    column_texts: Vec<String>,
    column: usize,
}

impl TableGrid {
    fn place(&mut self, cell: CellBuilder, cells: &mut Vec<String>) {
        let span = cell.grid_span.max(1);
        let text = if cell.v_merge_continue {
            self.column_texts.get(self.column).cloned().unwrap_or_default()
        } else {
            cell.paragraphs.join("\n")
        };

        let end = self.column + span;
        if self.column_texts.len() < end {
            self.column_texts.resize(end, String::new());
        }
        for slot in &mut self.column_texts[self.column..end] {
            slot.clone_from(&text);
        }
        for _ in 0..span {
            cells.push(text.clone());
        }
        self.column = end;
    }
}

fn parse_document(xml: &str) -> Result<ParsedDocument, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut doc = ParsedDocument::default();

    let mut table_depth = 0usize;
    let mut paragraph_depth = 0usize;
    let mut in_text = false;
    let mut paragraph = String::new();
    let mut cell: Option<CellBuilder> = None;
    let mut grid = TableGrid::default();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractError::Docx(format!("malformed XML: {e}")))?;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => {
                    table_depth += 1;
                    if table_depth == 1 {
                        grid = TableGrid::default();
                    }
                }
                b"w:tr" if table_depth == 1 => grid.column = 0,
                b"w:tc" if table_depth == 1 => {
                    cell = Some(CellBuilder {
                        grid_span: 1,
                        ..Default::default()
                    })
                }
                b"w:p" => {
                    paragraph_depth += 1;
                    if paragraph_depth == 1 {
                        paragraph.clear();
                    }
                }
                b"w:t" if paragraph_depth == 1 && table_depth <= 1 => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if paragraph_depth == 1 => paragraph.push('\t'),
                b"w:br" | b"w:cr" if paragraph_depth == 1 => paragraph.push('\n'),
                b"w:p" if paragraph_depth == 0 => {
                    finish_paragraph(String::new(), table_depth, &mut cell, &mut doc)
                }
                b"w:gridSpan" if table_depth == 1 => {
                    if let Some(cell) = cell.as_mut() {
                        cell.grid_span = grid_span(&e).unwrap_or(1);
                    }
                }
                b"w:vMerge" if table_depth == 1 => {
                    if let Some(cell) = cell.as_mut() {
                        cell.v_merge_continue = is_merge_continuation(&e);
                    }
                }
                _ => {}
            },
            Event::Text(e) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| ExtractError::Docx(format!("bad text node: {e}")))?;
                paragraph.push_str(&text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    if paragraph_depth == 1 {
                        finish_paragraph(
                            std::mem::take(&mut paragraph),
                            table_depth,
                            &mut cell,
                            &mut doc,
                        );
                    }
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                }
                b"w:tc" if table_depth == 1 => {
                    if let Some(done) = cell.take() {
                        grid.place(done, &mut doc.cells);
                    }
                }
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(doc)
}

fn finish_paragraph(
    text: String,
    table_depth: usize,
    cell: &mut Option<CellBuilder>,
    doc: &mut ParsedDocument,
) {
    match table_depth {
        0 => doc.paragraphs.push(text),
        1 => {
            if let Some(cell) = cell.as_mut() {
                cell.paragraphs.push(text);
            }
        }
        _ => {}
    }
}

fn attribute_value(element: &BytesStart<'_>, name: &str) -> Option<String> {
    let attr = element.try_get_attribute(name).ok()??;
    std::str::from_utf8(&attr.value).ok().map(|v| v.trim().to_string())
}

fn grid_span(element: &BytesStart<'_>) -> Option<usize> {
    attribute_value(element, "w:val")?.parse().ok()
}

/// `<w:vMerge/>` without a value continues the merge; `w:val="restart"` opens one.
fn is_merge_continuation(element: &BytesStart<'_>) -> bool {
    match attribute_value(element, "w:val") {
        None => true,
        Some(val) => val == "continue",
    }
}
