//! Plain-text extraction from uploaded documents.
//!
//! DOCX files are ZIP archives; the body lives in `word/document.xml`. Only
//! the visible run text (`w:t`) is kept, one line per `w:p` paragraph, so the
//! result matches what a reader sees in the document body.

use crate::domain::model::DocumentKind;
use crate::utils::error::{Result, ServiceError};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::io::{Cursor, Read};
use std::path::Path;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PLAIN_TEXT_MIME: &str = "text/plain";

const DOCUMENT_PART: &str = "word/document.xml";

impl DocumentKind {
    /// Decide how to read an upload from its declared content type, falling
    /// back to the file extension for generic types such as
    /// `application/octet-stream`.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Result<Self> {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());

        match mime.as_deref() {
            Some(DOCX_MIME) => return Ok(DocumentKind::Docx),
            Some(PLAIN_TEXT_MIME) => return Ok(DocumentKind::PlainText),
            _ => {}
        }

        let extension = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("docx") => Ok(DocumentKind::Docx),
            Some("txt") => Ok(DocumentKind::PlainText),
            _ => Err(ServiceError::validation(format!(
                "Invalid file type (name: {}, content type: {}). Please upload a .docx or .txt file.",
                file_name.unwrap_or("<none>"),
                content_type.unwrap_or("<none>")
            ))),
        }
    }
}

pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String> {
    match kind {
        DocumentKind::Docx => extract_docx(bytes),
        DocumentKind::PlainText => extract_plain_text(bytes),
    }
}

fn extract_plain_text(bytes: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ServiceError::document_format(format!("text file is not valid UTF-8: {}", e)))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Ok(text.replace("\r\n", "\n"))
}

fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let mut xml = Vec::new();
    {
        let mut part = archive.by_name(DOCUMENT_PART).map_err(|_| {
            ServiceError::document_format(format!("archive has no {} part", DOCUMENT_PART))
        })?;
        part.read_to_end(&mut xml).map_err(|e| {
            ServiceError::document_format(format!("could not read {}: {}", DOCUMENT_PART, e))
        })?;
    }

    tracing::debug!("Read {} ({} bytes)", DOCUMENT_PART, xml.len());
    paragraphs_from_xml(&xml).map(|paragraphs| paragraphs.join("\n"))
}

/// A paragraph still being read, plus the text-box paragraphs anchored in it.
/// Anchored paragraphs are emitted after their host so reading order holds.
#[derive(Default)]
struct OpenParagraph {
    text: String,
    anchored: Vec<String>,
}

fn paragraphs_from_xml(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    // Text boxes nest whole paragraphs inside a run, hence a stack.
    let mut open: Vec<OpenParagraph> = Vec::new();
    let mut run_depth = 0usize;
    let mut in_text = false;
    // Word writes every text box twice; the mc:Fallback copy is skipped.
    let mut fallback_depth = 0usize;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        if fallback_depth > 0 {
            match &event {
                Event::Start(e) if e.name().as_ref() == b"mc:Fallback" => fallback_depth += 1,
                Event::End(e) if e.name().as_ref() == b"mc:Fallback" => fallback_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
            continue;
        }

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => open.push(OpenParagraph::default()),
                b"w:r" => run_depth += 1,
                b"w:t" => in_text = true,
                b"mc:Fallback" => fallback_depth = 1,
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"w:p" => {
                close_paragraph(OpenParagraph::default(), &mut open, &mut paragraphs);
            }
            Event::Empty(e) => match (e.name().as_ref(), open.last_mut()) {
                (b"w:tab", Some(p)) if run_depth > 0 => p.text.push('\t'),
                (b"w:br" | b"w:cr", Some(p)) if run_depth > 0 => p.text.push('\n'),
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    if let Some(p) = open.pop() {
                        close_paragraph(p, &mut open, &mut paragraphs);
                    }
                }
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(p) = open.last_mut() {
                    p.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) if in_text => {
                if let Some(p) = open.last_mut() {
                    p.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !open.is_empty() || fallback_depth > 0 {
        return Err(ServiceError::document_format(
            "document XML ended inside an unclosed paragraph",
        ));
    }

    Ok(paragraphs)
}

fn close_paragraph(
    paragraph: OpenParagraph,
    open: &mut [OpenParagraph],
    paragraphs: &mut Vec<String>,
) {
    let target = match open.last_mut() {
        Some(host) => &mut host.anchored,
        None => paragraphs,
    };
    target.push(paragraph.text);
    target.extend(paragraph.anchored);
}
