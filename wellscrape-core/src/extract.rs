//! Text and metadata extraction for downloaded documents.
//!
//! Extraction is best effort. A document that is corrupt, unsupported or
//! simply has no text layer is logged and left alone; nothing here can fail
//! the run, not even a panicking backend.

use crate::error::ExtractError;
use crate::layout::sibling_artifacts;
use pdf_oxide::PdfDocument;
use pdf_oxide::object::Object;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// What an extraction backend found in a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedDocument {
    pub metadata: BTreeMap<String, String>,
    pub content: String,
}

impl ExtractedDocument {
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// `key: value` lines, sorted by key.
    pub fn metadata_dump(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.metadata {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedDocument, ExtractError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExtractOutcome {
    Written {
        metadata_path: PathBuf,
        content_path: PathBuf,
    },
    /// The document had no extractable text; nothing was written.
    Empty,
    /// The backend or the artifact writes failed; nothing usable was written.
    Failed(String),
}

/// Run `extractor` on a saved document and write `<stem>_metadata.txt` and
/// `<stem>_parsed.txt` beside it when there is text to keep.
pub fn extract_document(extractor: &dyn TextExtractor, path: &Path) -> ExtractOutcome {
    debug!("Extracting text from {}", path.display());

    // A backend panic on a malformed document is contained here like any
    // other extraction failure.
    let extracted = match catch_unwind(AssertUnwindSafe(|| extractor.extract(path))) {
        Ok(Ok(extracted)) => extracted,
        Ok(Err(e)) => {
            error!("Failed to extract text from {}: {}", path.display(), e);
            return ExtractOutcome::Failed(e.to_string());
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            error!("Extractor panicked on {}: {}", path.display(), panic_msg);
            return ExtractOutcome::Failed(format!("extractor panicked: {}", panic_msg));
        }
    };

    if !extracted.has_content() {
        info!("No text content found in {}", path.display());
        return ExtractOutcome::Empty;
    }

    let (metadata_path, content_path) = sibling_artifacts(path);
    let written = fs::write(&metadata_path, extracted.metadata_dump())
        .and_then(|_| fs::write(&content_path, &extracted.content));

    match written {
        Ok(()) => {
            info!(
                "Saved extracted text for {} to {}",
                path.display(),
                content_path.display()
            );
            ExtractOutcome::Written {
                metadata_path,
                content_path,
            }
        }
        Err(e) => {
            error!("Failed to write extraction results for {}: {}", path.display(), e);
            let _ = fs::remove_file(&metadata_path);
            ExtractOutcome::Failed(e.to_string())
        }
    }
}

/// Extraction backend for PDF files.
///
/// Metadata holds the PDF version, the page count, the file name and every
/// scalar entry of the document Info dictionary. Content is the text of
/// each page in page order, pages separated by a newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedDocument, ExtractError> {
        let mut doc = PdfDocument::open(path)?;
        let mut metadata = BTreeMap::new();

        let (major, minor) = doc.version();
        metadata.insert("pdf:version".to_string(), format!("{}.{}", major, minor));

        let pages = doc.page_count()?;
        metadata.insert("pdf:pages".to_string(), pages.to_string());

        if let Some(name) = path.file_name() {
            metadata.insert(
                "resourceName".to_string(),
                name.to_string_lossy().into_owned(),
            );
        }

        for (key, value) in info_entries(&mut doc) {
            metadata.insert(key, value);
        }

        let mut content = String::new();
        for page in 0..pages {
            let text = doc.extract_text(page)?;
            if !content.is_empty() && !text.is_empty() {
                content.push('\n');
            }
            content.push_str(&text);
        }

        Ok(ExtractedDocument { metadata, content })
    }
}

fn info_entries(doc: &mut PdfDocument) -> Vec<(String, String)> {
    let info = match doc
        .trailer()
        .as_dict()
        .and_then(|trailer| trailer.get("Info"))
        .cloned()
    {
        Some(info) => info,
        None => return Vec::new(),
    };

    let info = match info.as_reference() {
        Some(info_ref) => match doc.load_object(info_ref) {
            Ok(obj) => obj,
            Err(e) => {
                warn!("Could not load document Info dictionary: {}", e);
                return Vec::new();
            }
        },
        None => info,
    };

    let Some(dict) = info.as_dict() else {
        return Vec::new();
    };

    dict.iter()
        .filter_map(|(key, value)| describe(value).map(|v| (key.clone(), v)))
        .collect()
}

fn describe(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes) => Some(decode_pdf_string(bytes)),
        Object::Name(name) => Some(name.clone()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text strings are UTF-16BE with a byte order mark, or single-byte
/// otherwise.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(b"\xFE\xFF") {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}
