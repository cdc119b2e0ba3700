// Tests for the PDF backend on documents written by pdf_oxide itself

use pdf_oxide::writer::{DocumentBuilder, DocumentMetadata, PageSize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wellscrape_core::{ExtractOutcome, PdfExtractor, TextExtractor, extract_document};

const TITLE: &str = "Oilfield Cleanup Program FY 2020";

/// One page per entry; `None` is a page without any text.
fn write_pdf(path: &Path, pages: &[Option<&str>]) {
    let mut builder = DocumentBuilder::new().metadata(
        DocumentMetadata::new()
            .title(TITLE)
            .author("Railroad Commission of Texas"),
    );
    for text in pages {
        let page = builder.page(PageSize::Letter);
        match text {
            Some(text) => {
                page.at(72.0, 720.0).text(text).done();
            }
            None => {
                page.done();
            }
        }
    }
    fs::write(path, builder.build().unwrap()).unwrap();
}

fn saved_pdf(dir: &TempDir, pages: &[Option<&str>]) -> PathBuf {
    let path = dir.path().join("FY_2020.pdf");
    write_pdf(&path, pages);
    path
}

#[test]
fn test_hello_pdf_writes_text_and_metadata() {
    let dir = TempDir::new().unwrap();
    let path = saved_pdf(&dir, &[Some("Hello")]);

    let outcome = extract_document(&PdfExtractor, &path);

    assert!(matches!(outcome, ExtractOutcome::Written { .. }), "{outcome:?}");
    let content = fs::read_to_string(dir.path().join("FY_2020_parsed.txt")).unwrap();
    assert_eq!(content.trim(), "Hello");

    let metadata = fs::read_to_string(dir.path().join("FY_2020_metadata.txt")).unwrap();
    let lines: Vec<&str> = metadata.lines().collect();
    assert!(lines.contains(&"Title: Oilfield Cleanup Program FY 2020"), "{metadata}");
    assert!(lines.contains(&"Author: Railroad Commission of Texas"), "{metadata}");
    assert!(lines.contains(&"pdf:pages: 1"), "{metadata}");
    assert!(lines.contains(&"pdf:version: 1.7"), "{metadata}");
    assert!(lines.contains(&"resourceName: FY_2020.pdf"), "{metadata}");

    let mut sorted = lines.clone();
    sorted.sort();
    assert_eq!(lines, sorted);
}

#[test]
fn test_pages_are_joined_in_order() {
    let dir = TempDir::new().unwrap();
    let path = saved_pdf(&dir, &[Some("First quarter"), None, Some("Second quarter")]);

    let extracted = PdfExtractor.extract(&path).unwrap();

    assert_eq!(extracted.metadata.get("pdf:pages").map(String::as_str), Some("3"));
    let first = extracted.content.find("First quarter").unwrap();
    let second = extracted.content.find("Second quarter").unwrap();
    assert!(first < second);
    assert!(extracted.content[first..second].contains('\n'));
}

#[test]
fn test_pdf_without_text_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = saved_pdf(&dir, &[None]);

    assert_eq!(extract_document(&PdfExtractor, &path), ExtractOutcome::Empty);
    assert!(!dir.path().join("FY_2020_parsed.txt").exists());
    assert!(!dir.path().join("FY_2020_metadata.txt").exists());
}
