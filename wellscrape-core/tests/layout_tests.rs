// Tests for artifact paths under the data root

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wellscrape_core::CoreError;
use wellscrape_core::layout::{PathLayout, derive_filename, sibling_artifacts};

#[test]
fn test_relative_is_deterministic() {
    let first = PathLayout::relative("cleanup_reports/quarterly", "FY_2020", "FY_2020.pdf");
    let second = PathLayout::relative("cleanup_reports/quarterly", "FY_2020", "FY_2020.pdf");
    assert_eq!(first, second);
    assert_eq!(first, PathBuf::from("cleanup_reports/quarterly/FY_2020/FY_2020.pdf"));
}

#[test]
fn test_relative_without_sub_key() {
    assert_eq!(
        PathLayout::relative("cleanup_reports/annual", "", "Fiscal_Year_2019.pdf"),
        PathBuf::from("cleanup_reports/annual/Fiscal_Year_2019.pdf")
    );
}

#[test]
fn test_resolve_creates_parents() {
    let root = TempDir::new().unwrap();
    let layout = PathLayout::new(root.path().join("data"));

    let relative = PathLayout::relative("well_distribution", "2019", "counts.xlsx");
    let path = layout.resolve(&relative).unwrap();

    assert_eq!(path, root.path().join("data/well_distribution/2019/counts.xlsx"));
    assert!(path.parent().unwrap().is_dir());
    assert!(!path.exists());

    // Resolving again is harmless
    assert_eq!(layout.resolve(&relative).unwrap(), path);
}

#[test]
fn test_resolve_rejects_escaping_paths() {
    let root = TempDir::new().unwrap();
    let layout = PathLayout::new(root.path());

    for bad in ["../outside.pdf", "a/../../b.pdf", "/etc/passwd", ""] {
        let err = layout.resolve(Path::new(bad)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPath(_)), "{bad:?} was accepted");
    }
}

#[test]
fn test_derive_filename_is_idempotent() {
    let once = derive_filename("Oil & Gas,  Cleanup Fund FY 2020", "PDF").unwrap();
    assert_eq!(once, "Oil_Gas_Cleanup_Fund_FY_2020.pdf");

    let stem = once.trim_end_matches(".pdf");
    assert_eq!(derive_filename(stem, "pdf").unwrap(), once);
    assert_eq!(derive_filename(&once, "pdf").unwrap(), once);
}

#[test]
fn test_derive_filename_of_punctuation_only() {
    assert_eq!(derive_filename(" , ; ", "pdf"), None);
}

#[test]
fn test_sibling_artifacts() {
    let (metadata, content) = sibling_artifacts(Path::new("data/annual/FY_2020.pdf"));
    assert_eq!(metadata, PathBuf::from("data/annual/FY_2020_metadata.txt"));
    assert_eq!(content, PathBuf::from("data/annual/FY_2020_parsed.txt"));
}

#[test]
fn test_well_known_files() {
    let layout = PathLayout::new("data");
    assert_eq!(layout.log_file(), PathBuf::from("data/scrape.log"));
    assert_eq!(layout.summary_file(), PathBuf::from("data/run_summary.json"));
    assert_eq!(
        layout.saved_page("districts.html"),
        PathBuf::from("data/saved_pages/districts.html")
    );
}
