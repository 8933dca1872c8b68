//! Integration tests for bookmark merging and named destinations.

use pdfconcat::outline;
use pdfconcat::run;
use tempfile::TempDir;

use crate::common::{Fixture, bookmarks, config};

#[test]
fn test_bookmarks_renumbered_after_preceding_sources() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 3)
        .bookmark("Introduction", 1)
        .bookmark("Summary", 3)
        .write(&dir);
    let b = Fixture::new("b.pdf", 2).bookmark("Appendix", 2).write(&dir);
    let output = dir.path().join("out.pdf");

    let report = run(&config(&output, &[&a, &b])).unwrap();

    assert_eq!(report.bookmarks, 3);
    let merged = bookmarks(&output);
    let titles: Vec<_> = merged.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Introduction", "Summary", "Appendix"]);
    assert_eq!(outline::page_targets(&merged), vec![1, 3, 5]);
}

#[test]
fn test_nested_bookmarks_keep_structure() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 2).write(&dir);
    let b = Fixture::new("b.pdf", 3)
        .bookmark_with_children("Part", 1, &[("Section 1", 2), ("Section 2", 3)])
        .write(&dir);
    let output = dir.path().join("out.pdf");

    run(&config(&output, &[&a, &b])).unwrap();

    let merged = bookmarks(&output);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].title, "Part");
    assert_eq!(merged[0].children.len(), 2);
    assert_eq!(merged[0].children[1].title, "Section 2");
    assert_eq!(outline::page_targets(&merged), vec![3, 4, 5]);
}

#[test]
fn test_no_outline_without_bookmarks() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).write(&dir);
    let b = Fixture::new("b.pdf", 1).write(&dir);
    let output = dir.path().join("out.pdf");

    let report = run(&config(&output, &[&a, &b])).unwrap();

    assert_eq!(report.bookmarks, 0);
    let doc = lopdf::Document::load(&output).unwrap();
    assert!(!doc.catalog().unwrap().has(b"Outlines"));
}

#[test]
fn test_named_destination_resolved_and_shifted() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 2).write(&dir);
    let b = Fixture::new("b.pdf", 3)
        .named_bookmark("Chapter 2", "chapter-2", 3)
        .write(&dir);
    let output = dir.path().join("out.pdf");

    let report = run(&config(&output, &[&a, &b])).unwrap();

    assert_eq!(report.files[1].named_destinations, 1);
    let merged = bookmarks(&output);
    assert_eq!(merged[0].title, "Chapter 2");
    assert_eq!(merged[0].page(), Some(5));
}

#[test]
fn test_no_outlines_option_drops_bookmarks() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).bookmark("A", 1).write(&dir);
    let output = dir.path().join("out.pdf");

    let mut config = config(&output, &[&a]);
    config.outlines = false;
    let report = run(&config).unwrap();

    assert_eq!(report.bookmarks, 0);
    assert!(bookmarks(&output).is_empty());
}
