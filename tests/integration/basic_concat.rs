//! Integration tests for page concatenation.

use pdfconcat::{CompressionLevel, run};
use rstest::rstest;
use tempfile::TempDir;

use crate::common::{Fixture, config, page_markers, page_rotation, root_media_box};

#[test]
fn test_pages_appended_in_argument_order() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 2).write(&dir);
    let b = Fixture::new("b.pdf", 3).write(&dir);
    let output = dir.path().join("out.pdf");

    let report = run(&config(&output, &[&a, &b])).unwrap();

    assert_eq!(report.total_pages, 5);
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.files[1].first_page, 3);
    assert!(report.output_size > 0);
    assert_eq!(
        page_markers(&output),
        vec!["a.pdf-1", "a.pdf-2", "b.pdf-1", "b.pdf-2", "b.pdf-3"]
    );
}

#[test]
fn test_reversed_order_reverses_pages() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).write(&dir);
    let b = Fixture::new("b.pdf", 1).write(&dir);
    let output = dir.path().join("out.pdf");

    run(&config(&output, &[&b, &a])).unwrap();

    assert_eq!(page_markers(&output), vec!["b.pdf-1", "a.pdf-1"]);
}

#[test]
fn test_single_source() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 3).write(&dir);
    let output = dir.path().join("out.pdf");

    let report = run(&config(&output, &[&a])).unwrap();

    assert_eq!(report.total_pages, 3);
    assert_eq!(page_markers(&output), vec!["a.pdf-1", "a.pdf-2", "a.pdf-3"]);
}

#[test]
fn test_same_source_twice() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 2).write(&dir);
    let output = dir.path().join("out.pdf");

    let report = run(&config(&output, &[&a, &a])).unwrap();

    assert_eq!(report.total_pages, 4);
    assert_eq!(
        page_markers(&output),
        vec!["a.pdf-1", "a.pdf-2", "a.pdf-1", "a.pdf-2"]
    );
}

#[test]
fn test_output_uses_first_page_size() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1)
        .media_box([0, 0, 595, 842])
        .rotate(90)
        .write(&dir);
    let b = Fixture::new("b.pdf", 1).write(&dir);
    let output = dir.path().join("out.pdf");

    run(&config(&output, &[&a, &b])).unwrap();

    assert_eq!(root_media_box(&output), vec![0.0, 0.0, 595.0, 842.0]);
    assert_eq!(page_rotation(&output, 1), Some(90));
}

#[test]
fn test_mixed_page_sizes_keep_their_own_media_box() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).media_box([0, 0, 595, 842]).write(&dir);
    let b = Fixture::new("b.pdf", 1).write(&dir);
    let output = dir.path().join("out.pdf");

    run(&config(&output, &[&a, &b])).unwrap();

    let doc = lopdf::Document::load(&output).unwrap();
    let second = doc.get_pages()[&2];
    let media_box = doc
        .get_dictionary(second)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_float().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(media_box, vec![0.0, 0.0, 612.0, 792.0]);
}

#[rstest]
#[case(CompressionLevel::None)]
#[case(CompressionLevel::Standard)]
#[case(CompressionLevel::Maximum)]
fn test_every_compression_level_produces_readable_output(#[case] compression: CompressionLevel) {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 2).write(&dir);
    let b = Fixture::new("b.pdf", 1).write(&dir);
    let output = dir.path().join("out.pdf");

    let mut config = config(&output, &[&a, &b]);
    config.compression = compression;
    run(&config).unwrap();

    assert_eq!(page_markers(&output), vec!["a.pdf-1", "a.pdf-2", "b.pdf-1"]);
}

#[test]
fn test_existing_output_is_replaced() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).write(&dir);
    let output = dir.path().join("out.pdf");
    std::fs::write(&output, b"old contents").unwrap();

    run(&config(&output, &[&a])).unwrap();

    assert_eq!(page_markers(&output), vec!["a.pdf-1"]);
}

#[test]
fn test_output_directory_created() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).write(&dir);
    let output = dir.path().join("nested").join("deeper").join("out.pdf");

    run(&config(&output, &[&a])).unwrap();

    assert!(output.is_file());
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 2).write(&dir);
    let b = Fixture::new("b.pdf", 1).bookmark("B", 1).write(&dir);
    let output = dir.path().join("out.pdf");

    let mut config = config(&output, &[&a, &b]);
    config.dry_run = true;
    let report = run(&config).unwrap();

    assert!(report.dry_run);
    assert_eq!(report.total_pages, 3);
    assert_eq!(report.bookmarks, 1);
    assert_eq!(report.output_size, 0);
    assert!(!output.exists());
}
