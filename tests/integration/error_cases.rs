//! Integration tests for error handling and edge cases.

use pdfconcat::{Config, ConcatError, run};
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::{Fixture, config};

#[test]
fn test_error_nonexistent_input() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).write(&dir);
    let missing = dir.path().join("missing.pdf");
    let output = dir.path().join("out.pdf");

    let err = run(&config(&output, &[&a, &missing])).unwrap_err();

    assert!(matches!(err, ConcatError::InputNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(!output.exists());
}

#[test]
fn test_error_directory_input() {
    let dir = TempDir::new().unwrap();
    let subdir = dir.path().join("sub");
    std::fs::create_dir(&subdir).unwrap();
    let output = dir.path().join("out.pdf");

    let err = run(&config(&output, &[&subdir])).unwrap_err();

    assert!(matches!(err, ConcatError::NotAFile { .. }));
}

#[test]
fn test_error_not_a_pdf() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).write(&dir);
    let bogus = dir.path().join("bogus.pdf");
    std::fs::write(&bogus, b"this is not a pdf").unwrap();
    let output = dir.path().join("out.pdf");

    let err = run(&config(&output, &[&a, &bogus])).unwrap_err();

    assert!(matches!(err, ConcatError::InputOpen { .. }));
    assert_eq!(err.exit_code(), 3);
    assert!(!output.exists());
}

#[test]
fn test_failed_run_keeps_existing_output() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("bogus.pdf");
    std::fs::write(&bogus, b"%PDF-1.4 truncated").unwrap();
    let output = dir.path().join("out.pdf");
    std::fs::write(&output, b"previous").unwrap();

    assert!(run(&config(&output, &[&bogus])).is_err());

    assert_eq!(std::fs::read(&output).unwrap(), b"previous");
}

#[test]
fn test_error_output_is_directory() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).write(&dir);
    let output = dir.path().join("out_dir");
    std::fs::create_dir(&output).unwrap();

    let err = run(&config(&output, &[&a])).unwrap_err();

    assert!(matches!(err, ConcatError::OutputWrite { .. }));
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn test_error_empty_input_list() {
    let config = Config::new("out.pdf", Vec::<PathBuf>::new());
    assert!(matches!(config.validate(), Err(ConcatError::Usage)));
}

#[test]
fn test_no_clobber() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).write(&dir);
    let output = dir.path().join("out.pdf");
    std::fs::write(&output, b"keep").unwrap();

    let mut config = config(&output, &[&a]);
    config.no_clobber = true;
    let err = run(&config).unwrap_err();

    assert!(matches!(err, ConcatError::OutputExists { .. }));
    assert_eq!(std::fs::read(&output).unwrap(), b"keep");
}
