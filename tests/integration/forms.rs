//! Integration tests for interactive form handling.

use pdfconcat::run;
use tempfile::TempDir;

use crate::common::{Fixture, config, form_field_names, has_form, page_markers};

#[test]
fn test_form_carried_over() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).write(&dir);
    let b = Fixture::new("b.pdf", 1).form("name").write(&dir);
    let output = dir.path().join("out.pdf");

    let report = run(&config(&output, &[&a, &b])).unwrap();

    assert_eq!(report.form_source, Some(b.clone()));
    assert!(has_form(&output));
    assert_eq!(form_field_names(&output), vec!["name"]);
}

#[test]
fn test_single_input_with_form() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).form("name").write(&dir);
    let output = dir.path().join("out.pdf");

    let report = run(&config(&output, &[&a])).unwrap();

    assert_eq!(report.total_pages, 1);
    assert_eq!(page_markers(&output).len(), 1);
    assert_eq!(report.form_source, Some(a.clone()));
    assert_eq!(form_field_names(&output), vec!["name"]);
}

#[test]
fn test_last_form_wins() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).form("first").write(&dir);
    let b = Fixture::new("b.pdf", 1).write(&dir);
    let c = Fixture::new("c.pdf", 1).form("last").write(&dir);
    let output = dir.path().join("out.pdf");

    let report = run(&config(&output, &[&a, &b, &c])).unwrap();

    assert_eq!(report.form_source, Some(c.clone()));
    assert_eq!(form_field_names(&output), vec!["last"]);
}

#[test]
fn test_no_form_without_form_sources() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 2).write(&dir);
    let output = dir.path().join("out.pdf");

    let report = run(&config(&output, &[&a])).unwrap();

    assert_eq!(report.form_source, None);
    assert!(!has_form(&output));
}

#[test]
fn test_no_forms_option() {
    let dir = TempDir::new().unwrap();
    let a = Fixture::new("a.pdf", 1).form("name").write(&dir);
    let output = dir.path().join("out.pdf");

    let mut config = config(&output, &[&a]);
    config.forms = false;
    let report = run(&config).unwrap();

    assert_eq!(report.form_source, None);
    assert!(!has_form(&output));
}
