//! Integration tests for error handling and edge cases.

use pagewielder::engine::{Engine, EngineState, OperationSpec};
use pagewielder::error::PageWielderError;
use pagewielder::io::{PdfWriter, WriteOptions};
use rstest::rstest;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::{spec, write_pdf};

fn plan_error(specs: &[String]) -> PageWielderError {
    let mut engine = Engine::new();
    let err = match engine.parse(specs) {
        Ok(()) => engine.build_plan().unwrap_err(),
        Err(err) => err,
    };
    assert_eq!(engine.state(), EngineState::Failed);
    assert_eq!(engine.documents().open_count(), 0);
    err
}

#[test]
fn test_error_nonexistent_input() {
    let err = plan_error(&["/nonexistent/file.pdf@1".to_string()]);
    assert!(matches!(err, PageWielderError::FileNotFound { .. }));
    assert!(!err.is_input_error());
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn test_error_directory_input() {
    let temp_dir = TempDir::new().unwrap();
    let err = plan_error(&[temp_dir.path().display().to_string()]);
    assert!(matches!(err, PageWielderError::NotAFile { .. }));
}

#[test]
fn test_error_not_a_pdf() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("notes.pdf");
    std::fs::write(&path, b"plain text, not a PDF").unwrap();

    let err = plan_error(&[path.display().to_string()]);
    assert!(matches!(err, PageWielderError::FailedToLoadPdf { .. }));
}

#[rstest]
#[case("1-6")]
#[case("6")]
#[case("2,7")]
#[case("5-end,9")]
#[case("1-4294967296")]
fn test_error_out_of_range(#[case] pages: &str) {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 5);

    let err = plan_error(&[spec(&a, pages)]);
    assert_eq!(err.exit_code(), 3);
    match err {
        PageWielderError::OutOfRange {
            path, page_count, ..
        } => {
            assert_eq!(path, a);
            assert_eq!(page_count, 5);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
#[case("0")]
#[case("1-")]
#[case("a-3")]
#[case("1,,2")]
#[case("1@rotate45")]
fn test_error_malformed_spec(#[case] rest: &str) {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 5);

    let err = plan_error(&[spec(&a, rest)]);
    assert!(matches!(err, PageWielderError::Parse { .. }), "{rest}: {err}");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_error_everything_deleted() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 3);

    let err = plan_error(&[spec(&a, "all@delete")]);
    assert!(matches!(err, PageWielderError::Plan { .. }));
}

#[test]
fn test_error_no_specs() {
    let err = plan_error(&[]);
    assert!(matches!(err, PageWielderError::Plan { .. }));
}

#[tokio::test]
async fn test_writer_no_clobber() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 1);
    let output = temp_dir.path().join("out.pdf");
    std::fs::write(&output, b"existing").unwrap();

    let execution = Engine::new()
        .run([OperationSpec::new(&a)])
        .unwrap();
    let err = PdfWriter::new()
        .no_clobber()
        .save_owned(execution.document, &output)
        .await
        .unwrap_err();

    assert!(matches!(err, PageWielderError::OutputExists { .. }));
    assert_eq!(std::fs::read(&output).unwrap(), b"existing");
}

#[tokio::test]
async fn test_writer_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 1);
    let output = PathBuf::from("/nonexistent/dir/out.pdf");

    let execution = Engine::new()
        .run([OperationSpec::new(&a)])
        .unwrap();
    let writer = PdfWriter::with_options(WriteOptions::default());
    assert!(writer.can_write(&output).await.is_err());
    assert!(writer.save_owned(execution.document, &output).await.is_err());
}
