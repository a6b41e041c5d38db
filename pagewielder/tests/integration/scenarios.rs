//! End-to-end runs: files on disk through the engine and the writer.

use lopdf::Document;
use pagewielder::config::CompressionLevel;
use pagewielder::engine::{Engine, EngineState};
use pagewielder::io::PdfWriter;
use rstest::rstest;
use tempfile::TempDir;

use crate::common::{page_markers, page_rotations, sized_document, spec, write_document, write_pdf};

/// Run `specs` and write the result, returning the reloaded output.
async fn compose(specs: &[String], compression: CompressionLevel) -> Document {
    let mut engine = Engine::new();
    engine.parse(specs).unwrap();
    engine.build_plan().unwrap();
    let execution = engine.execute().unwrap();
    assert_eq!(engine.state(), EngineState::Done);

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.pdf");
    let stats = PdfWriter::with_compression(compression)
        .save_owned(execution.document, &output)
        .await
        .unwrap();
    assert!(stats.file_size > 0);

    Document::load(&output).unwrap()
}

#[tokio::test]
async fn test_select_list_of_pages() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 5);

    let doc = compose(&[spec(&a, "1-3,5")], CompressionLevel::Standard).await;
    assert_eq!(page_markers(&doc), vec![1, 2, 3, 5]);
}

#[tokio::test]
async fn test_merge_two_documents_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 3);
    let b = write_pdf(&temp_dir, "b.pdf", 2);

    let doc = compose(&[spec(&a, "all"), spec(&b, "all")], CompressionLevel::Standard).await;
    assert_eq!(page_markers(&doc), vec![1, 2, 3, 1, 2]);
}

#[tokio::test]
async fn test_descending_range() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 5);

    let doc = compose(&[spec(&a, "4-2")], CompressionLevel::None).await;
    assert_eq!(page_markers(&doc), vec![4, 3, 2]);
}

#[rstest]
#[case(CompressionLevel::None)]
#[case(CompressionLevel::Standard)]
#[case(CompressionLevel::Maximum)]
#[tokio::test]
async fn test_full_copy_round_trip(#[case] compression: CompressionLevel) {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 7);

    let doc = compose(&[spec(&a, "1-end")], compression).await;
    assert_eq!(page_markers(&doc), (1..=7).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_rotate_single_page() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 3);

    let doc = compose(
        &[spec(&a, "1"), spec(&a, "2@rotate90"), spec(&a, "3")],
        CompressionLevel::Standard,
    )
    .await;
    assert_eq!(page_markers(&doc), vec![1, 2, 3]);
    assert_eq!(page_rotations(&doc), vec![0, 90, 0]);
}

#[tokio::test]
async fn test_rotation_wraps_existing_rotation() {
    let temp_dir = TempDir::new().unwrap();
    let mut source = sized_document(&[(612, 792), (612, 792)]);
    let first = *source.get_pages().get(&1).unwrap();
    source
        .get_dictionary_mut(first)
        .unwrap()
        .set("Rotate", 270i64);
    let a = write_document(&temp_dir, "a.pdf", source);

    let doc = compose(&[spec(&a, "1-2@r180")], CompressionLevel::Standard).await;
    assert_eq!(page_rotations(&doc), vec![90, 180]);
}

#[tokio::test]
async fn test_delete_pages() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 6);

    let doc = compose(&[spec(&a, "2,5@delete")], CompressionLevel::Standard).await;
    assert_eq!(page_markers(&doc), vec![1, 3, 4, 6]);
}

#[tokio::test]
async fn test_delete_applies_to_later_selections() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 4);
    let b = write_pdf(&temp_dir, "b.pdf", 2);

    // Page numbers always refer to the original document.
    let doc = compose(
        &[spec(&a, "1-2"), spec(&b, ""), spec(&a, "3-4"), spec(&a, "2@d")],
        CompressionLevel::Standard,
    )
    .await;
    assert_eq!(page_markers(&doc), vec![1, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_duplicate_pages() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 2);

    let doc = compose(&[spec(&a, "1,1,2,1")], CompressionLevel::Maximum).await;
    assert_eq!(page_markers(&doc), vec![1, 1, 2, 1]);
    assert_eq!(doc.get_pages().len(), 4);
}

#[tokio::test]
async fn test_same_file_under_two_spellings() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 3);
    let dotted = temp_dir.path().join(".").join("a.pdf");

    let mut engine = Engine::new();
    engine
        .parse([spec(&a, "1"), spec(&dotted, "3")])
        .unwrap();
    engine.build_plan().unwrap();
    assert_eq!(engine.documents().len(), 1);

    let execution = engine.execute().unwrap();
    assert_eq!(execution.statistics.documents_used, 1);
    assert_eq!(page_markers(&execution.document), vec![1, 3]);
}

#[tokio::test]
async fn test_sources_left_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 3);
    let before = std::fs::read(&a).unwrap();

    compose(&[spec(&a, "3-1@r90")], CompressionLevel::Maximum).await;
    assert_eq!(std::fs::read(&a).unwrap(), before);
}
