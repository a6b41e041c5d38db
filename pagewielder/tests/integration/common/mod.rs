//! Shared helpers for the integration tests.
//!
//! Test PDFs are generated on the fly into a temporary directory. Every page
//! carries a `TestIndex` entry holding its 1-based page number in the file
//! it was generated for, so tests can follow pages through a run.

#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use std::path::PathBuf;
use tempfile::TempDir;

/// Build a document with one page per `(width, height)` entry.
pub fn sized_document(sizes: &[(i64, i64)]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids = Vec::new();
    for (i, (width, height)) in sizes.iter().enumerate() {
        let text = format!("BT /F1 18 Tf 50 50 Td (Page {}) Tj ET", i + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), text.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), (*width).into(), (*height).into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "TestIndex" => (i + 1) as i64,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Write a letter-sized PDF with `pages` pages to `dir/name`.
pub fn write_pdf(dir: &TempDir, name: &str, pages: usize) -> PathBuf {
    write_document(dir, name, sized_document(&vec![(612, 792); pages]))
}

/// Write `doc` to `dir/name`.
pub fn write_document(dir: &TempDir, name: &str, mut doc: Document) -> PathBuf {
    let path = dir.path().join(name);
    doc.save(&path).expect("Failed to write test PDF");
    path
}

/// `path@pages[@transform]` for a generated file.
pub fn spec(path: &PathBuf, rest: &str) -> String {
    if rest.is_empty() {
        path.display().to_string()
    } else {
        format!("{}@{rest}", path.display())
    }
}

/// `TestIndex` of every page, in page order.
pub fn page_markers(doc: &Document) -> Vec<i64> {
    doc.get_pages()
        .values()
        .map(|id| {
            doc.get_dictionary(*id)
                .and_then(|page| page.get(b"TestIndex"))
                .and_then(Object::as_i64)
                .expect("page without TestIndex")
        })
        .collect()
}

/// Direct `Rotate` entry of every page, in page order.
pub fn page_rotations(doc: &Document) -> Vec<i64> {
    doc.get_pages()
        .values()
        .map(|id| {
            doc.get_dictionary(*id)
                .ok()
                .and_then(|page| page.get(b"Rotate").ok())
                .and_then(|rotate| rotate.as_i64().ok())
                .unwrap_or(0)
        })
        .collect()
}

/// Create a temporary output path for test results.
pub fn temp_output_path() -> tempfile::TempPath {
    tempfile::NamedTempFile::new()
        .expect("Failed to create temp file")
        .into_temp_path()
}
