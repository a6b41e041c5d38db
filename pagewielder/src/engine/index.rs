//! Document indexes: lazily opened source documents and page resolution.
//!
//! A [`DocumentIndex`] owns one source document. It is created when an
//! operation names a path and only opens the file when something needs the
//! page count or a page. A [`DocumentSet`] holds every index of one run and
//! is passed explicitly through the engine; dropping it closes every handle.

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::engine::range::{PageRange, PageSelection};
use crate::error::{PageWielderError, Result};
use crate::io::{LoadedPdf, PdfReader};

/// Page attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page trees deeper than this are treated as cyclic.
const MAX_TREE_DEPTH: usize = 64;

/// Identity of a source document within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocumentId(usize);

impl DocumentId {
    /// Position of the document in its [`DocumentSet`].
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A resolved page: a document and a 0-based physical page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageReference {
    /// Source document.
    pub document: DocumentId,
    /// 0-based page index within the source document.
    pub index: usize,
}

impl PageReference {
    /// Create a page reference.
    pub fn new(document: DocumentId, index: usize) -> Self {
        Self { document, index }
    }

    /// 1-based page number, as users count.
    pub fn page_number(&self) -> usize {
        self.index + 1
    }
}

/// An opened source document and its page object ids in page order.
#[derive(Debug)]
struct DocumentHandle {
    loaded: LoadedPdf,
    page_ids: Vec<ObjectId>,
}

impl DocumentHandle {
    fn new(loaded: LoadedPdf) -> Self {
        let page_ids = loaded.document.get_pages().into_values().collect();
        Self { loaded, page_ids }
    }
}

/// One source document, opened on first use.
#[derive(Debug)]
pub struct DocumentIndex {
    id: DocumentId,
    path: PathBuf,
    handle: Option<DocumentHandle>,
}

impl DocumentIndex {
    fn new(id: DocumentId, path: PathBuf) -> Self {
        Self {
            id,
            path,
            handle: None,
        }
    }

    /// Identity of this document in its set.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Path the document was (or will be) loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the document has been opened.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Page count, if the document is already open.
    pub fn known_page_count(&self) -> Option<usize> {
        self.handle.as_ref().map(|h| h.page_ids.len())
    }

    /// Open the document if needed.
    fn handle(&mut self) -> Result<&DocumentHandle> {
        if self.handle.is_none() {
            debug!(document = %self.id, path = %self.path.display(), "opening source document");
            let loaded = PdfReader::new().load(&self.path)?;
            self.handle = Some(DocumentHandle::new(loaded));
        }

        self.handle
            .as_ref()
            .ok_or_else(|| PageWielderError::execution("document handle missing after open"))
    }

    /// Number of pages, opening the document if needed.
    pub fn page_count(&mut self) -> Result<usize> {
        Ok(self.handle()?.page_ids.len())
    }

    /// The loaded document and its load statistics.
    pub fn loaded(&mut self) -> Result<&LoadedPdf> {
        Ok(&self.handle()?.loaded)
    }

    /// The underlying document.
    pub fn document(&mut self) -> Result<&Document> {
        Ok(&self.handle()?.loaded.document)
    }

    /// Object id of the page at `index` (0-based).
    pub fn page_id(&mut self, index: usize) -> Result<ObjectId> {
        let path = self.path.clone();
        let handle = self.handle()?;
        handle.page_ids.get(index).copied().ok_or_else(|| {
            PageWielderError::out_of_range(path, (index + 1).to_string(), handle.page_ids.len())
        })
    }

    /// The page dictionary at `index` with inherited attributes filled in.
    pub fn page_attributes(&mut self, index: usize) -> Result<Dictionary> {
        let page_id = self.page_id(index)?;
        effective_page_dictionary(self.document()?, page_id)
    }

    /// Resolve one range into page references.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if a bound falls outside `[1, page_count]`.
    pub fn resolve(&mut self, range: &PageRange) -> Result<Vec<PageReference>> {
        let page_count = self.page_count()?;
        let indices = range.expand(page_count).ok_or_else(|| {
            PageWielderError::out_of_range(self.path.clone(), range.to_string(), page_count)
        })?;

        Ok(indices
            .into_iter()
            .map(|index| PageReference::new(self.id, index))
            .collect())
    }

    /// Resolve every range of a selection, in order.
    pub fn resolve_selection(&mut self, selection: &PageSelection) -> Result<Vec<PageReference>> {
        let mut pages = Vec::new();
        for range in selection.ranges() {
            pages.extend(self.resolve(range)?);
        }
        Ok(pages)
    }

    /// Drop the document handle.
    fn close(&mut self) {
        if self.handle.take().is_some() {
            debug!(document = %self.id, path = %self.path.display(), "closed source document");
        }
    }
}

/// Every source document of one run, keyed by path.
#[derive(Debug, Default)]
pub struct DocumentSet {
    documents: Vec<DocumentIndex>,
    by_path: HashMap<PathBuf, DocumentId>,
}

impl DocumentSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path without opening it.
    ///
    /// Registering the same file twice returns the same id.
    pub fn register(&mut self, path: &Path) -> DocumentId {
        let key = Self::key(path);
        if let Some(id) = self.by_path.get(&key) {
            return *id;
        }

        let id = DocumentId(self.documents.len());
        self.documents.push(DocumentIndex::new(id, path.to_path_buf()));
        self.by_path.insert(key, id);
        id
    }

    /// Register a document that is already in memory.
    pub fn insert_document(&mut self, path: &Path, document: Document) -> DocumentId {
        let id = self.register(path);
        let loaded = LoadedPdf::new(document, path.to_path_buf(), Duration::ZERO);
        self.documents[id.0].handle = Some(DocumentHandle::new(loaded));
        id
    }

    fn key(path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }

    /// Look up a document.
    pub fn get(&self, id: DocumentId) -> Result<&DocumentIndex> {
        self.documents
            .get(id.0)
            .ok_or_else(|| PageWielderError::execution(format!("unknown document {id}")))
    }

    /// Look up a document mutably.
    pub fn get_mut(&mut self, id: DocumentId) -> Result<&mut DocumentIndex> {
        self.documents
            .get_mut(id.0)
            .ok_or_else(|| PageWielderError::execution(format!("unknown document {id}")))
    }

    /// Path of a document, for messages.
    pub fn path(&self, id: DocumentId) -> Option<&Path> {
        self.documents.get(id.0).map(DocumentIndex::path)
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no documents are registered.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of documents currently open.
    pub fn open_count(&self) -> usize {
        self.documents.iter().filter(|d| d.is_open()).count()
    }

    /// Iterate over the documents in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &DocumentIndex> {
        self.documents.iter()
    }

    /// Close every open document.
    pub fn close_all(&mut self) {
        for document in &mut self.documents {
            document.close();
        }
    }
}

/// Follow an indirect reference, if `object` is one.
pub(crate) fn dereference<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Clone a page dictionary and copy in the attributes it inherits.
pub(crate) fn effective_page_dictionary(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = doc
        .get_dictionary(page_id)
        .map_err(|err| {
            PageWielderError::execution(format!("page object {page_id:?} is unreadable: {err}"))
        })?
        .clone();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        if depth == MAX_TREE_DEPTH {
            return Err(PageWielderError::execution(format!(
                "page tree above {page_id:?} is deeper than {MAX_TREE_DEPTH} levels"
            )));
        }

        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };

        for key in INHERITABLE_KEYS {
            if !page.has(key)
                && let Ok(value) = node.get(key)
            {
                page.set(key, value.clone());
            }
        }

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    Ok(page)
}

/// Rotation of a page dictionary in degrees, normalized to `0..360`.
pub(crate) fn page_rotation(doc: &Document, page: &Dictionary) -> i64 {
    let Ok(value) = page.get(b"Rotate") else {
        return 0;
    };
    let Ok(value) = dereference(doc, value) else {
        return 0;
    };

    let degrees = value
        .as_i64()
        .or_else(|_| value.as_float().map(|f| f.round() as i64))
        .unwrap_or(0);
    degrees.rem_euclid(360)
}
