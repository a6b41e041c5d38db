//! Plan execution: copying planned pages into a fresh document.
//!
//! Each source document used by the plan is cloned, renumbered past the
//! output's highest object id, and merged into the output once. Pages are
//! then linked into a new single-level page tree in plan order. Unreachable
//! objects (old catalogs, old page tree nodes, unused pages) are pruned at
//! the end.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::engine::index::{DocumentId, DocumentSet, effective_page_dictionary, page_rotation};
use crate::engine::plan::{Plan, Transform};
use crate::error::{PageWielderError, Result};

/// PDF version used when no source declares a higher one.
const DEFAULT_PDF_VERSION: &str = "1.7";

/// Statistics about one plan execution.
#[derive(Debug, Clone, Default)]
pub struct ExecutionStatistics {
    /// Pages in the output document.
    pub pages_written: usize,

    /// Distinct source documents copied from.
    pub documents_used: usize,

    /// Pages whose rotation was changed.
    pub pages_rotated: usize,

    /// Pages that repeat an earlier output page.
    pub duplicated_pages: usize,

    /// Total size of the source files.
    pub input_size: u64,

    /// Time spent assembling the output.
    pub elapsed: Duration,
}

/// Result of executing a plan.
#[derive(Debug)]
pub struct Execution {
    /// The assembled output document.
    pub document: Document,

    /// Statistics about the execution.
    pub statistics: ExecutionStatistics,
}

/// A source page after import: its object id in the output and its
/// dictionary with inherited attributes filled in.
struct ImportedPage {
    id: ObjectId,
    dictionary: Dictionary,
}

/// Builds output documents from plans.
#[derive(Debug, Clone, Default)]
pub struct PlanExecutor;

impl PlanExecutor {
    /// Create a new executor.
    pub fn new() -> Self {
        Self
    }

    /// Copy every planned page, in order, into a new document.
    ///
    /// Source documents are never modified.
    ///
    /// # Errors
    ///
    /// Returns an `Execution` error if a planned page is missing or is not
    /// a dictionary. Nothing is returned in that case.
    pub fn execute(&self, plan: &Plan, documents: &mut DocumentSet) -> Result<Execution> {
        let start = Instant::now();
        let document_ids = plan.documents();

        let mut output = Document::with_version(output_version(&document_ids, documents)?);
        let pages_id = output.new_object_id();

        let mut imported: HashMap<(DocumentId, usize), ImportedPage> = HashMap::new();
        let mut input_size = 0;

        for &document_id in &document_ids {
            let wanted: HashSet<usize> = plan
                .entries()
                .iter()
                .filter(|entry| entry.page.document == document_id)
                .map(|entry| entry.page.index)
                .collect();

            let source = documents.get_mut(document_id)?;
            input_size += source.loaded()?.file_size;

            let mut document = source.document()?.clone();
            document.renumber_objects_with(output.max_id + 1);
            let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();

            for index in wanted {
                let page_id = *page_ids.get(index).ok_or_else(|| {
                    PageWielderError::execution(format!(
                        "page {} of {} disappeared after renumbering",
                        index + 1,
                        source.path().display()
                    ))
                })?;
                let dictionary = effective_page_dictionary(&document, page_id)?;
                imported.insert(
                    (document_id, index),
                    ImportedPage {
                        id: page_id,
                        dictionary,
                    },
                );
            }

            debug!(
                document = %document_id,
                path = %source.path().display(),
                objects = document.objects.len(),
                "imported source objects"
            );

            output.max_id = document.max_id;
            output.objects.extend(document.objects);
        }

        let mut kids = Vec::with_capacity(plan.len());
        let mut placed = HashSet::new();
        let mut statistics = ExecutionStatistics {
            documents_used: document_ids.len(),
            input_size,
            ..Default::default()
        };

        for entry in plan.entries() {
            let page = imported
                .get(&(entry.page.document, entry.page.index))
                .ok_or_else(|| {
                    PageWielderError::execution(format!(
                        "page {} of document {} was not imported",
                        entry.page.page_number(),
                        entry.page.document
                    ))
                })?;

            let mut dictionary = page.dictionary.clone();
            dictionary.set("Parent", pages_id);

            match entry.transform {
                Transform::Identity => {}
                Transform::Rotate(rotation) => {
                    let rotated = (page_rotation(&output, &dictionary) + rotation.as_degrees())
                        .rem_euclid(360);
                    dictionary.set("Rotate", rotated);
                    statistics.pages_rotated += 1;
                }
                Transform::Delete => {
                    return Err(PageWielderError::execution(format!(
                        "deleted page {} of document {} reached the executor",
                        entry.page.page_number(),
                        entry.page.document
                    )));
                }
            }

            let id = if placed.insert(page.id) {
                output.objects.insert(page.id, Object::Dictionary(dictionary));
                page.id
            } else {
                statistics.duplicated_pages += 1;
                output.add_object(dictionary)
            };
            kids.push(Object::Reference(id));
        }

        statistics.pages_written = kids.len();

        output.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => kids.len() as i64,
                "Kids" => kids,
            }),
        );

        let catalog_id = output.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        output.trailer.set("Root", catalog_id);

        let pruned = output.prune_objects();
        output.renumber_objects();

        statistics.elapsed = start.elapsed();
        info!(
            pages = statistics.pages_written,
            documents = statistics.documents_used,
            rotated = statistics.pages_rotated,
            pruned = pruned.len(),
            elapsed_ms = statistics.elapsed.as_millis() as u64,
            "plan executed"
        );

        Ok(Execution {
            document: output,
            statistics,
        })
    }
}

/// Highest version declared by the documents, but at least 1.7.
fn output_version(ids: &[DocumentId], documents: &mut DocumentSet) -> Result<String> {
    let mut version = DEFAULT_PDF_VERSION.to_string();
    for &id in ids {
        let declared = &documents.get_mut(id)?.document()?.version;
        if declared.as_str() > version.as_str() {
            version = declared.clone();
        }
    }
    Ok(version)
}
