//! Operation specs and the page plan built from them.
//!
//! An [`OperationSpec`] names an input, a page selection and one transform.
//! [`build_plan`] resolves a list of specs against a [`DocumentSet`] and
//! flattens them into a [`Plan`]: the exact sequence of pages the output
//! will contain, in order.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

use crate::engine::index::{DocumentId, DocumentSet, PageReference};
use crate::engine::range::PageSelection;
use crate::error::{PageWielderError, Result};

/// Page rotation in degrees, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// Rotate 90 degrees clockwise.
    Clockwise90,
    /// Rotate 180 degrees.
    Rotate180,
    /// Rotate 270 degrees clockwise (90 counter-clockwise).
    Clockwise270,
}

impl Rotation {
    /// Parse rotation from degrees.
    ///
    /// # Errors
    ///
    /// Returns an error if the degrees value is not 90, 180, or 270.
    pub fn from_degrees(degrees: i64) -> Result<Self> {
        match degrees {
            90 => Ok(Self::Clockwise90),
            180 => Ok(Self::Rotate180),
            270 => Ok(Self::Clockwise270),
            _ => Err(PageWielderError::parse(
                degrees.to_string(),
                "rotation must be 90, 180, or 270",
            )),
        }
    }

    /// Get rotation as degrees.
    pub fn as_degrees(&self) -> i64 {
        match self {
            Self::Clockwise90 => 90,
            Self::Rotate180 => 180,
            Self::Clockwise270 => 270,
        }
    }
}

/// What happens to every page an operation selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transform {
    /// Copy the page unchanged.
    #[default]
    Identity,
    /// Copy the page and add to its rotation.
    Rotate(Rotation),
    /// Leave the page out of the output.
    Delete,
}

impl Transform {
    /// Parse a transform keyword such as `r90` or `delete`.
    pub fn parse(token: &str) -> Result<Self> {
        let trimmed = token.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "identity" | "none" => Ok(Self::Identity),
            "rotate90" | "r90" | "90" => Ok(Self::Rotate(Rotation::Clockwise90)),
            "rotate180" | "r180" | "180" => Ok(Self::Rotate(Rotation::Rotate180)),
            "rotate270" | "r270" | "270" => Ok(Self::Rotate(Rotation::Clockwise270)),
            "delete" | "d" => Ok(Self::Delete),
            _ => Err(PageWielderError::parse(
                trimmed,
                "unknown transform, expected identity, rotate90, rotate180, rotate270 or delete",
            )),
        }
    }

    /// True for [`Transform::Delete`].
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }

    /// Degrees this transform adds to a page's rotation.
    pub fn rotation_degrees(&self) -> i64 {
        match self {
            Self::Rotate(rotation) => rotation.as_degrees(),
            Self::Identity | Self::Delete => 0,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("identity"),
            Self::Rotate(rotation) => write!(f, "rotate{}", rotation.as_degrees()),
            Self::Delete => f.write_str("delete"),
        }
    }
}

impl FromStr for Transform {
    type Err = PageWielderError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// One user-facing operation: an input, the pages to take, and what to do
/// with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpec {
    /// Input document.
    pub input: PathBuf,
    /// Pages the operation applies to.
    pub pages: PageSelection,
    /// Transform applied to every selected page.
    pub transform: Transform,
}

impl OperationSpec {
    /// Every page of `input`, unchanged.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            pages: PageSelection::all(),
            transform: Transform::Identity,
        }
    }

    /// Replace the page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Replace the transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Parse the command-line form `PATH[@PAGES[@TRANSFORM]]`.
    ///
    /// An empty `PAGES` part selects every page, so `a.pdf@@r90` rotates a
    /// whole document.
    ///
    /// ```
    /// use pagewielder::engine::plan::{OperationSpec, Transform};
    ///
    /// let spec = OperationSpec::parse("scan.pdf@2-4@r90").unwrap();
    /// assert_eq!(spec.pages.to_string(), "2-4");
    /// assert_eq!(spec.transform.to_string(), "rotate90");
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts: Vec<&str> = s.rsplitn(3, '@').collect();
        parts.reverse();
        let input = parts.first().copied().unwrap_or_default();
        let pages = parts.get(1).copied().unwrap_or_default();
        let transform = parts.get(2).copied().unwrap_or_default();

        if input.trim().is_empty() {
            return Err(PageWielderError::parse(s, "missing input path"));
        }

        let pages = if pages.trim().is_empty() {
            PageSelection::all()
        } else {
            PageSelection::parse(pages)?
        };

        Ok(Self {
            input: PathBuf::from(input),
            pages,
            transform: Transform::parse(transform)?,
        })
    }
}

impl FromStr for OperationSpec {
    type Err = PageWielderError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for OperationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.input.display(), self.pages)?;
        if self.transform != Transform::Identity {
            write!(f, "@{}", self.transform)?;
        }
        Ok(())
    }
}

/// One output page: where it comes from and how it is changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanEntry {
    /// Source page.
    pub page: PageReference,
    /// Never [`Transform::Delete`].
    pub transform: Transform,
}

/// The ordered list of output pages. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    entries: Vec<PlanEntry>,
}

impl Plan {
    /// Entries in output order.
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Number of output pages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a plan returned by [`build_plan`].
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Source documents in order of first use.
    pub fn documents(&self) -> Vec<DocumentId> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|entry| entry.page.document)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// A serializable description of the plan, for dry runs.
    pub fn summary(&self, documents: &DocumentSet) -> PlanSummary {
        let inputs = self
            .documents()
            .into_iter()
            .map(|id| InputSummary {
                path: documents.path(id).map(PathBuf::from).unwrap_or_default(),
                page_count: documents.get(id).ok().and_then(|d| d.known_page_count()),
                pages_used: self.entries.iter().filter(|e| e.page.document == id).count(),
            })
            .collect();

        let pages = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| PageSummary {
                output_page: i + 1,
                input: documents
                    .path(entry.page.document)
                    .map(PathBuf::from)
                    .unwrap_or_default(),
                page: entry.page.page_number(),
                transform: entry.transform.to_string(),
            })
            .collect();

        PlanSummary {
            total_pages: self.entries.len(),
            inputs,
            pages,
        }
    }
}

/// Dry-run view of a [`Plan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    /// Number of output pages.
    pub total_pages: usize,
    /// Source documents in order of first use.
    pub inputs: Vec<InputSummary>,
    /// Output pages in order.
    pub pages: Vec<PageSummary>,
}

/// Per-input line of a [`PlanSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSummary {
    /// Input path.
    pub path: PathBuf,
    /// Page count of the input, when it was opened.
    pub page_count: Option<usize>,
    /// Output pages taken from this input.
    pub pages_used: usize,
}

/// Per-page line of a [`PlanSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    /// 1-based position in the output.
    pub output_page: usize,
    /// Input path.
    pub input: PathBuf,
    /// 1-based page number in the input.
    pub page: usize,
    /// Transform applied.
    pub transform: String,
}

/// Resolve `specs` against `documents` and flatten them into a [`Plan`].
///
/// Specs are processed in order and their pages keep the order of their
/// ranges. Pages selected by a `Delete` spec are left out of the whole plan.
/// A document that only appears in `Delete` specs contributes its remaining
/// pages at the position of its first `Delete` spec.
///
/// # Errors
///
/// - `Parse`, `OutOfRange`, or an I/O error if a spec cannot be resolved
/// - `Plan` if there are no specs or no page survives
pub fn build_plan(specs: &[OperationSpec], documents: &mut DocumentSet) -> Result<Plan> {
    if specs.is_empty() {
        return Err(PageWielderError::plan("no operations given"));
    }

    let mut resolved = Vec::with_capacity(specs.len());
    for spec in specs {
        let id = documents.register(&spec.input);
        let pages = documents.get_mut(id)?.resolve_selection(&spec.pages)?;
        debug!(
            spec = %spec,
            document = %id,
            pages = pages.len(),
            "resolved operation"
        );
        resolved.push((id, spec.transform, pages));
    }

    let deleted: HashSet<PageReference> = resolved
        .iter()
        .filter(|(_, transform, _)| transform.is_delete())
        .flat_map(|(_, _, pages)| pages.iter().copied())
        .collect();

    let copied: HashSet<DocumentId> = resolved
        .iter()
        .filter(|(_, transform, _)| !transform.is_delete())
        .map(|(id, _, _)| *id)
        .collect();

    let mut entries = Vec::new();
    let mut expanded = HashSet::new();

    for (id, transform, pages) in &resolved {
        if !transform.is_delete() {
            entries.extend(
                pages
                    .iter()
                    .filter(|page| !deleted.contains(page))
                    .map(|page| PlanEntry {
                        page: *page,
                        transform: *transform,
                    }),
            );
        } else if !copied.contains(id) && expanded.insert(*id) {
            let page_count = documents.get_mut(*id)?.page_count()?;
            entries.extend(
                (0..page_count)
                    .map(|index| PageReference::new(*id, index))
                    .filter(|page| !deleted.contains(page))
                    .map(|page| PlanEntry {
                        page,
                        transform: Transform::Identity,
                    }),
            );
        }
    }

    let plan = Plan { entries };
    validate_plan(&plan, documents)?;

    debug!(
        pages = plan.len(),
        deleted = deleted.len(),
        documents = plan.documents().len(),
        "plan built"
    );

    Ok(plan)
}

fn validate_plan(plan: &Plan, documents: &mut DocumentSet) -> Result<()> {
    if plan.is_empty() {
        return Err(PageWielderError::plan(
            "the operations select no pages (every selected page is deleted)",
        ));
    }

    for entry in plan.entries() {
        let document = documents.get_mut(entry.page.document)?;
        let page_count = document.page_count()?;
        if entry.page.index >= page_count {
            return Err(PageWielderError::out_of_range(
                document.path().to_path_buf(),
                entry.page.page_number().to_string(),
                page_count,
            ));
        }
        if entry.transform.is_delete() {
            return Err(PageWielderError::plan(format!(
                "page {} of {} is both deleted and copied",
                entry.page.page_number(),
                document.path().display()
            )));
        }
    }

    Ok(())
}
