//! Page sizes and grouping pages by size.
//!
//! Sizes come from each page's effective `MediaBox` and are compared after
//! rounding to two decimals, so `612 x 792` and `612.001 x 792` are the same
//! group.

use lopdf::{Document, Object};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::engine::index::{DocumentIndex, dereference};
use crate::engine::plan::{OperationSpec, Transform};
use crate::engine::range::{PageBound, PageRange, PageSelection};
use crate::error::{PageWielderError, Result};

/// Page size in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    /// Width in points.
    pub width: f64,
    /// Height in points.
    pub height: f64,
}

impl Dimensions {
    /// Size of a `[x0 y0 x1 y1]` rectangle.
    pub fn from_rectangle(doc: &Document, rect: &Object) -> Option<Self> {
        let values = dereference(doc, rect).ok()?.as_array().ok()?;
        if values.len() != 4 {
            return None;
        }

        let mut coords = [0.0; 4];
        for (slot, value) in coords.iter_mut().zip(values) {
            *slot = number(dereference(doc, value).ok()?)?;
        }

        Some(Self {
            width: (coords[2] - coords[0]).abs(),
            height: (coords[3] - coords[1]).abs(),
        })
    }

    /// Hundredths of a point, used to compare sizes.
    fn key(&self) -> (i64, i64) {
        (
            (self.width * 100.0).round() as i64,
            (self.height * 100.0).round() as i64,
        )
    }

    /// Whether two sizes are equal to two decimals.
    pub fn same_size(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} x {:.2}", self.width, self.height)
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Pages sharing one size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionGroup {
    /// The shared size.
    pub dimensions: Dimensions,
    /// 1-based page numbers, ascending.
    pub pages: Vec<usize>,
}

impl DimensionGroup {
    /// Number of pages in the group.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// What `info` reports about one file.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    /// Path the file was opened from.
    pub path: PathBuf,
    /// PDF header version.
    pub version: String,
    /// Number of pages.
    pub page_count: usize,
    /// Size on disk in bytes. Zero for in-memory documents.
    pub file_size: u64,
    /// Pages grouped by size.
    pub groups: Vec<DimensionGroup>,
}

/// Collect version, page count and size groups of `document`.
pub fn describe(document: &mut DocumentIndex) -> Result<DocumentInfo> {
    let groups = group_pages_by_dimensions(document)?;
    let loaded = document.loaded()?;

    Ok(DocumentInfo {
        path: loaded.path.clone(),
        version: loaded.document.version.clone(),
        page_count: loaded.page_count,
        file_size: loaded.file_size,
        groups,
    })
}

/// Size of the page at `index` (0-based).
pub fn page_dimensions(document: &mut DocumentIndex, index: usize) -> Result<Dimensions> {
    let path = document.path().to_path_buf();
    let page = document.page_attributes(index)?;
    let doc = document.document()?;

    page.get(b"MediaBox")
        .ok()
        .and_then(|rect| Dimensions::from_rectangle(doc, rect))
        .ok_or_else(|| {
            PageWielderError::execution(format!(
                "page {} of {} has no usable MediaBox",
                index + 1,
                path.display()
            ))
        })
}

/// Group every page of `document` by size, in order of first appearance.
pub fn group_pages_by_dimensions(document: &mut DocumentIndex) -> Result<Vec<DimensionGroup>> {
    let mut groups: Vec<DimensionGroup> = Vec::new();

    for index in 0..document.page_count()? {
        let dimensions = page_dimensions(document, index)?;
        match groups
            .iter_mut()
            .find(|group| group.dimensions.same_size(&dimensions))
        {
            Some(group) => group.pages.push(index + 1),
            None => groups.push(DimensionGroup {
                dimensions,
                pages: vec![index + 1],
            }),
        }
    }

    Ok(groups)
}

/// Parse a comma-separated list of 0-based group indices, e.g. `"0,2"`.
///
/// Returns `None` for blank input.
pub fn parse_group_selection(input: &str, group_count: usize) -> Result<Option<Vec<usize>>> {
    if input.trim().is_empty() {
        return Ok(None);
    }

    let mut selected = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        let index: usize = token
            .parse()
            .map_err(|_| PageWielderError::parse(token, "expected a group index"))?;
        if index >= group_count {
            return Err(PageWielderError::parse(
                token,
                format!("group index must be below {group_count}"),
            ));
        }
        if !selected.contains(&index) {
            selected.push(index);
        }
    }

    Ok(Some(selected))
}

/// A `Delete` operation removing every page of the selected groups.
pub fn removal_spec(
    input: &Path,
    groups: &[DimensionGroup],
    selected: &[usize],
) -> Result<OperationSpec> {
    let mut pages = Vec::new();
    for &index in selected {
        let group = groups.get(index).ok_or_else(|| {
            PageWielderError::invalid_config(format!("no page group with index {index}"))
        })?;
        pages.extend(group.pages.iter().copied());
    }
    pages.sort_unstable();
    pages.dedup();

    if pages.is_empty() {
        return Err(PageWielderError::invalid_config("no page groups selected"));
    }

    Ok(OperationSpec::new(input)
        .with_pages(compact_selection(&pages))
        .with_transform(Transform::Delete))
}

/// Collapse ascending page numbers into spans.
fn compact_selection(pages: &[usize]) -> PageSelection {
    let mut ranges = Vec::new();
    let mut iter = pages.iter().copied().peekable();

    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            end += 1;
            iter.next();
        }
        ranges.push(PageRange::Span {
            start: PageBound::Number(start as u64),
            end: PageBound::Number(end as u64),
        });
    }

    PageSelection::from_ranges(ranges)
}
