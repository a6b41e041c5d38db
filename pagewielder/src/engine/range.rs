//! Page range expressions.
//!
//! A range expression is a comma-separated list of tokens:
//!
//! - `5` - a single page
//! - `1-5` - pages 1 through 5 (inclusive)
//! - `9-6` - pages 9, 8, 7, 6 (descending ranges are allowed)
//! - `3-end`, `end-1`, `end` - `end` is the last page of the document
//! - `all` - every page
//! - `3:`, `:10`, `2:4`, `:` - open-ended colon form
//!
//! Parsing only checks syntax. Bounds are checked when the range is resolved
//! against a document, because `end` depends on the page count.
//!
//! ```
//! use pagewielder::engine::range::PageSelection;
//!
//! let selection = PageSelection::parse("1-3, 5, end").unwrap();
//! assert_eq!(selection.expand(6), Some(vec![0, 1, 2, 4, 5]));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use crate::error::{PageWielderError, Result};

/// One side of a page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageBound {
    /// A 1-based page number. Numbers too large for `u64` saturate.
    Number(u64),
    /// The last page of the document.
    End,
}

impl PageBound {
    /// Resolve this bound to a 1-based page number, if it exists.
    fn resolve(self, page_count: usize) -> Option<usize> {
        let page = match self {
            Self::Number(n) => usize::try_from(n).ok()?,
            Self::End => page_count,
        };
        (1..=page_count).contains(&page).then_some(page)
    }
}

impl fmt::Display for PageBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::End => f.write_str("end"),
        }
    }
}

/// A single token of a range expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRange {
    /// Every page of the document.
    All,
    /// An inclusive interval; descending when `start > end`.
    Span {
        /// First page emitted.
        start: PageBound,
        /// Last page emitted.
        end: PageBound,
    },
}

impl PageRange {
    /// A single page.
    pub fn single(page: u64) -> Self {
        Self::Span {
            start: PageBound::Number(page),
            end: PageBound::Number(page),
        }
    }

    /// Parse one token, e.g. `"4-2"` or `"7:"`.
    pub fn parse(token: &str) -> Result<Self> {
        let trimmed = token.trim();

        if trimmed.is_empty() {
            return Err(PageWielderError::parse(
                token,
                "empty page range (check for stray commas)",
            ));
        }

        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        if let Some((start, end)) = trimmed.split_once(':') {
            if end.contains(':') {
                return Err(PageWielderError::parse(
                    trimmed,
                    "expected at most one ':' in a range",
                ));
            }
            let (start, end) = (start.trim(), end.trim());
            if start.is_empty() && end.is_empty() {
                return Ok(Self::All);
            }
            let start = if start.is_empty() {
                PageBound::Number(1)
            } else {
                parse_bound(trimmed, start)?
            };
            let end = if end.is_empty() {
                PageBound::End
            } else {
                parse_bound(trimmed, end)?
            };
            return Ok(Self::Span { start, end });
        }

        if let Some((start, end)) = trimmed.split_once('-') {
            if end.contains('-') {
                return Err(PageWielderError::parse(
                    trimmed,
                    "expected a single '-' between two pages, like '1-5'",
                ));
            }
            let (start, end) = (start.trim(), end.trim());
            if start.is_empty() || end.is_empty() {
                return Err(PageWielderError::parse(
                    trimmed,
                    "missing range bound, expected a form like '1-5' or '3-end'",
                ));
            }
            return Ok(Self::Span {
                start: parse_bound(trimmed, start)?,
                end: parse_bound(trimmed, end)?,
            });
        }

        let page = parse_bound(trimmed, trimmed)?;
        Ok(Self::Span {
            start: page,
            end: page,
        })
    }

    /// Expand into 0-based page indices for a document of `page_count` pages.
    ///
    /// Returns `None` when a bound falls outside `[1, page_count]`.
    pub fn expand(&self, page_count: usize) -> Option<Vec<usize>> {
        match *self {
            Self::All => Some((0..page_count).collect()),
            Self::Span { start, end } => {
                let start = start.resolve(page_count)?;
                let end = end.resolve(page_count)?;
                if start <= end {
                    Some((start - 1..end).collect())
                } else {
                    Some((end - 1..start).rev().collect())
                }
            }
        }
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Span { start, end } if start == end => write!(f, "{start}"),
            Self::Span { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

fn parse_bound(token: &str, bound: &str) -> Result<PageBound> {
    if bound.eq_ignore_ascii_case("end") {
        return Ok(PageBound::End);
    }

    let page: u64 = match bound.parse() {
        Ok(page) => page,
        // All digits but too large: a page that no document has.
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => u64::MAX,
        Err(_) => {
            return Err(PageWielderError::parse(
                token,
                format!("invalid page number '{bound}'"),
            ));
        }
    };

    if page == 0 {
        return Err(PageWielderError::parse(
            token,
            "page numbers start at 1",
        ));
    }

    Ok(PageBound::Number(page))
}

/// An ordered list of ranges. Order and duplicates are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageSelection {
    ranges: Vec<PageRange>,
}

impl PageSelection {
    /// Every page of the document.
    pub fn all() -> Self {
        Self {
            ranges: vec![PageRange::All],
        }
    }

    /// Build a selection from already parsed ranges.
    pub fn from_ranges(ranges: Vec<PageRange>) -> Self {
        Self { ranges }
    }

    /// Parse a comma-separated range expression.
    pub fn parse(expr: &str) -> Result<Self> {
        let ranges = expr
            .split(',')
            .map(PageRange::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { ranges })
    }

    /// The ranges, in the order given.
    pub fn ranges(&self) -> &[PageRange] {
        &self.ranges
    }

    /// True when the selection is exactly `all`.
    pub fn is_all(&self) -> bool {
        self.ranges == [PageRange::All]
    }

    /// Expand every range and concatenate the results.
    ///
    /// Returns `None` if any range is out of bounds.
    pub fn expand(&self, page_count: usize) -> Option<Vec<usize>> {
        let mut pages = Vec::new();
        for range in &self.ranges {
            pages.extend(range.expand(page_count)?);
        }
        Some(pages)
    }
}

impl Default for PageSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for PageSelection {
    type Err = PageWielderError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PageSelection {
    type Error = PageWielderError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PageSelection> for String {
    fn from(selection: PageSelection) -> Self {
        selection.to_string()
    }
}

impl fmt::Display for PageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_single_page() {
        let range = PageRange::parse("5").unwrap();
        assert_eq!(range, PageRange::single(5));
        assert_eq!(range.expand(10), Some(vec![4]));
    }

    #[test]
    fn test_ascending_range() {
        let range = PageRange::parse("1-5").unwrap();
        assert_eq!(range.expand(10), Some(vec![0, 1, 2, 3, 4]));
    }

    #[test]
    fn test_descending_range() {
        let range = PageRange::parse("4-2").unwrap();
        assert_eq!(range.expand(5), Some(vec![3, 2, 1]));
    }

    #[rstest]
    #[case("3-end", 6, vec![2, 3, 4, 5])]
    #[case("end-4", 6, vec![5, 4, 3])]
    #[case("end", 6, vec![5])]
    #[case("end-end", 6, vec![5])]
    #[case("END", 3, vec![2])]
    #[case("all", 3, vec![0, 1, 2])]
    #[case("ALL", 2, vec![0, 1])]
    #[case("2:", 4, vec![1, 2, 3])]
    #[case(":2", 4, vec![0, 1])]
    #[case("3:1", 4, vec![2, 1, 0])]
    #[case(":", 3, vec![0, 1, 2])]
    #[case(" 2 - 3 ", 4, vec![1, 2])]
    fn test_expand_forms(#[case] token: &str, #[case] pages: usize, #[case] expected: Vec<usize>) {
        let range = PageRange::parse(token).unwrap();
        assert_eq!(range.expand(pages), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("abc")]
    #[case("0")]
    #[case("0-3")]
    #[case("1-")]
    #[case("-3")]
    #[case("1-2-3")]
    #[case("1:2:3")]
    #[case("1.5")]
    #[case("x:")]
    fn test_malformed_tokens(#[case] token: &str) {
        let err = PageRange::parse(token).unwrap_err();
        assert!(matches!(err, PageWielderError::Parse { .. }), "{token}: {err}");
    }

    #[test]
    fn test_parse_error_names_token() {
        let err = PageSelection::parse("1-3,x-4").unwrap_err();
        match err {
            PageWielderError::Parse { token, .. } => assert_eq!(token, "x-4"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stray_comma_rejected() {
        assert!(PageSelection::parse("1,,2").is_err());
        assert!(PageSelection::parse("1,2,").is_err());
        assert!(PageSelection::parse(",1").is_err());
    }

    #[test]
    fn test_out_of_bounds_expands_to_none() {
        assert_eq!(PageRange::parse("6").unwrap().expand(5), None);
        assert_eq!(PageRange::parse("1-6").unwrap().expand(5), None);
        assert_eq!(PageRange::parse("end").unwrap().expand(0), None);
    }

    #[test]
    fn test_huge_page_number_is_out_of_bounds() {
        let range = PageRange::parse("1-4294967296").unwrap();
        assert_eq!(range.expand(5), None);

        let range = PageRange::parse("99999999999999999999999").unwrap();
        assert_eq!(range.expand(5), None);
        assert!(PageRange::parse("-4").is_err());
        assert!(PageRange::parse("+4x").is_err());
    }

    #[test]
    fn test_all_on_empty_document() {
        assert_eq!(PageRange::All.expand(0), Some(vec![]));
    }

    #[test]
    fn test_selection_keeps_order_and_duplicates() {
        let selection = PageSelection::parse("3,1,3,2-1").unwrap();
        assert_eq!(selection.expand(3), Some(vec![2, 0, 2, 1, 0]));
    }

    #[test]
    fn test_selection_display() {
        let selection = PageSelection::parse("1-3, 5 ,end-2,all,4:").unwrap();
        assert_eq!(selection.to_string(), "1-3,5,end-2,all,4-end");
    }

    #[test]
    fn test_selection_is_all() {
        assert!(PageSelection::all().is_all());
        assert!(PageSelection::parse("All").unwrap().is_all());
        assert!(!PageSelection::parse("all,1").unwrap().is_all());
    }

    #[test]
    fn test_selection_serde() {
        let selection: PageSelection = serde_json::from_str("\"1-2,end\"").unwrap();
        assert_eq!(selection, PageSelection::parse("1-2,end").unwrap());
        assert_eq!(serde_json::to_string(&selection).unwrap(), "\"1-2,end\"");
        assert!(serde_json::from_str::<PageSelection>("\"1-\"").is_err());
    }
}
