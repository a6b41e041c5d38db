//! Property tests for range resolution.

use pagewielder::engine::{DocumentSet, PageRange, PageSelection};
use pagewielder::error::PageWielderError;
use proptest::prelude::*;
use std::path::Path;

use crate::common::sized_document;

fn pages_and_bounds() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..60).prop_flat_map(|n| (Just(n), 1..=n, 1..=n))
}

fn resolve(pages: usize, expression: &str) -> Result<Vec<usize>, PageWielderError> {
    let mut documents = DocumentSet::new();
    let id = documents.insert_document(
        Path::new("generated.pdf"),
        sized_document(&vec![(612, 792); pages]),
    );
    let selection = PageSelection::parse(expression)?;
    let references = documents.get_mut(id)?.resolve_selection(&selection)?;
    Ok(references.iter().map(|r| r.index).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ascending_span_is_contiguous((n, a, b) in pages_and_bounds()) {
        let (a, b) = (a.min(b), a.max(b));
        let indices = PageRange::parse(&format!("{a}-{b}")).unwrap().expand(n).unwrap();

        prop_assert_eq!(indices.len(), b - a + 1);
        prop_assert_eq!(indices, (a - 1..b).collect::<Vec<_>>());
    }

    #[test]
    fn descending_span_is_reversed((n, a, b) in pages_and_bounds()) {
        prop_assume!(a != b);
        let (low, high) = (a.min(b), a.max(b));

        let ascending = PageRange::parse(&format!("{low}-{high}")).unwrap().expand(n).unwrap();
        let descending = PageRange::parse(&format!("{high}-{low}")).unwrap().expand(n).unwrap();

        prop_assert!(descending.windows(2).all(|w| w[0] > w[1]));
        prop_assert_eq!(descending.into_iter().rev().collect::<Vec<_>>(), ascending);
    }

    #[test]
    fn parsing_is_deterministic(pages in prop::collection::vec(1u32..200, 1..8)) {
        let expression = pages
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let first = PageSelection::parse(&expression).unwrap();
        let second = PageSelection::parse(&expression).unwrap();
        prop_assert_eq!(first.expand(200).unwrap(), second.expand(200).unwrap());
        prop_assert_eq!(first.to_string(), expression);
    }

    #[test]
    fn bounds_past_end_are_out_of_range(n in 1usize..40, extra in 1usize..5) {
        let err = resolve(n, &format!("1-{}", n + extra)).unwrap_err();
        let is_out_of_range = matches!(err, PageWielderError::OutOfRange { .. });
        prop_assert!(is_out_of_range);
    }
}

#[test]
fn test_end_end_is_last_page() {
    assert_eq!(resolve(5, "end-end").unwrap(), vec![4]);
    assert_eq!(resolve(1, "end-end").unwrap(), vec![0]);
}

#[test]
fn test_page_after_last_is_out_of_range() {
    let err = resolve(5, "6").unwrap_err();
    assert!(matches!(err, PageWielderError::OutOfRange { .. }));
}

#[test]
fn test_listed_pages_keep_order() {
    assert_eq!(resolve(5, "1-3,5").unwrap(), vec![0, 1, 2, 4]);
    assert_eq!(resolve(5, "4-2").unwrap(), vec![3, 2, 1]);
}
