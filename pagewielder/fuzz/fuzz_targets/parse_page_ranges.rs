#![no_main]

use libfuzzer_sys::fuzz_target;
use pagewielder::engine::{OperationSpec, PageSelection};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(selection) = PageSelection::parse(s) {
        // Whatever parses must print back to something that parses the same.
        let reparsed = PageSelection::parse(&selection.to_string()).unwrap();
        assert_eq!(reparsed, selection);

        for page_count in [0, 1, 7] {
            if let Some(pages) = selection.expand(page_count) {
                assert!(pages.iter().all(|&index| index < page_count));
            }
        }
    }

    let _ = OperationSpec::parse(s);
});
