#![no_main]

use libfuzzer_sys::fuzz_target;
use sanar::filter::RowFilter;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Attempt to parse the selection expression
        // This should not panic regardless of input
        let _ = RowFilter::from_expr(input);
    }
});
