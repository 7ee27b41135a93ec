#![no_main]

use libfuzzer_sys::fuzz_target;
use stochcheck::spec::parse;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Any text is either a specification or an error, never a panic
        if let Ok(spec) = parse(input) {
            assert!(!spec.clauses.is_empty());
        }
    }
});
