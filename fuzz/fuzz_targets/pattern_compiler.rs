#![no_main]

use libfuzzer_sys::fuzz_target;
use nsdebug::{DebugError, PatternSet};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Tokens are escaped, so the only possible failure is an oversized program
        let set = match PatternSet::compile(input) {
            Ok(set) => set,
            Err(DebugError::InvalidPattern(_)) => return,
            Err(e) => panic!("unexpected compile error: {e}"),
        };
        if let Ok(restored) = PatternSet::compile(&set.to_namespaces()) {
            assert_eq!(set.includes().len(), restored.includes().len());
            assert_eq!(set.excludes().len(), restored.excludes().len());
        }
        let _ = set.is_enabled(input);
    }
});
