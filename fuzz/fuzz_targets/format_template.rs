#![no_main]

use libfuzzer_sys::fuzz_target;
use nsdebug::{sink_fn, Arg, Registry, RegistryConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let (template, message) = input.split_once('\n').unwrap_or((input, "%s %j"));
        let registry = Registry::empty(RegistryConfig::default().with_format(template));
        registry.set_default_log_sink(sink_fn(|_| {}));
        let channel = registry.get_or_create("fuzz");
        channel.set_enabled(true);

        // Unknown directives may fail the call; nothing may panic
        let _ = channel.log(vec![Arg::from(message), Arg::from(1), Arg::from("two")]);
    }
});
