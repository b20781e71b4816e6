#![no_main]

use libfuzzer_sys::fuzz_target;
use saphyr_replay::{AliasLimits, EventStream, Events};

// Feeds raw bytes straight through the stream: whatever the scanner makes of
// them, draining must terminate without panicking.
fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let limits = AliasLimits {
        max_total_replayed_tokens: 100_000,
        ..AliasLimits::default()
    };

    let mut events = EventStream::new(s, limits);
    loop {
        match events.next() {
            Ok(Some(_)) => continue,
            Ok(None) | Err(_) => break,
        }
    }
});
