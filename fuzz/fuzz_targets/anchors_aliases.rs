#![no_main]

use libfuzzer_sys::fuzz_target;
use saphyr_replay::{AliasLimits, EventStream, Events};

// This fuzzer biases inputs toward anchors and aliases. It embeds the input
// into documents that exercise capture, override, and replay, and drains the
// stream. Errors are fine; panics and stalls are not.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }

    let s = String::from_utf8_lossy(data);

    let docs = [
        format!("a: &A {s}\nb: *A\nseq: &S [1, 2, 3]\nseq_alias: *S\n"),
        format!("x: &D first\ny: &D {s}\nz: *D\n"),
        format!("outer: &O\n  inner: &I [{s}]\n  again: *I\ncopy: *O\n"),
    ];

    let limits = AliasLimits {
        max_total_replayed_tokens: 100_000,
        ..AliasLimits::default()
    };

    for doc in &docs {
        let mut events = EventStream::new(doc, limits);
        loop {
            match events.next() {
                Ok(Some(_)) => continue,
                Ok(None) | Err(_) => break,
            }
        }
    }
});
