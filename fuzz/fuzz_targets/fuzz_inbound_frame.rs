//! Fuzz target: inbound frame path (`FrameDecoder` + `codec::decode_bytes`)
//!
//! Feeds arbitrary bytes through the line framer in two uneven chunks and
//! decodes every frame it yields.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - No yielded frame exceeds `MAX_FRAME_SIZE`
//! - Decoding is deterministic (same bytes, same result)
//!
//! cargo fuzz run fuzz_inbound_frame

#![no_main]

use buswatch::channel::codec::{self, FrameDecoder, MAX_FRAME_SIZE};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let split = data.first().map_or(0, |b| *b as usize % (data.len() + 1));
    let (head, tail) = data.split_at(split);

    let check = |frame: &[u8]| {
        assert!(frame.len() <= MAX_FRAME_SIZE, "framer yielded an oversized frame");
        let first = codec::decode_bytes(frame);
        let second = codec::decode_bytes(frame);
        assert_eq!(first, second, "decode must be deterministic");
    };

    let mut framer = FrameDecoder::new();
    framer.feed(head, check);
    framer.feed(tail, check);
    framer.finish(check);

    // The whole buffer as a single frame must not panic either.
    let _ = codec::decode_bytes(data);
});
