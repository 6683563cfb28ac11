//! Fuzz target: `MonitorClient::handle_frame` over arbitrary frame streams
//!
//! Splits the input on newlines and hands every line to a fresh client.
//!
//! Invariants checked:
//! - No panics under any frame sequence
//! - The log feed never exceeds `LOG_CAPACITY`
//! - Start and stop are never enabled at the same time
//!
//! cargo fuzz run fuzz_session_replay

#![no_main]

use buswatch::app::events::AppEvent;
use buswatch::app::ports::PresentationSink;
use buswatch::app::service::MonitorClient;
use buswatch::channel::transport::NullChannel;
use buswatch::config::ClientConfig;
use buswatch::log_feed::LOG_CAPACITY;
use libfuzzer_sys::fuzz_target;

struct Discard;

impl PresentationSink for Discard {
    fn render(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let mut client = MonitorClient::new(ClientConfig::default());
    let mut channel = NullChannel::new();
    let mut sink = Discard;
    client.start(&mut sink);

    for line in text.lines() {
        client.handle_frame(line, &mut channel, &mut sink);
        assert!(client.feed().len() <= LOG_CAPACITY);
        let controls = client.controls();
        assert!(!(controls.start_enabled && controls.stop_enabled));
    }
    client.teardown(&mut channel);
});
