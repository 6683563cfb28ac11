//! Scripted session replay.
//!
//! Drives a [`MonitorClient`] from a plain-text script, one step per line:
//!
//! ```text
//! # comment
//! 42["connected",{"session_id":"abc"}]        ← inbound frame
//! > start 37.5 127.0 402 30                    ← user command
//! 42["monitoring_started",{"bus_number":"402","interval":30}]
//! > export
//! ```
//!
//! Steps are produced into a bounded [`EventQueue`] by one task and consumed
//! by the client task, both on a single-threaded `edge-executor`:
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────┐
//!  │  futures_lite::future::block_on                      │
//!  │  ┌────────────────────────────────────────────────┐  │
//!  │  │ edge_executor::LocalExecutor                   │  │
//!  │  │   feed ──▶ EventQueue<Option<Step>> ──▶ pump    │  │
//!  │  └────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────┘
//! ```

use core::fmt;

use edge_executor::LocalExecutor;
use futures_lite::future::block_on;
use log::{debug, info, warn};

use crate::app::commands::UserCommand;
use crate::app::ports::{
    ChannelError, ChannelPort, ExportError, ExportPort, PresentationSink, ProbeError, ProbePort,
    ProbeResponse,
};
use crate::app::service::MonitorClient;
use crate::channel::codec::FrameDecoder;
use crate::channel::messages::OutboundMessage;
use crate::channel::queue::{EventQueue, event_queue};
use crate::config::ClientConfig;
use crate::validator::RawRequest;

/// Marks a user-command line.
const COMMAND_PREFIX: char = '>';

// ───────────────────────────────────────────────────────────────
// Script parsing
// ───────────────────────────────────────────────────────────────

/// One script step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    User(UserCommand),
    Inbound(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    UnknownCommand { line: usize, command: String },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand { line, command } => {
                write!(f, "line {line}: unknown command '{command}'")
            }
        }
    }
}

impl std::error::Error for ScriptError {}

/// Parse one script line.  Blank lines and `#` comments yield `None`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<Step>, ScriptError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let Some(command) = line.strip_prefix(COMMAND_PREFIX) else {
        return Ok(Some(Step::Inbound(line.to_owned())));
    };

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let cmd = match name {
        "start" => {
            let args: Vec<&str> = words.collect();
            let arg = |i: usize| args.get(i).copied().unwrap_or_default();
            // Missing arguments stay blank so validation reports them.
            UserCommand::StartMonitoring(RawRequest::new(arg(0), arg(1), arg(2), arg(3)))
        }
        "stop" => UserCommand::StopMonitoring,
        "status" => UserCommand::QueryStatus,
        "clear" => UserCommand::ClearLog,
        "export" => UserCommand::ExportLog,
        "probe" => UserCommand::Probe,
        "probe-direct" => UserCommand::ProbeDirect,
        "teardown" => UserCommand::Teardown,
        other => {
            return Err(ScriptError::UnknownCommand {
                line: line_no,
                command: other.to_owned(),
            });
        }
    };
    Ok(Some(Step::User(cmd)))
}

/// Split raw script bytes into steps.  Line numbers count non-empty lines.
pub fn parse_script(bytes: &[u8]) -> Result<Vec<Step>, ScriptError> {
    let mut framer = FrameDecoder::new();
    let mut lines = Vec::new();
    framer.feed(bytes, |frame| lines.push(String::from_utf8_lossy(frame).into_owned()));
    framer.finish(|frame| lines.push(String::from_utf8_lossy(frame).into_owned()));
    if framer.dropped() > 0 {
        warn!("replay: skipped {} oversized script line(s)", framer.dropped());
    }

    let mut steps = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if let Some(step) = parse_line(idx + 1, line)? {
            steps.push(step);
        }
    }
    Ok(steps)
}

// ───────────────────────────────────────────────────────────────
// Combined I/O
// ───────────────────────────────────────────────────────────────

/// Bundles the three outward adapters so the client can borrow them as one.
pub struct ReplayIo<C, P, E> {
    pub channel: C,
    pub probe: P,
    pub export: E,
}

impl<C: ChannelPort, P, E> ChannelPort for ReplayIo<C, P, E> {
    fn emit(&mut self, msg: &OutboundMessage) -> Result<(), ChannelError> {
        self.channel.emit(msg)
    }
}

impl<C, P: ProbePort, E> ProbePort for ReplayIo<C, P, E> {
    fn probe(&mut self, identity: Option<&str>) -> Result<ProbeResponse, ProbeError> {
        self.probe.probe(identity)
    }
}

impl<C, P, E: ExportPort> ExportPort for ReplayIo<C, P, E> {
    fn write_export(&mut self, file_name: &str, contents: &str) -> Result<(), ExportError> {
        self.export.write_export(file_name, contents)
    }
}

// ───────────────────────────────────────────────────────────────
// Session driver
// ───────────────────────────────────────────────────────────────

pub struct ReplaySession<C, P, E, S> {
    pub client: MonitorClient,
    pub io: ReplayIo<C, P, E>,
    pub sink: S,
}

impl<C, P, E, S> ReplaySession<C, P, E, S>
where
    C: ChannelPort,
    P: ProbePort,
    E: ExportPort,
    S: PresentationSink,
{
    /// Build the client and announce it to the sink.
    pub fn new(config: ClientConfig, io: ReplayIo<C, P, E>, mut sink: S) -> Self {
        let mut client = MonitorClient::new(config);
        client.start(&mut sink);
        Self { client, io, sink }
    }

    /// Handle one step.  Refused commands are already in the feed.
    pub fn dispatch(&mut self, step: Step) {
        match step {
            Step::User(cmd) => {
                if let Err(e) = self.client.handle_command(cmd, &mut self.io, &mut self.sink) {
                    debug!("replay: command refused: {}", e);
                }
            }
            Step::Inbound(frame) => {
                self.client
                    .handle_frame(&frame, &mut self.io.channel, &mut self.sink);
            }
        }
    }

    /// Process-exit hook.
    pub fn teardown(&mut self) {
        self.client.teardown(&mut self.io.channel);
    }
}

/// Producer task: push every step, then the end marker.
pub async fn feed(queue: &EventQueue<Option<Step>>, steps: Vec<Step>) {
    for step in steps {
        queue.send(Some(step)).await;
    }
    queue.send(None).await;
}

/// Consumer task: apply steps until the end marker.  Returns the count.
pub async fn pump<C, P, E, S>(
    queue: &EventQueue<Option<Step>>,
    session: &mut ReplaySession<C, P, E, S>,
) -> usize
where
    C: ChannelPort,
    P: ProbePort,
    E: ExportPort,
    S: PresentationSink,
{
    let mut handled = 0;
    while let Some(step) = queue.receive().await {
        session.dispatch(step);
        handled += 1;
    }
    handled
}

/// Run `steps` through `session` on a local executor, then tear down.
pub fn run<C, P, E, S>(steps: Vec<Step>, session: &mut ReplaySession<C, P, E, S>) -> usize
where
    C: ChannelPort,
    P: ProbePort,
    E: ExportPort,
    S: PresentationSink,
{
    let queue: EventQueue<Option<Step>> = event_queue();
    let executor: LocalExecutor<'_, 4> = LocalExecutor::new();

    executor.spawn(feed(&queue, steps)).detach();
    let handled = block_on(executor.run(pump(&queue, session)));

    session.teardown();
    info!("replay: {} step(s) handled", handled);
    handled
}
