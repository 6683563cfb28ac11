//! Busz monitoring client: scripted replay entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  ConsoleChannel    LogPresentationSink   CannedProbe           │
//! │  (ChannelPort)     (PresentationSink)    (ProbePort)           │
//! │  FsExporter                                                    │
//! │  (ExportPort)                                                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              MonitorClient (pure logic)                │    │
//! │  │  Validator · Session FSM · Classifier · Log feed       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Replay script ──▶ EventQueue ──▶ client task (edge-executor)  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Outbound frames are written to stdout, one per line.  Diagnostic logs
//! go to stderr via `env_logger` (`RUST_LOG`, default `info`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use buswatch::adapters::console_channel::ConsoleChannel;
use buswatch::adapters::export_fs::FsExporter;
use buswatch::adapters::log_sink::LogPresentationSink;
use buswatch::adapters::probe::CannedProbe;
use buswatch::app::ports::ProbeResponse;
use buswatch::config::ClientConfig;
use buswatch::replay::{self, ReplayIo, ReplaySession};

/// Replay a scripted monitoring session through the client core.
#[derive(Debug, Parser)]
#[command(name = "buswatch", version, about)]
struct Args {
    /// Script file: inbound frames and `> command` lines.
    script: PathBuf,

    /// JSON client configuration (defaults when absent or invalid).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory receiving `> export` files.
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// JSON body returned by the station probe.
    #[arg(long)]
    probe_response: Option<PathBuf>,
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("╔══════════════════════════════════════╗");
    info!("║  buswatch v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = match &args.config {
        Some(path) => load_config(path),
        None => ClientConfig::default(),
    };

    // ── 3. Adapters ───────────────────────────────────────────
    let probe_response = match &args.probe_response {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading probe response {}", path.display()))?;
            Some(
                ProbeResponse::from_json(&text)
                    .with_context(|| format!("parsing probe response {}", path.display()))?,
            )
        }
        None => None,
    };

    let io = ReplayIo {
        channel: ConsoleChannel::new(io::stdout()),
        probe: CannedProbe::new(probe_response),
        export: FsExporter::new(&args.export_dir),
    };

    // ── 4. Script ─────────────────────────────────────────────
    let bytes = fs::read(&args.script)
        .with_context(|| format!("reading script {}", args.script.display()))?;
    let steps = replay::parse_script(&bytes)
        .with_context(|| format!("parsing script {}", args.script.display()))?;
    info!("Loaded {} step(s) from {}", steps.len(), args.script.display());

    // ── 5. Run ────────────────────────────────────────────────
    let mut session = ReplaySession::new(config, io, LogPresentationSink::new());
    replay::run(steps, &mut session);

    info!(
        "Finished in state {} with {} log entr(ies)",
        session.client.state(),
        session.client.feed().len()
    );
    Ok(())
}

/// Load a JSON config file, falling back to defaults on any failure.
fn load_config(path: &Path) -> ClientConfig {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            warn!("Config read failed ({}), using defaults", e);
            return ClientConfig::default();
        }
    };
    match ClientConfig::from_json(&text) {
        Ok(cfg) => {
            info!("Config loaded from {}", path.display());
            cfg
        }
        Err(e) => {
            warn!("Config load failed ({}), using defaults", e);
            ClientConfig::default()
        }
    }
}
