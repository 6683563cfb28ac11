//! Application core: session logic, zero I/O.
//!
//! Business rules for the monitoring client: command gating, state
//! machine orchestration, arrival classification and log-feed upkeep.
//! All interaction with the server, the observer and the file system
//! happens through **port traits** defined in [`ports`], keeping this
//! layer testable with mock adapters.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
