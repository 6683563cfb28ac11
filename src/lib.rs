//! Busz monitoring client library.
//!
//! Exposes the session core (validator, state machine, classifier, log
//! feed) and its port adapters for the replay binary and for integration
//! testing.  Nothing here opens a socket: the transport is consumed
//! through [`app::ports::ChannelPort`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod channel;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fsm;
pub mod log_feed;
pub mod replay;
pub mod validator;
