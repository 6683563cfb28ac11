//! Canned probe adapter.
//!
//! Answers every probe with a preloaded response, mimicking the station
//! lookup endpoint's behaviour: a request without a session id gets the
//! endpoint's own rejection body rather than the canned answer.

use log::debug;
use serde_json::json;

use crate::app::ports::{ProbeError, ProbePort, ProbeResponse};

#[derive(Debug, Default)]
pub struct CannedProbe {
    response: Option<ProbeResponse>,
    calls: u32,
}

impl CannedProbe {
    pub fn new(response: Option<ProbeResponse>) -> Self {
        Self { response, calls: 0 }
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }
}

impl ProbePort for CannedProbe {
    fn probe(&mut self, identity: Option<&str>) -> Result<ProbeResponse, ProbeError> {
        self.calls += 1;
        debug!("probe: session={:?}", identity);

        if identity.is_none() {
            return Ok(ProbeResponse {
                raw: json!({
                    "success": false,
                    "error_code": "MISSING_SESSION_ID",
                    "error": "X-Session-ID header is required",
                }),
            });
        }
        self.response
            .clone()
            .ok_or_else(|| ProbeError::Unavailable("no probe response configured".into()))
    }
}
