//! Concrete state handlers and table builder.
//!
//! Each state is three plain `fn` pointers.  `accepts` lists the events a
//! state legitimately expects; anything else is still applied but flagged.
//!
//! ```text
//!  DISCONNECTED ──[connected]──▶ CONNECTED ──[monitoring_started]──▶ ACTIVE
//!                                   ▲  │                               │
//!                                   │  └──[status(active)]─────────────┤
//!                          [connected/reconnect]            [monitoring_stopped]
//!                                   │                       [status(inactive)]
//!                                   │                                  ▼
//!                                FAULTED ◀──[error]──────────────── STOPPED
//!
//!  Any state ──[disconnected]──▶ FAULTED("connection lost")
//! ```

use log::{info, warn};

use super::{SessionEvent, SessionState, StateDescriptor, StateId};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the session state table.  Called once per machine.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Disconnected
        StateDescriptor {
            id: StateId::Disconnected,
            name: "Disconnected",
            on_enter: Some(disconnected_enter),
            on_exit: None,
            accepts: disconnected_accepts,
        },
        // Index 1: Connected
        StateDescriptor {
            id: StateId::Connected,
            name: "Connected",
            on_enter: Some(connected_enter),
            on_exit: None,
            accepts: connected_accepts,
        },
        // Index 2: Active
        StateDescriptor {
            id: StateId::Active,
            name: "Active",
            on_enter: Some(active_enter),
            on_exit: Some(active_exit),
            accepts: active_accepts,
        },
        // Index 3: Stopped
        StateDescriptor {
            id: StateId::Stopped,
            name: "Stopped",
            on_enter: Some(stopped_enter),
            on_exit: None,
            accepts: stopped_accepts,
        },
        // Index 4: Faulted
        StateDescriptor {
            id: StateId::Faulted,
            name: "Faulted",
            on_enter: Some(faulted_enter),
            on_exit: Some(faulted_exit),
            accepts: faulted_accepts,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISCONNECTED
// ═══════════════════════════════════════════════════════════════════════════

fn disconnected_enter(_state: &SessionState) {
    info!("DISCONNECTED: waiting for transport");
}

fn disconnected_accepts(_state: &SessionState, event: &SessionEvent) -> bool {
    matches!(
        event,
        SessionEvent::TransportConnected { .. } | SessionEvent::TransportReconnected
    )
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONNECTED: transport up, nothing monitored
// ═══════════════════════════════════════════════════════════════════════════

fn connected_enter(_state: &SessionState) {
    info!("CONNECTED: transport up, monitoring not active");
}

fn connected_accepts(_state: &SessionState, event: &SessionEvent) -> bool {
    // Nothing to stop yet.
    !matches!(event, SessionEvent::MonitoringStopped { .. })
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVE: server confirmed monitoring
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(state: &SessionState) {
    if let SessionState::Active {
        target_id,
        interval_secs,
    } = state
    {
        info!("ACTIVE: monitoring bus {} every {}s", target_id, interval_secs);
    }
}

fn active_exit(_state: &SessionState) {
    info!("ACTIVE: monitoring no longer confirmed");
}

fn active_accepts(state: &SessionState, event: &SessionEvent) -> bool {
    let SessionState::Active {
        target_id,
        interval_secs,
    } = state
    else {
        return false;
    };

    match event {
        SessionEvent::TransportDisconnected
        | SessionEvent::MonitoringStopped { .. }
        | SessionEvent::DomainError { .. }
        | SessionEvent::SessionStatus { active: false, .. } => true,
        // A repeated confirmation of the same session is harmless.
        SessionEvent::MonitoringStarted {
            target_id: t,
            interval_secs: i,
            ..
        } => t == target_id && i == interval_secs,
        SessionEvent::SessionStatus {
            active: true,
            target_id: t,
            ..
        } => t.as_deref() == Some(target_id.as_str()),
        SessionEvent::TransportConnected { .. } | SessionEvent::TransportReconnected => false,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  STOPPED: monitoring ended, transport up
// ═══════════════════════════════════════════════════════════════════════════

fn stopped_enter(_state: &SessionState) {
    info!("STOPPED: monitoring ended");
}

fn stopped_accepts(_state: &SessionState, event: &SessionEvent) -> bool {
    matches!(
        event,
        SessionEvent::TransportDisconnected
            | SessionEvent::MonitoringStarted { .. }
            | SessionEvent::SessionStatus { .. }
            | SessionEvent::DomainError { .. }
    )
}

// ═══════════════════════════════════════════════════════════════════════════
//  FAULTED: transport or domain error
// ═══════════════════════════════════════════════════════════════════════════

fn faulted_enter(state: &SessionState) {
    if let SessionState::Faulted { reason } = state {
        warn!("FAULTED: {}", reason);
    }
}

fn faulted_exit(_state: &SessionState) {
    info!("FAULTED: cleared");
}

fn faulted_accepts(_state: &SessionState, event: &SessionEvent) -> bool {
    !matches!(event, SessionEvent::MonitoringStopped { .. })
}
