//! Scan session state machine.
//!
//! `Idle -> Scanning -> Idle`, where the transition back to `Idle` is owned
//! by the transport's `ScanStopped` event alone. A user stop request only
//! issues the `StopScan` command; the scanning flag resynchronizes from the
//! event so it can never diverge from actual transport state, whether the
//! scan ended by request or by timeout.

use std::time::Duration;

use log::{info, trace};

use crate::api::transport::ScanFilter;
use crate::registry::command::Command;

/// Scan window handed to the transport; it stops the scan on its own at or
/// before this deadline.
pub const SCAN_PERIOD: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ScanState {
    Idle,
    Scanning,
}

pub struct ScanSession {
    state: ScanState,
    filter: ScanFilter,
}

impl ScanSession {
    pub fn new(filter: ScanFilter) -> Self {
        ScanSession {
            state: ScanState::Idle,
            filter,
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.state == ScanState::Scanning
    }

    /// Request a scan. No-op while one is already running.
    pub fn start(&mut self) -> Vec<Command> {
        if self.state == ScanState::Scanning {
            trace!("scan already running, ignoring start request");
            return Vec::new();
        }
        self.state = ScanState::Scanning;
        info!("starting scan ({} s window)", SCAN_PERIOD.as_secs());
        vec![Command::Scan {
            filter: self.filter.clone(),
            timeout: SCAN_PERIOD,
            allow_duplicates: true,
        }]
    }

    /// Request an early stop. The session stays `Scanning` until the
    /// transport confirms with `ScanStopped`.
    pub fn stop(&mut self) -> Vec<Command> {
        if self.state == ScanState::Idle {
            trace!("no scan running, ignoring stop request");
            return Vec::new();
        }
        vec![Command::StopScan]
    }

    /// The transport reported the scan over, by request or by timeout.
    pub fn on_scan_stopped(&mut self) {
        if self.state == ScanState::Scanning {
            info!("scan stopped");
        }
        self.state = ScanState::Idle;
    }
}
