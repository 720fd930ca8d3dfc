use std::time::Duration;

use crate::api::peripheral::PeripheralId;
use crate::api::transport::ScanFilter;

/// Follow-up transport work emitted by a state transition.
///
/// Commands are plain data. The transition that produced them has already
/// completed by the time the controller executes them against the transport,
/// so a transition can be exercised as a black box: state in, commands out.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Scan {
        filter: ScanFilter,
        timeout: Duration,
        allow_duplicates: bool,
    },
    StopScan,
    Connect {
        id: PeripheralId,
    },
    Disconnect {
        id: PeripheralId,
    },
    RetrieveServices {
        id: PeripheralId,
        filter: Option<ScanFilter>,
    },
    StartNotification {
        id: PeripheralId,
        service: String,
        characteristic: String,
    },
    StopNotification {
        id: PeripheralId,
        service: String,
        characteristic: String,
    },
    Read {
        id: PeripheralId,
        service: String,
        characteristic: String,
    },
    /// Reconcile against peripherals the transport discovered without
    /// emitting a live discovery event.
    FetchDiscoveredPeripherals {
        filter: ScanFilter,
    },
    RemoveFromTransport {
        id: PeripheralId,
    },
}
