use crate::api::peripheral::{Peripheral, PeripheralId, PeripheralInfo};

/// Everything the transport reports back about the radio.
///
/// `ServicesRetrieved` is synthesized by the controller from the resolution
/// of a `retrieve_services` command so that the registry sees one uniform
/// event stream.
///
/// Transports must deliver events for the same peripheral id in the order
/// they occurred; nothing downstream reorders or buffers.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    PeripheralDiscovered {
        peripheral: Peripheral,
    },
    ScanStopped,
    PeripheralConnected {
        id: PeripheralId,
    },
    PeripheralDisconnected {
        id: PeripheralId,
    },
    ServicesRetrieved {
        id: PeripheralId,
        info: PeripheralInfo,
    },
    CharacteristicValueUpdated {
        id: PeripheralId,
        service: String,
        characteristic: String,
        value: Vec<u8>,
    },
}
