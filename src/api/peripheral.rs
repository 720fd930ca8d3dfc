use std::collections::HashMap;
use std::fmt;

use crate::api::characteristic::CharacteristicDescriptor;

/// Opaque transport-assigned peripheral identifier.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PeripheralId(String);

impl PeripheralId {
    pub fn new(id: impl Into<String>) -> Self {
        PeripheralId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeripheralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeripheralId {
    fn from(id: &str) -> Self {
        PeripheralId(id.to_string())
    }
}

/// Advertisement payload attached to a discovery event.
///
/// Passed through unmodified; the registry never inspects it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Advertisement {
    pub is_connectable: Option<bool>,
    pub service_uuids: Vec<String>,
    pub manufacturer_data: HashMap<u16, Vec<u8>>,
    pub service_data: HashMap<String, Vec<u8>>,
    pub tx_power_level: Option<i8>,
}

/// One discovered BLE peripheral and its live state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Peripheral {
    pub id: PeripheralId,
    pub name: Option<String>,
    pub rssi: Option<i16>,
    pub advertising: Advertisement,
    /// Populated only after a successful service retrieval.
    pub characteristics: Option<Vec<CharacteristicDescriptor>>,
    pub connected: bool,
    /// Last decoded battery percentage, if any read or notification matched.
    pub battery_level: Option<u8>,
}

impl Peripheral {
    /// A freshly discovered peripheral: not connected, nothing retrieved yet.
    pub fn discovered(
        id: PeripheralId,
        name: Option<String>,
        rssi: Option<i16>,
        advertising: Advertisement,
    ) -> Self {
        Peripheral {
            id,
            name,
            rssi,
            advertising,
            characteristics: None,
            connected: false,
            battery_level: None,
        }
    }
}

/// Result of a `retrieve_services` command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeripheralInfo {
    pub id: PeripheralId,
    pub name: Option<String>,
    pub characteristics: Vec<CharacteristicDescriptor>,
}
