//! Authoritative peripheral map and its event-driven transitions.
//!
//! The registry owns the `PeripheralId -> Peripheral` map exclusively. Every
//! inbound transport event is folded in through [`PeripheralRegistry::apply`],
//! which mutates the map and returns the follow-up commands the transition
//! calls for; it never touches the transport itself. Duplicate and late
//! events are expected under BLE's discovery semantics and degrade to
//! no-ops, never errors.

use std::collections::HashMap;

use log::{info, trace};

use crate::api::peripheral::{Peripheral, PeripheralId, PeripheralInfo};
use crate::api::transport::ScanFilter;
use crate::api::transport_event::TransportEvent;
use crate::registry::command::Command;
use crate::registry::subscription::{
    BATTERY_LEVEL_UUID, BATTERY_SERVICE_UUID, decode_battery_level,
};
use crate::registry::uuid_norm::same_uuid;

pub struct PeripheralRegistry {
    peripherals: HashMap<PeripheralId, Peripheral>,
    /// Service filter used when reconciling cached transport discoveries
    /// after a scan ends; the same filter the scan itself runs with.
    filter: ScanFilter,
}

impl PeripheralRegistry {
    pub fn new(filter: ScanFilter) -> Self {
        PeripheralRegistry {
            peripherals: HashMap::new(),
            filter,
        }
    }

    /// Fold one transport event into the map.
    ///
    /// Returns the commands the transition requires; the caller executes
    /// them after the map mutation has already completed.
    pub fn apply(&mut self, event: &TransportEvent) -> Vec<Command> {
        trace!("applying {:?}", event);
        match event {
            TransportEvent::PeripheralDiscovered { peripheral } => self.on_discovered(peripheral),
            TransportEvent::PeripheralConnected { id } => self.on_connected(id),
            TransportEvent::PeripheralDisconnected { id } => self.on_disconnected(id),
            TransportEvent::ServicesRetrieved { id, info } => self.on_services_retrieved(id, info),
            TransportEvent::CharacteristicValueUpdated {
                id,
                service,
                characteristic,
                value,
            } => self.on_value_updated(id, service, characteristic, value),
            TransportEvent::ScanStopped => vec![Command::FetchDiscoveredPeripherals {
                filter: self.filter.clone(),
            }],
        }
    }

    fn on_discovered(&mut self, peripheral: &Peripheral) -> Vec<Command> {
        if self.peripherals.contains_key(&peripheral.id) {
            trace!("duplicate discovery of {}, ignored", peripheral.id);
            return Vec::new();
        }
        info!(
            "discovered {} ({})",
            peripheral.id,
            peripheral.name.as_deref().unwrap_or("unnamed")
        );
        // discovery never reports a live connection
        let mut entry = peripheral.clone();
        entry.connected = false;
        self.peripherals.insert(entry.id.clone(), entry);
        Vec::new()
    }

    fn on_connected(&mut self, id: &PeripheralId) -> Vec<Command> {
        let Some(peripheral) = self.peripherals.get_mut(id) else {
            trace!("connect event for unknown peripheral {}, ignored", id);
            return Vec::new();
        };
        peripheral.connected = true;
        info!("{} connected", id);
        vec![Command::RetrieveServices {
            id: id.clone(),
            filter: None,
        }]
    }

    fn on_disconnected(&mut self, id: &PeripheralId) -> Vec<Command> {
        let Some(peripheral) = self.peripherals.get_mut(id) else {
            trace!("disconnect event for unknown peripheral {}, ignored", id);
            return Vec::new();
        };
        peripheral.connected = false;
        info!("{} disconnected", id);
        Vec::new()
    }

    fn on_services_retrieved(&mut self, id: &PeripheralId, info: &PeripheralInfo) -> Vec<Command> {
        let Some(peripheral) = self.peripherals.get_mut(id) else {
            trace!("service info for unknown peripheral {}, ignored", id);
            return Vec::new();
        };
        peripheral.characteristics = Some(info.characteristics.clone());
        if peripheral.name.is_none() {
            peripheral.name = info.name.clone();
        }
        trace!(
            "{} exposes {} characteristics",
            id,
            info.characteristics.len()
        );
        Vec::new()
    }

    fn on_value_updated(
        &mut self,
        id: &PeripheralId,
        service: &str,
        characteristic: &str,
        value: &[u8],
    ) -> Vec<Command> {
        if !same_uuid(service, BATTERY_SERVICE_UUID)
            || !same_uuid(characteristic, BATTERY_LEVEL_UUID)
        {
            trace!(
                "value update for {}/{} is not a battery level, dropped",
                service, characteristic
            );
            return Vec::new();
        }
        let Some(peripheral) = self.peripherals.get_mut(id) else {
            trace!("battery update for unknown peripheral {}, dropped", id);
            return Vec::new();
        };
        if !peripheral.connected {
            // late resolution of a read or notification that raced a disconnect
            trace!("battery update for disconnected peripheral {}, dropped", id);
            return Vec::new();
        }
        let Some(level) = decode_battery_level(value) else {
            trace!("empty battery payload from {}, dropped", id);
            return Vec::new();
        };
        peripheral.battery_level = Some(level);
        info!("battery level of {}: {}%", id, level);
        Vec::new()
    }

    /// Drop a peripheral on user request.
    ///
    /// The entry is gone once this returns; the emitted disconnect/removal
    /// commands are best-effort and their failure does not bring it back.
    pub fn remove(&mut self, id: &PeripheralId) -> Vec<Command> {
        if self.peripherals.remove(id).is_none() {
            trace!("removal of unknown peripheral {}, ignored", id);
            return Vec::new();
        }
        info!("removed {}", id);
        vec![
            Command::Disconnect { id: id.clone() },
            Command::RemoveFromTransport { id: id.clone() },
        ]
    }

    pub fn get(&self, id: &PeripheralId) -> Option<&Peripheral> {
        self.peripherals.get(id)
    }

    pub fn contains(&self, id: &PeripheralId) -> bool {
        self.peripherals.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.peripherals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peripherals.is_empty()
    }

    /// Cloned view of the map in stable id order.
    pub fn snapshot(&self) -> Vec<Peripheral> {
        let mut peripherals: Vec<Peripheral> = self.peripherals.values().cloned().collect();
        peripherals.sort_by(|a, b| a.id.cmp(&b.id));
        peripherals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::characteristic::{CharacteristicDescriptor, CharacteristicProperty};
    use crate::api::peripheral::Advertisement;

    fn registry() -> PeripheralRegistry {
        PeripheralRegistry::new(ScanFilter::default())
    }

    fn esp32() -> Peripheral {
        Peripheral::discovered(
            PeripheralId::from("00-11-22"),
            Some("micropython-esp32".to_string()),
            Some(-47),
            Advertisement {
                is_connectable: Some(true),
                service_uuids: vec!["180F".to_string()],
                ..Advertisement::default()
            },
        )
    }

    fn discovered(peripheral: Peripheral) -> TransportEvent {
        TransportEvent::PeripheralDiscovered { peripheral }
    }

    fn battery_info(id: &str) -> PeripheralInfo {
        PeripheralInfo {
            id: PeripheralId::from(id),
            name: None,
            characteristics: vec![CharacteristicDescriptor {
                service: "180f".to_string(),
                characteristic: "2a19".to_string(),
                properties: vec![CharacteristicProperty::Read, CharacteristicProperty::Notify],
            }],
        }
    }

    #[test]
    fn repeated_discovery_keeps_a_single_entry() {
        let mut registry = registry();
        for _ in 0..4 {
            assert!(registry.apply(&discovered(esp32())).is_empty());
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_discovery_does_not_overwrite_known_state() {
        let mut registry = registry();
        registry.apply(&discovered(esp32()));
        registry.apply(&TransportEvent::PeripheralConnected {
            id: esp32().id,
        });

        let mut renamed = esp32();
        renamed.name = Some("something-else".to_string());
        registry.apply(&discovered(renamed));

        let peripheral = registry.get(&esp32().id).unwrap();
        assert!(peripheral.connected);
        assert_eq!(peripheral.name.as_deref(), Some("micropython-esp32"));
    }

    #[test]
    fn discovery_never_imports_a_connected_flag() {
        let mut registry = registry();
        let mut peripheral = esp32();
        peripheral.connected = true;
        registry.apply(&discovered(peripheral));
        assert!(!registry.get(&esp32().id).unwrap().connected);
    }

    #[test]
    fn connect_marks_connected_and_retrieves_services() {
        let mut registry = registry();
        registry.apply(&discovered(esp32()));
        let commands = registry.apply(&TransportEvent::PeripheralConnected {
            id: esp32().id,
        });
        assert_eq!(
            commands,
            vec![Command::RetrieveServices {
                id: esp32().id,
                filter: None,
            }]
        );
        assert!(registry.get(&esp32().id).unwrap().connected);
    }

    #[test]
    fn connect_for_unknown_peripheral_changes_nothing() {
        let mut registry = registry();
        let commands = registry.apply(&TransportEvent::PeripheralConnected {
            id: PeripheralId::from("cafe"),
        });
        assert!(commands.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn disconnect_clears_connected_flag() {
        let mut registry = registry();
        registry.apply(&discovered(esp32()));
        registry.apply(&TransportEvent::PeripheralConnected {
            id: esp32().id,
        });
        let commands = registry.apply(&TransportEvent::PeripheralDisconnected {
            id: esp32().id,
        });
        assert!(commands.is_empty());
        assert!(!registry.get(&esp32().id).unwrap().connected);
    }

    #[test]
    fn disconnect_for_unknown_peripheral_is_a_no_op() {
        let mut registry = registry();
        let commands = registry.apply(&TransportEvent::PeripheralDisconnected {
            id: PeripheralId::from("cafe"),
        });
        assert!(commands.is_empty());
    }

    #[test]
    fn service_retrieval_merges_without_discarding_discovery_metadata() {
        let mut registry = registry();
        registry.apply(&discovered(esp32()));
        registry.apply(&TransportEvent::ServicesRetrieved {
            id: esp32().id,
            info: battery_info("00-11-22"),
        });

        let peripheral = registry.get(&esp32().id).unwrap();
        assert_eq!(peripheral.rssi, Some(-47));
        assert_eq!(peripheral.name.as_deref(), Some("micropython-esp32"));
        assert_eq!(peripheral.advertising.service_uuids, vec!["180F"]);
        assert_eq!(peripheral.characteristics.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn service_retrieval_fills_a_missing_name() {
        let mut registry = registry();
        let mut nameless = esp32();
        nameless.name = None;
        registry.apply(&discovered(nameless));

        let mut info = battery_info("00-11-22");
        info.name = Some("micropython-esp32".to_string());
        registry.apply(&TransportEvent::ServicesRetrieved {
            id: esp32().id,
            info,
        });
        assert_eq!(
            registry.get(&esp32().id).unwrap().name.as_deref(),
            Some("micropython-esp32")
        );
    }

    #[test]
    fn battery_update_sets_level_for_connected_peripheral() {
        let mut registry = registry();
        registry.apply(&discovered(esp32()));
        registry.apply(&TransportEvent::PeripheralConnected {
            id: esp32().id,
        });
        registry.apply(&TransportEvent::CharacteristicValueUpdated {
            id: esp32().id,
            service: "0000180f-0000-1000-8000-00805f9b34fb".to_string(),
            characteristic: "2a19".to_string(),
            value: vec![93],
        });
        assert_eq!(registry.get(&esp32().id).unwrap().battery_level, Some(93));
    }

    #[test]
    fn mismatched_characteristic_leaves_level_unchanged() {
        let mut registry = registry();
        registry.apply(&discovered(esp32()));
        registry.apply(&TransportEvent::PeripheralConnected {
            id: esp32().id,
        });
        registry.apply(&TransportEvent::CharacteristicValueUpdated {
            id: esp32().id,
            service: "180F".to_string(),
            characteristic: "AA00".to_string(),
            value: vec![93],
        });
        assert_eq!(registry.get(&esp32().id).unwrap().battery_level, None);
    }

    #[test]
    fn battery_update_for_disconnected_peripheral_is_dropped() {
        let mut registry = registry();
        registry.apply(&discovered(esp32()));
        registry.apply(&TransportEvent::CharacteristicValueUpdated {
            id: esp32().id,
            service: "180F".to_string(),
            characteristic: "2A19".to_string(),
            value: vec![93],
        });
        assert_eq!(registry.get(&esp32().id).unwrap().battery_level, None);
    }

    #[test]
    fn battery_update_for_unknown_peripheral_is_dropped() {
        let mut registry = registry();
        let commands = registry.apply(&TransportEvent::CharacteristicValueUpdated {
            id: PeripheralId::from("cafe"),
            service: "180F".to_string(),
            characteristic: "2A19".to_string(),
            value: vec![93],
        });
        assert!(commands.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_battery_payload_is_dropped() {
        let mut registry = registry();
        registry.apply(&discovered(esp32()));
        registry.apply(&TransportEvent::PeripheralConnected {
            id: esp32().id,
        });
        registry.apply(&TransportEvent::CharacteristicValueUpdated {
            id: esp32().id,
            service: "180F".to_string(),
            characteristic: "2A19".to_string(),
            value: Vec::new(),
        });
        assert_eq!(registry.get(&esp32().id).unwrap().battery_level, None);
    }

    #[test]
    fn scan_stopped_requests_cached_discovery_reconciliation() {
        let filter = ScanFilter {
            services: vec!["180F".to_string()],
        };
        let mut registry = PeripheralRegistry::new(filter.clone());
        let commands = registry.apply(&TransportEvent::ScanStopped);
        assert_eq!(commands, vec![Command::FetchDiscoveredPeripherals { filter }]);
    }

    #[test]
    fn remove_deletes_entry_and_issues_best_effort_cleanup() {
        let mut registry = registry();
        registry.apply(&discovered(esp32()));
        let commands = registry.remove(&esp32().id);
        assert_eq!(
            commands,
            vec![
                Command::Disconnect { id: esp32().id },
                Command::RemoveFromTransport { id: esp32().id },
            ]
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_of_unknown_peripheral_issues_nothing() {
        let mut registry = registry();
        assert!(registry.remove(&PeripheralId::from("cafe")).is_empty());
    }

    #[test]
    fn events_after_removal_behave_as_if_never_discovered() {
        let mut registry = registry();
        registry.apply(&discovered(esp32()));
        registry.remove(&esp32().id);

        assert!(
            registry
                .apply(&TransportEvent::PeripheralConnected { id: esp32().id })
                .is_empty()
        );
        registry.apply(&TransportEvent::CharacteristicValueUpdated {
            id: esp32().id,
            service: "180F".to_string(),
            characteristic: "2A19".to_string(),
            value: vec![93],
        });
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_is_sorted_by_id() {
        let mut registry = registry();
        for id in ["bb", "aa", "cc"] {
            registry.apply(&discovered(Peripheral::discovered(
                PeripheralId::from(id),
                None,
                None,
                Advertisement::default(),
            )));
        }
        let ids: Vec<String> = registry
            .snapshot()
            .into_iter()
            .map(|p| p.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["aa", "bb", "cc"]);
    }
}
