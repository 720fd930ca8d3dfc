//! Battery level notification subscriptions.
//!
//! One `subscribed` flag per peripheral. Toggling on retrieves the battery
//! service before subscribing so the transport has the characteristic handles
//! it needs; toggling off only unsubscribes. A disconnect resets the flag
//! without a stop command: the transport invalidates subscriptions itself
//! when the link goes down.

use std::collections::HashSet;

use log::trace;

use crate::api::peripheral::PeripheralId;
use crate::api::transport::ScanFilter;
use crate::registry::command::Command;

pub const BATTERY_SERVICE_UUID: &str = "180F";
pub const BATTERY_LEVEL_UUID: &str = "2A19";

/// Decode a battery level notification or read payload: a single unsigned
/// byte holding the percentage.
pub fn decode_battery_level(value: &[u8]) -> Option<u8> {
    value.first().copied()
}

#[derive(Default)]
pub struct BatterySubscriptions {
    subscribed: HashSet<PeripheralId>,
}

impl BatterySubscriptions {
    pub fn new() -> Self {
        BatterySubscriptions::default()
    }

    pub fn is_subscribed(&self, id: &PeripheralId) -> bool {
        self.subscribed.contains(id)
    }

    pub fn enable(&mut self, id: &PeripheralId) -> Vec<Command> {
        if !self.subscribed.insert(id.clone()) {
            return Vec::new();
        }
        let filter = ScanFilter {
            services: vec![BATTERY_SERVICE_UUID.to_string()],
        };
        vec![
            Command::RetrieveServices {
                id: id.clone(),
                filter: Some(filter),
            },
            Command::StartNotification {
                id: id.clone(),
                service: BATTERY_SERVICE_UUID.to_string(),
                characteristic: BATTERY_LEVEL_UUID.to_string(),
            },
        ]
    }

    pub fn disable(&mut self, id: &PeripheralId) -> Vec<Command> {
        if !self.subscribed.remove(id) {
            return Vec::new();
        }
        vec![Command::StopNotification {
            id: id.clone(),
            service: BATTERY_SERVICE_UUID.to_string(),
            characteristic: BATTERY_LEVEL_UUID.to_string(),
        }]
    }

    /// The link went down; the transport has already torn the subscription
    /// down on its side.
    pub fn on_disconnect(&mut self, id: &PeripheralId) {
        if self.subscribed.remove(id) {
            trace!("subscription for {} reset on disconnect", id);
        }
    }
}
