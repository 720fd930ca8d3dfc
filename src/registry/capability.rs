//! Characteristic capability inspection.

use crate::api::characteristic::{CharacteristicDescriptor, CharacteristicProperty};
use crate::registry::subscription::{BATTERY_LEVEL_UUID, BATTERY_SERVICE_UUID};
use crate::registry::uuid_norm::same_uuid;

/// Whether a peripheral's retrieved characteristic list contains a battery
/// level characteristic that advertises notify support.
///
/// `None` means services were never retrieved; no list, no capability.
pub fn supports_battery_notification(
    characteristics: Option<&[CharacteristicDescriptor]>,
) -> bool {
    characteristics.is_some_and(|list| {
        list.iter().any(|c| {
            same_uuid(&c.service, BATTERY_SERVICE_UUID)
                && same_uuid(&c.characteristic, BATTERY_LEVEL_UUID)
                && c.properties.contains(&CharacteristicProperty::Notify)
        })
    })
}
