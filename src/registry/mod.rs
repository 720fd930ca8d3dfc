//! Peripheral registry core.
//!
//! Folds the transport's event stream into an authoritative, deduplicated
//! view of known peripherals and issues the follow-up commands each
//! transition calls for:
//!
//! 1. **Peripheral Registry** - the `id -> Peripheral` map and its
//!    event-driven transitions.
//! 2. **Scan Session** - the `Idle -> Scanning -> Idle` state machine whose
//!    scanning flag resynchronizes from the transport's `ScanStopped` event.
//! 3. **Battery Subscriptions** - per-peripheral notification toggles and
//!    battery payload decoding.
//! 4. **Controller** - the single-threaded event loop tying 1-3 to an
//!    injected transport.

pub mod capability;
pub mod command;
pub mod controller;
pub mod peripheral_registry;
pub mod scan_session;
pub mod subscription;
pub mod uuid_norm;

pub use capability::supports_battery_notification;
pub use command::Command;
pub use controller::Controller;
pub use peripheral_registry::PeripheralRegistry;
pub use scan_session::{SCAN_PERIOD, ScanSession};
pub use subscription::{BATTERY_LEVEL_UUID, BATTERY_SERVICE_UUID, BatterySubscriptions};
