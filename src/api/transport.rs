use std::time::Duration;

use async_trait::async_trait;

use crate::Result;
use crate::api::peripheral::{Peripheral, PeripheralId, PeripheralInfo};

/// Command surface of the native BLE binding.
///
/// Implementations are constructed with a `tokio::sync::mpsc::Sender` for
/// `TransportEvent` and deliver everything that happens on the radio through
/// that channel; command resolutions that carry data (`read`,
/// `retrieve_services`, `discovered_peripherals`) are returned to the caller
/// and fed back into the registry as ordinary events by the controller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn scan(
        &self,
        filter: &ScanFilter,
        timeout: Duration,
        allow_duplicates: bool,
    ) -> Result<()>;

    async fn stop_scan(&self) -> Result<()>;

    async fn connect(&self, id: &PeripheralId) -> Result<()>;

    async fn disconnect(&self, id: &PeripheralId) -> Result<()>;

    async fn read(
        &self,
        id: &PeripheralId,
        service: &str,
        characteristic: &str,
    ) -> Result<Vec<u8>>;

    async fn retrieve_services(
        &self,
        id: &PeripheralId,
        filter: Option<&ScanFilter>,
    ) -> Result<PeripheralInfo>;

    // subscribe to notifications
    async fn start_notification(
        &self,
        id: &PeripheralId,
        service: &str,
        characteristic: &str,
    ) -> Result<()>;

    // unsubscribe to notifications
    async fn stop_notification(
        &self,
        id: &PeripheralId,
        service: &str,
        characteristic: &str,
    ) -> Result<()>;

    /// Peripherals the transport already knows about, e.g. cached scan
    /// results it never emitted a live discovery event for.
    async fn discovered_peripherals(&self, filter: &ScanFilter) -> Result<Vec<Peripheral>>;

    async fn remove_peripheral(&self, id: &PeripheralId) -> Result<()>;
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanFilter {
    pub services: Vec<String>,
}
