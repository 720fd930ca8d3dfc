//! Scripted end-to-end run of the registry core: scan, connect, subscribe,
//! read, remove. The transport is a stand-in that answers every command the
//! way a well-behaved radio would.
//!
//! Run with: `cargo run --example battery_monitor`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::LevelFilter;
use tokio::sync::mpsc::{self, Receiver, Sender};

use batscan::Result;
use batscan::api::characteristic::{CharacteristicDescriptor, CharacteristicProperty};
use batscan::api::peripheral::{Advertisement, Peripheral, PeripheralId, PeripheralInfo};
use batscan::api::transport::{ScanFilter, Transport};
use batscan::api::transport_event::TransportEvent;
use batscan::registry::Controller;

struct ScriptedTransport {
    events: Sender<TransportEvent>,
}

impl ScriptedTransport {
    fn peripheral(&self) -> Peripheral {
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
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn scan(
        &self,
        _filter: &ScanFilter,
        _timeout: Duration,
        _allow_duplicates: bool,
    ) -> Result<()> {
        // one discovery, then the window closes on its own
        let _ = self
            .events
            .send(TransportEvent::PeripheralDiscovered {
                peripheral: self.peripheral(),
            })
            .await;
        let _ = self.events.send(TransportEvent::ScanStopped).await;
        Ok(())
    }

    async fn stop_scan(&self) -> Result<()> {
        Ok(())
    }

    async fn connect(&self, id: &PeripheralId) -> Result<()> {
        let _ = self
            .events
            .send(TransportEvent::PeripheralConnected { id: id.clone() })
            .await;
        Ok(())
    }

    async fn disconnect(&self, id: &PeripheralId) -> Result<()> {
        let _ = self
            .events
            .send(TransportEvent::PeripheralDisconnected { id: id.clone() })
            .await;
        Ok(())
    }

    async fn read(
        &self,
        _id: &PeripheralId,
        _service: &str,
        _characteristic: &str,
    ) -> Result<Vec<u8>> {
        Ok(vec![93])
    }

    async fn retrieve_services(
        &self,
        id: &PeripheralId,
        _filter: Option<&ScanFilter>,
    ) -> Result<PeripheralInfo> {
        Ok(PeripheralInfo {
            id: id.clone(),
            name: None,
            characteristics: vec![CharacteristicDescriptor {
                service: "180f".to_string(),
                characteristic: "2a19".to_string(),
                properties: vec![CharacteristicProperty::Read, CharacteristicProperty::Notify],
            }],
        })
    }

    async fn start_notification(
        &self,
        id: &PeripheralId,
        service: &str,
        characteristic: &str,
    ) -> Result<()> {
        // first push right after subscribing
        let _ = self
            .events
            .send(TransportEvent::CharacteristicValueUpdated {
                id: id.clone(),
                service: service.to_string(),
                characteristic: characteristic.to_string(),
                value: vec![91],
            })
            .await;
        Ok(())
    }

    async fn stop_notification(
        &self,
        _id: &PeripheralId,
        _service: &str,
        _characteristic: &str,
    ) -> Result<()> {
        Ok(())
    }

    async fn discovered_peripherals(&self, _filter: &ScanFilter) -> Result<Vec<Peripheral>> {
        Ok(vec![self.peripheral()])
    }

    async fn remove_peripheral(&self, _id: &PeripheralId) -> Result<()> {
        Ok(())
    }
}

async fn drain(
    controller: &mut Controller<ScriptedTransport>,
    events: &mut Receiver<TransportEvent>,
) {
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_millis(50), events.recv()).await
    {
        controller.handle_event(event).await;
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .init();

    let (sender_tx, mut receiver_rx) = mpsc::channel::<TransportEvent>(256);
    let transport = Arc::new(ScriptedTransport { events: sender_tx });
    let mut controller = Controller::new(transport, ScanFilter::default());

    controller.start_scan().await;
    drain(&mut controller, &mut receiver_rx).await;

    let discovered = controller.peripherals();
    log::info!("{} peripheral(s) after scan", discovered.len());

    let id = discovered[0].id.clone();
    controller.connect(&id).await.unwrap();
    drain(&mut controller, &mut receiver_rx).await;

    if controller.offers_battery_notifications(&id) {
        controller.set_battery_notifications(&id, true).await.unwrap();
        drain(&mut controller, &mut receiver_rx).await;
    }

    controller.read_battery(&id).await.unwrap();
    drain(&mut controller, &mut receiver_rx).await;

    for peripheral in controller.peripherals() {
        log::info!(
            "{}: connected={} battery={:?}",
            peripheral.name.as_deref().unwrap_or("unnamed"),
            peripheral.connected,
            peripheral.battery_level
        );
    }
}
