//! Event loop binding the registry, scan session and subscriptions to a
//! transport.
//!
//! The controller processes one inbound event or one command resolution at a
//! time, so no transition ever races another and the peripheral map needs no
//! locking. Commands are fire-and-forget: their effect on state arrives back
//! as ordinary transport events (a connect only shows up once the transport
//! confirms it), and resolutions that carry data are replayed into the
//! registry through the same `apply` path as live events.

use std::collections::VecDeque;
use std::sync::Arc;

use log::warn;
use tokio::sync::mpsc::Receiver;

use crate::api::peripheral::{Peripheral, PeripheralId};
use crate::api::transport::{ScanFilter, Transport};
use crate::api::transport_event::TransportEvent;
use crate::registry::capability::supports_battery_notification;
use crate::registry::command::Command;
use crate::registry::peripheral_registry::PeripheralRegistry;
use crate::registry::scan_session::ScanSession;
use crate::registry::subscription::{
    BATTERY_LEVEL_UUID, BATTERY_SERVICE_UUID, BatterySubscriptions,
};
use crate::{Error, Result};

pub struct Controller<T: Transport> {
    transport: Arc<T>,
    registry: PeripheralRegistry,
    scan: ScanSession,
    subscriptions: BatterySubscriptions,
}

impl<T: Transport> Controller<T> {
    pub fn new(transport: Arc<T>, filter: ScanFilter) -> Self {
        Controller {
            transport,
            registry: PeripheralRegistry::new(filter.clone()),
            scan: ScanSession::new(filter),
            subscriptions: BatterySubscriptions::new(),
        }
    }

    /// Drain the transport's event channel until it closes.
    pub async fn run(&mut self, events: &mut Receiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
    }

    /// Apply one transport event and execute whatever follow-up commands the
    /// transition emitted.
    pub async fn handle_event(&mut self, event: TransportEvent) {
        let commands = self.apply(&event);
        self.run_commands(commands).await;
    }

    fn apply(&mut self, event: &TransportEvent) -> Vec<Command> {
        match event {
            TransportEvent::ScanStopped => self.scan.on_scan_stopped(),
            TransportEvent::PeripheralDisconnected { id } => self.subscriptions.on_disconnect(id),
            _ => {}
        }
        self.registry.apply(event)
    }

    /// Execute commands best-effort: a failed command is logged and the
    /// state it would have confirmed simply never materializes.
    async fn run_commands(&mut self, commands: Vec<Command>) {
        let mut pending: VecDeque<Command> = commands.into();
        while let Some(command) = pending.pop_front() {
            match self.execute(&command).await {
                Ok(follow_ups) => {
                    for event in follow_ups {
                        pending.extend(self.apply(&event));
                    }
                }
                Err(e) => warn!("command {:?} failed: {}", command, e),
            }
        }
    }

    /// Execute commands on behalf of a user intent, surfacing the first
    /// failure to the caller instead of swallowing it.
    async fn run_intent(&mut self, commands: Vec<Command>) -> Result<()> {
        for command in commands {
            let follow_ups = self.execute(&command).await?;
            for event in follow_ups {
                let next = self.apply(&event);
                self.run_commands(next).await;
            }
        }
        Ok(())
    }

    /// One command against the transport. Resolutions that carry data come
    /// back as events for the registry to fold in.
    async fn execute(&self, command: &Command) -> Result<Vec<TransportEvent>> {
        match command {
            Command::Scan {
                filter,
                timeout,
                allow_duplicates,
            } => {
                self.transport
                    .scan(filter, *timeout, *allow_duplicates)
                    .await?;
                Ok(Vec::new())
            }
            Command::StopScan => {
                self.transport.stop_scan().await?;
                Ok(Vec::new())
            }
            Command::Connect { id } => {
                self.transport.connect(id).await?;
                Ok(Vec::new())
            }
            Command::Disconnect { id } => {
                self.transport.disconnect(id).await?;
                Ok(Vec::new())
            }
            Command::RetrieveServices { id, filter } => {
                let info = self.transport.retrieve_services(id, filter.as_ref()).await?;
                Ok(vec![TransportEvent::ServicesRetrieved {
                    id: id.clone(),
                    info,
                }])
            }
            Command::StartNotification {
                id,
                service,
                characteristic,
            } => {
                self.transport
                    .start_notification(id, service, characteristic)
                    .await?;
                Ok(Vec::new())
            }
            Command::StopNotification {
                id,
                service,
                characteristic,
            } => {
                self.transport
                    .stop_notification(id, service, characteristic)
                    .await?;
                Ok(Vec::new())
            }
            Command::Read {
                id,
                service,
                characteristic,
            } => {
                let value = self.transport.read(id, service, characteristic).await?;
                Ok(vec![TransportEvent::CharacteristicValueUpdated {
                    id: id.clone(),
                    service: service.clone(),
                    characteristic: characteristic.clone(),
                    value,
                }])
            }
            Command::FetchDiscoveredPeripherals { filter } => {
                let cached = self.transport.discovered_peripherals(filter).await?;
                Ok(cached
                    .into_iter()
                    .map(|peripheral| TransportEvent::PeripheralDiscovered { peripheral })
                    .collect())
            }
            Command::RemoveFromTransport { id } => {
                self.transport.remove_peripheral(id).await?;
                Ok(Vec::new())
            }
        }
    }

    // ----- user intents -------------------------------------------------

    pub async fn start_scan(&mut self) {
        let commands = self.scan.start();
        self.run_commands(commands).await;
    }

    pub async fn stop_scan(&mut self) {
        let commands = self.scan.stop();
        self.run_commands(commands).await;
    }

    pub fn is_scanning(&self) -> bool {
        self.scan.is_scanning()
    }

    /// Ask the transport to connect. `connected` flips only when the
    /// transport confirms with a `PeripheralConnected` event.
    pub async fn connect(&mut self, id: &PeripheralId) -> Result<()> {
        self.ensure_known(id)?;
        self.run_intent(vec![Command::Connect { id: id.clone() }])
            .await
    }

    pub async fn disconnect(&mut self, id: &PeripheralId) -> Result<()> {
        self.ensure_known(id)?;
        self.run_intent(vec![Command::Disconnect { id: id.clone() }])
            .await
    }

    /// One-shot battery read; the response bytes flow through the same
    /// validated value-update path as a notification.
    pub async fn read_battery(&mut self, id: &PeripheralId) -> Result<()> {
        self.ensure_known(id)?;
        self.run_intent(vec![Command::Read {
            id: id.clone(),
            service: BATTERY_SERVICE_UUID.to_string(),
            characteristic: BATTERY_LEVEL_UUID.to_string(),
        }])
        .await
    }

    /// Toggle battery level notifications for a peripheral.
    ///
    /// Enabling requires the retrieved characteristic list to advertise
    /// notify support for the battery pair; callers gate their toggle UI on
    /// [`Controller::offers_battery_notifications`].
    pub async fn set_battery_notifications(
        &mut self,
        id: &PeripheralId,
        enabled: bool,
    ) -> Result<()> {
        let peripheral = self
            .registry
            .get(id)
            .ok_or_else(|| Error::PeripheralNotFound(id.clone()))?;
        if enabled && !supports_battery_notification(peripheral.characteristics.as_deref()) {
            return Err(Error::NotificationUnsupported(id.clone()));
        }
        let commands = if enabled {
            self.subscriptions.enable(id)
        } else {
            self.subscriptions.disable(id)
        };
        self.run_intent(commands).await
    }

    /// Forget a peripheral. Local removal is immediate; the transport-side
    /// disconnect and removal are best-effort.
    pub async fn remove(&mut self, id: &PeripheralId) {
        let commands = self.registry.remove(id);
        self.run_commands(commands).await;
    }

    // ----- views --------------------------------------------------------

    pub fn peripherals(&self) -> Vec<Peripheral> {
        self.registry.snapshot()
    }

    pub fn peripheral(&self, id: &PeripheralId) -> Option<Peripheral> {
        self.registry.get(id).cloned()
    }

    pub fn offers_battery_notifications(&self, id: &PeripheralId) -> bool {
        self.registry
            .get(id)
            .is_some_and(|p| supports_battery_notification(p.characteristics.as_deref()))
    }

    pub fn battery_notifications_enabled(&self, id: &PeripheralId) -> bool {
        self.subscriptions.is_subscribed(id)
    }

    fn ensure_known(&self, id: &PeripheralId) -> Result<()> {
        if self.registry.contains(id) {
            Ok(())
        } else {
            Err(Error::PeripheralNotFound(id.clone()))
        }
    }
}
