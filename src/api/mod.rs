pub mod characteristic;
pub mod peripheral;
pub mod transport;
pub mod transport_event;
