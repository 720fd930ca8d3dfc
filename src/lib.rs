//! Event-sourced BLE peripheral registry.
//!
//! Folds a native transport's event stream (discovery, connect, disconnect,
//! characteristic updates, scan stop) into a deduplicated view of known
//! peripherals and their battery state, expressing follow-up transport work
//! as explicit command values instead of in-line side effects.

pub mod api;
pub mod error;
pub mod registry;

pub use error::{Error, Result};
