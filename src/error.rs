use std::fmt;

use crate::api::peripheral::PeripheralId;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced to the caller of a user-intent method.
///
/// Event application never produces an error: unknown peripherals and
/// mismatched characteristics degrade to a silent no-op.
#[derive(Debug)]
pub enum Error {
    /// The transport rejected or failed a command.
    Transport(String),

    /// An intent referenced a peripheral the registry does not know.
    PeripheralNotFound(PeripheralId),

    /// The peripheral's characteristic list does not advertise notify
    /// support for the battery level characteristic.
    NotificationUnsupported(PeripheralId),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(message) => write!(f, "transport error: {}", message),
            Error::PeripheralNotFound(id) => write!(f, "unknown peripheral {}", id),
            Error::NotificationUnsupported(id) => {
                write!(f, "peripheral {} does not support battery notifications", id)
            }
        }
    }
}

impl std::error::Error for Error {}
