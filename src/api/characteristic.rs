/// A service/characteristic pair reported by service retrieval, together
/// with the operations the peripheral advertises for it.
///
/// UUIDs are kept exactly as the transport reported them; comparison goes
/// through `registry::uuid_norm`.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct CharacteristicDescriptor {
    pub service: String,
    pub characteristic: String,
    pub properties: Vec<CharacteristicProperty>,
}

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum CharacteristicProperty {
    Broadcast,
    Read,
    WriteWithoutResponse,
    Write,
    AuthenticatedSignedWrites,
    Notify,
    NotifyEncryptionRequired,
    Indicate,
    IndicateEncryptionRequired,
    ExtendedProperties,
}
