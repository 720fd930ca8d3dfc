//! UUID canonicalization for transport-reported identifiers.
//!
//! Native bindings are inconsistent about UUID shape: some events carry the
//! 16-bit short form (`"2A19"`), others the full 128-bit form with hyphens
//! (`"00002a19-0000-1000-8000-00805f9b34fb"`). All comparison in this crate
//! happens on the uppercase short form.

use uuid::Uuid;

/// Canonical uppercase short form of a transport-reported UUID.
///
/// Full 128-bit forms are reduced to the 16-bit identifier embedded in their
/// first segment; anything unparseable is assumed to already be short form
/// and is only uppercased.
pub fn short_form(raw: &str) -> String {
    if let Ok(uuid) = Uuid::parse_str(raw) {
        let bytes = uuid.as_bytes();
        return format!("{:02X}{:02X}", bytes[2], bytes[3]);
    }
    raw.to_ascii_uppercase()
}

/// Whether two UUIDs name the same identifier once canonicalized.
pub fn same_uuid(a: &str, b: &str) -> bool {
    short_form(a) == short_form(b)
}
