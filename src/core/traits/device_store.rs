use crate::core::errors::Result;

/// Port for the server that stores device dictionaries.
///
/// Implementations live in `adapters::store`. Only one call is needed:
/// export the resolved configuration of a single device.
pub trait DeviceStore: Send + Sync {
    /// Return the resolved device configuration (YAML) for `hostname`.
    fn export(&self, hostname: &str) -> Result<Vec<u8>>;
}
