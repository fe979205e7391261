// # Interface Source Trait
//
// Defines the interface for listing local network interfaces together with
// their global-scope addresses.
//
// ## Implementations
//
// - iproute2 (`ip --json address show scope global`): `speedtest-ambient-iproute2` crate
//
// ## Usage
//
// ```rust,ignore
// use speedtest_ambient_core::InterfaceSource;
// use speedtest_ambient_core::discovery::enumerate;
//
// let source = /* InterfaceSource implementation */;
// let interfaces = source.list_interfaces().await?;
// for entry in enumerate(&interfaces) {
//     println!("{:?} {:?}", entry.family, entry.local);
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One interface object of the structured listing
///
/// Only the fields the discovery pipeline needs are modelled; everything else
/// in the listing is ignored. Interfaces without matching addresses are
/// emitted by `ip` as `{}`, hence every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    /// Interface name (e.g. "eth0")
    #[serde(default)]
    pub ifname: Option<String>,

    /// Assigned addresses
    #[serde(default)]
    pub addr_info: Vec<AddrInfo>,
}

/// One assigned address entry of an interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddrInfo {
    /// Family tag ("inet" or "inet6")
    #[serde(default)]
    pub family: Option<String>,

    /// Local address
    #[serde(default)]
    pub local: Option<String>,
}

impl AddrInfo {
    /// Create an address entry with both fields present
    pub fn new(family: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            family: Some(family.into()),
            local: Some(local.into()),
        }
    }
}

/// Parse the JSON listing produced by `ip --json address show`
///
/// The top level must be an array of interface objects. Anything else is a
/// discovery failure: without the listing there is nothing to measure.
pub fn parse_interface_listing(json: &str) -> Result<Vec<NetworkInterface>, crate::Error> {
    serde_json::from_str(json)
        .map_err(|e| crate::Error::discovery(format!("Malformed interface listing: {}", e)))
}

/// Trait for interface listing implementations
///
/// Called exactly once per run. An error is fatal for the whole run; partial
/// listings must not be returned.
#[async_trait]
pub trait InterfaceSource: Send + Sync {
    /// List every interface with its global-scope addresses, in listing order
    async fn list_interfaces(&self) -> Result<Vec<NetworkInterface>, crate::Error>;
}
