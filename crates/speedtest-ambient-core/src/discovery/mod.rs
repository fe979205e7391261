//! Address discovery
//!
//! Turns the interface listing into the ordered set of local addresses worth
//! measuring:
//!
//! ```text
//! InterfaceSource ──► enumerate ──► split_families ──► sieve ──► Vec<RoutableAddress>
//!                     (flatten)     (v4 / v6)          (RouteLookup)
//! ```
//!
//! Every step is eager and order-preserving. The order of the final sequence
//! (all IPv4 first, then all IPv6, each in discovery order) decides which
//! reporting channel an address is uploaded to.

mod family;
mod sieve;

pub use family::{AddressFamily, AddressFamilyGroup, split_families};
pub use sieve::{PROBE_DESTINATION_V4, PROBE_DESTINATION_V6, contains_word, sieve, sieve_family};

use crate::error::Result;
use crate::traits::{AddrInfo, InterfaceSource, NetworkInterface, RouteLookup};
use tracing::{debug, info};

/// A local address the system selects as source for global traffic
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutableAddress {
    /// The address as listed by the interface source
    pub address: String,
    /// Its family
    pub family: AddressFamily,
}

impl RoutableAddress {
    /// Create a new routable address
    pub fn new(address: impl Into<String>, family: AddressFamily) -> Self {
        Self {
            address: address.into(),
            family,
        }
    }
}

impl std::fmt::Display for RoutableAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.address)
    }
}

/// Flatten the address entries of all interfaces, in listing order
pub fn enumerate(interfaces: &[NetworkInterface]) -> Vec<AddrInfo> {
    interfaces
        .iter()
        .flat_map(|interface| interface.addr_info.iter().cloned())
        .collect()
}

/// Run the whole discovery pipeline
///
/// Lists interfaces once, splits the entries by family and keeps the
/// addresses the routing table would pick for global traffic. Any failure of
/// the listing or of a route lookup aborts discovery.
pub async fn discover(
    interfaces: &dyn InterfaceSource,
    routes: &dyn RouteLookup,
) -> Result<Vec<RoutableAddress>> {
    let listing = interfaces.list_interfaces().await?;
    let entries = enumerate(&listing);
    debug!(
        "Listed {} interface(s) with {} address entries",
        listing.len(),
        entries.len()
    );

    let groups = split_families(entries);
    info!(
        "Candidate addresses: {} IPv4, {} IPv6",
        groups.v4.len(),
        groups.v6.len()
    );

    let routable = sieve(&groups, routes).await?;
    info!("Routable addresses: {}", routable.len());
    Ok(routable)
}
