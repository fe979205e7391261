// # Route Lookup Trait
//
// Asks the system which route (and therefore which source address) it would
// use to reach a destination.
//
// ## Implementations
//
// - iproute2 (`ip route get <destination>`): `speedtest-ambient-iproute2` crate

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for route lookup implementations
///
/// The returned text is the routing decision exactly as the tool prints it;
/// the route sieve only searches it for address tokens.
#[async_trait]
pub trait RouteLookup: Send + Sync {
    /// Describe the route the system would use to reach `destination`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: Human-readable routing decision
    /// - `Err(Error)`: The lookup itself failed (fatal for the run)
    async fn route_get(&self, destination: IpAddr) -> Result<String, crate::Error>;
}
