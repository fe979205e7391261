// # iproute2 Interface Source and Route Lookup
//
// This crate implements the interface listing and the route lookup on top of
// the `ip` tool from iproute2:
//
// - `ip --json address show scope global` → [`InterfaceSource`]
// - `ip route get <destination>`          → [`RouteLookup`]
//
// ## Platform Support
//
// Linux only in practice: the crate compiles anywhere, but without an `ip`
// binary every call fails with a command error.

use async_trait::async_trait;
use speedtest_ambient_core::command::run_command;
use speedtest_ambient_core::traits::{
    InterfaceSource, NetworkInterface, RouteLookup, parse_interface_listing,
};
use speedtest_ambient_core::{Error, Result};
use std::net::IpAddr;
use tracing::debug;

/// Default iproute2 executable
const DEFAULT_IP_BINARY: &str = "ip";

/// `ip`-command backed interface listing and route lookup
#[derive(Debug, Clone)]
pub struct IpRoute2 {
    /// Executable to invoke
    binary: String,
}

impl IpRoute2 {
    /// Use `ip` from PATH
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_IP_BINARY)
    }

    /// Use a specific `ip` executable
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments for the global-scope address listing
    pub fn address_args() -> [&'static str; 5] {
        ["--json", "address", "show", "scope", "global"]
    }

    /// Arguments for the route lookup to `destination`
    pub fn route_args(destination: IpAddr) -> Vec<String> {
        vec!["route".to_string(), "get".to_string(), destination.to_string()]
    }
}

impl Default for IpRoute2 {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InterfaceSource for IpRoute2 {
    async fn list_interfaces(&self) -> Result<Vec<NetworkInterface>> {
        let output = run_command(&self.binary, Self::address_args())
            .await
            .map_err(|e| Error::discovery(e.to_string()))?;

        let interfaces = parse_interface_listing(&output.stdout)?;
        debug!("{} reported {} interface(s)", self.binary, interfaces.len());
        Ok(interfaces)
    }
}

#[async_trait]
impl RouteLookup for IpRoute2 {
    async fn route_get(&self, destination: IpAddr) -> Result<String> {
        let output = run_command(&self.binary, Self::route_args(destination))
            .await
            .map_err(|e| Error::route_lookup(format!("{} ({})", e, destination)))?;
        Ok(output.stdout)
    }
}
