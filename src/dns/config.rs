//! Resolver configuration.
//!
//! Deserializable with serde so it can be embedded in a larger discovery
//! config; every field has a default.

use super::{DnsResolverWithOverrides, DnsSdResolver, GaiResolver, HickoryResolver, Resolve};
use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};

/// Host lookup backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// hickory-dns; supports SRV.
    #[default]
    Hickory,
    /// Platform `getaddrinfo`; `dns+` only.
    System,
}

/// Transport used to reach explicit name servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DnsProtocol {
    #[default]
    Udp,
    Tcp,
}

/// Configuration for the default resolver stack.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Host lookup backend (default: hickory)
    pub backend: Backend,
    /// Name servers for the hickory backend; empty uses system configuration
    pub name_servers: Vec<SocketAddr>,
    /// Transport for `name_servers` (default: udp)
    pub protocol: DnsProtocol,
    /// Port for `dns+` names without one (default: none, such names fail)
    pub default_port: Option<u16>,
    /// Per-name lookup timeout in milliseconds (default: none)
    pub timeout_ms: Option<u64>,
    /// Static host to IP overrides consulted before the backend
    pub overrides: HashMap<String, Vec<IpAddr>>,
}

impl ResolverConfig {
    /// Use explicit name servers with the hickory backend.
    pub fn name_servers(mut self, servers: impl IntoIterator<Item = SocketAddr>) -> Self {
        self.backend = Backend::Hickory;
        self.name_servers = servers.into_iter().collect();
        self
    }

    pub fn protocol(mut self, protocol: DnsProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn default_port(mut self, port: u16) -> Self {
        self.default_port = Some(port);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_override(mut self, host: impl Into<String>, ips: Vec<IpAddr>) -> Self {
        self.overrides.insert(host.into(), ips);
        self
    }

    /// Lookup timeout as a `Duration`.
    pub fn lookup_timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Builds the host lookup backend, wrapped in overrides when configured.
    pub fn build_backend(&self) -> Arc<dyn Resolve> {
        let backend: Arc<dyn Resolve> = match self.backend {
            Backend::System => Arc::new(GaiResolver::new()),
            Backend::Hickory if self.name_servers.is_empty() => Arc::new(HickoryResolver::new()),
            Backend::Hickory => Arc::new(HickoryResolver::with_name_servers(
                &self.name_servers,
                self.protocol,
                self.lookup_timeout(),
            )),
        };

        if self.overrides.is_empty() {
            return backend;
        }

        let overrides = self
            .overrides
            .iter()
            .map(|(host, ips)| (Cow::Owned(host.clone()), ips.clone()))
            .collect();
        Arc::new(DnsResolverWithOverrides::new(backend, overrides))
    }

    /// Builds the service-discovery resolver described by this config.
    pub fn build(&self) -> DnsSdResolver {
        let mut resolver = DnsSdResolver::new(self.build_backend());
        if let Some(port) = self.default_port {
            resolver = resolver.with_default_port(port);
        }
        if let Some(timeout) = self.lookup_timeout() {
            resolver = resolver.with_timeout(timeout);
        }
        tracing::debug!(
            backend = ?self.backend,
            name_servers = self.name_servers.len(),
            overrides = self.overrides.len(),
            "built dns discovery resolver"
        );
        resolver
    }
}
