//! Async DNS resolver using hickory-dns.
//!
//! This resolver provides fully async DNS resolution with support for:
//! - A/AAAA lookups (IPv4 + IPv6)
//! - SRV lookups
//! - System DNS configuration auto-detection
//! - Explicit name servers over UDP or TCP
//!
//! # Performance
//!
//! Unlike `GaiResolver`, this resolver is fully async and doesn't require
//! spawning blocking tasks. It maintains connection pools to DNS servers
//! for better performance under load.

use super::config::DnsProtocol;
use super::{Addrs, Name, Resolve, Resolving, ResolvingSrv, SrvTarget};
use crate::base::neterror::NetError;
use hickory_resolver::{
    config::{LookupIpStrategy, NameServerConfig, ResolverConfig},
    name_server::TokioConnectionProvider,
    proto::xfer::Protocol,
    TokioResolver,
};
use std::{
    net::{IpAddr, SocketAddr},
    sync::{Arc, LazyLock},
    time::Duration,
};

/// Async DNS resolver backed by hickory-dns.
///
/// [`HickoryResolver::new`] shares one lazily initialized, system-configured
/// resolver across all instances. [`HickoryResolver::with_name_servers`]
/// builds a dedicated resolver that only talks to the given servers.
///
/// # Example
///
/// ```rust,ignore
/// use dnsdisco::dns::{HickoryResolver, Name, Resolve};
///
/// let resolver = HickoryResolver::new();
/// let addrs = resolver.resolve(Name::new("example.com")).await?;
/// let srv = resolver.resolve_srv(Name::new("_http._tcp.example.com")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HickoryResolver {
    resolver: Arc<TokioResolver>,
}

impl HickoryResolver {
    /// Creates a new `HickoryResolver` using the system DNS configuration.
    ///
    /// The underlying resolver is lazily initialized on first use.
    /// It will attempt to read system DNS configuration; if that fails,
    /// it falls back to sensible defaults.
    pub fn new() -> Self {
        static RESOLVER: LazyLock<Arc<TokioResolver>> = LazyLock::new(|| {
            let mut builder = match TokioResolver::builder_tokio() {
                Ok(builder) => {
                    tracing::debug!("Using system DNS configuration");
                    builder
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Failed to read system DNS config, using defaults"
                    );
                    TokioResolver::builder_with_config(
                        ResolverConfig::default(),
                        TokioConnectionProvider::default(),
                    )
                }
            };

            builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

            Arc::new(builder.build())
        });

        Self {
            resolver: Arc::clone(&RESOLVER),
        }
    }

    /// Creates a resolver that queries only `servers` over `protocol`.
    ///
    /// `timeout` bounds each query to a single name server; hickory's default
    /// applies when `None`.
    pub fn with_name_servers(
        servers: &[SocketAddr],
        protocol: DnsProtocol,
        timeout: Option<Duration>,
    ) -> Self {
        let protocol = match protocol {
            DnsProtocol::Udp => Protocol::Udp,
            DnsProtocol::Tcp => Protocol::Tcp,
        };

        let mut config = ResolverConfig::new();
        for addr in servers {
            config.add_name_server(NameServerConfig::new(*addr, protocol));
        }

        let mut builder =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default());
        let options = builder.options_mut();
        options.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
        if let Some(timeout) = timeout {
            options.timeout = timeout;
        }

        tracing::debug!(servers = ?servers, ?protocol, "Using explicit DNS servers");
        Self {
            resolver: Arc::new(builder.build()),
        }
    }
}

impl Default for HickoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolve for HickoryResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.clone();
        Box::pin(async move {
            let domain = name.as_str();
            tracing::debug!(domain = %domain, "resolving via hickory-dns");

            let lookup = resolver.resolver.lookup_ip(domain).await.map_err(|e| {
                tracing::debug!(domain = %domain, error = %e, "hickory-dns lookup failed");
                NetError::name_not_resolved(domain, e)
            })?;

            let ips: Vec<IpAddr> = lookup.iter().collect();

            if ips.is_empty() {
                return Err(NetError::name_not_resolved(domain, "no addresses returned"));
            }

            tracing::debug!(domain = %domain, count = ips.len(), "hickory-dns resolution complete");
            Ok(Box::new(ips.into_iter()) as Addrs)
        })
    }

    fn resolve_srv(&self, name: Name) -> ResolvingSrv {
        let resolver = self.clone();
        Box::pin(async move {
            let domain = name.as_str();
            tracing::debug!(domain = %domain, "srv lookup via hickory-dns");

            let lookup = resolver.resolver.srv_lookup(domain).await.map_err(|e| {
                tracing::debug!(domain = %domain, error = %e, "hickory-dns srv lookup failed");
                NetError::name_not_resolved(domain, e)
            })?;

            let targets: Vec<SrvTarget> = lookup
                .iter()
                .map(|srv| SrvTarget::new(srv.target().to_utf8(), srv.port()))
                .collect();

            tracing::debug!(domain = %domain, count = targets.len(), "hickory-dns srv lookup complete");
            Ok(targets)
        })
    }
}
