//! System DNS resolver using getaddrinfo.
//!
//! This resolver uses the operating system's native DNS resolution via
//! `getaddrinfo`, executed in a thread pool to avoid blocking the async runtime.
//!
//! # When to Use
//!
//! - When you need to respect system DNS configuration (/etc/hosts, nsswitch, etc.)
//! - When only `dns+` lookups are needed; `getaddrinfo` cannot answer SRV queries

use super::{Addrs, Name, Resolve, Resolving};
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, ToSocketAddrs};

/// System DNS resolver using `getaddrinfo` in a thread pool.
///
/// This resolver wraps the standard library's `ToSocketAddrs` trait and
/// executes resolution in `tokio::task::spawn_blocking` to avoid blocking
/// the async runtime. SRV lookups are not supported.
///
/// # Cancellation
///
/// Dropping the returned future does not stop the blocking `getaddrinfo`
/// call; it finishes on the blocking pool and its result is discarded.
#[derive(Clone, Debug, Default)]
pub struct GaiResolver;

impl GaiResolver {
    /// Creates a new `GaiResolver`.
    pub fn new() -> Self {
        Self
    }
}

impl Resolve for GaiResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            if let Some(ip) = try_parse_ip(name.as_str()) {
                return Ok(Box::new(std::iter::once(ip)) as Addrs);
            }

            let host = name.as_str().to_string();
            let domain = host.clone();

            let result = tokio::task::spawn_blocking(move || {
                tracing::debug!(host = %host, "resolving via getaddrinfo");
                (host.as_str(), 0u16)
                    .to_socket_addrs()
                    .map(|iter| iter.map(|addr| addr.ip()).collect::<Vec<_>>())
            })
            .await;

            // Handle task join error (cancellation, panic)
            let ips = result
                .map_err(|e| {
                    tracing::error!(error = %e, "DNS resolution task failed");
                    NetError::name_not_resolved(domain.as_str(), e)
                })?
                .dns_context(&domain)?;

            if ips.is_empty() {
                return Err(NetError::name_not_resolved(
                    domain,
                    "no addresses returned by getaddrinfo",
                ));
            }

            tracing::debug!(domain = %domain, count = ips.len(), "DNS resolution complete");
            Ok(Box::new(ips.into_iter()) as Addrs)
        })
    }
}

/// Parses a host string as an IP address, bypassing DNS.
///
/// Accepts bare IPv4, bare IPv6 and bracketed IPv6 (`[::1]`). Returns `None`
/// for hostnames that require resolution.
pub fn try_parse_ip(host: &str) -> Option<IpAddr> {
    if let Ok(addr) = host.parse::<Ipv4Addr>() {
        return Some(IpAddr::V4(addr));
    }

    let unbracketed = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if let Ok(addr) = unbracketed.parse::<Ipv6Addr>() {
        return Some(IpAddr::V6(addr));
    }

    None
}
