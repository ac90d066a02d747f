//! DNS Service Discovery Module
//!
//! Resolves address specifications such as `dns+example.com:9090` or
//! `dnssrv+_web._tcp.example.com` into `host:port` targets and caches the
//! latest result per specification.
//!
//! # Architecture
//!
//! - [`Resolve`]: host-level lookups (A/AAAA and SRV). Backends are
//!   [`HickoryResolver`], [`GaiResolver`] and [`DnsResolverWithOverrides`].
//! - [`SdResolve`]: turns a tagged name into targets. [`DnsSdResolver`] is the
//!   default, built on any [`Resolve`].
//! - [`Provider`]: the cache. Refreshed by [`Provider::resolve`], read by
//!   [`Provider::addresses`].
//!
//! # Example
//!
//! ```rust,ignore
//! use dnsdisco::dns::{Provider, ResolverConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let provider = Provider::from_config(&ResolverConfig::default().default_port(9100));
//! provider
//!     .resolve(&CancellationToken::new(), &["dns+node-exporter.local"])
//!     .await?;
//! println!("{:?}", provider.addresses().await);
//! ```

mod config;
mod gai;
mod hickory;
mod metrics;
mod provider;
mod query;
mod resolve;
mod sd;

pub use config::{Backend, DnsProtocol, ResolverConfig};
pub use gai::{try_parse_ip, GaiResolver};
pub use hickory::HickoryResolver;
pub use metrics::{LookupCounters, NoopMetrics, ResolveMetrics};
pub use provider::Provider;
pub use query::{AddressSpec, QueryType};
pub use resolve::{
    Addrs, DnsResolverWithOverrides, Name, Resolve, Resolving, ResolvingSrv, SrvTarget,
};
pub use sd::{DnsSdResolver, ResolvingTargets, SdResolve};
