//! DNS-backed address cache for service discovery.
//!
//! A [`Provider`] maps each address specification to the targets of its most
//! recent successful resolution. Specifications look like:
//!
//! - `127.0.0.1:9090`: literal, used as-is
//! - `dns+example.com:9090`: A/AAAA lookup
//! - `dnssrv+_web._tcp.example.com`: SRV lookup, then A/AAAA of each target
//! - `dnssrvnoa+_web._tcp.example.com`: SRV lookup only
//!
//! # Example
//!
//! ```rust,ignore
//! use dnsdisco::dns::Provider;
//! use tokio_util::sync::CancellationToken;
//!
//! let provider = Provider::default();
//! let cancel = CancellationToken::new();
//!
//! provider
//!     .resolve(&cancel, &["127.0.0.1:9090", "dns+example.com:9090"])
//!     .await?;
//! for target in provider.addresses().await {
//!     println!("target: {}", target);
//! }
//! ```

use super::metrics::{LookupCounters, ResolveMetrics};
use super::query::AddressSpec;
use super::{DnsSdResolver, Name, QueryType, ResolverConfig, SdResolve};
use crate::base::neterror::{LookupFailure, LookupFailures, NetError};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Store of resolved discovery targets.
///
/// All reads and writes of the cache go through one lock. [`resolve`](Self::resolve)
/// holds it for the whole refresh, lookups included, so refreshes are
/// serialized and [`addresses`](Self::addresses) never sees a half-applied one.
/// A refresh whose future is dropped before completion changes nothing.
pub struct Provider {
    resolver: Arc<dyn SdResolve>,
    metrics: Arc<dyn ResolveMetrics>,
    /// Address specification -> targets of its last successful lookup.
    resolved: Mutex<HashMap<String, Vec<String>>>,
}

impl Provider {
    /// Creates an empty provider.
    pub fn new(resolver: Arc<dyn SdResolve>, metrics: Arc<dyn ResolveMetrics>) -> Self {
        Self {
            resolver,
            metrics,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an empty provider counting into its own [`LookupCounters`].
    pub fn with_resolver(resolver: Arc<dyn SdResolve>) -> Self {
        Self::new(resolver, Arc::new(LookupCounters::new()))
    }

    /// Creates an empty provider using the resolver described by `config`.
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::with_resolver(Arc::new(config.build()))
    }

    /// Lookup recorder; its counts are readable through [`ResolveMetrics`].
    pub fn metrics(&self) -> &Arc<dyn ResolveMetrics> {
        &self.metrics
    }

    /// Refreshes the cache from `addrs`.
    ///
    /// Literal entries are stored as-is. Tagged entries are resolved in order;
    /// a failed lookup is logged and counted, and the entry keeps its previous
    /// targets (or stays absent). Entries not in `addrs` are then removed.
    ///
    /// The cache is fully updated and pruned before this returns. `Err` lists
    /// the entries whose lookup failed during this call.
    ///
    /// Cancelling `cancel` aborts the in-flight lookup. Remaining entries are
    /// still visited and fail immediately, keeping their previous targets.
    pub async fn resolve<S: AsRef<str>>(
        &self,
        cancel: &CancellationToken,
        addrs: &[S],
    ) -> Result<(), LookupFailures> {
        let mut resolved = self.resolved.lock().await;
        // Applied to a copy and swapped in at the end, so dropping this
        // future partway leaves the cache as it was.
        let mut next = resolved.clone();

        let mut attempted = 0;
        let mut failures = Vec::new();

        for addr in addrs {
            let addr = addr.as_ref();

            let (qtype, name) = match AddressSpec::parse(addr) {
                AddressSpec::Literal(literal) => {
                    next.insert(addr.to_string(), vec![literal.to_string()]);
                    continue;
                }
                AddressSpec::Lookup { qtype, name } => (qtype, name),
            };

            attempted += 1;
            let result = self.lookup(cancel, qtype, name).await;
            self.metrics.lookup();

            match result {
                Ok(targets) => {
                    tracing::debug!(addr = %addr, count = targets.len(), "dns resolution complete");
                    next.insert(addr.to_string(), targets);
                }
                Err(error) => {
                    self.metrics.failure();
                    tracing::error!(addr = %addr, error = %error, "dns resolution failed");
                    failures.push(LookupFailure {
                        addr: addr.to_string(),
                        error,
                    });
                }
            }
        }

        let requested: HashSet<&str> = addrs.iter().map(|addr| addr.as_ref()).collect();
        next.retain(|addr, targets| {
            let keep = requested.contains(addr.as_str());
            if !keep {
                tracing::debug!(addr = %addr, count = targets.len(), "removing address no longer requested");
            }
            keep
        });

        *resolved = next;
        drop(resolved);

        if failures.is_empty() {
            Ok(())
        } else {
            Err(LookupFailures {
                attempted,
                failures,
            })
        }
    }

    async fn lookup(
        &self,
        cancel: &CancellationToken,
        qtype: &str,
        name: &str,
    ) -> Result<Vec<String>, NetError> {
        let qtype: QueryType = qtype.parse()?;
        self.resolver
            .resolve(cancel.clone(), Name::new(name), qtype)
            .await
    }

    /// Returns a copy of every cached target.
    ///
    /// Targets of one specification keep their resolution order; there is no
    /// order across specifications.
    pub async fn addresses(&self) -> Vec<String> {
        let resolved = self.resolved.lock().await;
        resolved.values().flatten().cloned().collect()
    }

    /// Number of address specifications currently cached.
    pub async fn len(&self) -> usize {
        self.resolved.lock().await.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.resolved.lock().await.is_empty()
    }
}

impl Default for Provider {
    /// Provider with the system-configured hickory resolver and no default port.
    fn default() -> Self {
        Self::with_resolver(Arc::new(DnsSdResolver::default()))
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
