//! Core DNS resolution types and traits.
//!
//! This module defines the `Resolve` trait and supporting types that form
//! the host lookup layer underneath service discovery.

use crate::base::neterror::NetError;
use std::{
    borrow::Cow, collections::HashMap, fmt, future::Future, net::IpAddr, pin::Pin, sync::Arc,
};

/// A domain name to resolve into IP addresses or SRV records.
///
/// This is a lightweight wrapper around a hostname string that provides
/// a type-safe way to pass domain names to resolvers.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    /// Creates a new [`Name`] from any string-like type.
    #[inline]
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    /// View the hostname as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// One SRV answer: the target host and the port it serves on.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct SrvTarget {
    /// Target host without the trailing root dot.
    pub target: String,
    pub port: u16,
}

impl SrvTarget {
    /// Creates a new target, stripping a trailing `.` from fully-qualified names.
    pub fn new(target: impl Into<String>, port: u16) -> Self {
        let mut target = target.into();
        if target.len() > 1 && target.ends_with('.') {
            target.pop();
        }
        Self { target, port }
    }
}

/// Alias for an `Iterator` trait object over `IpAddr`.
pub type Addrs = Box<dyn Iterator<Item = IpAddr> + Send>;

/// Alias for the `Future` type returned by a DNS resolver.
pub type Resolving = Pin<Box<dyn Future<Output = Result<Addrs, NetError>> + Send>>;

/// Alias for the `Future` type returned by an SRV lookup.
pub type ResolvingSrv = Pin<Box<dyn Future<Output = Result<Vec<SrvTarget>, NetError>> + Send>>;

/// Trait for host-level DNS resolution.
///
/// Implementations must be thread-safe.
///
/// # Design Notes
///
/// - Uses `&self` for concurrent resolution without mutable access.
/// - Returns boxed futures for trait object compatibility.
/// - Returned futures own everything they need, so they can be raced against
///   a cancellation token or a timer by the caller.
pub trait Resolve: Send + Sync {
    /// Resolves a domain name to IP addresses (A and AAAA).
    fn resolve(&self, name: Name) -> Resolving;

    /// Looks up the SRV records of `name`.
    ///
    /// Resolvers without SRV support keep the default, which fails with
    /// [`NetError::SrvNotSupported`].
    fn resolve_srv(&self, name: Name) -> ResolvingSrv {
        let _ = name;
        Box::pin(std::future::ready(Err::<Vec<SrvTarget>, _>(
            NetError::SrvNotSupported,
        )))
    }
}

/// Blanket implementation for Arc-wrapped resolvers.
impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: Name) -> Resolving {
        (**self).resolve(name)
    }

    fn resolve_srv(&self, name: Name) -> ResolvingSrv {
        (**self).resolve_srv(name)
    }
}

/// DNS resolver wrapper that supports hostname overrides.
///
/// This resolver first checks a map of hostname-to-address overrides before
/// falling back to the underlying resolver. SRV lookups always go to the
/// underlying resolver. Useful for:
/// - Testing without real DNS
/// - Pinning discovery targets to fixed IPs
///
/// # Example
///
/// ```rust,ignore
/// use dnsdisco::dns::{DnsResolverWithOverrides, HickoryResolver};
/// use std::collections::HashMap;
///
/// let mut overrides = HashMap::new();
/// overrides.insert("api.local".into(), vec!["127.0.0.1".parse().unwrap()]);
///
/// let resolver = DnsResolverWithOverrides::new(
///     Arc::new(HickoryResolver::new()),
///     overrides,
/// );
/// ```
pub struct DnsResolverWithOverrides {
    inner: Arc<dyn Resolve>,
    overrides: Arc<HashMap<Cow<'static, str>, Vec<IpAddr>>>,
}

impl DnsResolverWithOverrides {
    /// Creates a new resolver with the given overrides.
    ///
    /// # Arguments
    ///
    /// * `inner` - The fallback resolver for non-overridden hostnames.
    /// * `overrides` - Map of hostnames to their resolved addresses.
    pub fn new(inner: Arc<dyn Resolve>, overrides: HashMap<Cow<'static, str>, Vec<IpAddr>>) -> Self {
        Self {
            inner,
            overrides: Arc::new(overrides),
        }
    }

    /// Returns the number of configured overrides.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl Resolve for DnsResolverWithOverrides {
    fn resolve(&self, name: Name) -> Resolving {
        if let Some(addrs) = self.overrides.get(name.as_str()) {
            tracing::debug!(domain = %name, count = addrs.len(), "using dns override");
            let addrs: Addrs = Box::new(addrs.clone().into_iter());
            return Box::pin(std::future::ready(Ok(addrs)));
        }
        self.inner.resolve(name)
    }

    fn resolve_srv(&self, name: Name) -> ResolvingSrv {
        self.inner.resolve_srv(name)
    }
}

impl fmt::Debug for DnsResolverWithOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsResolverWithOverrides")
            .field("override_count", &self.overrides.len())
            .finish_non_exhaustive()
    }
}
