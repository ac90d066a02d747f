//! Service-discovery resolution of tagged names into `host:port` targets.
//!
//! [`SdResolve`] is the capability the [`Provider`](super::Provider) consumes.
//! [`DnsSdResolver`] is the default implementation; it turns a name and a
//! [`QueryType`] into targets using any host-level [`Resolve`] backend.

use super::gai::try_parse_ip;
use super::{HickoryResolver, Name, QueryType, Resolve, SrvTarget};
use crate::base::neterror::NetError;
use std::{fmt, future::Future, net::IpAddr, pin::Pin, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

/// Alias for the `Future` type returned by an [`SdResolve`] implementation.
pub type ResolvingTargets = Pin<Box<dyn Future<Output = Result<Vec<String>, NetError>> + Send>>;

/// Resolves a tagged name into a list of `host:port` targets.
///
/// Implementations must return promptly with [`NetError::Aborted`] once
/// `cancel` fires.
pub trait SdResolve: Send + Sync {
    fn resolve(&self, cancel: CancellationToken, name: Name, qtype: QueryType) -> ResolvingTargets;
}

impl<R: SdResolve + ?Sized> SdResolve for Arc<R> {
    fn resolve(&self, cancel: CancellationToken, name: Name, qtype: QueryType) -> ResolvingTargets {
        (**self).resolve(cancel, name, qtype)
    }
}

/// Default [`SdResolve`] built on a host-level resolver.
///
/// - `dns`: the name is `[scheme://]host[:port]`. Each resolved IP is joined
///   with the explicit port, or the default port when none is given.
/// - `dnssrv`/`srv`: every SRV target is resolved and each IP is joined with
///   the record's port. One failed target lookup fails the whole name.
/// - `dnssrvnoa`: SRV targets are returned as `target:port`.
///
/// A `scheme://` prefix on the name is carried onto every target.
#[derive(Clone)]
pub struct DnsSdResolver {
    inner: Arc<dyn Resolve>,
    default_port: Option<u16>,
    timeout: Option<Duration>,
}

impl DnsSdResolver {
    /// Creates a resolver with no default port and no timeout.
    pub fn new(inner: Arc<dyn Resolve>) -> Self {
        Self {
            inner,
            default_port: None,
            timeout: None,
        }
    }

    /// Port used for `dns` names that carry none.
    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = Some(port);
        self
    }

    /// Upper bound on a single `resolve` call, SRV target lookups included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn default_port(&self) -> Option<u16> {
        self.default_port
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for DnsSdResolver {
    fn default() -> Self {
        Self::new(Arc::new(HickoryResolver::new()))
    }
}

impl fmt::Debug for DnsSdResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsSdResolver")
            .field("default_port", &self.default_port)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SdResolve for DnsSdResolver {
    fn resolve(&self, cancel: CancellationToken, name: Name, qtype: QueryType) -> ResolvingTargets {
        let inner = Arc::clone(&self.inner);
        let default_port = self.default_port;
        let timeout = self.timeout;

        Box::pin(async move {
            let lookup = lookup_targets(inner, name, qtype, default_port);
            let bounded = async move {
                match timeout {
                    Some(limit) => tokio::time::timeout(limit, lookup)
                        .await
                        .unwrap_or(Err(NetError::TimedOut)),
                    None => lookup.await,
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(NetError::Aborted),
                result = bounded => result,
            }
        })
    }
}

async fn lookup_targets(
    inner: Arc<dyn Resolve>,
    name: Name,
    qtype: QueryType,
    default_port: Option<u16>,
) -> Result<Vec<String>, NetError> {
    let (scheme, rest) = split_scheme(name.as_str());

    match qtype {
        QueryType::Dns => {
            let (host, port) = split_host_port(rest)?;
            let port = port.or(default_port).ok_or_else(|| NetError::MissingPort {
                name: name.to_string(),
            })?;

            let ips: Vec<IpAddr> = match try_parse_ip(host) {
                Some(ip) => vec![ip],
                None => Resolve::resolve(&inner, Name::new(host)).await?.collect(),
            };

            Ok(ips
                .iter()
                .map(|ip| with_scheme(scheme, join_host_port(&ip.to_string(), port)))
                .collect())
        }
        QueryType::Srv => {
            let (host, _) = split_host_port(rest)?;
            let records = inner.resolve_srv(Name::new(host)).await?;

            let lookups = records.into_iter().map(|SrvTarget { target, port }| {
                let inner = Arc::clone(&inner);
                async move {
                    let ips = Resolve::resolve(&inner, Name::new(target)).await?;
                    Ok::<_, NetError>(
                        ips.map(|ip| with_scheme(scheme, join_host_port(&ip.to_string(), port)))
                            .collect::<Vec<_>>(),
                    )
                }
            });

            let resolved = futures::future::try_join_all(lookups).await?;
            Ok(resolved.into_iter().flatten().collect())
        }
        QueryType::SrvNoA => {
            let (host, _) = split_host_port(rest)?;
            let records = inner.resolve_srv(Name::new(host)).await?;
            Ok(records
                .iter()
                .map(|srv| with_scheme(scheme, join_host_port(&srv.target, srv.port)))
                .collect())
        }
    }
}

/// Splits `scheme://rest`, keeping `scheme://` intact.
fn split_scheme(name: &str) -> (Option<&str>, &str) {
    match name.find("://") {
        Some(idx) => (Some(&name[..idx + 3]), &name[idx + 3..]),
        None => (None, name),
    }
}

fn with_scheme(scheme: Option<&str>, target: String) -> String {
    match scheme {
        Some(scheme) => format!("{}{}", scheme, target),
        None => target,
    }
}

/// Splits `host:port`, `[v6]:port`, `[v6]`, `host` or a bare IPv6 address.
///
/// Brackets are removed from the returned host.
fn split_host_port(addr: &str) -> Result<(&str, Option<u16>), NetError> {
    let (host, port) = if let Some(bracketed) = addr.strip_prefix('[') {
        let end = bracketed
            .find(']')
            .ok_or_else(|| NetError::address_invalid(addr, "missing ']' in address"))?;
        let host = &bracketed[..end];
        match &bracketed[end + 1..] {
            "" => (host, None),
            rest => match rest.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None => return Err(NetError::address_invalid(addr, "unexpected text after ']'")),
            },
        }
    } else {
        match addr.matches(':').count() {
            0 => (addr, None),
            1 => match addr.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (addr, None),
            },
            // Unbracketed IPv6 literal, no port
            _ => (addr, None),
        }
    };

    if host.is_empty() {
        return Err(NetError::address_invalid(addr, "missing host"));
    }

    // An empty port means no port
    let port = port
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<u16>()
                .map_err(|e| NetError::address_invalid(addr, format!("invalid port {:?}: {}", p, e)))
        })
        .transpose()?;

    Ok((host, port))
}

fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{Addrs, Resolving, ResolvingSrv};
    use std::collections::HashMap;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[derive(Default)]
    struct MockResolver {
        hosts: HashMap<&'static str, Vec<IpAddr>>,
        srv: HashMap<&'static str, Vec<SrvTarget>>,
    }

    impl Resolve for MockResolver {
        fn resolve(&self, name: Name) -> Resolving {
            let result = self
                .hosts
                .get(name.as_str())
                .cloned()
                .map(|ips| Box::new(ips.into_iter()) as Addrs)
                .ok_or_else(|| NetError::name_not_resolved(name.as_str(), "NXDOMAIN"));
            Box::pin(std::future::ready(result))
        }

        fn resolve_srv(&self, name: Name) -> ResolvingSrv {
            let result = self
                .srv
                .get(name.as_str())
                .cloned()
                .ok_or_else(|| NetError::name_not_resolved(name.as_str(), "NXDOMAIN"));
            Box::pin(std::future::ready(result))
        }
    }

    /// Never answers.
    struct StalledResolver;

    impl Resolve for StalledResolver {
        fn resolve(&self, _name: Name) -> Resolving {
            Box::pin(std::future::pending::<Result<Addrs, NetError>>())
        }
    }

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    fn sd(mock: MockResolver) -> DnsSdResolver {
        DnsSdResolver::new(Arc::new(mock))
    }

    async fn run(resolver: &DnsSdResolver, name: &str, qtype: QueryType) -> Result<Vec<String>, NetError> {
        resolver
            .resolve(CancellationToken::new(), Name::new(name), qtype)
            .await
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port("example.com:9090").unwrap(), ("example.com", Some(9090)));
        assert_eq!(split_host_port("example.com").unwrap(), ("example.com", None));
        assert_eq!(split_host_port("[::1]:80").unwrap(), ("::1", Some(80)));
        assert_eq!(split_host_port("[::1]").unwrap(), ("::1", None));
        assert_eq!(split_host_port("fe80::1").unwrap(), ("fe80::1", None));
        assert_eq!(split_host_port("example.com:").unwrap(), ("example.com", None));
        assert_eq!(split_host_port("[::1]:").unwrap(), ("::1", None));
    }

    #[test]
    fn test_split_host_port_invalid() {
        assert!(matches!(
            split_host_port("example.com:http"),
            Err(NetError::AddressInvalid { .. })
        ));
        assert!(matches!(
            split_host_port("example.com:70000"),
            Err(NetError::AddressInvalid { .. })
        ));
        assert!(matches!(split_host_port("[::1"), Err(NetError::AddressInvalid { .. })));
        assert!(matches!(split_host_port(":80"), Err(NetError::AddressInvalid { .. })));
    }

    #[test]
    fn test_join_host_port() {
        assert_eq!(join_host_port("10.0.0.1", 80), "10.0.0.1:80");
        assert_eq!(join_host_port("::1", 80), "[::1]:80");
        assert_eq!(join_host_port("node.example.com", 7000), "node.example.com:7000");
    }

    #[tokio::test]
    async fn test_dns_with_explicit_port() {
        let mut mock = MockResolver::default();
        mock.hosts.insert("example.com", vec![v4(10, 0, 0, 1), v4(10, 0, 0, 2)]);

        let targets = run(&sd(mock), "example.com:9090", QueryType::Dns).await.unwrap();
        assert_eq!(targets, vec!["10.0.0.1:9090", "10.0.0.2:9090"]);
    }

    #[tokio::test]
    async fn test_dns_uses_default_port() {
        let mut mock = MockResolver::default();
        mock.hosts.insert("example.com", vec![v4(10, 0, 0, 1)]);
        let resolver = sd(mock).with_default_port(8080);

        let targets = run(&resolver, "example.com", QueryType::Dns).await.unwrap();
        assert_eq!(targets, vec!["10.0.0.1:8080"]);

        // Explicit port wins over the default
        let targets = run(&resolver, "example.com:9090", QueryType::Dns).await.unwrap();
        assert_eq!(targets, vec!["10.0.0.1:9090"]);

        // Empty port falls back to the default
        let targets = run(&resolver, "example.com:", QueryType::Dns).await.unwrap();
        assert_eq!(targets, vec!["10.0.0.1:8080"]);
    }

    #[tokio::test]
    async fn test_dns_missing_port() {
        let mut mock = MockResolver::default();
        mock.hosts.insert("example.com", vec![v4(10, 0, 0, 1)]);

        let err = run(&sd(mock), "example.com", QueryType::Dns).await.unwrap_err();
        assert_eq!(
            err,
            NetError::MissingPort {
                name: "example.com".into()
            }
        );
    }

    #[tokio::test]
    async fn test_dns_ipv6_and_scheme() {
        let mut mock = MockResolver::default();
        mock.hosts.insert("example.com", vec![IpAddr::V6(Ipv6Addr::LOCALHOST)]);

        let targets = run(&sd(mock), "https://example.com:443", QueryType::Dns)
            .await
            .unwrap();
        assert_eq!(targets, vec!["https://[::1]:443"]);
    }

    #[tokio::test]
    async fn test_dns_ip_literal_skips_lookup() {
        // Empty mock: any lookup would fail
        let resolver = sd(MockResolver::default());

        let targets = run(&resolver, "[2001:db8::1]:9090", QueryType::Dns).await.unwrap();
        assert_eq!(targets, vec!["[2001:db8::1]:9090"]);
    }

    #[tokio::test]
    async fn test_dns_lookup_failure() {
        let err = run(&sd(MockResolver::default()), "bad.example.com:9090", QueryType::Dns)
            .await
            .unwrap_err();
        assert!(matches!(err, NetError::NameNotResolved { .. }));
    }

    #[tokio::test]
    async fn test_srv_resolves_targets() {
        let mut mock = MockResolver::default();
        mock.srv.insert(
            "_svc._tcp.example.com",
            vec![SrvTarget::new("a.example.com.", 7000), SrvTarget::new("b.example.com.", 7001)],
        );
        mock.hosts.insert("a.example.com", vec![v4(10, 0, 0, 5)]);
        mock.hosts.insert("b.example.com", vec![v4(10, 0, 0, 6), v4(10, 0, 0, 7)]);

        // Default port is ignored for SRV
        let resolver = sd(mock).with_default_port(1);
        let targets = run(&resolver, "_svc._tcp.example.com", QueryType::Srv).await.unwrap();
        assert_eq!(targets, vec!["10.0.0.5:7000", "10.0.0.6:7001", "10.0.0.7:7001"]);
    }

    #[tokio::test]
    async fn test_srv_target_failure_fails_name() {
        let mut mock = MockResolver::default();
        mock.srv.insert(
            "_svc._tcp.example.com",
            vec![SrvTarget::new("a.example.com", 7000), SrvTarget::new("gone.example.com", 7000)],
        );
        mock.hosts.insert("a.example.com", vec![v4(10, 0, 0, 5)]);

        let err = run(&sd(mock), "_svc._tcp.example.com", QueryType::Srv)
            .await
            .unwrap_err();
        assert!(matches!(err, NetError::NameNotResolved { name, .. } if name == "gone.example.com"));
    }

    #[tokio::test]
    async fn test_srv_no_a() {
        let mut mock = MockResolver::default();
        mock.srv.insert(
            "_svc._tcp.example.com",
            vec![SrvTarget::new("a.example.com.", 7000)],
        );

        let targets = run(&sd(mock), "_svc._tcp.example.com", QueryType::SrvNoA)
            .await
            .unwrap();
        assert_eq!(targets, vec!["a.example.com:7000"]);
    }

    #[tokio::test]
    async fn test_srv_query_drops_port() {
        let mut mock = MockResolver::default();
        mock.srv.insert(
            "_svc._tcp.example.com",
            vec![SrvTarget::new("a.example.com.", 7000)],
        );
        mock.hosts.insert("a.example.com", vec![v4(10, 0, 0, 5)]);
        let resolver = sd(mock);

        let targets = run(&resolver, "_svc._tcp.example.com:9090", QueryType::Srv)
            .await
            .unwrap();
        assert_eq!(targets, vec!["10.0.0.5:7000"]);

        let targets = run(&resolver, "_svc._tcp.example.com:9090", QueryType::SrvNoA)
            .await
            .unwrap();
        assert_eq!(targets, vec!["a.example.com:7000"]);
    }

    #[tokio::test]
    async fn test_srv_empty_answer_is_empty_set() {
        let mut mock = MockResolver::default();
        mock.srv.insert("_svc._tcp.example.com", vec![]);

        let targets = run(&sd(mock), "_svc._tcp.example.com", QueryType::Srv).await.unwrap();
        assert!(targets.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_lookup() {
        let resolver = DnsSdResolver::new(Arc::new(StalledResolver));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = resolver
            .resolve(cancel, Name::new("example.com:80"), QueryType::Dns)
            .await
            .unwrap_err();
        assert_eq!(err, NetError::Aborted);
    }

    #[tokio::test]
    async fn test_cancelled_mid_lookup() {
        let resolver = DnsSdResolver::new(Arc::new(StalledResolver));
        let cancel = CancellationToken::new();

        let pending = resolver.resolve(cancel.clone(), Name::new("example.com:80"), QueryType::Dns);
        let handle = tokio::spawn(pending);
        tokio::task::yield_now().await;
        cancel.cancel();

        assert_eq!(handle.await.unwrap().unwrap_err(), NetError::Aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let resolver =
            DnsSdResolver::new(Arc::new(StalledResolver)).with_timeout(Duration::from_secs(5));

        let err = run(&resolver, "example.com:80", QueryType::Dns).await.unwrap_err();
        assert_eq!(err, NetError::TimedOut);
    }
}
