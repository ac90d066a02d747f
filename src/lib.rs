//! # dnsdisco
//!
//! DNS-backed address resolution cache for service discovery.
//!
//! Callers hand a [`Provider`](dns::Provider) the full list of address
//! specifications on every refresh. Literal addresses are kept as-is, tagged
//! ones are resolved through DNS, and anything no longer listed is dropped.
//! A failed lookup never disturbs other entries and leaves its own entry
//! serving the last good result.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dnsdisco::dns::Provider;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = Provider::default();
//!     let cancel = CancellationToken::new();
//!     if let Err(failures) = provider
//!         .resolve(&cancel, &["127.0.0.1:9090", "dnssrv+_prometheus._tcp.example.com"])
//!         .await
//!     {
//!         eprintln!("degraded refresh: {}", failures);
//!     }
//!     println!("targets: {:?}", provider.addresses().await);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions and context helpers
//! - [`dns`] - Resolvers, query types, configuration and the provider

pub mod base;
pub mod dns;
