use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetError {
    // Resolution Errors
    #[error("Name not resolved: {name}: {reason}")]
    NameNotResolved { name: String, reason: String },
    #[error("Invalid query type: {0}")]
    InvalidQueryType(String),
    #[error("Missing port in address given for dns lookup: {name}")]
    MissingPort { name: String },
    #[error("Address invalid: {addr}: {reason}")]
    AddressInvalid { addr: String, reason: String },
    #[error("SRV lookups not supported by this resolver")]
    SrvNotSupported,

    // Control Errors
    #[error("Operation aborted")]
    Aborted,
    #[error("Operation timed out")]
    TimedOut,
}

impl NetError {
    /// Build a `NameNotResolved` from anything printable.
    pub fn name_not_resolved(name: impl Into<String>, reason: impl fmt::Display) -> Self {
        NetError::NameNotResolved {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Build an `AddressInvalid` from anything printable.
    pub fn address_invalid(addr: impl Into<String>, reason: impl fmt::Display) -> Self {
        NetError::AddressInvalid {
            addr: addr.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error was caused by the caller cancelling the lookup.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, NetError::Aborted)
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::Aborted => -3,
            NetError::TimedOut => -7,
            NetError::NameNotResolved { .. } => -105,
            NetError::AddressInvalid { .. } => -108,
            NetError::MissingPort { .. } => -108,
            // Discovery errors (custom codes starting at -1000)
            NetError::InvalidQueryType(_) => -1000,
            NetError::SrvNotSupported => -1001,
        }
    }
}

/// One AddressSpec whose lookup failed during a refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    pub addr: String,
    pub error: NetError,
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.addr, self.error)
    }
}

/// Per-entry failures collected over one `Provider::resolve` call.
///
/// Returned after the cache has been fully updated and pruned; entries listed
/// here kept whatever targets they had before the call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{} of {attempted} dns lookups failed", .failures.len())]
pub struct LookupFailures {
    pub attempted: usize,
    pub failures: Vec<LookupFailure>,
}

impl LookupFailures {
    /// Addresses that failed, in input order.
    pub fn addrs(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.addr.as_str())
    }

    /// True when every failure was a cancellation.
    pub fn all_cancelled(&self) -> bool {
        !self.failures.is_empty() && self.failures.iter().all(|f| f.error.is_cancellation())
    }
}
