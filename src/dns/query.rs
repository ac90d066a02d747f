//! Address specifications and query types.
//!
//! An address specification is `[qtype+]name`. Without a `qtype+` prefix the
//! string is a literal target; otherwise the prefix picks the lookup.

use crate::base::neterror::NetError;
use std::{fmt, str::FromStr};

/// DNS query performed for a tagged address specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    /// `dns+`: A/AAAA lookup, port taken from the name or the default port.
    Dns,
    /// `dnssrv+` or `srv+`: SRV lookup followed by A/AAAA lookup of each target.
    Srv,
    /// `dnssrvnoa+`: SRV lookup, targets emitted as host names.
    SrvNoA,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Dns => "dns",
            QueryType::Srv => "dnssrv",
            QueryType::SrvNoA => "dnssrvnoa",
        }
    }
}

impl FromStr for QueryType {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dns" => Ok(QueryType::Dns),
            "dnssrv" | "srv" => Ok(QueryType::Srv),
            "dnssrvnoa" => Ok(QueryType::SrvNoA),
            other => Err(NetError::InvalidQueryType(other.to_string())),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed address specification borrowing from its source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSpec<'a> {
    /// Used as-is.
    Literal(&'a str),
    /// To be resolved. `qtype` is not validated yet.
    Lookup { qtype: &'a str, name: &'a str },
}

impl<'a> AddressSpec<'a> {
    /// Splits on the first `+` only; the name may contain further `+`.
    pub fn parse(addr: &'a str) -> Self {
        match addr.split_once('+') {
            Some((qtype, name)) => AddressSpec::Lookup { qtype, name },
            None => AddressSpec::Literal(addr),
        }
    }
}
