//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): resolution error codes, Chromium numbering where one exists
//! - [`LookupFailures`](neterror::LookupFailures): per-entry failures of a refresh cycle

pub mod context;
pub mod neterror;

#[cfg(test)]
mod tests;
