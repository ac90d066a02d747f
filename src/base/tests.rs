use crate::base::neterror::{LookupFailure, LookupFailures, NetError};

#[test]
fn test_net_error_codes() {
    // Standard Chromium codes
    assert_eq!(NetError::Aborted.as_i32(), -3);
    assert_eq!(NetError::TimedOut.as_i32(), -7);
    assert_eq!(NetError::name_not_resolved("a.example", "nxdomain").as_i32(), -105);

    // Custom codes
    assert_eq!(NetError::InvalidQueryType("mx".into()).as_i32(), -1000);
    assert_eq!(NetError::SrvNotSupported.as_i32(), -1001);
}

#[test]
fn test_error_messages() {
    let err = NetError::MissingPort {
        name: "example.com".into(),
    };
    assert_eq!(
        err.to_string(),
        "Missing port in address given for dns lookup: example.com"
    );

    let err = NetError::InvalidQueryType("mx".into());
    assert_eq!(err.to_string(), "Invalid query type: mx");
}

#[test]
fn test_lookup_failures_summary() {
    let failures = LookupFailures {
        attempted: 3,
        failures: vec![
            LookupFailure {
                addr: "dns+a.example:80".into(),
                error: NetError::Aborted,
            },
            LookupFailure {
                addr: "dns+b.example:80".into(),
                error: NetError::Aborted,
            },
        ],
    };

    assert_eq!(failures.to_string(), "2 of 3 dns lookups failed");
    assert!(failures.all_cancelled());
    assert_eq!(
        failures.addrs().collect::<Vec<_>>(),
        vec!["dns+a.example:80", "dns+b.example:80"]
    );
}

#[test]
fn test_all_cancelled_mixed() {
    let failures = LookupFailures {
        attempted: 2,
        failures: vec![
            LookupFailure {
                addr: "dns+a.example:80".into(),
                error: NetError::Aborted,
            },
            LookupFailure {
                addr: "dns+b.example:80".into(),
                error: NetError::TimedOut,
            },
        ],
    };
    assert!(!failures.all_cancelled());
}
