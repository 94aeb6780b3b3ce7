use std::io;

use ratsorat_util::errors::ResolveError;

#[test]
fn test_cycle_error_display() {
    let err = ResolveError::Cycle {
        path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
    };
    assert_eq!(err.to_string(), "dependency cycle: a -> b -> a");
}

#[test]
fn test_self_cycle_error_display() {
    let err = ResolveError::Cycle {
        path: vec!["a".to_string(), "a".to_string()],
    };
    assert_eq!(err.to_string(), "dependency cycle: a -> a");
}

#[test]
fn test_cycle_path_accessor() {
    let err = ResolveError::Cycle {
        path: vec!["x".to_string(), "x".to_string()],
    };
    assert!(err.is_cycle());
    assert_eq!(err.cycle_path(), Some(&["x".to_string(), "x".to_string()][..]));
}

#[test]
fn test_message_error_display() {
    let err = ResolveError::msg("invalid call");
    assert_eq!(err.to_string(), "invalid call");
    assert!(!err.is_cycle());
    assert!(err.cycle_path().is_none());
}

#[test]
fn test_failed_error_is_transparent() {
    let err = ResolveError::other(io::Error::new(io::ErrorKind::NotFound, "seed missing"));
    assert_eq!(err.to_string(), "seed missing");
}

#[test]
fn test_failed_error_survives_clone() {
    let err = ResolveError::other(io::Error::new(io::ErrorKind::Other, "boom"));
    let copy = err.clone();
    assert_eq!(err.to_string(), copy.to_string());
    assert!(matches!(copy, ResolveError::Failed(_)));
}

#[test]
fn test_pass_limit_error_display() {
    let err = ResolveError::PassLimit { limit: 3 };
    assert_eq!(
        err.to_string(),
        "module table did not reach a fixed point after 3 passes"
    );
}

#[test]
fn test_config_error_display() {
    let err = ResolveError::Config {
        message: "bad key".to_string(),
    };
    assert_eq!(err.to_string(), "Configuration error: bad key");
}
