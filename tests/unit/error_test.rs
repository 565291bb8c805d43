//! Tests for error types

use nuber_dispatch::core::{DispatchError, Interrupted};

#[test]
fn test_unknown_region_error() {
    let err = DispatchError::UnknownRegion("Nowhere".to_string());
    assert_eq!(format!("{}", err), "unknown region: Nowhere");
}

#[test]
fn test_driver_pool_full_error() {
    let err = DispatchError::DriverPoolFull("D1000".to_string());
    assert_eq!(format!("{}", err), "driver pool is full, cannot accept D1000");
}

#[test]
fn test_invalid_config_error() {
    let err = DispatchError::InvalidConfig("no regions".to_string());
    assert_eq!(format!("{}", err), "invalid configuration: no regions");
}

#[test]
fn test_timeout_error() {
    let err = DispatchError::Timeout;
    assert_eq!(format!("{}", err), "timed out waiting for booking result");
}

#[test]
fn test_interrupted_error() {
    assert_eq!(format!("{}", Interrupted), "wait interrupted");
}

#[test]
fn test_dispatch_error_into_anyhow() {
    let app: nuber_dispatch::AppResult<()> = Err(DispatchError::Abandoned.into());
    let err = app.unwrap_err();
    assert!(err.downcast_ref::<DispatchError>().is_some());
}
