//! Tests for configuration validation

use nuber_dispatch::config::{DispatchConfig, RegionConfig};

#[test]
fn test_region_config_validation() {
    assert!(RegionConfig::new(2).validate().is_ok());
    assert!(RegionConfig::new(0).validate().is_err());
}

#[test]
fn test_dispatch_config_requires_region() {
    let cfg = DispatchConfig::new();
    assert!(cfg.validate().is_err());
}

#[test]
fn test_dispatch_config_rejects_zero_limit() {
    let cfg = DispatchConfig::new().with_region("CityA", 0);
    let err = cfg.validate().unwrap_err();
    assert!(err.contains("CityA"));
}

#[test]
fn test_dispatch_config_rejects_zero_drivers() {
    let cfg = DispatchConfig::new().with_region("CityA", 1).with_max_drivers(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_dispatch_config_from_json() {
    let json = r#"{
        "regions": {
            "CityA": { "max_simultaneous_jobs": 1 },
            "CityB": { "max_simultaneous_jobs": 2 }
        },
        "log_events": true,
        "max_drivers": 10
    }"#;
    let cfg = DispatchConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.regions.len(), 2);
    assert_eq!(cfg.regions["CityB"].max_simultaneous_jobs, 2);
    assert!(cfg.log_events);
    assert_eq!(cfg.max_drivers, 10);
}

#[test]
fn test_dispatch_config_from_json_invalid() {
    assert!(DispatchConfig::from_json_str("{ not json").is_err());
    assert!(DispatchConfig::from_json_str(r#"{ "regions": {} }"#).is_err());
}

#[test]
fn test_dispatch_config_from_json_file() {
    let path = std::env::temp_dir().join(format!("nuber-dispatch-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "regions": { "North": { "max_simultaneous_jobs": 3 } } }"#).unwrap();

    let cfg = DispatchConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.regions["North"].max_simultaneous_jobs, 3);

    std::fs::remove_file(&path).unwrap();
    assert!(DispatchConfig::from_json_file(&path).is_err());
}

#[test]
fn test_dispatch_config_serializes() {
    let cfg = DispatchConfig::new().with_region("CityA", 1).with_log_events(true);
    let json = serde_json::to_string(&cfg).unwrap();
    let back = DispatchConfig::from_json_str(&json).unwrap();
    assert_eq!(back, cfg);
}
