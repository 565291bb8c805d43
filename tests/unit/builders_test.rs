//! Tests for builder modules

use std::sync::Arc;
use std::time::Duration;

use nuber_dispatch::builders::{build_dispatcher, DispatcherBuilder};
use nuber_dispatch::config::DispatchConfig;
use nuber_dispatch::core::{DispatchError, InMemoryEventSink};
use nuber_dispatch::model::Driver;

#[test]
fn test_builder_regions() {
    let builder = DispatcherBuilder::new().region("South", 1).region("North", 2);
    assert_eq!(builder.region_names(), vec!["North", "South"]);

    let dispatcher = builder.build().unwrap();
    assert_eq!(dispatcher.region("North").unwrap().max_simultaneous_jobs(), 2);
    assert_eq!(dispatcher.region("South").unwrap().max_simultaneous_jobs(), 1);
}

#[test]
fn test_builder_rejects_zero_limit() {
    let err = DispatcherBuilder::new().region("Broken", 0).build().err().unwrap();
    assert!(matches!(err, DispatchError::InvalidConfig(_)));
}

#[test]
fn test_builder_driver_capacity() {
    let dispatcher = DispatcherBuilder::new()
        .region("R", 1)
        .max_drivers(1)
        .build()
        .unwrap();
    dispatcher.add_driver(Driver::new("D1", Duration::ZERO)).unwrap();
    let err = dispatcher.add_driver(Driver::new("D2", Duration::ZERO)).unwrap_err();
    assert!(matches!(err, DispatchError::DriverPoolFull(ref name) if name == "D2"));
}

#[test]
fn test_builder_event_sink() {
    let sink = Arc::new(InMemoryEventSink::new(4));
    let dispatcher = DispatcherBuilder::new()
        .region("R", 1)
        .log_events(true)
        .event_sink(sink.clone())
        .build()
        .unwrap();
    dispatcher.log_event(&"1:null:P", "hello");
    assert_eq!(sink.lines(), vec!["1:null:P: hello".to_string()]);
}

#[test]
fn test_build_dispatcher_from_config() {
    let cfg = DispatchConfig::new()
        .with_region("CityA", 1)
        .with_region("CityB", 2)
        .with_max_drivers(5);
    let dispatcher = build_dispatcher(&cfg).unwrap();
    assert_eq!(dispatcher.region_names(), vec!["CityA", "CityB"]);
    dispatcher.shutdown();
    assert!(dispatcher.await_termination(Duration::from_secs(5)));
}

#[test]
fn test_build_dispatcher_invalid_config() {
    let err = build_dispatcher(&DispatchConfig::new()).err().unwrap();
    assert!(matches!(err, DispatchError::InvalidConfig(ref msg) if msg.starts_with("config invalid")));
}
