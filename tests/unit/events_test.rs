//! Tests for event sinks and event line rendering

use nuber_dispatch::core::{render_event, EventSink, InMemoryEventSink};

#[test]
fn test_render_event_format() {
    assert_eq!(render_event(&"7:null:Ann", "starts, asks for driver"), "7:null:Ann: starts, asks for driver");
}

#[test]
fn test_in_memory_sink_keeps_order() {
    let sink = InMemoryEventSink::new(4);
    sink.record("a");
    sink.record("b");
    assert_eq!(sink.lines(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(sink.len(), 2);
}

#[test]
fn test_in_memory_sink_drops_oldest() {
    let sink = InMemoryEventSink::new(2);
    sink.record("a");
    sink.record("b");
    sink.record("c");
    assert_eq!(sink.lines(), vec!["b".to_string(), "c".to_string()]);
}

#[test]
fn test_in_memory_sink_zero_capacity() {
    let sink = InMemoryEventSink::new(0);
    sink.record("ignored");
    assert!(sink.is_empty());
}
