//! Unit-level tests for configuration, errors, events, and builders.

mod unit;
