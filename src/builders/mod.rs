pub mod dispatcher_builder;

pub use dispatcher_builder::{build_dispatcher, DispatcherBuilder};
