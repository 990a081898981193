pub mod json;

pub use json::JsonSink;
