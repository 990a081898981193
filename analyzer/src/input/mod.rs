pub mod osc_text;

pub use osc_text::OscTextReader;
