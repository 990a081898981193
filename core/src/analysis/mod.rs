pub mod analyzer;
pub mod averager;
pub mod selection;
pub mod smearing;

pub use analyzer::SignalAnalyzer;
pub use averager::ProfileFiller;
pub use selection::SelectionFilter;
pub use smearing::Smearer;
