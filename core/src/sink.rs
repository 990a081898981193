use std::collections::HashMap;

/// Destination for derived artifacts, addressed by a hierarchical key
/// (`sample/temperature/voltage` or a module name).
///
/// Persistence failures are the sink's problem: implementations report them
/// (log) and never roll back in-memory analysis state, so the methods do not
/// return errors.
pub trait ResultSink {
    fn write_series(&mut self, key: &str, name: &str, points: &[(f64, f64)]);
    fn write_map(&mut self, key: &str, name: &str, points: &[(f64, f64, f64)]);
    fn write_table(&mut self, key: &str, name: &str, rows: &[(String, f64)]);
}

/// In-memory sink for tests and interactive inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    series: HashMap<String, Vec<(f64, f64)>>,
    maps: HashMap<String, Vec<(f64, f64, f64)>>,
    tables: HashMap<String, Vec<(String, f64)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(key: &str, name: &str) -> String {
        format!("{}/{}", key, name)
    }

    pub fn series(&self, key: &str, name: &str) -> Option<&[(f64, f64)]> {
        self.series.get(&Self::slot(key, name)).map(|v| v.as_slice())
    }

    pub fn map(&self, key: &str, name: &str) -> Option<&[(f64, f64, f64)]> {
        self.maps.get(&Self::slot(key, name)).map(|v| v.as_slice())
    }

    pub fn table(&self, key: &str, name: &str) -> Option<&[(String, f64)]> {
        self.tables.get(&Self::slot(key, name)).map(|v| v.as_slice())
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.maps.is_empty() && self.tables.is_empty()
    }
}

impl ResultSink for MemorySink {
    fn write_series(&mut self, key: &str, name: &str, points: &[(f64, f64)]) {
        self.series.insert(Self::slot(key, name), points.to_vec());
    }

    fn write_map(&mut self, key: &str, name: &str, points: &[(f64, f64, f64)]) {
        self.maps.insert(Self::slot(key, name), points.to_vec());
    }

    fn write_table(&mut self, key: &str, name: &str, rows: &[(String, f64)]) {
        self.tables.insert(Self::slot(key, name), rows.to_vec());
    }
}
