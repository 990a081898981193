use log::warn;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tctcore::sink::ResultSink;

/// Persists result artifacts as JSON documents, one file per artifact under
/// `<root>/<key>/<name>.json`.
///
/// Write failures are reported and swallowed; the in-memory analysis state
/// never rolls back over a persistence problem.
pub struct JsonSink {
    root: PathBuf,
}

impl JsonSink {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn write(&self, key: &str, name: &str, document: serde_json::Value) {
        let dir = self.root.join(key);
        let path = dir.join(format!("{}.json", name));
        let payload = match serde_json::to_string_pretty(&document) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("failed to encode {}: {}", path.display(), err);
                return;
            }
        };
        if let Err(err) = fs::create_dir_all(&dir).and_then(|_| fs::write(&path, payload)) {
            warn!("failed to persist {}: {}", path.display(), err);
        }
    }
}

impl ResultSink for JsonSink {
    fn write_series(&mut self, key: &str, name: &str, points: &[(f64, f64)]) {
        self.write(key, name, json!({ "name": name, "points": points }));
    }

    fn write_map(&mut self, key: &str, name: &str, points: &[(f64, f64, f64)]) {
        self.write(key, name, json!({ "name": name, "points": points }));
    }

    fn write_table(&mut self, key: &str, name: &str, rows: &[(String, f64)]) {
        self.write(key, name, json!({ "name": name, "rows": rows }));
    }
}
