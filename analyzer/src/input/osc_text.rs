use std::fs;
use std::path::Path;
use tctcore::prelude::{CoreResult, PipelineError};
use tctcore::waveform::{Polarity, Trace, WaveformSample};
use tctcore::WaveformReader;

/// Reads plain-text oscilloscope exports: one `time voltage` pair per line
/// (ns, mV), `#`-prefixed lines ignored.
pub struct OscTextReader {
    pub polarity: Polarity,
    pub bias_volt: f64,
    pub temperature_k: f64,
}

impl Default for OscTextReader {
    fn default() -> Self {
        Self {
            polarity: Polarity::Positive,
            bias_volt: 0.0,
            temperature_k: 293.0,
        }
    }
}

impl WaveformReader for OscTextReader {
    fn read(&self, path: &Path, index: u32) -> CoreResult<WaveformSample> {
        let contents = fs::read_to_string(path)
            .map_err(|e| PipelineError::FileOpen(format!("{}: {}", path.display(), e)))?;

        let mut time = Vec::new();
        let mut volt = Vec::new();
        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (t, v) = match (parts.next(), parts.next()) {
                (Some(t), Some(v)) => (t, v),
                _ => {
                    return Err(PipelineError::MalformedWaveform(format!(
                        "{}:{}: expected 'time voltage'",
                        path.display(),
                        lineno + 1
                    )))
                }
            };
            time.push(parse_number(t, path, lineno)?);
            volt.push(parse_number(v, path, lineno)?);
        }
        if time.is_empty() {
            return Err(PipelineError::MalformedWaveform(format!(
                "{}: no data lines",
                path.display()
            )));
        }

        Ok(WaveformSample::new(
            index,
            Trace::new(time, volt)?,
            self.bias_volt,
            self.temperature_k,
            self.polarity,
        ))
    }
}

fn parse_number(token: &str, path: &Path, lineno: usize) -> CoreResult<f64> {
    token.parse::<f64>().map_err(|e| {
        PipelineError::MalformedWaveform(format!("{}:{}: {}", path.display(), lineno + 1, e))
    })
}
