use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tctcore::scan::{AxisGeometry, GridIndex, ScanGrid};
use tctcore::waveform::Trace;

/// Configuration for generating a synthetic acquisition batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub acquisitions: usize,
    /// How many of the acquisitions get a noisy baseline.
    pub noisy_acquisitions: usize,
    pub points: usize,
    pub dt_ns: f64,
    pub delay_ns: f64,
    pub rise_ns: f64,
    pub plateau_ns: f64,
    pub amplitude_mv: f64,
    /// Uniform baseline-noise amplitude for the noisy acquisitions, mV.
    pub noise_mv: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            acquisitions: 10,
            noisy_acquisitions: 3,
            points: 500,
            dt_ns: 0.2,
            delay_ns: 40.0,
            rise_ns: 2.0,
            plateau_ns: 15.0,
            amplitude_mv: 60.0,
            noise_mv: 12.0,
            seed: 0,
        }
    }
}

fn build_trace(config: &GeneratorConfig, rng: &mut StdRng, noisy: bool) -> Trace {
    let mut time = Vec::with_capacity(config.points);
    let mut volt = Vec::with_capacity(config.points);
    let fall_start = config.delay_ns + config.rise_ns + config.plateau_ns;
    for i in 0..config.points {
        let t = i as f64 * config.dt_ns;
        let mut v = if t < config.delay_ns {
            0.0
        } else if t < config.delay_ns + config.rise_ns {
            (t - config.delay_ns) / config.rise_ns * config.amplitude_mv
        } else if t < fall_start {
            config.amplitude_mv
        } else {
            (config.amplitude_mv - (t - fall_start) * 4.0).max(0.0)
        };
        if noisy && config.noise_mv > 0.0 {
            v += rng.gen_range(-config.noise_mv..config.noise_mv);
        }
        time.push(t);
        volt.push(v);
    }
    Trace { time, volt }
}

/// Writes one synthetic batch as `acq_NN.txt` files; the noisy acquisitions
/// come last. Returns the file count.
pub fn write_batch(dir: &Path, config: &GeneratorConfig) -> anyhow::Result<usize> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let quiet = config.acquisitions.saturating_sub(config.noisy_acquisitions);
    for i in 0..config.acquisitions {
        let trace = build_trace(config, &mut rng, i >= quiet);
        let path = dir.join(format!("acq_{:03}.txt", i));
        let mut file = fs::File::create(&path)
            .with_context(|| format!("creating synthetic acquisition {}", path.display()))?;
        writeln!(file, "# synthetic acquisition {}", i)?;
        for (t, v) in trace.time.iter().zip(&trace.volt) {
            writeln!(file, "{:.4} {:.4}", t, v)?;
        }
    }
    Ok(config.acquisitions)
}

/// Configuration for a synthetic scan grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanGeneratorConfig {
    pub scan_points: usize,
    pub secondary_points: usize,
    pub optical_points: usize,
    pub step_um: f64,
    pub trace_points: usize,
    pub peak_mv: f64,
}

impl Default for ScanGeneratorConfig {
    fn default() -> Self {
        Self {
            scan_points: 12,
            secondary_points: 8,
            optical_points: 7,
            step_um: 20.0,
            trace_points: 50,
            peak_mv: 40.0,
        }
    }
}

/// Two-channel grid with a Gaussian charge blob in the scan plane; channel 2
/// collects 80% of channel 1.
pub fn build_scan_grid(config: &ScanGeneratorConfig) -> ScanGrid {
    let geometry = [
        AxisGeometry {
            points: config.scan_points,
            step: config.step_um,
            origin: 0.0,
        },
        AxisGeometry {
            points: config.secondary_points,
            step: config.step_um,
            origin: 0.0,
        },
        AxisGeometry {
            points: config.optical_points,
            step: 50.0,
            origin: 0.0,
        },
    ];
    let mut grid = ScanGrid::new(geometry, vec![100.0], vec![0.0], 2);

    let cx = (config.scan_points as f64 - 1.0) / 2.0;
    let cy = (config.secondary_points as f64 - 1.0) / 2.0;
    let sigma = config.scan_points as f64 / 4.0;
    for channel in 0..2 {
        let scale = if channel == 0 { 1.0 } else { 0.8 };
        for i in 0..config.scan_points {
            for j in 0..config.secondary_points {
                for k in 0..config.optical_points {
                    let r2 = (i as f64 - cx).powi(2) + (j as f64 - cy).powi(2);
                    let level = config.peak_mv * scale * (-r2 / (2.0 * sigma * sigma)).exp();
                    let time: Vec<f64> = (0..config.trace_points).map(|p| p as f64).collect();
                    let volt = vec![level; config.trace_points];
                    grid.set_waveform(
                        channel,
                        GridIndex {
                            spatial: [i, j, k],
                            u1: 0,
                            u2: 0,
                        },
                        Trace { time, volt },
                    );
                }
            }
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use tctcore::scan::{Axis, ScanSource};
    use tempfile::TempDir;

    #[test]
    fn batch_writes_requested_file_count() {
        let dir = TempDir::new().unwrap();
        let config = GeneratorConfig {
            acquisitions: 5,
            noisy_acquisitions: 2,
            ..Default::default()
        };
        assert_eq!(write_batch(dir.path(), &config).unwrap(), 5);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 5);
    }

    #[test]
    fn quiet_trace_has_flat_baseline() {
        let config = GeneratorConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let trace = build_trace(&config, &mut rng, false);
        assert!(trace.volt[..100].iter().all(|v| *v == 0.0));
        let peak = trace.volt.iter().cloned().fold(0.0, f64::max);
        assert_eq!(peak, config.amplitude_mv);
    }

    #[test]
    fn scan_grid_matches_configured_geometry() {
        let config = ScanGeneratorConfig::default();
        let grid = build_scan_grid(&config);
        assert_eq!(grid.axis_geometry(Axis::X).points, config.scan_points);
        assert_eq!(grid.axis_geometry(Axis::Z).points, config.optical_points);
        assert_eq!(grid.channel_count(), 2);
        let index = GridIndex {
            spatial: [0, 0, 0],
            u1: 0,
            u2: 0,
        };
        assert!(grid.waveform(0, index).is_some());
    }
}
