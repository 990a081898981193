//! Accumulation primitives backing the averaged acquisition statistics.

use ndarray::Array2;

/// Fixed-range 1-D count histogram.
#[derive(Debug, Clone)]
pub struct Hist1D {
    lo: f64,
    hi: f64,
    counts: Vec<u64>,
    out_of_range: u64,
}

impl Hist1D {
    pub fn new(bins: usize, lo: f64, hi: f64) -> Self {
        Self {
            lo,
            hi,
            counts: vec![0; bins.max(1)],
            out_of_range: 0,
        }
    }

    pub fn fill(&mut self, x: f64) {
        let span = self.hi - self.lo;
        if span <= 0.0 || x < self.lo || x >= self.hi {
            self.out_of_range += 1;
            return;
        }
        let bin = ((x - self.lo) / span * self.counts.len() as f64) as usize;
        let idx = bin.min(self.counts.len() - 1);
        self.counts[idx] += 1;
    }

    pub fn entries(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn out_of_range(&self) -> u64 {
        self.out_of_range
    }

    /// (bin center, count) pairs.
    pub fn to_series(&self) -> Vec<(f64, f64)> {
        let width = (self.hi - self.lo) / self.counts.len() as f64;
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| (self.lo + (i as f64 + 0.5) * width, c as f64))
            .collect()
    }
}

/// Per-bin mean accumulator: each fill contributes (x, v) with weight 1 and
/// the series reports the mean v per x bin.
#[derive(Debug, Clone)]
pub struct Profile1D {
    lo: f64,
    hi: f64,
    sums: Vec<f64>,
    counts: Vec<u64>,
}

impl Profile1D {
    pub fn new(bins: usize, lo: f64, hi: f64) -> Self {
        let bins = bins.max(1);
        Self {
            lo,
            hi,
            sums: vec![0.0; bins],
            counts: vec![0; bins],
        }
    }

    pub fn fill(&mut self, x: f64, v: f64) {
        let span = self.hi - self.lo;
        if span <= 0.0 || x < self.lo || x >= self.hi {
            return;
        }
        let bin = ((x - self.lo) / span * self.sums.len() as f64) as usize;
        let bin = bin.min(self.sums.len() - 1);
        self.sums[bin] += v;
        self.counts[bin] += 1;
    }

    pub fn entries(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// (bin center, mean) pairs for the populated bins.
    pub fn to_series(&self) -> Vec<(f64, f64)> {
        let width = (self.hi - self.lo) / self.sums.len() as f64;
        let mut series = Vec::new();
        for (i, (&sum, &count)) in self.sums.iter().zip(&self.counts).enumerate() {
            if count > 0 {
                series.push((self.lo + (i as f64 + 0.5) * width, sum / count as f64));
            }
        }
        series
    }
}

/// 2-D count accumulation over a fixed (x, y) range.
#[derive(Debug, Clone)]
pub struct Density2D {
    xlo: f64,
    xhi: f64,
    ylo: f64,
    yhi: f64,
    counts: Array2<f64>,
}

impl Density2D {
    pub fn new(xbins: usize, xlo: f64, xhi: f64, ybins: usize, ylo: f64, yhi: f64) -> Self {
        Self {
            xlo,
            xhi,
            ylo,
            yhi,
            counts: Array2::zeros((xbins.max(1), ybins.max(1))),
        }
    }

    pub fn fill(&mut self, x: f64, y: f64, weight: f64) {
        let (nx, ny) = self.counts.dim();
        let xspan = self.xhi - self.xlo;
        let yspan = self.yhi - self.ylo;
        if xspan <= 0.0 || yspan <= 0.0 {
            return;
        }
        if x < self.xlo || x >= self.xhi || y < self.ylo || y >= self.yhi {
            return;
        }
        let i = (((x - self.xlo) / xspan * nx as f64) as usize).min(nx - 1);
        let j = (((y - self.ylo) / yspan * ny as f64) as usize).min(ny - 1);
        self.counts[[i, j]] += weight;
    }

    pub fn total(&self) -> f64 {
        self.counts.sum()
    }

    /// (x center, y center, count) triples for the populated cells.
    pub fn to_map(&self) -> Vec<(f64, f64, f64)> {
        let (nx, ny) = self.counts.dim();
        let xwidth = (self.xhi - self.xlo) / nx as f64;
        let ywidth = (self.yhi - self.ylo) / ny as f64;
        let mut points = Vec::new();
        for ((i, j), &c) in self.counts.indexed_iter() {
            if c > 0.0 {
                points.push((
                    self.xlo + (i as f64 + 0.5) * xwidth,
                    self.ylo + (j as f64 + 0.5) * ywidth,
                    c,
                ));
            }
        }
        points
    }
}
