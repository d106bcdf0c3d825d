//! Visibility-amplitude datasets: the four-column ASCII format and a
//! synthetic generator for demos and tests.

use std::error::Error;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::model::visibility_amplitude;

/// Capacity limit applied by default when reading a dataset file.
pub const DEFAULT_MAX_POINTS: usize = 1024;

/// One visibility-amplitude dataset: four parallel columns of equal length,
/// immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisData {
    /// u-coordinate of each baseline, in wavelengths.
    pub u: Vec<f64>,
    /// v-coordinate of each baseline, in wavelengths.
    pub v: Vec<f64>,
    /// Measured visibility amplitude.
    pub amp: Vec<f64>,
    /// One-sigma uncertainty of each amplitude.
    pub sigma: Vec<f64>,
}

impl VisData {
    /// Number of data points.
    pub fn len(&self) -> usize {
        self.u.len()
    }

    /// True when the dataset holds no points.
    pub fn is_empty(&self) -> bool {
        self.u.is_empty()
    }

    /// Reads a dataset from a plain-text file of whitespace-separated numeric
    /// tokens, grouped in fours: u, v, amplitude, sigma. Reading stops at EOF
    /// or at the first token that does not parse as a float; only complete
    /// four-column rows are kept.
    ///
    /// More than `max_points` rows is an error, as is an unreadable file.
    pub fn read_ascii(path: impl AsRef<Path>, max_points: usize) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| format!("cannot read data file {}: {e}", path.display()))?;
        Self::parse(&text, max_points).map_err(|e| format!("{}: {e}", path.display()).into())
    }

    fn parse(text: &str, max_points: usize) -> Result<Self, String> {
        let mut data = VisData::default();
        let mut row = [0.0f64; 4];
        let mut col = 0;
        for token in text.split_whitespace() {
            let Ok(value) = token.parse::<f64>() else {
                break;
            };
            row[col] = value;
            col += 1;
            if col == 4 {
                if data.len() == max_points {
                    return Err(format!("more than {max_points} data points"));
                }
                data.u.push(row[0]);
                data.v.push(row[1]);
                data.amp.push(row[2]);
                data.sigma.push(row[3]);
                col = 0;
            }
        }
        Ok(data)
    }

    /// Writes the dataset in the same four-column format [`read_ascii`]
    /// accepts.
    ///
    /// [`read_ascii`]: VisData::read_ascii
    pub fn write_ascii(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
        let path = path.as_ref();
        let file = fs::File::create(path)
            .map_err(|e| format!("cannot create data file {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);
        for i in 0..self.len() {
            writeln!(
                w,
                "{:e}\t{:e}\t{:e}\t{:e}",
                self.u[i], self.v[i], self.amp[i], self.sigma[i]
            )?;
        }
        w.flush()?;
        Ok(())
    }

    /// Builds a dataset by evaluating the two-component model at the given
    /// (u, v) points and adding zero-centered Gaussian noise of width
    /// `noise`. The sigma column records `noise` for every point.
    pub fn synthesize(theta: &[f64], uv: &[(f64, f64)], noise: f64, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let normal =
            Normal::new(0.0, noise).expect("Expecting noise width to be finite and non-negative.");
        let mut data = VisData::default();
        for &(u, v) in uv {
            data.u.push(u);
            data.v.push(v);
            data.amp
                .push(visibility_amplitude(u, v, theta) + normal.sample(&mut rng));
            data.sigma.push(noise);
        }
        data
    }
}
