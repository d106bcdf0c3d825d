//! Gaussian random-walk proposal with per-parameter step deviations.

use crate::rng::ChainRng;

/// Proposal that perturbs every parameter independently by a zero-centered
/// Gaussian step of fixed width.
///
/// The deviations are immutable for the lifetime of a run; there is no
/// adaptation.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianProposal {
    devs: Vec<f64>,
}

impl GaussianProposal {
    /// Builds a proposal from explicit per-parameter deviations.
    pub fn new(devs: Vec<f64>) -> Self {
        Self { devs }
    }

    /// Builds deviations as `frac * initial[i]`, the usual way a run is
    /// configured: steps a fixed fraction of the starting values.
    pub fn from_fraction(initial: &[f64], frac: f64) -> Self {
        Self {
            devs: initial.iter().map(|&p| frac * p).collect(),
        }
    }

    /// Per-parameter step deviations.
    pub fn devs(&self) -> &[f64] {
        &self.devs
    }

    /// Draws a candidate state by stepping every parameter, in order, with
    /// two uniforms consumed per parameter.
    pub fn propose(&self, current: &[f64], rng: &mut ChainRng) -> Vec<f64> {
        debug_assert_eq!(current.len(), self.devs.len());
        current
            .iter()
            .zip(&self.devs)
            .map(|(&x, &dev)| x + rng.gaussian(dev))
            .collect()
    }
}
