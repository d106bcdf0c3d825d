/*!
The target distribution: log prior, log likelihood and their sum.

The prior is scale-invariant in the two flux/width pairs,
`-ln(flux1 * width1 * flux2 * width2)`. The likelihood is the negative
chi-square of the model against the data. Proposals with a negative flux or
width are floored to [`LOG_FLOOR`] by the likelihood before any data point is
touched, which is how unphysical states get rejected without ever faulting
the computation.
*/

use crate::data::VisData;
use crate::model::{visibility_amplitude, N_PARAMS};

/// Log-probability floor returned for unphysical parameter vectors.
///
/// Low enough that a floored candidate essentially never wins the acceptance
/// test against any finite state.
pub const LOG_FLOOR: f64 = -1.0e34;

/// Log of the (unnormalized) target density for a parameter vector.
///
/// The walker is written against this seam; tests use toy targets, the
/// driver uses [`TwoGaussianPosterior`].
pub trait LogTarget {
    /// Log posterior (up to a constant) at `theta`.
    fn log_posterior(&self, theta: &[f64]) -> f64;
}

/// Posterior of the two-component visibility model over one dataset.
///
/// Owns its dataset; each worker clones the whole evaluator so chains never
/// share state.
#[derive(Debug, Clone)]
pub struct TwoGaussianPosterior {
    data: VisData,
}

impl TwoGaussianPosterior {
    pub fn new(data: VisData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &VisData {
        &self.data
    }

    /// Scale-invariant log prior on the flux/width pairs.
    ///
    /// No bounds checking: a negative product comes out NaN. The likelihood
    /// floor fires on exactly those vectors, so the composition in
    /// [`LogTarget::log_posterior`] still rejects them.
    pub fn log_prior(&self, theta: &[f64]) -> f64 {
        debug_assert!(theta.len() >= N_PARAMS);
        -(theta[0] * theta[1] * theta[4] * theta[5]).ln()
    }

    /// Negative chi-square of the model against the data.
    ///
    /// Any negative flux or width short-circuits to [`LOG_FLOOR`] without
    /// evaluating a single data point.
    pub fn log_likelihood(&self, theta: &[f64]) -> f64 {
        debug_assert!(theta.len() >= N_PARAMS);
        if theta[0] < 0.0 || theta[1] < 0.0 || theta[4] < 0.0 || theta[5] < 0.0 {
            return LOG_FLOOR;
        }
        let mut chi2 = 0.0;
        for i in 0..self.data.len() {
            let resid = self.data.amp[i] - visibility_amplitude(self.data.u[i], self.data.v[i], theta);
            chi2 += resid * resid / (self.data.sigma[i] * self.data.sigma[i]);
        }
        -chi2
    }
}

impl LogTarget for TwoGaussianPosterior {
    fn log_posterior(&self, theta: &[f64]) -> f64 {
        self.log_prior(theta) + self.log_likelihood(theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn small_data() -> VisData {
        VisData {
            u: vec![0.0, 2.0e9],
            v: vec![0.0, -1.0e9],
            amp: vec![5.9, 3.2],
            sigma: vec![0.1, 0.2],
        }
    }

    #[test]
    fn likelihood_floors_every_negative_scale_parameter() {
        let post = TwoGaussianPosterior::new(small_data());
        let base = [4.5, 4.8, -11.5, 13.6, 1.4, 3.1];
        for idx in [0, 1, 4, 5] {
            let mut theta = base;
            theta[idx] = -theta[idx];
            assert_eq!(post.log_likelihood(&theta), LOG_FLOOR, "index {idx}");
        }
    }

    #[test]
    fn negative_displacements_are_physical() {
        let post = TwoGaussianPosterior::new(small_data());
        let theta = [4.5, 4.8, -11.5, -13.6, 1.4, 3.1];
        assert!(post.log_likelihood(&theta) > LOG_FLOOR);
    }

    #[test]
    fn floor_fires_before_the_data_are_touched() {
        // zero sigmas would divide by zero if the sum ran
        let data = VisData {
            u: vec![0.0],
            v: vec![0.0],
            amp: vec![5.9],
            sigma: vec![0.0],
        };
        let post = TwoGaussianPosterior::new(data);
        let theta = [-4.5, 4.8, -11.5, 13.6, 1.4, 3.1];
        assert_eq!(post.log_likelihood(&theta), LOG_FLOOR);
    }

    #[test]
    fn prior_is_minus_log_of_the_scale_product() {
        let post = TwoGaussianPosterior::new(small_data());
        let theta = [4.5, 4.8, -11.5, 13.6, 1.4, 3.1];
        assert_abs_diff_eq!(
            post.log_prior(&theta),
            -(4.5f64 * 4.8 * 1.4 * 3.1).ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn posterior_is_prior_plus_likelihood() {
        let post = TwoGaussianPosterior::new(small_data());
        let theta = [4.5, 4.8, -11.5, 13.6, 1.4, 3.1];
        assert_abs_diff_eq!(
            post.log_posterior(&theta),
            post.log_prior(&theta) + post.log_likelihood(&theta),
            epsilon = 1e-12
        );
    }

    #[test]
    fn exact_model_parameters_zero_the_chi_square() {
        let theta = [4.0, 5.0, -12.0, 13.0, 1.2, 3.0];
        let uv: Vec<(f64, f64)> = (0..8).map(|i| (i as f64 * 5.0e8, i as f64 * -3.0e8)).collect();
        let mut data = VisData::synthesize(&theta, &uv, 0.0, 1);
        // noiseless data but finite error bars
        data.sigma = vec![0.1; data.len()];
        let post = TwoGaussianPosterior::new(data);
        assert_abs_diff_eq!(post.log_likelihood(&theta), 0.0, epsilon = 1e-9);
    }
}
