/*!
The Metropolis walker: propose, evaluate, accept or reject, record.

One [`Walker`] drives one chain. Per iteration it draws a Gaussian step for
every parameter, evaluates the candidate's log posterior, draws one more
uniform for the acceptance test `cand_lp >= current_lp + ln r`, and records
the post-transition state. The uniform draws come from the offset
[`ChainRng::uniform`] range, so `ln r` is occasionally positive and a
candidate that improves the posterior by less than that margin can still be
rejected; this is part of the chain's fixed arithmetic and is preserved
as-is.

A run returns an explicit [`ChainRun`] — recorded samples, MAP estimate and
acceptance count — and never mutates the caller's initial vector.
*/

use indicatif::ProgressBar;
use ndarray::{Array2, ArrayView1};

use crate::posterior::LogTarget;
use crate::proposal::GaussianProposal;
use crate::rng::ChainRng;

/// Highest-posterior state seen during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEstimate {
    pub params: Vec<f64>,
    pub log_posterior: f64,
}

/// Everything one chain run produces.
#[derive(Debug, Clone)]
pub struct ChainRun {
    /// Recorded states, one row per iteration: the accepted candidate, or
    /// the retained previous state on rejection. Row count always equals the
    /// requested chain length.
    pub samples: Array2<f64>,
    /// Highest-posterior state. Seeded from the state at run start, so it is
    /// well-defined even when every proposal is rejected and its posterior
    /// never decreases below the starting one.
    pub map: MapEstimate,
    /// Number of accepted proposals; at most the chain length.
    pub accepted: usize,
}

impl ChainRun {
    /// Accepted proposals over chain length; 0.0 for an empty chain by
    /// convention.
    pub fn acceptance_ratio(&self) -> f64 {
        if self.samples.nrows() == 0 {
            0.0
        } else {
            self.accepted as f64 / self.samples.nrows() as f64
        }
    }
}

/// A single Metropolis chain over a target distribution.
///
/// Owns its target, proposal and generator; nothing is shared between
/// walkers.
#[derive(Debug, Clone)]
pub struct Walker<T> {
    target: T,
    proposal: GaussianProposal,
    rng: ChainRng,
    current: Vec<f64>,
    current_lp: f64,
}

impl<T: LogTarget> Walker<T> {
    /// Creates a walker at `initial`, evaluating its posterior once.
    pub fn new(target: T, proposal: GaussianProposal, initial: &[f64], seed: u64) -> Self {
        let current_lp = target.log_posterior(initial);
        Self {
            target,
            proposal,
            rng: ChainRng::seeded(seed),
            current: initial.to_vec(),
            current_lp,
        }
    }

    /// State the chain currently sits at.
    pub fn current_state(&self) -> &[f64] {
        &self.current
    }

    /// Log posterior of the current state.
    pub fn current_log_posterior(&self) -> f64 {
        self.current_lp
    }

    /// Runs the chain for `n_steps` iterations.
    ///
    /// `run(0)` returns an empty record, zero accepted proposals and the
    /// starting state as MAP. Calling `run` again continues the chain from
    /// where the previous run left it.
    pub fn run(&mut self, n_steps: usize) -> ChainRun {
        self.run_inner(n_steps, None)
    }

    /// Same as [`run`](Walker::run), ticking a progress bar per iteration.
    pub fn run_with_progress(&mut self, n_steps: usize, pb: &ProgressBar) -> ChainRun {
        pb.set_length(n_steps as u64);
        self.run_inner(n_steps, Some(pb))
    }

    fn run_inner(&mut self, n_steps: usize, pb: Option<&ProgressBar>) -> ChainRun {
        let dim = self.current.len();
        let mut samples = Array2::<f64>::zeros((n_steps, dim));
        let mut map = MapEstimate {
            params: self.current.clone(),
            log_posterior: self.current_lp,
        };
        let mut accepted = 0;

        for i in 0..n_steps {
            let candidate = self.proposal.propose(&self.current, &mut self.rng);
            let cand_lp = self.target.log_posterior(&candidate);
            let r = self.rng.uniform();
            // NaN candidate posteriors fail this comparison and are rejected
            if cand_lp >= self.current_lp + r.ln() {
                self.current = candidate;
                self.current_lp = cand_lp;
                accepted += 1;
                if cand_lp > map.log_posterior {
                    map.params.copy_from_slice(&self.current);
                    map.log_posterior = cand_lp;
                }
            }
            samples.row_mut(i).assign(&ArrayView1::from(&self.current[..]));
            if let Some(pb) = pb {
                pb.inc(1);
            }
        }

        ChainRun {
            samples,
            map,
            accepted,
        }
    }
}
