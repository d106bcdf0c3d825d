//! End-to-end fit of the two-component model over a synthetic dataset,
//! going through the ASCII reader, the parallel runner and the chain file.

use std::fs;

use vis_mcmc::data::{VisData, DEFAULT_MAX_POINTS};
use vis_mcmc::posterior::{LogTarget, TwoGaussianPosterior};
use vis_mcmc::proposal::GaussianProposal;
use vis_mcmc::runner::{sample_to_file, RunConfig};

#[test]
fn short_fit_over_synthetic_data() {
    const WORKERS: usize = 2;
    const LEN: usize = 400;

    let truth = [4.0, 5.0, -12.0, 13.0, 1.2, 3.0];
    let uv: Vec<(f64, f64)> = (0..64)
        .map(|i| {
            let a = i as f64;
            (a * 1.2e8 - 4.0e9, 3.5e9 - a * 1.1e8)
        })
        .collect();

    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("synth_data.dat");
    VisData::synthesize(&truth, &uv, 0.1, 11)
        .write_ascii(&data_path)
        .unwrap();

    let data = VisData::read_ascii(&data_path, DEFAULT_MAX_POINTS).unwrap();
    assert_eq!(data.len(), 64);

    let target = TwoGaussianPosterior::new(data);
    let initial = vec![4.5, 4.8, -11.5, 13.6, 1.4, 3.1];
    let initial_lp = target.log_posterior(&initial);
    let proposal = GaussianProposal::from_fraction(&initial, 0.01);
    let cfg = RunConfig {
        workers: WORKERS,
        chain_length: LEN,
        base_seed: 4357,
        chain_path: dir.path().join("chains.dat"),
    };

    let runs = sample_to_file(&target, &proposal, &initial, &cfg);
    assert_eq!(runs.len(), WORKERS);

    for run in &runs {
        assert_eq!(run.samples.nrows(), LEN);
        assert!(run.accepted <= LEN);
        assert!((0.0..=1.0).contains(&run.acceptance_ratio()));
        assert!(run.map.log_posterior >= initial_lp);
        // scale parameters of the best state stay physical
        assert!(run.map.params[0] >= 0.0 && run.map.params[1] >= 0.0);
        assert!(run.map.params[4] >= 0.0 && run.map.params[5] >= 0.0);
    }

    let chain_rows = fs::read_to_string(&cfg.chain_path).unwrap().lines().count();
    assert_eq!(chain_rows, WORKERS * LEN);

    // the true parameters fit the data far better than the offset start
    assert!(target.log_posterior(&truth) > initial_lp);
}
