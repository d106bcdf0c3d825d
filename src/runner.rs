/*!
Parallel execution: one walker per rank, chains persisted in rank order.

Each rank runs on its own scoped thread with an exclusively owned walker
seeded `base_seed + rank`, so the ranks decorrelate while every run with the
same configuration reproduces the same output file bit for bit. The ranks
share nothing but the chain file, which they take turns appending to under
the barrier protocol in [`crate::writer`]; sampling itself never
synchronizes.
*/

use std::path::PathBuf;
use std::sync::Barrier;
use std::thread;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::posterior::LogTarget;
use crate::proposal::GaussianProposal;
use crate::walker::{ChainRun, Walker};
use crate::writer;

/// Configuration of one parallel sampling run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of ranks. Must be at least one.
    pub workers: usize,
    /// Iterations per rank.
    pub chain_length: usize,
    /// Rank r samples with seed `base_seed + r`.
    pub base_seed: u64,
    /// Shared chain output file.
    pub chain_path: PathBuf,
}

/// Samples `cfg.workers` independent chains and writes their records to
/// `cfg.chain_path` in rank order. Returns the per-rank results, indexed by
/// rank.
///
/// The target is cloned per rank, dataset included, so chains never contend
/// on shared state. A chain-buffer allocation failure or an output-file
/// failure takes the whole process down rather than leaving peers blocked
/// at the write barrier.
pub fn sample_to_file<T>(
    target: &T,
    proposal: &GaussianProposal,
    initial: &[f64],
    cfg: &RunConfig,
) -> Vec<ChainRun>
where
    T: LogTarget + Clone + Send + Sync,
{
    run_ranks(target, proposal, initial, cfg, None)
}

/// Same as [`sample_to_file`], with one progress bar per rank.
pub fn sample_to_file_with_progress<T>(
    target: &T,
    proposal: &GaussianProposal,
    initial: &[f64],
    cfg: &RunConfig,
) -> Vec<ChainRun>
where
    T: LogTarget + Clone + Send + Sync,
{
    let multi = MultiProgress::new();
    run_ranks(target, proposal, initial, cfg, Some(&multi))
}

fn run_ranks<T>(
    target: &T,
    proposal: &GaussianProposal,
    initial: &[f64],
    cfg: &RunConfig,
    multi: Option<&MultiProgress>,
) -> Vec<ChainRun>
where
    T: LogTarget + Clone + Send + Sync,
{
    assert!(cfg.workers > 0, "need at least one worker");

    let barrier = Barrier::new(cfg.workers);
    let pb_style = ProgressStyle::default_bar()
        .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap()
        .progress_chars("##-");

    thread::scope(|scope| {
        let barrier = &barrier;
        let handles: Vec<_> = (0..cfg.workers)
            .map(|rank| {
                let pb = multi.map(|m| {
                    let pb = m.add(ProgressBar::new(cfg.chain_length as u64));
                    pb.set_prefix(format!("walker {rank}"));
                    pb.set_style(pb_style.clone());
                    pb
                });
                scope.spawn(move || {
                    let mut walker = Walker::new(
                        target.clone(),
                        proposal.clone(),
                        initial,
                        cfg.base_seed + rank as u64,
                    );
                    let run = match &pb {
                        Some(pb) => walker.run_with_progress(cfg.chain_length, pb),
                        None => walker.run(cfg.chain_length),
                    };
                    if let Some(pb) = &pb {
                        pb.finish_with_message("done");
                    }
                    writer::write_rank_ordered(
                        &cfg.chain_path,
                        rank,
                        cfg.workers,
                        barrier,
                        &run.samples.view(),
                    );
                    run
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("worker thread panicked"))
            .collect()
    })
}
