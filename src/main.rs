//! Command-line driver: fit the two-component Gaussian visibility model to a
//! dataset, or synthesize a dataset to fit.

use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use vis_mcmc::data::{VisData, DEFAULT_MAX_POINTS};
use vis_mcmc::model::{visibility_amplitude, N_PARAMS};
use vis_mcmc::posterior::TwoGaussianPosterior;
use vis_mcmc::proposal::GaussianProposal;
use vis_mcmc::runner::{self, RunConfig};
use vis_mcmc::walker::MapEstimate;

#[derive(Parser, Debug)]
#[command(name = "vis-mcmc", about = "Metropolis-Hastings visibility-amplitude fitting")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit the two-component Gaussian model to a dataset.
    Fit(FitArgs),
    /// Write a synthetic dataset drawn from the model.
    Synth(SynthArgs),
}

#[derive(Args, Debug)]
struct FitArgs {
    /// Input dataset: four whitespace-separated columns (u, v, amplitude, sigma).
    #[arg(long, default_value = "synth_data.dat")]
    data: PathBuf,

    /// Chain output file; worker blocks appear in rank order.
    #[arg(long, default_value = "chains.dat")]
    chains: PathBuf,

    /// Best-fit model CSV.
    #[arg(long, default_value = "model.dat")]
    model: PathBuf,

    /// Run log, written when --verbose is set.
    #[arg(long, default_value = "mcmc.log")]
    log: PathBuf,

    /// Write a run log with point count, acceptance ratios and best fit.
    #[arg(long)]
    verbose: bool,

    /// Number of parallel walkers.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Iterations per walker.
    #[arg(long, default_value_t = 50_000)]
    chain_length: usize,

    /// Base seed; walker r samples with seed + r.
    #[arg(long, default_value_t = 4357)]
    seed: u64,

    /// Initial parameters: flux1,width1,dx2,dy2,flux2,width2.
    #[arg(long, value_delimiter = ',', default_values_t = [4.5, 4.8, -11.5, 13.6, 1.4, 3.1], allow_negative_numbers = true)]
    init: Vec<f64>,

    /// Proposal deviation as a fraction of each initial value.
    #[arg(long, default_value_t = 0.01)]
    step_frac: f64,

    /// Maximum number of data points accepted from the input file.
    #[arg(long, default_value_t = DEFAULT_MAX_POINTS)]
    max_points: usize,

    /// Suppress progress bars.
    #[arg(long)]
    quiet: bool,
}

#[derive(Args, Debug)]
struct SynthArgs {
    /// Output dataset file.
    #[arg(long, default_value = "synth_data.dat")]
    out: PathBuf,

    /// True parameters: flux1,width1,dx2,dy2,flux2,width2.
    #[arg(long, value_delimiter = ',', default_values_t = [4.0, 5.0, -12.0, 13.0, 1.2, 3.0], allow_negative_numbers = true)]
    params: Vec<f64>,

    /// Number of data points.
    #[arg(long, default_value_t = 128)]
    points: usize,

    /// Half-extent of the sampled uv box, in wavelengths.
    #[arg(long, default_value_t = 8.0e9)]
    uv_extent: f64,

    /// One-sigma noise added to each amplitude.
    #[arg(long, default_value_t = 0.1)]
    noise: f64,

    /// Seed for uv placement and noise.
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Fit(args) => fit(args),
        Command::Synth(args) => synth(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn check_params(name: &str, params: &[f64]) -> Result<(), Box<dyn Error>> {
    if params.len() != N_PARAMS {
        return Err(format!(
            "--{name} needs exactly {N_PARAMS} comma-separated values, got {}",
            params.len()
        )
        .into());
    }
    Ok(())
}

fn fit(args: FitArgs) -> Result<(), Box<dyn Error>> {
    check_params("init", &args.init)?;
    if args.workers == 0 {
        return Err("--workers must be at least 1".into());
    }

    let data = VisData::read_ascii(&args.data, args.max_points)?;
    let n_points = data.len();
    let target = TwoGaussianPosterior::new(data);
    let proposal = GaussianProposal::from_fraction(&args.init, args.step_frac);
    let cfg = RunConfig {
        workers: args.workers,
        chain_length: args.chain_length,
        base_seed: args.seed,
        chain_path: args.chains.clone(),
    };

    let runs = if args.quiet {
        runner::sample_to_file(&target, &proposal, &args.init, &cfg)
    } else {
        runner::sample_to_file_with_progress(&target, &proposal, &args.init, &cfg)
    };

    // the best MAP across all ranks decides the reported model
    let best: &MapEstimate = runs
        .iter()
        .map(|run| &run.map)
        .max_by(|a, b| a.log_posterior.total_cmp(&b.log_posterior))
        .expect("at least one worker ran");

    write_model_csv(&args.model, target.data(), &best.params)?;

    if args.verbose {
        let mut log = File::create(&args.log)
            .map_err(|e| format!("cannot open log file {}: {e}", args.log.display()))?;
        writeln!(
            log,
            "Read {n_points} data points from file {}",
            args.data.display()
        )?;
        for (rank, run) in runs.iter().enumerate() {
            writeln!(
                log,
                "walker {rank}: {} iterations completed with an acceptance ratio of {:e}",
                args.chain_length,
                run.acceptance_ratio()
            )?;
        }
        writeln!(log, "Most likely values of the parameters:")?;
        writeln!(
            log,
            "{}",
            best.params
                .iter()
                .map(|p| format!("{p:e}"))
                .collect::<Vec<_>>()
                .join("\t")
        )?;
        writeln!(log, "log posterior: {:e}", best.log_posterior)?;
    }

    Ok(())
}

/// Records the best-fit model next to the data, one CSV row per point.
fn write_model_csv(path: &Path, data: &VisData, theta: &[f64]) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)
        .map_err(|e| format!("cannot open model file {}: {e}", path.display()))?;
    let mut w = csv::Writer::from_writer(file);
    w.write_record(["uCo", "vCo", "VisAmp", "Sigma", "Model"])?;
    for i in 0..data.len() {
        let model = visibility_amplitude(data.u[i], data.v[i], theta);
        w.write_record([
            format!("{:e}", data.u[i]),
            format!("{:e}", data.v[i]),
            format!("{:e}", data.amp[i]),
            format!("{:e}", data.sigma[i]),
            format!("{model:e}"),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn synth(args: SynthArgs) -> Result<(), Box<dyn Error>> {
    check_params("params", &args.params)?;

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let extent = args.uv_extent.abs();
    let uv: Vec<(f64, f64)> = (0..args.points)
        .map(|_| {
            (
                rng.gen_range(-extent..=extent),
                rng.gen_range(-extent..=extent),
            )
        })
        .collect();
    let data = VisData::synthesize(&args.params, &uv, args.noise, args.seed.wrapping_add(1));
    data.write_ascii(&args.out)?;
    println!("wrote {} synthetic points to {}", data.len(), args.out.display());
    Ok(())
}
