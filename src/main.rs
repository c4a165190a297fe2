use aggpack_core::config::FailurePolicy;
use aggpack_core::init_logging;
use aggpack_lib::{load_config, run_sweep};
use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Parametric aggregate packing sweeps", long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "aggpack.toml")]
    config: String,

    /// Base seed, overriding the config
    #[arg(long)]
    seed: Option<u64>,

    /// Frames per run, overriding the config
    #[arg(long)]
    frames: Option<u32>,

    /// Output directory, overriding the config
    #[arg(short, long)]
    output: Option<String>,

    /// Run combinations on all cores
    #[arg(long)]
    parallel: bool,

    /// Failure policy (skip, retry, abort), overriding the config
    #[arg(long, value_enum)]
    on_failure: Option<Policy>,

    /// Print the effective config as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Policy {
    Skip,
    Retry,
    Abort,
}

impl From<Policy> for FailurePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Skip => FailurePolicy::Skip,
            Policy::Retry => FailurePolicy::Retry,
            Policy::Abort => FailurePolicy::Abort,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut config = load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(frames) = args.frames {
        config.simulation.frames = frames;
    }
    if let Some(output) = args.output {
        config.output.directory = output;
    }
    if args.parallel {
        config.simulation.parallel = true;
    }
    if let Some(policy) = args.on_failure {
        config.simulation.failure_policy = policy.into();
    }

    if args.print_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let summary = run_sweep(&config)?;
    println!(
        "{}",
        serde_json::json!({
            "fingerprint": summary.fingerprint,
            "base_seed": summary.base_seed,
            "total_runs": summary.total_runs,
            "completed": summary.completed,
            "skipped": summary.skipped,
            "elapsed_s": summary.elapsed_s,
        })
    );
    Ok(())
}
