use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use obitb::config::{parse_flag, TbConfig, WAVE_FILENAME};
use obitb::counter_model::{CounterModel, FaultConfig};
use obitb::error::TbResult;
use obitb::script::counter_script;
use obitb::testbench::Testbench;
use obitb::utils::seed_from_clock;
use obitb::{junit, report, Verbosity, CRATE_NAME};

#[derive(Parser, Debug)]
#[command(
    name = "obitb",
    version,
    about = "Cycle-accurate OBI conformance testbench for the counter peripheral"
)]
struct Cli {
    /// Verbosity: low, medium, high, full or debug.
    #[arg(long, default_value = "medium")]
    log_level: Verbosity,

    /// Dump a VCD trace (true/false).
    #[arg(long, default_value = "false", action = ArgAction::Set, value_parser = flag)]
    gen_waves: bool,

    #[arg(long, default_value = WAVE_FILENAME)]
    wave_file: PathBuf,

    /// Random seed. Drawn from the clock when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JUnit XML result to this file.
    #[arg(long)]
    junit: Option<PathBuf>,

    #[arg(long)]
    max_cycles: Option<u64>,

    /// Keep running after a scoreboard error until the program ends.
    #[arg(long)]
    keep_going: bool,

    /// Device drops the response of every Nth read.
    #[arg(long)]
    drop_read_every: Option<u32>,

    /// Probability of the device withholding grant in a cycle.
    #[arg(long, default_value_t = 0.0)]
    stall_prob: f64,

    /// Device never grants a request.
    #[arg(long)]
    never_grant: bool,
}

fn flag(s: &str) -> Result<bool, String> {
    Ok(parse_flag(s))
}

fn run(cli: Cli) -> TbResult<bool> {
    let seed = cli.seed.unwrap_or_else(seed_from_clock);
    let faults = FaultConfig {
        drop_read_every: cli.drop_read_every,
        stall_prob: cli.stall_prob,
        never_grant: cli.never_grant,
    };
    let mut cfg = TbConfig {
        log_level: cli.log_level,
        gen_waves: cli.gen_waves,
        wave_path: cli.wave_file,
        seed,
        stop_on_mismatch: !cli.keep_going,
        faults,
        ..Default::default()
    };
    if let Some(n) = cli.max_cycles {
        cfg.max_cycles = n;
    }

    let start = Instant::now();
    let mut tb = Testbench::new(CounterModel::with_faults(seed, faults), counter_script(), cfg)?;
    let r = tb.run();
    println!("{}", report::render(&r));

    if let Some(path) = cli.junit {
        junit::create_junit_xml(&path, CRATE_NAME, "counter", &r, start.elapsed().as_secs_f64())?;
        tracing::info!("JUnit report written to {}", path.display());
    }
    Ok(r.passed())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.tracing_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(2)
        }
    }
}
