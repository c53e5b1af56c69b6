//! bitflip - CLI Entry Point
//!
//! Commands:
//! - `bitflip run <program>` - Run a program fault-free and show its result
//! - `bitflip calibrate <campaign>` - Establish golden values for a campaign
//! - `bitflip campaign <campaign>` - Run every injection and report statistics
//! - `bitflip generate <program>` - Write a randomized campaign

use bitflip::campaign::{store, Baseline, CampaignObserver, Outcome, RunStatus, StopFlag, Summary};
use bitflip::{CampaignSession, Config, ExecutionUnit, Machine, ProgramImage};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bitflip")]
#[command(version = "0.1.0")]
#[command(about = "Single-bit-upset fault injection campaigns against a simulated CPU")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program fault-free until it signals completion
    Run {
        /// Path to the program binary
        program: PathBuf,
        /// Maximum number of cycles to run (default: baseline ceiling)
        #[arg(short, long)]
        max_cycles: Option<u64>,
    },
    /// Run the golden execution for a campaign
    Calibrate {
        /// Path to the campaign file
        campaign: PathBuf,
        /// Write the golden values back into the campaign file
        #[arg(short, long)]
        write: bool,
    },
    /// Run a fault-injection campaign
    Campaign {
        /// Path to the campaign file
        campaign: PathBuf,
        /// Write per-injection outcomes and the summary as JSON
        #[arg(short, long)]
        report: Option<PathBuf>,
        /// Write golden values back into the campaign file after calibration
        #[arg(short, long)]
        write: bool,
        /// Drive the campaign from the interactive terminal monitor
        #[arg(long)]
        tui: bool,
    },
    /// Generate a randomized campaign for a program
    Generate {
        /// Path to the program binary the campaign targets
        program: PathBuf,
        /// Number of injections (default: from config, 1000)
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Seed for reproducible campaigns (default: current time)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Output directory (default: from config)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path).unwrap_or_else(|e| fail(e)),
        None => Config::default(),
    };

    match cli.command {
        Commands::Run { program, max_cycles } => {
            run_program(&program, max_cycles.unwrap_or(config.engine.baseline_cycle_ceiling), &config);
        }
        Commands::Calibrate { campaign, write } => {
            calibrate_campaign(&campaign, write, &config);
        }
        Commands::Campaign { campaign, report, write, tui } => {
            run_campaign(&campaign, report, write, tui, &config);
        }
        Commands::Generate { program, count, seed, out_dir } => {
            generate_campaign(&program, count, seed, out_dir, &config);
        }
    }
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("❌ {}", e);
    std::process::exit(1);
}

fn run_program(path: &Path, max_cycles: u64, config: &Config) {
    println!("🔧 Running: {}", path.display());

    let image = ProgramImage::from_file(path).unwrap_or_else(|e| fail(e));
    let addresses = config.engine.addresses();
    let mut machine = Machine::new();
    ExecutionUnit::load_program(&mut machine, &image, &addresses).unwrap_or_else(|e| fail(e));
    println!("📂 Loaded {} bytes", image.len());

    while machine.read_memory_byte(addresses.finish) != 0 && machine.cycles < max_cycles {
        ExecutionUnit::step_cycle(&mut machine);
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Cycles: {}", machine.cycles);
    println!("State:  {:?}", machine.state);
    if let Some(instr) = machine.last_instruction() {
        println!("Last:   {:?}", instr);
    }
    println!("Result: {}", machine.read_memory_byte(addresses.result));

    if machine.read_memory_byte(addresses.finish) != 0 {
        println!();
        println!("⚠️  Reached max cycles limit ({}) without the finish signal.", max_cycles);
    }
}

fn open_session(campaign: &Path, config: &Config) -> CampaignSession<Machine> {
    let machine = Machine::new();
    let definition = store::load(campaign, &machine.geometry()).unwrap_or_else(|e| fail(e));
    CampaignSession::open(machine, definition, config.engine.clone()).unwrap_or_else(|e| fail(e))
}

fn calibrate_campaign(campaign: &Path, write: bool, config: &Config) {
    let mut session = open_session(campaign, config);
    let already = session.definition().is_calibrated();

    let baseline = session.calibrate().unwrap_or_else(|e| fail(e));
    print_baseline(&baseline);

    if already {
        println!("(campaign was already calibrated)");
    } else if write {
        store::save(campaign, session.definition()).unwrap_or_else(|e| fail(e));
        println!("✓ Saved golden values to {}", campaign.display());
    }
}

fn print_baseline(baseline: &Baseline) {
    println!("Expected result:       {}", baseline.expected_result);
    println!("Expected instructions: {}", baseline.expected_instructions);
}

/// Prints one line per completed injection batch.
struct ConsoleProgress {
    step: usize,
}

impl CampaignObserver for ConsoleProgress {
    fn on_calibrated(&mut self, baseline: &Baseline) {
        println!("━━━ Golden run ━━━");
        print_baseline(baseline);
        println!();
    }

    fn on_injection_complete(&mut self, index: usize, total: usize, _outcome: Outcome) {
        let done = index + 1;
        if done % self.step == 0 || done == total {
            println!("  {:>6}/{} injections", done, total);
        }
    }

    fn on_complete(&mut self, _summary: &Summary) {
        println!();
    }
}

fn run_campaign(campaign: &Path, report: Option<PathBuf>, write: bool, tui: bool, config: &Config) {
    println!("🧪 Campaign: {}", campaign.display());

    let mut session = open_session(campaign, config);
    let was_calibrated = session.definition().is_calibrated();

    if tui {
        monitor(session, campaign, report, write, was_calibrated);
        return;
    }

    let mut progress = ConsoleProgress {
        step: (session.total() / 10).max(1),
    };
    let summary = match session.run(&StopFlag::new(), &mut progress).unwrap_or_else(|e| fail(e)) {
        RunStatus::Completed(summary) => Some(summary),
        RunStatus::NoInjections => None,
        RunStatus::Stopped => fail("campaign stopped before completion"),
    };

    match summary {
        Some(summary) => println!("{}", summary),
        None => println!("Campaign plans no injections; nothing to run."),
    }
    finish_campaign(&session, campaign, report, write, was_calibrated);
}

#[cfg(feature = "tui")]
fn monitor(
    session: CampaignSession<Machine>,
    campaign: &Path,
    report: Option<PathBuf>,
    write: bool,
    was_calibrated: bool,
) {
    let session = bitflip::run_monitor(session).unwrap_or_else(|e| fail(e));
    if let Ok(summary) = session.summary() {
        println!("{}", summary);
    }
    finish_campaign(&session, campaign, report, write, was_calibrated);
}

#[cfg(not(feature = "tui"))]
fn monitor(_: CampaignSession<Machine>, _: &Path, _: Option<PathBuf>, _: bool, _: bool) {
    fail("built without the `tui` feature");
}

fn finish_campaign(
    session: &CampaignSession<Machine>,
    campaign: &Path,
    report: Option<PathBuf>,
    write: bool,
    was_calibrated: bool,
) {
    if write && !was_calibrated && session.definition().is_calibrated() {
        store::save(campaign, session.definition()).unwrap_or_else(|e| fail(e));
        println!("✓ Saved golden values to {}", campaign.display());
    }

    if let Some(path) = report {
        let summary = session.summary().ok();
        let body = serde_json::json!({
            "campaign": session.definition(),
            "outcomes": session.results(),
            "summary": summary,
        });
        let text = serde_json::to_string_pretty(&body).unwrap_or_else(|e| fail(e));
        std::fs::write(&path, text).unwrap_or_else(|e| fail(e));
        println!("✓ Report written to {}", path.display());
    }
}

fn generate_campaign(
    program: &Path,
    count: Option<usize>,
    seed: Option<u64>,
    out_dir: Option<PathBuf>,
    config: &Config,
) {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now();
    let seed = seed.unwrap_or_else(|| {
        now.duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as u64).unwrap_or_default()
    });
    let count = count.unwrap_or(config.generator.count);
    let dir = out_dir.unwrap_or_else(|| config.generator.campaign_dir.clone());

    let mut rng = StdRng::seed_from_u64(seed);
    let definition = store::generate(program, &Machine::new().geometry(), count, &mut rng)
        .unwrap_or_else(|e| fail(e));

    let path = dir.join(store::generated_file_name(now));
    store::save(&path, &definition).unwrap_or_else(|e| fail(e));

    println!("✓ Generated {} injections (seed {})", count, seed);
    println!("✓ Saved to {}", path.display());
}
