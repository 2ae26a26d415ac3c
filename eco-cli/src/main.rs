use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use eco_config::load_model_config;
use eco_core::{DataCollector, Simulation};
use eco_types::{MetricsSnapshot, PopulationSample, WorldSnapshot};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

const DEFAULT_LOG_FILTER: &str = "eco_cli=info,eco_core=info";

#[derive(Parser, Debug)]
#[command(name = "eco-cli")]
#[command(about = "Ad-bot ecosystem simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the model and print a population summary.
    Run {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 100)]
        ticks: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Step {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        ticks: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = false)]
        print_state: bool,
    },
    /// Write the per-tick population series (bots, humans, ready patches).
    Collect {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 200)]
        ticks: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = SeriesFormat::Csv)]
        format: SeriesFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Export {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 50)]
        ticks: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = ExportFormat::Jsonl)]
        format: ExportFormat,
        /// Defaults to `trace.jsonl` / `trace.json` in a timestamped run directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Read a saved trace back and report its population series.
    Replay {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = SeriesFormat::Json)]
        format: SeriesFormat,
    },
    /// Print the portrayal layers of the world after N ticks.
    Frame {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        ticks: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    Benchmark {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 200)]
        ticks: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long)]
        bots: Option<u32>,
        #[arg(long)]
        humans: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SeriesFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Jsonl,
    Json,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    ticks: u32,
    seed: u64,
    final_tick: u64,
    bots: u32,
    humans: u32,
    ready_patches: u32,
    total_births: u64,
    total_deaths: u64,
}

impl RunSummary {
    fn from_snapshot(ticks: u32, snapshot: &WorldSnapshot) -> Self {
        Self {
            ticks,
            seed: snapshot.rng_seed,
            final_tick: snapshot.tick,
            bots: snapshot.metrics.bots,
            humans: snapshot.metrics.humans,
            ready_patches: snapshot.metrics.ready_patches,
            total_births: snapshot.metrics.total_births,
            total_deaths: snapshot.metrics.total_deaths,
        }
    }
}

#[derive(Debug, Serialize)]
struct StepSummary {
    ticks: u32,
    final_tick: u64,
    moves_last_tick: usize,
    births_last_tick: u64,
    starvations_last_tick: u64,
    predations_last_tick: u64,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    seed: u64,
    snapshots: usize,
    first_tick: u64,
    final_tick: u64,
    peak_bots: u32,
    peak_humans: u32,
    min_ready_patches: u32,
    max_ready_patches: u32,
    bots_extinct_at: Option<u64>,
    humans_extinct_at: Option<u64>,
    final_population: PopulationSample,
}

impl ReplayReport {
    fn from_series(seed: u64, series: &DataCollector) -> Option<Self> {
        let samples = series.samples();
        let first = samples.first()?;
        let last = series.latest()?;
        let extinct_at = |count: fn(&PopulationSample) -> u32| {
            samples
                .iter()
                .find(|sample| count(*sample) == 0)
                .map(|sample| sample.tick)
        };

        Some(Self {
            seed,
            snapshots: samples.len(),
            first_tick: first.tick,
            final_tick: last.tick,
            peak_bots: samples.iter().map(|s| s.counts.bots).max().unwrap_or(0),
            peak_humans: samples.iter().map(|s| s.counts.humans).max().unwrap_or(0),
            min_ready_patches: samples
                .iter()
                .map(|s| s.counts.ready_patches)
                .min()
                .unwrap_or(0),
            max_ready_patches: samples
                .iter()
                .map(|s| s.counts.ready_patches)
                .max()
                .unwrap_or(0),
            bots_extinct_at: extinct_at(|s| s.counts.bots),
            humans_extinct_at: extinct_at(|s| s.counts.humans),
            final_population: *last,
        })
    }
}

#[derive(Debug, Serialize)]
struct BenchmarkSummary {
    ticks: u32,
    elapsed_ms: u128,
    avg_ms_per_tick: f64,
    final_metrics: MetricsSnapshot,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ticks,
            seed,
            format,
            out,
        } => run_command(config, ticks, seed, format, out),
        Commands::Step {
            config,
            ticks,
            seed,
            print_state,
        } => step_command(config, ticks, seed, print_state),
        Commands::Collect {
            config,
            ticks,
            seed,
            format,
            out,
        } => collect_command(config, ticks, seed, format, out),
        Commands::Export {
            config,
            ticks,
            seed,
            format,
            out,
        } => export_command(config, ticks, seed, format, out),
        Commands::Replay { input, format } => replay_command(input, format),
        Commands::Frame {
            config,
            ticks,
            seed,
        } => frame_command(config, ticks, seed),
        Commands::Benchmark {
            config,
            ticks,
            seed,
            bots,
            humans,
        } => benchmark_command(config, ticks, seed, bots, humans),
    }
}

fn run_command(
    config_path: Option<PathBuf>,
    ticks: u32,
    seed: u64,
    format: OutputFormat,
    out: Option<PathBuf>,
) -> Result<()> {
    let mut sim = build_simulation(config_path.as_deref(), seed)?;
    sim.advance(ticks)?;
    let summary = RunSummary::from_snapshot(ticks, &sim.snapshot());

    let text = match format {
        OutputFormat::Pretty => format!(
            "ticks={} seed={} final_tick={} bots={} humans={} ready_patches={} births={} deaths={}",
            summary.ticks,
            summary.seed,
            summary.final_tick,
            summary.bots,
            summary.humans,
            summary.ready_patches,
            summary.total_births,
            summary.total_deaths
        ),
        OutputFormat::Json => serde_json::to_string_pretty(&summary)?,
    };
    write_output(text, out)
}

fn step_command(
    config_path: Option<PathBuf>,
    ticks: u32,
    seed: u64,
    print_state: bool,
) -> Result<()> {
    let ticks = ticks.max(1);
    let mut sim = build_simulation(config_path.as_deref(), seed)?;
    sim.advance(ticks - 1)?;
    let last = sim.step()?;

    let summary = StepSummary {
        ticks,
        final_tick: last.tick,
        moves_last_tick: last.moves.len(),
        births_last_tick: last.metrics.births_last_tick,
        starvations_last_tick: last.metrics.starvations_last_tick,
        predations_last_tick: last.metrics.predations_last_tick,
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    if print_state {
        println!("{}", serde_json::to_string_pretty(&sim.snapshot())?);
    }
    Ok(())
}

fn collect_command(
    config_path: Option<PathBuf>,
    ticks: u32,
    seed: u64,
    format: SeriesFormat,
    out: Option<PathBuf>,
) -> Result<()> {
    let mut sim = build_simulation(config_path.as_deref(), seed)?;
    sim.advance(ticks)?;

    let (payload, file_name) = match format {
        SeriesFormat::Csv => (sim.collector().to_csv(), "population.csv"),
        SeriesFormat::Json => (
            serde_json::to_string_pretty(sim.collector().samples())?,
            "population.json",
        ),
    };

    let path = out
        .unwrap_or_else(|| default_output_dir(seed))
        .join(file_name);
    write_file(&path, &payload)?;
    info!(
        samples = sim.collector().len(),
        path = %path.display(),
        "wrote population series"
    );
    Ok(())
}

fn export_command(
    config_path: Option<PathBuf>,
    ticks: u32,
    seed: u64,
    format: ExportFormat,
    out: Option<PathBuf>,
) -> Result<()> {
    let mut sim = build_simulation(config_path.as_deref(), seed)?;

    let (payload, file_name) = match format {
        ExportFormat::Jsonl => {
            let mut lines = sim.export_trace_jsonl(ticks)?.join("\n");
            lines.push('\n');
            (lines, "trace.jsonl")
        }
        ExportFormat::Json => {
            let mut snapshots = Vec::with_capacity(ticks as usize + 1);
            snapshots.push(sim.snapshot());
            for _ in 0..ticks {
                sim.step()?;
                snapshots.push(sim.snapshot());
            }
            (serde_json::to_string_pretty(&snapshots)?, "trace.json")
        }
    };

    let path = out.unwrap_or_else(|| default_output_dir(seed).join(file_name));
    write_file(&path, &payload)?;
    info!(
        ticks,
        bots = sim.metrics().bots,
        humans = sim.metrics().humans,
        path = %path.display(),
        "exported trace"
    );
    Ok(())
}

fn replay_command(input: PathBuf, format: SeriesFormat) -> Result<()> {
    let snapshots = read_trace(&input)?;
    let seed = snapshots
        .first()
        .map(|snapshot| snapshot.rng_seed)
        .context("replay input holds no snapshots")?;
    let series: DataCollector = snapshots
        .iter()
        .map(WorldSnapshot::population_sample)
        .collect();

    match format {
        SeriesFormat::Csv => print!("{}", series.to_csv()),
        SeriesFormat::Json => {
            let report = ReplayReport::from_series(seed, &series)
                .context("replay input holds no snapshots")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn frame_command(config_path: Option<PathBuf>, ticks: u32, seed: u64) -> Result<()> {
    let mut sim = build_simulation(config_path.as_deref(), seed)?;
    sim.advance(ticks)?;
    println!("{}", serde_json::to_string_pretty(&sim.frame())?);
    Ok(())
}

fn benchmark_command(
    config_path: Option<PathBuf>,
    ticks: u32,
    seed: u64,
    bots: Option<u32>,
    humans: Option<u32>,
) -> Result<()> {
    let mut cfg = load_model_config(config_path.as_deref())?;
    if let Some(v) = bots {
        cfg.initial_bots = v;
    }
    if let Some(v) = humans {
        cfg.initial_humans = v;
    }

    let mut sim = Simulation::new(cfg, seed)?;
    let start = Instant::now();
    sim.advance(ticks.max(1))?;
    let elapsed = start.elapsed();

    let summary = BenchmarkSummary {
        ticks: ticks.max(1),
        elapsed_ms: elapsed.as_millis(),
        avg_ms_per_tick: elapsed.as_secs_f64() * 1000.0 / ticks.max(1) as f64,
        final_metrics: sim.metrics().clone(),
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn build_simulation(config_path: Option<&Path>, seed: u64) -> Result<Simulation> {
    let cfg = load_model_config(config_path)?;
    let sim = Simulation::new(cfg, seed).context("model parameters were rejected")?;
    info!(
        seed,
        width = sim.config().width,
        height = sim.config().height,
        "model initialized"
    );
    Ok(sim)
}

/// Traces are either a JSON array of snapshots or one snapshot per line.
fn read_trace(input: &Path) -> Result<Vec<WorldSnapshot>> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("failed to read trace {}", input.display()))?;

    if content.trim_start().starts_with('[') {
        return serde_json::from_str(&content)
            .with_context(|| format!("{} is not a JSON array of snapshots", input.display()));
    }
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<WorldSnapshot>(line)
                .with_context(|| format!("{}:{} is not a snapshot", input.display(), idx + 1))
        })
        .collect()
}

fn default_output_dir(seed: u64) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    PathBuf::from("runs").join(format!("{stamp}-seed{seed}"))
}

fn write_file(path: &Path, payload: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed creating output directory {}", dir.display()))?;
    }
    fs::write(path, payload).with_context(|| format!("failed writing {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

fn write_output(text: String, out: Option<PathBuf>) -> Result<()> {
    match out {
        Some(path) => write_file(&path, &text),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
