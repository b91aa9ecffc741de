//! AeroWatch - cycling telemetry analytics
//!
//! Command-line entry point. Replays recorded telemetry through the
//! analytics engine and prints one JSON report per sample.

use aerowatch::equipment::BikeCatalog;
use aerowatch::metrics::engine::{AnalyticsEngine, EngineSet, TickReport};
use aerowatch::metrics::pull_draft::{format_duration, Segment};
use aerowatch::recording::exporter_csv::{export_csv_to_file, resolve_export_path};
use aerowatch::storage::config::{self, AnalyticsConfig};
use aerowatch::telemetry::types::TelemetryTick;
use aerowatch::world::surface::SurfaceTable;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "aerowatch",
    version,
    about = "Cycling telemetry analytics",
    long_about = "Derive gradient, rolling resistance, effective CdA and pull/draft statistics from recorded telemetry."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (defaults to the platform data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON-lines telemetry file
    Replay {
        /// One `{"sample": {...}, "athlete": {...}}` object per line
        input: PathBuf,

        /// Override the configured bike
        #[arg(long)]
        bike: Option<String>,

        /// Surface/Crr table to use instead of the built-in one
        #[arg(long)]
        surfaces: Option<PathBuf>,

        /// Write the parameter log as CSV (a directory gets a timestamped filename)
        #[arg(long)]
        export: Option<PathBuf>,

        /// Track every athlete independently instead of resetting on change
        #[arg(long)]
        per_athlete: bool,
    },
    /// List the bike catalog
    Bikes,
    /// Print the effective configuration as TOML
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting AeroWatch v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;

    match cli.command {
        Command::Replay {
            input,
            bike,
            surfaces,
            export,
            per_athlete,
        } => {
            let mut config = config;
            if let Some(bike) = bike {
                config.bike = bike;
            }
            let surfaces = match surfaces {
                Some(path) => SurfaceTable::from_path(&path)
                    .with_context(|| format!("Failed to load surface table {}", path.display()))?,
                None => SurfaceTable::builtin().context("Built-in surface table is invalid")?,
            };
            let export = export.map(|target| resolve_export_path(&target, chrono::Local::now()));
            replay(&input, config, Arc::new(surfaces), export.as_deref(), per_athlete)
        }
        Command::Bikes => {
            let catalog = BikeCatalog::builtin();
            for bike in catalog.iter() {
                let marker = if bike.name == config.bike { "*" } else { " " };
                println!("{} {:<55} {:>5.2} kg  {}", marker, bike.name, bike.weight_kg, bike.tyre_type());
            }
            Ok(())
        }
        Command::Config { save } => {
            print!(
                "{}",
                toml::to_string_pretty(&config).context("Failed to serialize configuration")?
            );
            if save {
                match &cli.config {
                    Some(path) => config::save_config_to(&config, path),
                    None => config::save_config(&config),
                }
                .context("Failed to save configuration")?;
            }
            Ok(())
        }
    }
}

/// Either one engine that resets on athlete change, or one engine per athlete.
enum Replayer {
    Single(AnalyticsEngine),
    PerAthlete(EngineSet),
}

impl Replayer {
    fn process(&mut self, tick: &TelemetryTick) -> &TickReport {
        match self {
            Replayer::Single(engine) => engine.process(&tick.sample, &tick.athlete),
            Replayer::PerAthlete(set) => set.process(&tick.sample, &tick.athlete),
        }
    }
}

fn replay(
    input: &Path,
    config: AnalyticsConfig,
    surfaces: Arc<SurfaceTable>,
    export: Option<&Path>,
    per_athlete: bool,
) -> Result<()> {
    let file = std::fs::File::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let reader = BufReader::new(file);

    let catalog = Arc::new(BikeCatalog::builtin());
    let show_totals = config.display.show_accumulated_statistics;
    let mut replayer = if per_athlete {
        Replayer::PerAthlete(EngineSet::new(config, catalog, surfaces))
    } else {
        Replayer::Single(AnalyticsEngine::new(config, catalog, surfaces))
    };

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut processed = 0usize;
    let mut skipped = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let tick: TelemetryTick = match serde_json::from_str(line) {
            Ok(tick) => tick,
            Err(e) => {
                tracing::warn!("Skipping line {}: {}", index + 1, e);
                skipped += 1;
                continue;
            }
        };
        let report = replayer.process(&tick);
        serde_json::to_writer(&mut out, report).context("Failed to write report")?;
        writeln!(out).context("Failed to write report")?;
        processed += 1;
    }
    out.flush().context("Failed to flush output")?;

    tracing::info!("Processed {} samples, skipped {}", processed, skipped);

    match &replayer {
        Replayer::Single(engine) => {
            if show_totals {
                log_totals(engine);
            }
            if let Some(path) = export {
                export_csv_to_file(engine.log(), path)
                    .with_context(|| format!("Failed to export {}", path.display()))?;
                tracing::info!("Exported parameter log to {}", path.display());
            }
        }
        Replayer::PerAthlete(set) => {
            let mut ids: Vec<u64> = set.athlete_ids().collect();
            ids.sort_unstable();
            for id in ids {
                let Some(engine) = set.get(id) else { continue };
                if show_totals {
                    log_totals(engine);
                }
                if let Some(path) = export {
                    let path = athlete_export_path(path, id);
                    export_csv_to_file(engine.log(), &path)
                        .with_context(|| format!("Failed to export {}", path.display()))?;
                    tracing::info!("Exported athlete {} log to {}", id, path.display());
                }
            }
        }
    }

    Ok(())
}

fn log_totals(engine: &AnalyticsEngine) {
    let report = engine.last_report();
    let snapshot = &report.pull_draft;
    let display = &engine.config().display;
    let (wkg, hide_unit) = (display.show_wkg, display.hide_unit);
    let describe = |segment: &Segment| {
        let average = if wkg {
            segment
                .avg_watts_per_kg(report.rider_weight_kg)
                .map(|v| format!("{:.1}{}", v, if hide_unit { "" } else { " W/kg" }))
        } else {
            segment
                .avg_power_w()
                .map(|v| format!("{:.0}{}", v, if hide_unit { "" } else { " W" }))
        };
        format!(
            "{} ({})",
            format_duration(segment.duration_s),
            average.unwrap_or_else(|| "-".to_string())
        )
    };
    tracing::info!(
        "Athlete {}: pulling {}, drafting {}",
        report.athlete_id,
        describe(&snapshot.pull_total),
        describe(&snapshot.draft_total)
    );
}

/// `log.csv` -> `log_<athlete>.csv`
fn athlete_export_path(path: &Path, athlete_id: u64) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "aerowatch".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, athlete_id, ext.to_string_lossy()),
        None => format!("{}_{}", stem, athlete_id),
    };
    path.with_file_name(name)
}
