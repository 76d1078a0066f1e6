use anyhow::{Context, Result};
use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use loxone_sensors::config::{ChannelConfig, LogCoefficients, SensorConfig};
use loxone_sensors::constants::DEFAULT_WINDOW_SIZE;
use loxone_sensors::input::parse_reading_line;
use loxone_sensors::output::{OutputFormat, create_formatter};
use loxone_sensors::{Reading, SensorProcessor};

#[derive(Parser, Debug)]
#[command(name = "loxone-sensors")]
#[command(about = "Smooth and calibrate sensor readings for the Loxone bus", long_about = None)]
struct Args {
    /// Reading file, one `value` or `channel,value` per line (stdin if omitted)
    input: Option<PathBuf>,

    /// TOML channel configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Channel the overrides below apply to (default: first configured channel)
    #[arg(long)]
    channel: Option<String>,

    /// Moving average window size
    #[arg(short = 'w', long)]
    window: Option<usize>,

    /// Decimal places preserved by the moving average
    #[arg(short = 'd', long)]
    decimals: Option<u32>,

    /// Logarithmic calibration as add:mult (e.g. "1250:-180")
    #[arg(long)]
    calibration: Option<LogCoefficients>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Print raw and smoothed statistics per channel to stderr
    #[arg(long)]
    summary: bool,

    /// Abort on the first malformed line instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f32,
    std_dev: f32,
    min: f32,
    max: f32,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f32>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChannelSummary {
    channel: String,
    raw: Option<StatsSummary>,
    smoothed: Option<StatsSummary>,
}

struct ChannelStats {
    raw: Stats<f32>,
    smoothed: Stats<f32>,
}

impl ChannelStats {
    fn new() -> Self {
        Self {
            raw: Stats::new(),
            smoothed: Stats::new(),
        }
    }

    fn update(&mut self, reading: &Reading) {
        self.raw.update(reading.raw);
        self.smoothed.update(reading.value);
    }
}

fn apply_overrides(config: &mut SensorConfig, args: &Args) {
    if args.window.is_none() && args.decimals.is_none() && args.calibration.is_none() {
        return;
    }

    let name = match args.channel.clone() {
        Some(name) => name,
        None => match config.channels.first() {
            Some(first) => first.name.clone(),
            None => "default".to_string(),
        },
    };

    if config.channel(&name).is_none() {
        log::info!("Adding channel {} from command line", name);
        config
            .channels
            .push(ChannelConfig::new(name.clone(), DEFAULT_WINDOW_SIZE, 0));
    }

    if let Some(channel) = config.channel_mut(&name) {
        if let Some(window) = args.window {
            channel.window_size = window;
        }
        if let Some(decimals) = args.decimals {
            channel.decimal_places = decimals;
        }
        if let Some(calibration) = args.calibration {
            channel.calibration = Some(calibration);
        }
    }
}

fn open_input(path: Option<&PathBuf>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn print_summary(stats: &BTreeMap<String, ChannelStats>, format: OutputFormat) -> Result<()> {
    let summaries: Vec<ChannelSummary> = stats
        .iter()
        .map(|(channel, s)| ChannelSummary {
            channel: channel.clone(),
            raw: StatsSummary::from_stats(&s.raw),
            smoothed: StatsSummary::from_stats(&s.smoothed),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summaries)
                .context("Failed to serialize summary")?;
            eprintln!("{}", json);
        }
        OutputFormat::Text | OutputFormat::Csv => {
            for summary in &summaries {
                eprintln!("{}:", summary.channel);
                for (label, s) in [("raw", &summary.raw), ("smoothed", &summary.smoothed)] {
                    if let Some(s) = s {
                        eprintln!(
                            "  {:<8} n={} mean={:.3} std={:.3} min={:.3} max={:.3}",
                            label, s.count, s.mean, s.std_dev, s.min, s.max
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match args.config {
        Some(ref path) => SensorConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => SensorConfig::default(),
    };
    apply_overrides(&mut config, &args);

    let mut processor = SensorProcessor::new(&config).context("Invalid channel configuration")?;
    log::info!(
        "Channels: {}",
        processor.channel_names().collect::<Vec<_>>().join(", ")
    );

    let formatter = create_formatter(args.format, args.verbose > 0);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Some(header) = formatter.header() {
        writeln!(out, "{}", header)?;
    }

    let mut stats: BTreeMap<String, ChannelStats> = BTreeMap::new();
    let mut skipped = 0usize;

    for (index, line) in open_input(args.input.as_ref())?.lines().enumerate() {
        let line_no = index + 1;
        let line = line.context("Failed to read input")?;

        let reading = match parse_reading_line(&line)
            .and_then(|raw| {
                raw.map(|raw| processor.process_reading(raw.channel.as_deref(), raw.value))
                    .transpose()
            }) {
            Ok(Some(reading)) => reading,
            Ok(None) => continue,
            Err(e) if !args.strict => {
                log::warn!("Line {}: {}", line_no, e);
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Line {}", line_no)),
        };

        writeln!(out, "{}", formatter.format(&reading))?;

        if args.summary {
            stats
                .entry(reading.channel.clone())
                .or_insert_with(ChannelStats::new)
                .update(&reading);
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {} malformed line(s)", skipped);
    }

    if args.summary {
        print_summary(&stats, args.format)?;
    }

    Ok(())
}
