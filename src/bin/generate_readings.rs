use anyhow::{Context, Result, bail};
use clap::Parser;
use loxone_sensors::simulation::{NoiseConfig, apply_noise, constant_signal, step_signal, sweep_signal};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate_readings")]
#[command(about = "Generate synthetic noisy sensor traces for smoothing tests")]
struct Args {
    /// Trace shape: "constant:V", "step:A:B:AT" or "sweep:START:END"
    #[arg(short, long, default_value = "constant:21.5")]
    shape: String,

    /// Number of readings
    #[arg(short = 'n', long, default_value_t = 100)]
    count: usize,

    /// Prefix each line with this channel name
    #[arg(long)]
    channel: Option<String>,

    /// TOML noise configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gaussian noise standard deviation (CLI override)
    #[arg(long)]
    noise: Option<f32>,

    /// Spike probability per reading (CLI override)
    #[arg(long)]
    spike_probability: Option<f32>,

    /// Spike amplitude
    #[arg(long, default_value_t = 5.0)]
    spike_amplitude: f32,

    /// Linear drift added per reading (CLI override)
    #[arg(long)]
    drift: Option<f32>,

    /// Seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Decimal places written per reading
    #[arg(long, default_value_t = 3)]
    precision: usize,
}

fn parse_number(field: &str) -> Result<f32> {
    field
        .trim()
        .parse()
        .with_context(|| format!("invalid number: {}", field))
}

fn generate_shape(shape: &str, count: usize) -> Result<Vec<f32>> {
    let fields: Vec<&str> = shape.split(':').collect();
    match fields.as_slice() {
        ["constant", value] => Ok(constant_signal(parse_number(value)?, count)),
        ["step", before, after, at] => {
            let at: usize = at
                .trim()
                .parse()
                .with_context(|| format!("invalid step position: {}", at))?;
            Ok(step_signal(parse_number(before)?, parse_number(after)?, at, count))
        }
        ["sweep", start, end] => Ok(sweep_signal(parse_number(start)?, parse_number(end)?, count)),
        _ => bail!("unknown trace shape: {}", shape),
    }
}

fn build_noise_config(args: &Args) -> Result<NoiseConfig> {
    let mut config = match args.config {
        Some(ref path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => NoiseConfig::default(),
    };

    if let Some(std_dev) = args.noise {
        config = config.with_gaussian(std_dev);
    }
    if let Some(probability) = args.spike_probability {
        config = config.with_spikes(probability, args.spike_amplitude);
    }
    if let Some(drift) = args.drift {
        config = config.with_drift(drift);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let noise_config = build_noise_config(&args)?;
    let mut readings = generate_shape(&args.shape, args.count)?;
    apply_noise(&mut readings, &noise_config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for reading in readings {
        match args.channel {
            Some(ref channel) => writeln!(out, "{},{:.*}", channel, args.precision, reading)?,
            None => writeln!(out, "{:.*}", args.precision, reading)?,
        }
    }

    Ok(())
}
