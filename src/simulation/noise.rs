use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Impairments applied to a clean sensor trace
///
/// Each impairment is optional so TOML files only need to name the ones
/// they use:
///
/// ```toml
/// seed = 42
/// drift_per_sample = 0.001
///
/// [gaussian]
/// std_dev = 0.3
///
/// [spikes]
/// probability = 0.02
/// amplitude = 5.0
/// ```
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct NoiseConfig {
    pub seed: Option<u64>,
    pub gaussian: Option<GaussianNoiseConfig>,
    pub spikes: Option<SpikeNoiseConfig>,
    #[serde(default)]
    pub drift_per_sample: f32,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_gaussian(mut self, std_dev: f32) -> Self {
        self.gaussian = Some(GaussianNoiseConfig { std_dev });
        self
    }

    pub fn with_spikes(mut self, probability: f32, amplitude: f32) -> Self {
        self.spikes = Some(SpikeNoiseConfig {
            probability,
            amplitude,
        });
        self
    }

    pub fn with_drift(mut self, drift_per_sample: f32) -> Self {
        self.drift_per_sample = drift_per_sample;
        self
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct GaussianNoiseConfig {
    pub std_dev: f32,
}

/// Occasional single-sample outliers, as seen from a flaky I2C read
#[derive(Clone, Debug, serde::Deserialize)]
pub struct SpikeNoiseConfig {
    pub probability: f32,
    pub amplitude: f32,
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

pub fn std_dev(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    let n = signal.len() as f32;
    let mean = signal.iter().sum::<f32>() / n;
    (signal.iter().map(|&x| (x - mean) * (x - mean)).sum::<f32>() / n).sqrt()
}

fn apply_gaussian_noise(signal: &mut [f32], config: &GaussianNoiseConfig, rng: &mut ChaCha8Rng) {
    if config.std_dev <= 0.0 {
        return;
    }

    let normal = match Normal::new(0.0, config.std_dev as f64) {
        Ok(normal) => normal,
        Err(e) => {
            log::warn!("Skipping gaussian noise: {}", e);
            return;
        }
    };

    for sample in signal.iter_mut() {
        *sample += normal.sample(rng) as f32;
    }
}

fn apply_spikes(signal: &mut [f32], config: &SpikeNoiseConfig, rng: &mut ChaCha8Rng) {
    if config.probability <= 0.0 {
        return;
    }

    for sample in signal.iter_mut() {
        if rng.random::<f32>() < config.probability {
            let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
            *sample += sign * config.amplitude;
        }
    }
}

fn apply_drift(signal: &mut [f32], drift_per_sample: f32) {
    if drift_per_sample == 0.0 {
        return;
    }

    for (i, sample) in signal.iter_mut().enumerate() {
        *sample += drift_per_sample * i as f32;
    }
}

/// Apply every configured impairment to `signal` in place
pub fn apply_noise(signal: &mut [f32], config: &NoiseConfig) {
    let mut rng = create_rng(config.seed);

    apply_drift(signal, config.drift_per_sample);

    if let Some(ref gaussian) = config.gaussian {
        apply_gaussian_noise(signal, gaussian, &mut rng);
    }

    if let Some(ref spikes) = config.spikes {
        apply_spikes(signal, spikes, &mut rng);
    }
}

/// Noisy trace around a constant `base` reading
pub fn generate_noisy_readings(base: f32, count: usize, config: &NoiseConfig) -> Vec<f32> {
    let mut signal = super::signal::constant_signal(base, count);
    apply_noise(&mut signal, config);
    signal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_reproducible() {
        let config = NoiseConfig::default()
            .with_seed(7)
            .with_gaussian(0.5)
            .with_spikes(0.1, 3.0);
        let a = generate_noisy_readings(20.0, 200, &config);
        let b = generate_noisy_readings(20.0, 200, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_gaussian_spread() {
        let config = NoiseConfig::default().with_seed(1).with_gaussian(0.5);
        let readings = generate_noisy_readings(20.0, 5000, &config);
        let spread = std_dev(&readings);
        assert!((spread - 0.5).abs() < 0.05, "std dev {}", spread);
    }

    #[test]
    fn test_drift_without_noise() {
        let config = NoiseConfig::default().with_drift(0.5);
        let readings = generate_noisy_readings(10.0, 4, &config);
        assert_eq!(readings, vec![10.0, 10.5, 11.0, 11.5]);
    }

    #[test]
    fn test_no_impairments_is_clean() {
        let readings = generate_noisy_readings(3.0, 10, &NoiseConfig::default().with_seed(3));
        assert!(readings.iter().all(|&r| r == 3.0));
        assert_eq!(std_dev(&readings), 0.0);
    }

    #[test]
    fn test_parse_toml() {
        let config: NoiseConfig = toml::from_str(
            "seed = 42\n[gaussian]\nstd_dev = 0.3\n[spikes]\nprobability = 0.02\namplitude = 5.0\n",
        )
        .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.drift_per_sample, 0.0);
        assert!(config.gaussian.is_some());
        assert!(config.spikes.is_some());
    }
}
