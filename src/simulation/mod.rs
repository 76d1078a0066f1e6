mod noise;
mod signal;

pub use noise::{
    GaussianNoiseConfig, NoiseConfig, SpikeNoiseConfig, apply_noise, generate_noisy_readings,
    std_dev,
};
pub use signal::{constant_signal, step_signal, sweep_signal};
