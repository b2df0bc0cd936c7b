//! Sample sources feeding a streaming session

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use sigstream_core::{BoardData, BoardDescriptor, SigError, SigResult};
use std::f64::consts::PI;
use std::time::{SystemTime, UNIX_EPOCH};

/// Produces sample packages for a streaming session.
///
/// A package is one column of the fetched matrix: `num_rows` values with the
/// timestamp in the descriptor's timestamp row.
pub trait SampleSource: Send {
    /// Geometry of the packages this source emits
    fn descriptor(&self) -> &'static BoardDescriptor;

    /// Reset internal clocks and counters before a new stream
    fn reset(&mut self);

    /// Generate the next `count` packages
    fn generate(&mut self, count: usize) -> Vec<Vec<f64>>;
}

/// Configuration for the simulated board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Gaussian noise standard deviation in microvolts
    pub noise_std: f64,
    /// Dominant rhythm amplitude in microvolts
    pub rhythm_amplitude: f64,
    /// Dominant rhythm frequency in Hz
    pub rhythm_freq: f64,
    /// Mains interference component (None disables it)
    pub mains_hz: Option<f64>,
    /// Probability of an artifact spike per sample
    pub artifact_prob: f64,
    /// Artifact spike amplitude in microvolts
    pub artifact_amp: f64,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            noise_std: 5.0,
            rhythm_amplitude: 20.0,
            rhythm_freq: 10.0,
            mains_hz: Some(50.0),
            artifact_prob: 0.001,
            artifact_amp: 100.0,
            seed: None,
        }
    }
}

/// Simulated ExG board.
///
/// Each channel carries the dominant rhythm with a per-channel phase offset,
/// a weaker first harmonic, baseline wander, Gaussian noise, occasional
/// artifact spikes and an optional mains component.
pub struct SyntheticSource {
    descriptor: &'static BoardDescriptor,
    config: SyntheticConfig,
    rng: StdRng,
    noise: Normal<f64>,
    produced: u64,
    start_epoch: f64,
}

impl SyntheticSource {
    pub fn new(descriptor: &'static BoardDescriptor, config: SyntheticConfig) -> SigResult<Self> {
        if config.noise_std < 0.0 {
            return Err(SigError::InvalidArgument {
                reason: "noise standard deviation must be non-negative".to_string(),
            });
        }
        let seed = config.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs()
        });
        let noise = Normal::new(0.0, config.noise_std).map_err(|e| SigError::Source {
            reason: format!("noise distribution: {}", e),
        })?;

        Ok(SyntheticSource {
            descriptor,
            config,
            rng: StdRng::seed_from_u64(seed),
            noise,
            produced: 0,
            start_epoch: now_epoch(),
        })
    }

    fn exg_sample(&mut self, t: f64, channel_idx: usize) -> f64 {
        let phase = channel_idx as f64 * PI / 8.0;
        let mut value =
            self.config.rhythm_amplitude * (2.0 * PI * self.config.rhythm_freq * t + phase).sin();

        // First harmonic and slow baseline wander
        value += 0.3
            * self.config.rhythm_amplitude
            * (2.0 * PI * 2.0 * self.config.rhythm_freq * t + phase).sin();
        value += 2.0 * (2.0 * PI * 0.1 * t).sin();

        value += self.noise.sample(&mut self.rng);

        if let Some(mains) = self.config.mains_hz {
            value += 2.0 * (2.0 * PI * mains * t).sin();
        }

        if self.rng.gen::<f64>() < self.config.artifact_prob {
            value += self.config.artifact_amp * self.rng.gen_range(-1.0..1.0);
        }

        value
    }
}

impl SampleSource for SyntheticSource {
    fn descriptor(&self) -> &'static BoardDescriptor {
        self.descriptor
    }

    fn reset(&mut self) {
        self.produced = 0;
        self.start_epoch = now_epoch();
    }

    fn generate(&mut self, count: usize) -> Vec<Vec<f64>> {
        let descr = self.descriptor;
        let dt = 1.0 / descr.sampling_rate;
        let mut packages = Vec::with_capacity(count);

        for _ in 0..count {
            let t = self.produced as f64 * dt;
            let mut package = vec![0.0; descr.num_rows];

            package[descr.package_num_row] = (self.produced % 256) as f64;
            for (idx, &row) in descr.exg_rows.iter().enumerate() {
                package[row] = self.exg_sample(t, idx);
            }
            for (idx, &row) in descr.accel_rows.iter().enumerate() {
                package[row] = 0.01 * (2.0 * PI * 0.5 * t + idx as f64).sin();
            }
            package[descr.timestamp_row] = self.start_epoch + t;

            packages.push(package);
            self.produced += 1;
        }

        packages
    }
}

/// Replays a saved recording, rewriting timestamps to the replay clock and
/// looping when the file runs out.
pub struct PlaybackSource {
    descriptor: &'static BoardDescriptor,
    recording: BoardData,
    cursor: usize,
    produced: u64,
    start_epoch: f64,
}

impl PlaybackSource {
    pub fn new(descriptor: &'static BoardDescriptor, recording: BoardData) -> SigResult<Self> {
        if recording.num_rows() != descriptor.num_rows {
            return Err(SigError::DimensionMismatch {
                rows: descriptor.num_rows,
                values: recording.num_rows(),
            });
        }
        if recording.is_empty() {
            return Err(SigError::Source {
                reason: "recording is empty".to_string(),
            });
        }
        Ok(PlaybackSource {
            descriptor,
            recording,
            cursor: 0,
            produced: 0,
            start_epoch: now_epoch(),
        })
    }

    /// Number of samples in the underlying recording
    pub fn recording_len(&self) -> usize {
        self.recording.num_samples()
    }
}

impl SampleSource for PlaybackSource {
    fn descriptor(&self) -> &'static BoardDescriptor {
        self.descriptor
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.produced = 0;
        self.start_epoch = now_epoch();
    }

    fn generate(&mut self, count: usize) -> Vec<Vec<f64>> {
        let descr = self.descriptor;
        let dt = 1.0 / descr.sampling_rate;
        let mut packages = Vec::with_capacity(count);

        for _ in 0..count {
            // cursor is always in range: the recording is non-empty
            let mut package = self
                .recording
                .sample(self.cursor)
                .expect("cursor within recording");
            package[descr.timestamp_row] = self.start_epoch + self.produced as f64 * dt;

            packages.push(package);
            self.cursor = (self.cursor + 1) % self.recording.num_samples();
            self.produced += 1;
        }

        packages
    }
}

fn now_epoch() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs_f64()
}
