//! Spectral estimation for individual channels

use num_complex::Complex;
use realfft::RealFftPlanner;
use sigstream_core::{SigError, SigResult};
use std::f64::consts::PI;

/// One-sided power spectral density
#[derive(Debug, Clone)]
pub struct PowerSpectrum {
    /// Power per bin (unit²/Hz)
    pub power: Vec<f64>,
    /// Bin center frequencies in Hz
    pub freqs: Vec<f64>,
}

fn hann(i: usize, n: usize) -> f64 {
    0.5 * (1.0 - (2.0 * PI * i as f64 / (n - 1) as f64).cos())
}

/// Hann-windowed one-sided periodogram of `data`
pub fn psd(data: &[f64], fs: f64) -> SigResult<PowerSpectrum> {
    if fs <= 0.0 {
        return Err(SigError::InvalidArgument {
            reason: format!("sampling rate must be positive, got {}", fs),
        });
    }
    if data.len() < 2 {
        return Err(SigError::InvalidArgument {
            reason: format!("need at least 2 samples for a spectrum, got {}", data.len()),
        });
    }

    let n = data.len();
    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let mut input: Vec<f64> = data
        .iter()
        .enumerate()
        .map(|(i, &x)| x * hann(i, n))
        .collect();
    let mut spectrum: Vec<Complex<f64>> = fft.make_output_vec();
    fft.process(&mut input, &mut spectrum)
        .map_err(|e| SigError::InvalidArgument {
            reason: format!("FFT failed: {}", e),
        })?;

    let window_power: f64 = (0..n).map(|i| hann(i, n).powi(2)).sum();
    let scale = 1.0 / (fs * window_power);

    let bins = spectrum.len();
    let mut power = Vec::with_capacity(bins);
    let mut freqs = Vec::with_capacity(bins);
    for (i, value) in spectrum.iter().enumerate() {
        let mut p = value.norm_sqr() * scale;
        // One-sided: double everything except DC and (for even n) Nyquist
        let is_nyquist = n % 2 == 0 && i == bins - 1;
        if i > 0 && !is_nyquist {
            p *= 2.0;
        }
        power.push(p);
        freqs.push(i as f64 * fs / n as f64);
    }

    Ok(PowerSpectrum { power, freqs })
}

/// Integrate a spectrum over `[low, high]` Hz (trapezoidal rule)
pub fn band_power(spectrum: &PowerSpectrum, low: f64, high: f64) -> SigResult<f64> {
    if low < 0.0 || low >= high {
        return Err(SigError::InvalidArgument {
            reason: format!("band must satisfy 0 <= low < high, got [{}, {}]", low, high),
        });
    }

    let mut total = 0.0;
    for i in 1..spectrum.freqs.len() {
        let (f0, f1) = (spectrum.freqs[i - 1], spectrum.freqs[i]);
        if f1 < low || f0 > high {
            continue;
        }
        total += 0.5 * (spectrum.power[i - 1] + spectrum.power[i]) * (f1 - f0);
    }
    Ok(total)
}
