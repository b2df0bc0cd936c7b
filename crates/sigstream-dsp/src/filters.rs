//! IIR filters over channel slices
//!
//! Second-order sections with RBJ cookbook coefficients, cascaded with the
//! Butterworth Q schedule for higher orders. Filtering is causal and
//! single-pass; state starts at zero for every call.

use sigstream_core::{SigError, SigResult};
use std::f64::consts::PI;

/// Largest accepted filter order
pub const MAX_ORDER: usize = 8;

/// One second-order section, Direct Form I
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl Biquad {
    fn from_coeffs(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Biquad {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// RBJ lowpass section
    pub fn lowpass(fs: f64, cutoff: f64, q: f64) -> Self {
        let omega = 2.0 * PI * cutoff / fs;
        let alpha = omega.sin() / (2.0 * q);
        let cos_omega = omega.cos();

        Self::from_coeffs(
            (1.0 - cos_omega) / 2.0,
            1.0 - cos_omega,
            (1.0 - cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    /// RBJ highpass section
    pub fn highpass(fs: f64, cutoff: f64, q: f64) -> Self {
        let omega = 2.0 * PI * cutoff / fs;
        let alpha = omega.sin() / (2.0 * q);
        let cos_omega = omega.cos();

        Self::from_coeffs(
            (1.0 + cos_omega) / 2.0,
            -(1.0 + cos_omega),
            (1.0 + cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    /// RBJ notch section
    pub fn notch(fs: f64, freq: f64, q: f64) -> Self {
        let omega = 2.0 * PI * freq / fs;
        let alpha = omega.sin() / (2.0 * q);
        let cos_omega = omega.cos();

        Self::from_coeffs(
            1.0,
            -2.0 * cos_omega,
            1.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    /// Advance the section by one sample
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Run the section over a whole channel in place
    pub fn apply(&mut self, data: &mut [f64]) {
        for value in data.iter_mut() {
            *value = self.process(*value);
        }
    }
}

/// Butterworth Q values for an even-order cascade
fn butterworth_qs(order: usize) -> Vec<f64> {
    let sections = order / 2;
    (0..sections)
        .map(|k| {
            let theta = PI * (2.0 * k as f64 + 1.0) / (2.0 * order as f64);
            1.0 / (2.0 * theta.cos())
        })
        .collect()
}

fn check_order(order: usize) -> SigResult<()> {
    if order == 0 || order % 2 != 0 || order > MAX_ORDER {
        return Err(SigError::InvalidArgument {
            reason: format!(
                "filter order must be a positive even number <= {}, got {}",
                MAX_ORDER, order
            ),
        });
    }
    Ok(())
}

fn check_cutoff(fs: f64, cutoff: f64) -> SigResult<()> {
    if fs <= 0.0 {
        return Err(SigError::InvalidArgument {
            reason: format!("sampling rate must be positive, got {}", fs),
        });
    }
    if cutoff <= 0.0 || cutoff >= fs / 2.0 {
        return Err(SigError::InvalidArgument {
            reason: format!(
                "cutoff must lie in (0, {} Hz), got {} Hz",
                fs / 2.0,
                cutoff
            ),
        });
    }
    Ok(())
}

/// Butterworth lowpass, applied in place
pub fn lowpass(data: &mut [f64], fs: f64, cutoff: f64, order: usize) -> SigResult<()> {
    check_order(order)?;
    check_cutoff(fs, cutoff)?;

    for q in butterworth_qs(order) {
        Biquad::lowpass(fs, cutoff, q).apply(data);
    }
    Ok(())
}

/// Butterworth highpass, applied in place
pub fn highpass(data: &mut [f64], fs: f64, cutoff: f64, order: usize) -> SigResult<()> {
    check_order(order)?;
    check_cutoff(fs, cutoff)?;

    for q in butterworth_qs(order) {
        Biquad::highpass(fs, cutoff, q).apply(data);
    }
    Ok(())
}

/// Band-limit a channel to `(low_cutoff, high_cutoff)` Hz, applied in place.
///
/// Implemented as a highpass at the low corner cascaded with a lowpass at
/// the high corner, each of the given order.
pub fn bandpass(
    data: &mut [f64],
    fs: f64,
    low_cutoff: f64,
    high_cutoff: f64,
    order: usize,
) -> SigResult<()> {
    if low_cutoff >= high_cutoff {
        return Err(SigError::InvalidArgument {
            reason: format!(
                "bandpass corners must satisfy low < high, got {} >= {}",
                low_cutoff, high_cutoff
            ),
        });
    }
    check_order(order)?;
    check_cutoff(fs, low_cutoff)?;
    check_cutoff(fs, high_cutoff)?;

    for q in butterworth_qs(order) {
        Biquad::highpass(fs, low_cutoff, q).apply(data);
    }
    for q in butterworth_qs(order) {
        Biquad::lowpass(fs, high_cutoff, q).apply(data);
    }
    Ok(())
}

/// Notch out a single frequency, applied in place
pub fn notch(data: &mut [f64], fs: f64, freq: f64, q: f64) -> SigResult<()> {
    check_cutoff(fs, freq)?;
    if q <= 0.0 {
        return Err(SigError::InvalidArgument {
            reason: format!("notch quality factor must be positive, got {}", q),
        });
    }

    Biquad::notch(fs, freq, q).apply(data);
    Ok(())
}
