//! Trend removal for individual channels

use serde::{Deserialize, Serialize};

/// Trend model to subtract from a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Detrend {
    /// Subtract the channel mean (DC offset removal)
    Constant,
    /// Subtract the least-squares line
    Linear,
}

/// Remove the selected trend from `data` in place.
///
/// Empty and single-sample channels are left untouched.
pub fn detrend(data: &mut [f64], mode: Detrend) {
    if data.is_empty() {
        return;
    }

    match mode {
        Detrend::Constant => {
            let mean = data.iter().sum::<f64>() / data.len() as f64;
            for value in data.iter_mut() {
                *value -= mean;
            }
        }
        Detrend::Linear => {
            if data.len() < 2 {
                data[0] = 0.0;
                return;
            }
            let n = data.len() as f64;
            let sum_x = (n - 1.0) * n / 2.0;
            let sum_x2 = (n - 1.0) * n * (2.0 * n - 1.0) / 6.0;
            let sum_y: f64 = data.iter().sum();
            let sum_xy: f64 = data
                .iter()
                .enumerate()
                .map(|(i, &y)| i as f64 * y)
                .sum();

            let denom = n * sum_x2 - sum_x * sum_x;
            let slope = (n * sum_xy - sum_x * sum_y) / denom;
            let intercept = (sum_y - slope * sum_x) / n;

            for (i, value) in data.iter_mut().enumerate() {
                *value -= intercept + slope * i as f64;
            }
        }
    }
}
