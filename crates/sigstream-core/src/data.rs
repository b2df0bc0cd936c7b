//! BoardData: channels-by-samples matrix fetched from a session

use crate::error::{SigError, SigResult};
use serde::{Deserialize, Serialize};

/// Two-dimensional sample buffer.
///
/// Rows are channels (in board-descriptor order, timestamp last), columns
/// are samples. Values are stored row-major in one flat allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardData {
    num_rows: usize,
    num_samples: usize,
    values: Vec<f64>,
}

impl BoardData {
    /// Build a matrix from a flat row-major buffer
    pub fn new(num_rows: usize, values: Vec<f64>) -> SigResult<Self> {
        if num_rows == 0 {
            return Err(SigError::InvalidArgument {
                reason: "matrix must have at least one row".to_string(),
            });
        }
        if values.len() % num_rows != 0 {
            return Err(SigError::DimensionMismatch {
                rows: num_rows,
                values: values.len(),
            });
        }
        let num_samples = values.len() / num_rows;
        Ok(BoardData {
            num_rows,
            num_samples,
            values,
        })
    }

    /// Empty matrix with the given row count
    pub fn empty(num_rows: usize) -> SigResult<Self> {
        Self::new(num_rows, Vec::new())
    }

    /// Build a matrix from per-sample packages (one column each).
    ///
    /// Every package must carry exactly `num_rows` values.
    pub fn from_packages(num_rows: usize, packages: &[Vec<f64>]) -> SigResult<Self> {
        let mut values = vec![0.0; num_rows * packages.len()];
        for (col, package) in packages.iter().enumerate() {
            if package.len() != num_rows {
                return Err(SigError::DimensionMismatch {
                    rows: num_rows,
                    values: package.len(),
                });
            }
            for (row, &value) in package.iter().enumerate() {
                values[row * packages.len() + col] = value;
            }
        }
        Self::new(num_rows, values)
    }

    /// Number of rows (channels)
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of samples per row
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// True when no samples are buffered
    pub fn is_empty(&self) -> bool {
        self.num_samples == 0
    }

    /// One channel as a slice
    pub fn row(&self, row: usize) -> SigResult<&[f64]> {
        self.check_row(row)?;
        let start = row * self.num_samples;
        Ok(&self.values[start..start + self.num_samples])
    }

    /// One channel as a mutable slice
    pub fn row_mut(&mut self, row: usize) -> SigResult<&mut [f64]> {
        self.check_row(row)?;
        let start = row * self.num_samples;
        Ok(&mut self.values[start..start + self.num_samples])
    }

    /// One sample (column) gathered across all rows
    pub fn sample(&self, col: usize) -> SigResult<Vec<f64>> {
        if col >= self.num_samples {
            return Err(SigError::InvalidArgument {
                reason: format!(
                    "sample {} out of range (matrix has {} samples)",
                    col, self.num_samples
                ),
            });
        }
        Ok((0..self.num_rows)
            .map(|row| self.values[row * self.num_samples + col])
            .collect())
    }

    /// Flat row-major view of the whole matrix
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Summary statistics for one row
    pub fn row_stats(&self, row: usize) -> SigResult<ChannelStats> {
        Ok(ChannelStats::calculate(self.row(row)?))
    }

    fn check_row(&self, row: usize) -> SigResult<()> {
        if row >= self.num_rows {
            return Err(SigError::RowOutOfRange {
                row,
                num_rows: self.num_rows,
            });
        }
        Ok(())
    }
}

/// Basic statistics for one channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelStats {
    pub mean: f64,
    pub rms: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub peak_to_peak: f64,
}

impl ChannelStats {
    pub fn calculate(data: &[f64]) -> Self {
        if data.is_empty() {
            return Self {
                mean: 0.0,
                rms: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
                peak_to_peak: 0.0,
            };
        }

        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let rms = (data.iter().map(|x| x * x).sum::<f64>() / n).sqrt();
        let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let min = data.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max = data.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

        Self {
            mean,
            rms,
            std_dev: variance.sqrt(),
            min,
            max,
            peak_to_peak: max - min,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_from_flat_buffer() {
        let data = BoardData::new(2, vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0]).unwrap();
        assert_eq!(data.num_rows(), 2);
        assert_eq!(data.num_samples(), 3);
        assert_eq!(data.row(0).unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(data.row(1).unwrap(), &[10.0, 20.0, 30.0]);
        assert_eq!(data.sample(1).unwrap(), vec![2.0, 20.0]);
    }

    #[test]
    fn test_matrix_rejects_ragged_buffer() {
        assert!(BoardData::new(3, vec![1.0, 2.0, 3.0, 4.0]).is_err());
        assert!(BoardData::new(0, vec![]).is_err());
    }

    #[test]
    fn test_from_packages_transposes() {
        // Two packages of three rows each become columns
        let packages = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let data = BoardData::from_packages(3, &packages).unwrap();
        assert_eq!(data.num_samples(), 2);
        assert_eq!(data.row(0).unwrap(), &[1.0, 4.0]);
        assert_eq!(data.row(2).unwrap(), &[3.0, 6.0]);
        assert_eq!(data.sample(0).unwrap(), packages[0]);
    }

    #[test]
    fn test_from_packages_rejects_short_package() {
        let packages = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0]];
        assert!(BoardData::from_packages(3, &packages).is_err());
    }

    #[test]
    fn test_row_out_of_range() {
        let mut data = BoardData::new(2, vec![0.0; 4]).unwrap();
        assert!(data.row(2).is_err());
        assert!(data.row_mut(5).is_err());
    }

    #[test]
    fn test_channel_stats() {
        let stats = ChannelStats::calculate(&[1.0, -1.0, 1.0, -1.0]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.rms, 1.0);
        assert_eq!(stats.peak_to_peak, 2.0);

        let empty = ChannelStats::calculate(&[]);
        assert_eq!(empty.mean, 0.0);
        assert_eq!(empty.rms, 0.0);
    }
}
