//! DataHandler: persistence and conditioning context for fetched data

use crate::detrend::{detrend, Detrend};
use crate::filters;
use sigstream_core::{csv, BoardData, BoardModel, SigError, SigResult};
use std::path::Path;
use tracing::debug;

/// Filter order used by the conditioning shortcuts
const CONDITIONING_ORDER: usize = 4;

/// Wraps a fetched matrix together with the board that produced it, so
/// conditioning knows the sampling rate and which rows carry ExG data.
///
/// Auxiliary rows (package counter, accelerometer, timestamp) are never
/// touched by the conditioning operations.
#[derive(Debug, Clone)]
pub struct DataHandler {
    board: BoardModel,
    data: BoardData,
}

impl DataHandler {
    /// Wrap an in-memory matrix
    pub fn from_matrix(board: BoardModel, data: BoardData) -> SigResult<Self> {
        let expected = board.descriptor().num_rows;
        if data.num_rows() != expected {
            return Err(SigError::DimensionMismatch {
                rows: expected,
                values: data.num_rows(),
            });
        }
        Ok(DataHandler { board, data })
    }

    /// Load a recording previously written with [`DataHandler::save_csv`]
    pub fn from_csv(board: BoardModel, path: &Path) -> SigResult<Self> {
        let data = csv::read_csv(path, board.descriptor().num_rows)?;
        debug!(samples = data.num_samples(), file = %path.display(), "recording loaded");
        Self::from_matrix(board, data)
    }

    /// Write the current matrix to a CSV recording
    pub fn save_csv(&self, path: &Path) -> SigResult<()> {
        csv::write_csv(&self.data, path)?;
        debug!(samples = self.data.num_samples(), file = %path.display(), "recording saved");
        Ok(())
    }

    /// Subtract each ExG channel's mean
    pub fn remove_dc_offset(&mut self) -> SigResult<()> {
        for &row in self.board.descriptor().exg_rows {
            detrend(self.data.row_mut(row)?, Detrend::Constant);
        }
        debug!(board = %self.board, "DC offset removed");
        Ok(())
    }

    /// Band-limit each ExG channel to `(low_hz, high_hz)`
    pub fn bandpass(&mut self, low_hz: f64, high_hz: f64) -> SigResult<()> {
        let descriptor = self.board.descriptor();
        for &row in descriptor.exg_rows {
            filters::bandpass(
                self.data.row_mut(row)?,
                descriptor.sampling_rate,
                low_hz,
                high_hz,
                CONDITIONING_ORDER,
            )?;
        }
        debug!(board = %self.board, low_hz, high_hz, "bandpass applied");
        Ok(())
    }

    /// Notch out mains interference on each ExG channel
    pub fn remove_mains(&mut self, freq_hz: f64) -> SigResult<()> {
        let descriptor = self.board.descriptor();
        for &row in descriptor.exg_rows {
            filters::notch(self.data.row_mut(row)?, descriptor.sampling_rate, freq_hz, 30.0)?;
        }
        debug!(board = %self.board, freq_hz, "mains interference removed");
        Ok(())
    }

    /// Board that produced the wrapped matrix
    pub fn board(&self) -> BoardModel {
        self.board
    }

    /// Wrapped matrix
    pub fn data(&self) -> &BoardData {
        &self.data
    }

    /// Unwrap the matrix
    pub fn into_data(self) -> BoardData {
        self.data
    }
}
