//! Board models, package geometry and connection parameters

use crate::error::{SigError, SigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Boards a session can be opened against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardModel {
    /// Simulated 8-channel ExG board
    Synthetic,
    /// Replays a previously saved recording
    Playback,
}

impl BoardModel {
    /// Package geometry for this board
    pub fn descriptor(&self) -> &'static BoardDescriptor {
        match self {
            BoardModel::Synthetic => &SYNTHETIC_DESCRIPTOR,
            // Playback reuses the synthetic geometry unless the recording
            // was made by another master board.
            BoardModel::Playback => &SYNTHETIC_DESCRIPTOR,
        }
    }
}

impl fmt::Display for BoardModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardModel::Synthetic => write!(f, "synthetic"),
            BoardModel::Playback => write!(f, "playback"),
        }
    }
}

/// Static layout of one board's sample packages.
///
/// A fetched matrix has `num_rows` rows; each column is one sample package
/// with the timestamp appended as the last row.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardDescriptor {
    /// Human-readable board name
    pub name: &'static str,
    /// Sampling rate in Hz
    pub sampling_rate: f64,
    /// Row carrying the wrapping package counter
    pub package_num_row: usize,
    /// Rows carrying ExG channel data (microvolts)
    pub exg_rows: &'static [usize],
    /// Rows carrying accelerometer data
    pub accel_rows: &'static [usize],
    /// Row carrying the unix timestamp in seconds
    pub timestamp_row: usize,
    /// Total number of rows in a fetched matrix
    pub num_rows: usize,
}

impl BoardDescriptor {
    /// Number of ExG channels
    pub fn exg_channel_count(&self) -> usize {
        self.exg_rows.len()
    }

    /// Duration in seconds covered by `samples` packages
    pub fn duration_of(&self, samples: usize) -> f64 {
        samples as f64 / self.sampling_rate
    }
}

/// Reference geometry: 250 Hz, counter + 8 ExG + 3 accelerometer values per
/// package, timestamp appended as the final row.
pub static SYNTHETIC_DESCRIPTOR: BoardDescriptor = BoardDescriptor {
    name: "synthetic",
    sampling_rate: 250.0,
    package_num_row: 0,
    exg_rows: &[1, 2, 3, 4, 5, 6, 7, 8],
    accel_rows: &[9, 10, 11],
    timestamp_row: 12,
    num_rows: 13,
};

/// Connection parameters handed to session preparation.
///
/// Serializes to and from JSON; only the fields relevant to the chosen board
/// need to be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Serial port name for wired boards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_port: Option<String>,
    /// Recording to replay (playback board)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Board whose geometry the recording uses (playback board)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_board: Option<BoardModel>,
    /// Random seed for simulated sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ConnectionParams {
    /// Parse parameters from their JSON representation
    pub fn from_json(json: &str) -> SigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render parameters as JSON
    pub fn to_json(&self) -> SigResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Validate the parameters against the board they will be used with
    pub fn validate_for(&self, board: BoardModel) -> SigResult<()> {
        match board {
            BoardModel::Synthetic => Ok(()),
            BoardModel::Playback => {
                if self.file.is_none() {
                    return Err(SigError::InvalidArgument {
                        reason: "playback board requires a recording file".to_string(),
                    });
                }
                Ok(())
            }
        }
    }
}
