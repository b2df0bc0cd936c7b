//! sigstream-board: Session lifecycle and sample streaming
//!
//! Opens sessions against simulated or file-backed boards, streams sample
//! packages into a bounded ring buffer and hands them out as matrices.

pub mod buffer;
pub mod session;
pub mod source;

pub use buffer::SampleBuffer;
pub use session::{BoardSession, SessionState, StreamSettings};
pub use source::{PlaybackSource, SampleSource, SyntheticConfig, SyntheticSource};
