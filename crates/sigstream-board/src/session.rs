//! BoardSession: lifecycle and data retrieval for one board connection

use crate::buffer::SampleBuffer;
use crate::source::{PlaybackSource, SampleSource, SyntheticConfig, SyntheticSource};
use parking_lot::Mutex;
use sigstream_core::{
    csv, BoardData, BoardDescriptor, BoardModel, ConnectionParams, SigError, SigResult,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Prepared and idle; data from a previous stream stays retrievable
    Prepared,
    /// Producer task is running
    Streaming,
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Prepared => "prepared",
            SessionState::Streaming => "streaming",
        }
    }
}

/// Settings for one streaming run
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Ring buffer capacity in sample packages
    pub buffer_capacity: usize,
    /// How often the producer wakes up to emit accumulated samples
    pub tick_interval: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            // One hour at the reference 250 Hz rate
            buffer_capacity: 3600 * 250,
            tick_interval: Duration::from_millis(10),
        }
    }
}

struct StreamTask {
    stop: watch::Sender<bool>,
    handle: JoinHandle<Box<dyn SampleSource>>,
}

/// Handle to an open board connection.
///
/// Created by [`BoardSession::prepare`], driven through
/// `start_stream`/`stop_stream`, emptied through the retrieval calls and
/// torn down by [`BoardSession::release`] (or drop).
pub struct BoardSession {
    id: Uuid,
    board: BoardModel,
    descriptor: &'static BoardDescriptor,
    state: SessionState,
    buffer: Arc<Mutex<SampleBuffer>>,
    source: Option<Box<dyn SampleSource>>,
    stream: Option<StreamTask>,
}

impl std::fmt::Debug for BoardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardSession")
            .field("id", &self.id)
            .field("board", &self.board)
            .field("state", &self.state)
            .field("streaming", &self.stream.is_some())
            .finish()
    }
}

impl BoardSession {
    /// Open a session against `board`.
    ///
    /// Playback boards load and validate their recording here, so a bad file
    /// fails the session before any streaming starts.
    pub fn prepare(board: BoardModel, params: ConnectionParams) -> SigResult<Self> {
        params.validate_for(board)?;

        let source: Box<dyn SampleSource> = match board {
            BoardModel::Synthetic => {
                let config = SyntheticConfig {
                    seed: params.seed,
                    ..Default::default()
                };
                Box::new(SyntheticSource::new(board.descriptor(), config)?)
            }
            BoardModel::Playback => {
                let descriptor = params
                    .master_board
                    .unwrap_or(BoardModel::Synthetic)
                    .descriptor();
                let path = params.file.clone().ok_or_else(|| SigError::InvalidArgument {
                    reason: "playback board requires a recording file".to_string(),
                })?;
                let recording = csv::read_csv(&path, descriptor.num_rows)?;
                debug!(
                    samples = recording.num_samples(),
                    file = %path.display(),
                    "loaded playback recording"
                );
                Box::new(PlaybackSource::new(descriptor, recording)?)
            }
        };

        let descriptor = source.descriptor();
        let id = Uuid::new_v4();
        info!(session = %id, board = %board, rate = descriptor.sampling_rate, "session prepared");

        Ok(BoardSession {
            id,
            board,
            descriptor,
            state: SessionState::Prepared,
            buffer: Arc::new(Mutex::new(SampleBuffer::new(
                StreamSettings::default().buffer_capacity,
            ))),
            source: Some(source),
            stream: None,
        })
    }

    /// Session identifier used in logs
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Board this session is connected to
    pub fn board(&self) -> BoardModel {
        self.board
    }

    /// Package geometry of the connected board
    pub fn descriptor(&self) -> &'static BoardDescriptor {
        self.descriptor
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Start the producer task. Replaces the ring buffer, so samples from a
    /// previous run are gone once a new stream starts.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_stream(&mut self, settings: StreamSettings) -> SigResult<()> {
        if self.state == SessionState::Streaming {
            return Err(SigError::SessionState {
                operation: "start stream",
                state: self.state.name(),
            });
        }
        let mut source = self.source.take().ok_or_else(|| SigError::Source {
            reason: "sample source unavailable".to_string(),
        })?;

        self.buffer = Arc::new(Mutex::new(SampleBuffer::new(settings.buffer_capacity)));
        let buffer = Arc::clone(&self.buffer);
        let rate = self.descriptor.sampling_rate;
        let tick = settings.tick_interval;
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(tick);
            let started = Instant::now();
            let mut produced: u64 = 0;
            source.reset();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // Emit however many samples the wall clock owes us,
                        // so the rate stays exact across missed ticks.
                        let target = (started.elapsed().as_secs_f64() * rate) as u64;
                        if target > produced {
                            let batch = source.generate((target - produced) as usize);
                            produced = target;
                            buffer.lock().extend(batch);
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            source
        });

        self.stream = Some(StreamTask {
            stop: stop_tx,
            handle,
        });
        self.state = SessionState::Streaming;
        info!(
            session = %self.id,
            capacity = settings.buffer_capacity,
            "stream started"
        );
        Ok(())
    }

    /// Stop the producer task. Buffered samples stay retrievable.
    pub async fn stop_stream(&mut self) -> SigResult<()> {
        let task = self.stream.take().ok_or(SigError::SessionState {
            operation: "stop stream",
            state: self.state.name(),
        })?;

        let _ = task.stop.send(true);
        match task.handle.await {
            Ok(source) => self.source = Some(source),
            Err(e) => {
                self.state = SessionState::Prepared;
                return Err(SigError::Source {
                    reason: format!("stream task failed: {}", e),
                });
            }
        }
        self.state = SessionState::Prepared;

        let (len, discarded) = {
            let buffer = self.buffer.lock();
            (buffer.len(), buffer.discarded())
        };
        if discarded > 0 {
            warn!(
                session = %self.id,
                discarded,
                "ring buffer overflowed; oldest samples were dropped"
            );
        }
        info!(session = %self.id, buffered = len, "stream stopped");
        Ok(())
    }

    /// Number of buffered samples
    pub fn data_count(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Drain the whole buffer into a matrix, oldest sample first
    pub fn board_data(&mut self) -> SigResult<BoardData> {
        let packages = self.buffer.lock().drain_all();
        BoardData::from_packages(self.descriptor.num_rows, &packages)
    }

    /// Latest `count` samples (or fewer) without draining the buffer
    pub fn current_board_data(&self, count: usize) -> SigResult<BoardData> {
        let packages = self.buffer.lock().peek_latest(count);
        BoardData::from_packages(self.descriptor.num_rows, &packages)
    }

    /// The most recent sample, if any
    pub fn immediate_board_data(&self) -> SigResult<BoardData> {
        self.current_board_data(1)
    }

    /// Stop streaming if needed and close the session
    pub async fn release(mut self) -> SigResult<()> {
        if self.state == SessionState::Streaming {
            self.stop_stream().await?;
        }
        info!(session = %self.id, "session released");
        Ok(())
    }
}

impl Drop for BoardSession {
    fn drop(&mut self) {
        if let Some(task) = self.stream.take() {
            task.handle.abort();
            warn!(session = %self.id, "session dropped while streaming; producer aborted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn test_settings() -> StreamSettings {
        StreamSettings {
            buffer_capacity: 10_000,
            tick_interval: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn test_stream_produces_data() {
        let mut session =
            BoardSession::prepare(BoardModel::Synthetic, ConnectionParams::default()).unwrap();
        assert_eq!(session.state(), SessionState::Prepared);
        assert_eq!(session.data_count(), 0);

        session.start_stream(test_settings()).unwrap();
        sleep(Duration::from_millis(200)).await;
        session.stop_stream().await.unwrap();

        // 200ms at 250 Hz is ~50 samples; leave slack for timing jitter
        let count = session.data_count();
        assert!(count >= 20, "only {} samples buffered", count);

        let data = session.board_data().unwrap();
        assert_eq!(data.num_rows(), session.descriptor().num_rows);
        assert_eq!(data.num_samples(), count);

        // Draining empties the buffer
        assert_eq!(session.data_count(), 0);
        session.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_current_data_peeks_without_draining() {
        let mut session =
            BoardSession::prepare(BoardModel::Synthetic, ConnectionParams::default()).unwrap();
        session.start_stream(test_settings()).unwrap();
        sleep(Duration::from_millis(150)).await;
        session.stop_stream().await.unwrap();

        let count = session.data_count();
        assert!(count > 5);

        let latest = session.current_board_data(5).unwrap();
        assert_eq!(latest.num_samples(), 5);
        assert_eq!(session.data_count(), count);

        let immediate = session.immediate_board_data().unwrap();
        assert_eq!(immediate.num_samples(), 1);

        session.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_double_start_is_state_error() {
        let mut session =
            BoardSession::prepare(BoardModel::Synthetic, ConnectionParams::default()).unwrap();
        session.start_stream(test_settings()).unwrap();

        let err = session.start_stream(test_settings()).unwrap_err();
        assert!(matches!(err, SigError::SessionState { .. }));

        session.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_without_start_is_state_error() {
        let mut session =
            BoardSession::prepare(BoardModel::Synthetic, ConnectionParams::default()).unwrap();
        let err = session.stop_stream().await.unwrap_err();
        assert!(matches!(err, SigError::SessionState { .. }));
    }

    #[tokio::test]
    async fn test_restart_replaces_buffer() {
        let mut session =
            BoardSession::prepare(BoardModel::Synthetic, ConnectionParams::default()).unwrap();

        session.start_stream(test_settings()).unwrap();
        sleep(Duration::from_millis(100)).await;
        session.stop_stream().await.unwrap();
        let first = session.data_count();
        assert!(first > 0);

        session.start_stream(test_settings()).unwrap();
        sleep(Duration::from_millis(50)).await;
        session.stop_stream().await.unwrap();

        // Old samples are gone; only the new run is buffered
        assert!(session.data_count() < first + 30);
        session.release().await.unwrap();
    }

    #[test]
    fn test_prepare_playback_without_file_fails() {
        let err =
            BoardSession::prepare(BoardModel::Playback, ConnectionParams::default()).unwrap_err();
        assert!(matches!(err, SigError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_release_while_streaming() {
        let mut session =
            BoardSession::prepare(BoardModel::Synthetic, ConnectionParams::default()).unwrap();
        session.start_stream(test_settings()).unwrap();
        sleep(Duration::from_millis(50)).await;
        session.release().await.unwrap();
    }
}
