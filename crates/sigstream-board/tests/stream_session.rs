//! Live streaming behavior of BoardSession

use sigstream_board::{BoardSession, StreamSettings};
use sigstream_core::{BoardModel, ConnectionParams};
use std::time::Duration;

fn fast_settings() -> StreamSettings {
    StreamSettings {
        buffer_capacity: 50_000,
        tick_interval: Duration::from_millis(5),
    }
}

#[tokio::test]
async fn streamed_matrix_is_well_formed() {
    let params = ConnectionParams {
        seed: Some(42),
        ..Default::default()
    };
    let mut session = BoardSession::prepare(BoardModel::Synthetic, params).unwrap();
    let descriptor = session.descriptor();

    session.start_stream(fast_settings()).unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    session.stop_stream().await.unwrap();

    let data = session.board_data().unwrap();
    assert_eq!(data.num_rows(), descriptor.num_rows);
    assert!(data.num_samples() >= 50, "got {} samples", data.num_samples());

    // Timestamps never go backwards
    let timestamps = data.row(descriptor.timestamp_row).unwrap();
    assert!(timestamps.windows(2).all(|w| w[1] >= w[0]));

    // Package counters advance by one, wrapping at 256
    let counters = data.row(descriptor.package_num_row).unwrap();
    for pair in counters.windows(2) {
        let expected = (pair[0] + 1.0) % 256.0;
        assert_eq!(pair[1], expected);
    }

    session.release().await.unwrap();
}

#[tokio::test]
async fn tiny_buffer_keeps_newest_samples() {
    let params = ConnectionParams {
        seed: Some(1),
        ..Default::default()
    };
    let mut session = BoardSession::prepare(BoardModel::Synthetic, params).unwrap();
    let settings = StreamSettings {
        buffer_capacity: 10,
        tick_interval: Duration::from_millis(5),
    };

    session.start_stream(settings).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    session.stop_stream().await.unwrap();

    // 300ms at 250 Hz produces far more than 10 samples; the buffer holds
    // only the newest ones
    assert_eq!(session.data_count(), 10);

    let descriptor = session.descriptor();
    let data = session.board_data().unwrap();
    let timestamps = data.row(descriptor.timestamp_row).unwrap();
    assert!(timestamps.windows(2).all(|w| w[1] >= w[0]));

    session.release().await.unwrap();
}
