//! Full acquire -> persist -> condition -> replay pipeline

use sigstream_board::{BoardSession, StreamSettings};
use sigstream_core::{BoardModel, ConnectionParams};
use sigstream_dsp::DataHandler;
use std::time::Duration;

fn fast_settings() -> StreamSettings {
    StreamSettings {
        buffer_capacity: 50_000,
        tick_interval: Duration::from_millis(5),
    }
}

#[tokio::test]
async fn acquire_persist_condition_replay() {
    let dir = tempfile::tempdir().unwrap();
    let raw_path = dir.path().join("session.csv");

    // Acquire a short synthetic recording
    let params = ConnectionParams {
        seed: Some(123),
        ..Default::default()
    };
    let mut session = BoardSession::prepare(BoardModel::Synthetic, params).unwrap();
    session.start_stream(fast_settings()).unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    session.stop_stream().await.unwrap();

    let data = session.board_data().unwrap();
    assert!(!data.is_empty());
    session.release().await.unwrap();

    // Persist and reload: the matrix survives the CSV round trip
    let handler = DataHandler::from_matrix(BoardModel::Synthetic, data.clone()).unwrap();
    handler.save_csv(&raw_path).unwrap();
    let reloaded = DataHandler::from_csv(BoardModel::Synthetic, &raw_path).unwrap();
    assert_eq!(reloaded.data(), &data);

    // Condition the reloaded recording
    let descriptor = BoardModel::Synthetic.descriptor();
    let mut conditioned = reloaded;
    conditioned.remove_dc_offset().unwrap();
    conditioned.bandpass(1.0, 50.0).unwrap();

    for &row in descriptor.exg_rows {
        let stats = conditioned.data().row_stats(row).unwrap();
        assert!(stats.mean.abs() < 1.0, "row {} mean {}", row, stats.mean);
    }
    // Aux rows are untouched by conditioning
    assert_eq!(
        conditioned.data().row(descriptor.package_num_row).unwrap(),
        data.row(descriptor.package_num_row).unwrap()
    );
    assert_eq!(
        conditioned.data().row(descriptor.timestamp_row).unwrap(),
        data.row(descriptor.timestamp_row).unwrap()
    );

    // The saved file can back a playback session
    let playback_params = ConnectionParams {
        file: Some(raw_path.clone()),
        master_board: Some(BoardModel::Synthetic),
        ..Default::default()
    };
    let mut replay = BoardSession::prepare(BoardModel::Playback, playback_params).unwrap();
    replay.start_stream(fast_settings()).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    replay.stop_stream().await.unwrap();

    let replayed = replay.board_data().unwrap();
    assert!(!replayed.is_empty());
    assert_eq!(replayed.num_rows(), descriptor.num_rows);

    // Replayed ExG values come from the recording
    let exg_row = descriptor.exg_rows[0];
    let original = data.row(exg_row).unwrap();
    let replayed_exg = replayed.row(exg_row).unwrap();
    let n = replayed_exg.len().min(original.len());
    assert_eq!(&replayed_exg[..n], &original[..n]);

    replay.release().await.unwrap();
}
