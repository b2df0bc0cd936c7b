//! sigstream demo binary
//!
//! Streams from a (simulated or file-backed) board for a fixed duration,
//! saves the buffered data, conditions it and saves the result:
//! prepare → start → wait → stop → fetch → save → detrend + bandpass → save.

use anyhow::Context;
use clap::Parser;
use sigstream_board::{BoardSession, StreamSettings};
use sigstream_core::{BoardModel, ChannelStats, ConnectionParams};
use sigstream_dsp::{band_power, psd, DataHandler};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
enum BoardArg {
    /// Simulated 8-channel ExG board
    Synthetic,
    /// Replay a saved recording
    Playback,
}

impl From<BoardArg> for BoardModel {
    fn from(arg: BoardArg) -> Self {
        match arg {
            BoardArg::Synthetic => BoardModel::Synthetic,
            BoardArg::Playback => BoardModel::Playback,
        }
    }
}

/// Acquire a fixed-duration recording and condition it
#[derive(Debug, Parser)]
#[command(name = "sigstream", version)]
struct Cli {
    /// Board to open the session against
    #[arg(long, value_enum, default_value_t = BoardArg::Synthetic)]
    board: BoardArg,

    /// How long to stream, in seconds
    #[arg(long, default_value_t = 5.0)]
    duration: f64,

    /// Ring buffer capacity in samples
    #[arg(long)]
    buffer: Option<usize>,

    /// Bandpass low corner in Hz
    #[arg(long, default_value_t = 1.0)]
    low: f64,

    /// Bandpass high corner in Hz
    #[arg(long, default_value_t = 50.0)]
    high: f64,

    /// Where to write the raw recording (conditioned data lands next to it)
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON file with connection parameters
    #[arg(long)]
    params: Option<PathBuf>,

    /// Print per-channel statistics and alpha-band power after conditioning
    #[arg(long)]
    summary: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    if cli.duration <= 0.0 {
        anyhow::bail!("duration must be positive, got {}", cli.duration);
    }

    let params = match &cli.params {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ConnectionParams::from_json(&json).context("parsing connection parameters")?
        }
        None => ConnectionParams::default(),
    };

    let board = BoardModel::from(cli.board);
    let mut session = BoardSession::prepare(board, params).context("preparing session")?;

    let mut settings = StreamSettings::default();
    if let Some(capacity) = cli.buffer {
        settings.buffer_capacity = capacity;
    }
    session.start_stream(settings).context("starting stream")?;

    info!(seconds = cli.duration, "streaming");
    tokio::time::sleep(Duration::from_secs_f64(cli.duration)).await;

    session.stop_stream().await.context("stopping stream")?;
    info!(samples = session.data_count(), "acquisition finished");

    let data = session.board_data().context("fetching board data")?;
    if data.is_empty() {
        anyhow::bail!("no samples were acquired");
    }

    let raw_path = cli
        .output
        .unwrap_or_else(|| default_output_path());
    let mut handler =
        DataHandler::from_matrix(board, data).context("wrapping fetched data")?;
    handler.save_csv(&raw_path).context("saving raw recording")?;
    info!(file = %raw_path.display(), "raw recording saved");

    handler.remove_dc_offset().context("removing DC offset")?;
    handler
        .bandpass(cli.low, cli.high)
        .context("applying bandpass")?;

    let conditioned_path = with_suffix(&raw_path, "_conditioned");
    handler
        .save_csv(&conditioned_path)
        .context("saving conditioned recording")?;
    info!(file = %conditioned_path.display(), "conditioned recording saved");

    if cli.summary {
        print_summary(&handler)?;
    }

    session.release().await.context("releasing session")?;
    Ok(())
}

fn default_output_path() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("sigstream_{}.csv", stamp))
}

/// `session.csv` + `_conditioned` -> `session_conditioned.csv`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    path.with_file_name(name)
}

fn print_summary(handler: &DataHandler) -> anyhow::Result<()> {
    let descriptor = handler.board().descriptor();
    let data = handler.data();

    println!(
        "{} samples over {:.2}s from board '{}'",
        data.num_samples(),
        descriptor.duration_of(data.num_samples()),
        descriptor.name
    );

    for (idx, &row) in descriptor.exg_rows.iter().enumerate() {
        let ChannelStats {
            mean,
            rms,
            peak_to_peak,
            ..
        } = data.row_stats(row)?;
        println!(
            "  ch{:<2} mean {:>8.3} uV   rms {:>8.3} uV   p-p {:>8.3} uV",
            idx + 1,
            mean,
            rms,
            peak_to_peak
        );
    }

    let first_exg = data.row(descriptor.exg_rows[0])?;
    let spectrum = psd(first_exg, descriptor.sampling_rate)?;
    let alpha = band_power(&spectrum, 8.0, 13.0)?;
    println!("  alpha band power (ch1, 8-13 Hz): {:.3}", alpha);

    Ok(())
}
