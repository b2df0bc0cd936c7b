//! CSV persistence for fetched board data
//!
//! One record per sample; fields are the matrix rows in descriptor order.
//! No header, so a saved recording can be replayed against the descriptor
//! that produced it.

use crate::data::BoardData;
use crate::error::{SigError, SigResult};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write a matrix to `path`, one CSV record per sample
pub fn write_csv(data: &BoardData, path: &Path) -> SigResult<()> {
    let file = File::create(path).map_err(|e| SigError::Io {
        context: "create recording file",
        source: e,
    })?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));

    let mut record = Vec::with_capacity(data.num_rows());
    for col in 0..data.num_samples() {
        record.clear();
        for row in 0..data.num_rows() {
            record.push(data.row(row)?[col].to_string());
        }
        writer.write_record(&record).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| SigError::Io {
        context: "flush recording file",
        source: e,
    })?;
    Ok(())
}

/// Read a matrix written by [`write_csv`].
///
/// Every record must carry exactly `expected_rows` fields.
pub fn read_csv(path: &Path, expected_rows: usize) -> SigResult<BoardData> {
    let file = File::open(path).map_err(|e| SigError::Io {
        context: "open recording file",
        source: e,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(BufReader::new(file));

    let mut packages = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(csv_error)?;
        if record.len() != expected_rows {
            return Err(SigError::Format {
                reason: format!(
                    "record {} has {} fields, expected {}",
                    line + 1,
                    record.len(),
                    expected_rows
                ),
            });
        }
        let mut package = Vec::with_capacity(expected_rows);
        for field in record.iter() {
            let value: f64 = field.trim().parse().map_err(|_| SigError::Format {
                reason: format!("record {}: invalid number {:?}", line + 1, field),
            })?;
            package.push(value);
        }
        packages.push(package);
    }

    BoardData::from_packages(expected_rows, &packages)
}

fn csv_error(err: csv::Error) -> SigError {
    SigError::Format {
        reason: format!("CSV: {}", err),
    }
}
