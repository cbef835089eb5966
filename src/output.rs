//! Output formatting and persistence for query results.
//!
//! Supports pretty JSON for the CLI and the ranking CSV export.

use anyhow::Result;
use chrono::{DateTime, Local};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::analysis::RankingEntry;

/// Header of the ranking export, in column order.
pub const RANKING_HEADER: [&str; 5] = ["rank", "station", "peak_value", "mean_value", "peak_time_slot"];

/// Decimal places used for values in tables and exports.
pub const DISPLAY_DECIMALS: usize = 1;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes `value` to `writer` as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write>(mut writer: W, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Prints `value` to stdout as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    write_json(std::io::stdout().lock(), value)
}

/// Writes a ranking as CSV with a header row. Values use display precision.
pub fn write_ranking_csv<W: Write>(writer: W, entries: &[RankingEntry]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(RANKING_HEADER)?;
    for entry in entries {
        writer.write_record([
            entry.rank.to_string(),
            entry.station.clone(),
            format!("{:.*}", DISPLAY_DECIMALS, entry.peak_value),
            format!("{:.*}", DISPLAY_DECIMALS, entry.mean_value),
            entry.peak_time_slot.label(),
        ])?;
    }
    writer.flush()?;

    Ok(())
}

/// Renders a ranking CSV into a string.
pub fn ranking_csv_string(entries: &[RankingEntry]) -> Result<String> {
    let mut buf = Vec::new();
    write_ranking_csv(&mut buf, entries)?;
    Ok(String::from_utf8(buf)?)
}

/// Parses a ranking CSV written by [`write_ranking_csv`]. A leading BOM is ignored.
pub fn read_ranking_csv<R: Read>(mut reader: R) -> Result<Vec<RankingEntry>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

    let mut rdr = csv::Reader::from_reader(body);
    let mut entries = Vec::new();
    for result in rdr.deserialize() {
        let entry: RankingEntry = result?;
        entries.push(entry);
    }

    Ok(entries)
}

/// Writes a ranking CSV file, prefixed with a UTF-8 BOM for spreadsheet tools.
pub fn export_ranking(path: &Path, entries: &[RankingEntry]) -> Result<()> {
    debug!(path = %path.display(), entries = entries.len(), "Writing ranking CSV");

    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;
    write_ranking_csv(&mut file, entries)?;

    info!(path = %path.display(), entries = entries.len(), "Ranking exported");
    Ok(())
}

/// Default export file name, e.g. `congestion_ranking_2호선_20250930_081500.csv`.
pub fn ranking_file_name(line: Option<&str>, at: DateTime<Local>) -> String {
    let scope = line
        .map(|l| l.replace(['/', '\\', ' '], "_"))
        .unwrap_or_else(|| "all".to_string());
    format!("congestion_ranking_{}_{}.csv", scope, at.format("%Y%m%d_%H%M%S"))
}
