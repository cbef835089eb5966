//! Reads the source CSV into a [`RawTable`].
//!
//! The file is decoded with the first encoding in the configured list that
//! decodes it without errors, then its header is split into metadata columns
//! (matched by name) and time-slot columns (matched by label format).

use encoding_rs::EUC_KR;
use serde::Serialize;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::DataLoadError;
use crate::model::{RawRecord, RawTable};
use crate::timeslot::{SlotSequence, TimeSlot};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A text encoding the loader can try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "&'static str")]
pub enum SourceEncoding {
    Cp949,
    EucKr,
    Utf8Sig,
    Utf8,
}

impl SourceEncoding {
    pub const DEFAULT_ORDER: [SourceEncoding; 4] = [
        SourceEncoding::Cp949,
        SourceEncoding::EucKr,
        SourceEncoding::Utf8Sig,
        SourceEncoding::Utf8,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SourceEncoding::Cp949 => "cp949",
            SourceEncoding::EucKr => "euc-kr",
            SourceEncoding::Utf8Sig => "utf-8-sig",
            SourceEncoding::Utf8 => "utf-8",
        }
    }

    /// Strict decode: any malformed or unmappable sequence yields `None`.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            // encoding_rs implements euc-kr as the windows-949 superset.
            SourceEncoding::Cp949 | SourceEncoding::EucKr => EUC_KR
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
            SourceEncoding::Utf8Sig => std::str::from_utf8(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes))
                .ok()
                .map(str::to_string),
            SourceEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<SourceEncoding> for &'static str {
    fn from(encoding: SourceEncoding) -> Self {
        encoding.label()
    }
}

impl FromStr for SourceEncoding {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "cp949" | "windows-949" | "ms949" => Ok(SourceEncoding::Cp949),
            "euc-kr" | "euckr" => Ok(SourceEncoding::EucKr),
            "utf-8-sig" | "utf8-sig" => Ok(SourceEncoding::Utf8Sig),
            "utf-8" | "utf8" => Ok(SourceEncoding::Utf8),
            other => Err(anyhow::anyhow!("unsupported encoding `{}`", other)),
        }
    }
}

/// Decodes `bytes` with the first encoding in `encodings` that succeeds.
///
/// A leading UTF-8 byte-order mark selects `utf-8-sig` directly when it is
/// configured, since the BOM bytes are also a valid cp949 sequence.
pub fn decode(bytes: &[u8], encodings: &[SourceEncoding]) -> Option<(SourceEncoding, String)> {
    if bytes.starts_with(UTF8_BOM) && encodings.contains(&SourceEncoding::Utf8Sig) {
        if let Some(text) = SourceEncoding::Utf8Sig.decode(bytes) {
            return Some((SourceEncoding::Utf8Sig, text));
        }
    }

    encodings.iter().find_map(|encoding| {
        let decoded = encoding.decode(bytes);
        if decoded.is_none() {
            debug!(encoding = encoding.label(), "Decode failed, trying next encoding");
        }
        decoded.map(|text| (*encoding, text))
    })
}

/// Loads `path` using the default encoding order.
pub fn load(path: impl AsRef<Path>) -> Result<RawTable, DataLoadError> {
    load_with(path.as_ref(), &SourceEncoding::DEFAULT_ORDER)
}

/// Loads `path`, trying `encodings` in order.
#[tracing::instrument(skip(encodings), fields(path = %path.display()))]
pub fn load_with(path: &Path, encodings: &[SourceEncoding]) -> Result<RawTable, DataLoadError> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => DataLoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let (encoding, text) = decode(&bytes, encodings).ok_or_else(|| DataLoadError::Undecodable {
        path: path.to_path_buf(),
        tried: encodings
            .iter()
            .map(SourceEncoding::label)
            .collect::<Vec<_>>()
            .join(", "),
    })?;
    info!(encoding = encoding.label(), bytes = bytes.len(), "Data file decoded");

    let table = parse_table(&text)?;
    info!(
        records = table.records.len(),
        slots = table.slots.len(),
        "Wide table loaded"
    );
    Ok(table)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaRole {
    Line,
    Station,
    Direction,
    StationCode,
    DayType,
    Operator,
}

static META_ALIASES: &[(MetaRole, &[&str])] = &[
    (MetaRole::Line, &["호선", "노선", "line"]),
    (MetaRole::Station, &["역명", "출발역", "station", "station_name"]),
    (MetaRole::Direction, &["운행구분", "상하구분", "direction"]),
    (MetaRole::StationCode, &["역번호", "station_code", "station_number"]),
    (MetaRole::DayType, &["요일구분", "일자", "date", "day_type"]),
    (MetaRole::Operator, &["운영기관", "operator"]),
];

fn meta_role(header: &str) -> Option<MetaRole> {
    let header = header.to_lowercase();
    META_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&header.as_str()))
        .map(|(role, _)| *role)
}

/// Column positions discovered from the header row.
#[derive(Debug, Default)]
struct ColumnLayout {
    line: Option<usize>,
    station: Option<usize>,
    direction: Option<usize>,
    station_code: Option<usize>,
    day_type: Option<usize>,
    operator: Option<usize>,
    slot_columns: Vec<(usize, TimeSlot)>,
}

impl ColumnLayout {
    fn discover(headers: &csv::StringRecord) -> Self {
        let mut layout = ColumnLayout::default();

        for (idx, raw) in headers.iter().enumerate() {
            let header = normalize_header(raw);
            if let Some(slot) = TimeSlot::parse_label(header) {
                layout.slot_columns.push((idx, slot));
                continue;
            }

            let target = match meta_role(header) {
                Some(MetaRole::Line) => &mut layout.line,
                Some(MetaRole::Station) => &mut layout.station,
                Some(MetaRole::Direction) => &mut layout.direction,
                Some(MetaRole::StationCode) => &mut layout.station_code,
                Some(MetaRole::DayType) => &mut layout.day_type,
                Some(MetaRole::Operator) => &mut layout.operator,
                None => {
                    debug!(column = header, "Ignoring unrecognised column");
                    continue;
                }
            };
            if target.is_none() {
                *target = Some(idx);
            }
        }

        layout
    }
}

fn normalize_header(raw: &str) -> &str {
    raw.trim_start_matches('\u{feff}').trim()
}

fn cell(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parses decoded CSV text into a [`RawTable`].
pub fn parse_table(text: &str) -> Result<RawTable, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let layout = ColumnLayout::discover(reader.headers()?);
    let line_idx = layout.line.ok_or(DataLoadError::MissingColumn("line"))?;
    let station_idx = layout.station.ok_or(DataLoadError::MissingColumn("station"))?;
    let direction_idx = layout.direction.ok_or(DataLoadError::MissingColumn("direction"))?;

    let slots = SlotSequence::new(layout.slot_columns.iter().map(|(_, slot)| *slot).collect())?;
    if !slots.is_canonical() {
        warn!(
            slots = slots.len(),
            first = ?slots.first().map(|s| s.label()),
            last = ?slots.last().map(|s| s.label()),
            "Time-slot columns differ from the canonical 05:30-00:30 grid"
        );
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result?;

        let (Some(line), Some(station)) = (cell(&record, Some(line_idx)), cell(&record, Some(station_idx)))
        else {
            skipped += 1;
            continue;
        };

        let cells = layout
            .slot_columns
            .iter()
            .map(|(idx, _)| record.get(*idx).unwrap_or_default().to_string())
            .collect();

        records.push(RawRecord {
            line,
            station,
            direction: cell(&record, Some(direction_idx)).unwrap_or_default(),
            station_code: cell(&record, layout.station_code),
            day_type: cell(&record, layout.day_type),
            operator: cell(&record, layout.operator),
            cells,
        });
    }

    if skipped > 0 {
        warn!(skipped, "Skipped rows without a line or station");
    }

    Ok(RawTable { slots, records })
}
