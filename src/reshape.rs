//! Wide-to-long reshaping of the loaded table.

use std::path::Path;
use tracing::{debug, info};

use crate::error::DataLoadError;
use crate::loader::{self, SourceEncoding};
use crate::model::{CongestionTable, Observation, RawTable};

/// Parses one congestion cell.
///
/// Whitespace and thousands separators are ignored. Blank, non-numeric,
/// negative and non-finite cells are missing.
pub fn parse_value(cell: &str) -> Option<f64> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Emits one [`Observation`] per (record, slot), record-major and in slot order.
///
/// Fails with [`DataLoadError::Empty`] when no cell holds a usable value.
pub fn reshape(raw: RawTable) -> Result<CongestionTable, DataLoadError> {
    let slots = raw.slots;
    let mut observations = Vec::with_capacity(raw.records.len() * slots.len());
    let mut missing = 0usize;

    for record in raw.records {
        for (idx, slot) in slots.as_slice().iter().enumerate() {
            let value = record.cells.get(idx).and_then(|c| parse_value(c));
            if value.is_none() {
                missing += 1;
            }

            observations.push(Observation {
                line: record.line.clone(),
                station: record.station.clone(),
                direction: record.direction.clone(),
                station_code: record.station_code.clone(),
                day_type: record.day_type.clone(),
                time_slot: *slot,
                hour: slot.hour(),
                value,
            });
        }
    }

    if missing == observations.len() {
        return Err(DataLoadError::Empty);
    }

    debug!(missing, "Missing cells kept as absent values");
    info!(
        observations = observations.len(),
        present = observations.len() - missing,
        "Long table built"
    );

    Ok(CongestionTable::new(slots, observations))
}

/// Loads and reshapes `path` in one step.
pub fn load_table(
    path: impl AsRef<Path>,
    encodings: &[SourceEncoding],
) -> Result<CongestionTable, DataLoadError> {
    reshape(loader::load_with(path.as_ref(), encodings)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_table;

    const WIDE: &str = "\
호선,역번호,역명,운행구분,23시30분,00시00분,00시30분
1호선,150,서울역,상행,40.5,,12
1호선,150,서울역,하행,-3,n/a,\" 7.25 \"
2호선,222,강남,내선,99,100,101
";

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(" 42.5 "), Some(42.5));
        assert_eq!(parse_value("1,050.5"), Some(1050.5));
        assert_eq!(parse_value("0"), Some(0.0));
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("-"), None);
        assert_eq!(parse_value("-1"), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("inf"), None);
    }

    #[test]
    fn test_reshape_emits_record_major_slot_order() {
        let table = reshape(parse_table(WIDE).unwrap()).unwrap();

        assert_eq!(table.len(), 9);
        let labels: Vec<_> = table.observations()[..3]
            .iter()
            .map(|o| o.time_slot.label())
            .collect();
        assert_eq!(labels, vec!["23:30", "00:00", "00:30"]);

        let first = &table.observations()[0];
        assert_eq!(first.station, "서울역");
        assert_eq!(first.direction, "상행");
        assert_eq!(first.station_code.as_deref(), Some("150"));
        assert_eq!(first.hour, 23);
        assert_eq!(table.observations()[2].hour, 0);
    }

    #[test]
    fn test_reshape_keeps_missing_as_absent() {
        let table = reshape(parse_table(WIDE).unwrap()).unwrap();
        let values: Vec<_> = table.observations()[..6].iter().map(|o| o.value).collect();
        assert_eq!(
            values,
            vec![Some(40.5), None, Some(12.0), None, None, Some(7.25)]
        );
    }

    #[test]
    fn test_reshape_round_trips_every_cell() {
        let raw = parse_table(WIDE).unwrap();
        let expected = raw.clone();
        let table = reshape(raw).unwrap();

        for record in &expected.records {
            for (idx, slot) in expected.slots.as_slice().iter().enumerate() {
                let found: Vec<_> = table
                    .observations()
                    .iter()
                    .filter(|o| {
                        o.station == record.station
                            && o.direction == record.direction
                            && o.time_slot == *slot
                    })
                    .collect();
                assert_eq!(found.len(), 1);
                assert_eq!(found[0].value, parse_value(&record.cells[idx]));
            }
        }
    }

    #[test]
    fn test_reshape_is_deterministic() {
        let a = reshape(parse_table(WIDE).unwrap()).unwrap();
        let b = reshape(parse_table(WIDE).unwrap()).unwrap();
        assert_eq!(a.observations(), b.observations());
    }

    #[test]
    fn test_reshape_all_missing_is_empty() {
        let text = "호선,역명,운행구분,05:30,06:00\n1호선,시청,상행,,x\n";
        let err = reshape(parse_table(text).unwrap()).unwrap_err();
        assert!(matches!(err, DataLoadError::Empty));
    }

    #[test]
    fn test_table_catalog() {
        let table = reshape(parse_table(WIDE).unwrap()).unwrap();
        assert_eq!(table.lines(), vec!["1호선", "2호선"]);
        assert_eq!(table.stations(Some("1호선")), vec!["서울역"]);
        assert_eq!(table.directions(Some("1호선")), vec!["상행", "하행"]);
        assert_eq!(table.directions(None), vec!["내선", "상행", "하행"]);
        assert_eq!(table.station_count(), 2);
    }
}
