use encoding_rs::EUC_KR;
use std::fs;
use subway_congestion::analysis::{self, FilterCriteria, SortMode, utility::round_to};
use subway_congestion::config::DashboardConfig;
use subway_congestion::dashboard::{Dashboard, FilterParams};
use subway_congestion::error::DataLoadError;
use subway_congestion::loader::{SourceEncoding, parse_table};
use subway_congestion::output::{export_ranking, read_ranking_csv};
use subway_congestion::reshape::{load_table, reshape};
use subway_congestion::timeslot::{SlotSequence, TimeSlot};

const FIXTURE: &str = "tests/fixtures/congestion_sample.csv";

fn fixture_dashboard() -> Dashboard {
    let config = DashboardConfig {
        data_path: FIXTURE.into(),
        ..Default::default()
    };
    Dashboard::load(config).expect("Failed to load fixture")
}

fn line(name: &str) -> FilterParams {
    FilterParams {
        line: Some(name.to_string()),
        ..Default::default()
    }
}

fn slot(label: &str) -> TimeSlot {
    TimeSlot::parse_label(label).unwrap()
}

#[test]
fn test_full_pipeline() {
    let table = load_table(FIXTURE, &SourceEncoding::DEFAULT_ORDER).expect("Failed to load fixture");

    assert!(table.slots().is_canonical());
    assert_eq!(table.slots().len(), 39);
    // 13 records with a station; the row without one is skipped.
    assert_eq!(table.len(), 13 * 39);
    assert_eq!(table.lines(), vec!["1호선", "2호선"]);
    assert_eq!(table.stations(Some("2호선")), vec!["강남", "삼성", "선릉", "역삼"]);
    assert_eq!(table.directions(Some("1호선")), vec!["상선", "하선"]);

    let first = &table.observations()[0];
    assert_eq!(first.station, "서울역");
    assert_eq!(first.day_type.as_deref(), Some("평일"));
    assert_eq!(first.station_code.as_deref(), Some("150"));
    assert_eq!(first.time_slot, slot("05:30"));

    let last = table.observations().last().unwrap();
    assert_eq!(last.time_slot, slot("00:30"));
    assert_eq!(last.hour, 0);
}

#[test]
fn test_ranking_over_fixture() {
    let view = fixture_dashboard().ranking(&line("2호선"), Some(10)).unwrap();

    let stations: Vec<_> = view.entries.iter().map(|e| e.station.as_str()).collect();
    assert_eq!(stations, vec!["강남", "선릉", "역삼", "삼성"]);
    assert_eq!(view.entries[0].peak_value, 160.0);
    assert_eq!(view.entries[0].peak_time_slot, slot("08:00"));
    assert!((view.entries[3].mean_value - 28.3784).abs() < 1e-3);

    let overview = view.overview.unwrap();
    assert_eq!(overview.station_count, 4);
    assert_eq!(overview.max_value, 160.0);
}

#[test]
fn test_thousands_separator_and_missing_cells() {
    let view = fixture_dashboard().ranking(&line("1호선"), None).unwrap();
    assert_eq!(view.entries[0].station, "종각");
    assert_eq!(view.entries[0].peak_value, 1050.5);
    assert_eq!(view.entries[0].peak_time_slot, slot("08:30"));

    let table = fixture_dashboard();
    let samsung_missing = table
        .table()
        .observations()
        .iter()
        .filter(|o| o.station == "삼성" && o.value.is_none())
        .count();
    assert_eq!(samsung_missing, 2);
}

#[test]
fn test_direction_and_time_range_filter() {
    let params = FilterParams {
        line: Some("2호선".into()),
        direction: Some("외선".into()),
        from: Some("17:00".into()),
        to: Some("20:00".into()),
    };
    let view = fixture_dashboard().ranking(&params, None).unwrap();

    // 삼성 runs only 내선.
    assert_eq!(view.entries.len(), 3);
    assert!(view.entries.iter().all(|e| e.peak_time_slot == slot("18:30")));
    assert_eq!(view.entries[0].station, "강남");
}

#[test]
fn test_heatmap_over_fixture() {
    let params = FilterParams {
        line: Some("2호선".into()),
        from: Some("07:00".into()),
        to: Some("09:00".into()),
        ..Default::default()
    };
    let matrix = fixture_dashboard().heatmap(&params, Some("peak"), Some(3)).unwrap();

    // Row limit is clamped up to five, so all four stations fit.
    assert_eq!(matrix.stations, vec!["강남", "선릉", "역삼", "삼성"]);
    assert_eq!(matrix.sort_mode, SortMode::PeakValueDesc);
    assert_eq!(matrix.slots.len(), 5);
    // Both directions of 강남 at 08:00 (160 and 140) are averaged.
    assert_eq!(matrix.cell("강남", slot("08:00")), Some(150.0));
    // Stats agree with the ranking peak, not the averaged cell.
    assert_eq!(matrix.stats.unwrap().max_value, 160.0);
}

#[test]
fn test_cp949_file_matches_utf8_file() {
    let text = fs::read_to_string(FIXTURE).unwrap();
    let (encoded, _, had_errors) = EUC_KR.encode(&text);
    assert!(!had_errors);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("congestion_cp949.csv");
    fs::write(&path, &encoded).unwrap();

    let from_cp949 = load_table(&path, &SourceEncoding::DEFAULT_ORDER).unwrap();
    let from_utf8 = load_table(FIXTURE, &SourceEncoding::DEFAULT_ORDER).unwrap();
    assert_eq!(from_cp949.observations(), from_utf8.observations());
}

#[test]
fn test_utf8_only_rejects_cp949_bytes() {
    let (encoded, _, _) = EUC_KR.encode("호선,역명,운행구분,05:30\n1호선,시청,상선,10\n");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cp949.csv");
    fs::write(&path, &encoded).unwrap();

    let err = load_table(&path, &[SourceEncoding::Utf8]).unwrap_err();
    assert!(matches!(err, DataLoadError::Undecodable { .. }));
}

#[test]
fn test_missing_file_is_fatal() {
    let err = load_table("does/not/exist.csv", &SourceEncoding::DEFAULT_ORDER).unwrap_err();
    assert!(matches!(err, DataLoadError::NotFound { .. }));
}

#[test]
fn test_equal_peaks_rank_by_station_name() {
    let text = "line,station,direction,07:30,08:00\nL,B,up,150,10\nL,A,up,10,150\n";
    let table = reshape(parse_table(text).unwrap()).unwrap();

    let subset = analysis::filter(table.observations(), &FilterCriteria::new());
    let summaries = analysis::summarize(subset.iter().copied());
    let ranking = analysis::rank(summaries.values(), 10);

    assert_eq!(ranking.len(), 2);
    assert_eq!((ranking[0].rank, ranking[0].station.as_str()), (1, "A"));
    assert_eq!(ranking[0].peak_time_slot, slot("08:00"));
    assert_eq!((ranking[1].rank, ranking[1].station.as_str()), (2, "B"));
    assert_eq!(ranking[1].peak_time_slot, slot("07:30"));
}

#[test]
fn test_export_round_trip() {
    let view = fixture_dashboard().ranking(&line("1호선"), None).unwrap();
    assert_eq!(view.entries.len(), 3);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ranking.csv");
    export_ranking(&path, &view.entries).unwrap();

    let parsed = read_ranking_csv(fs::File::open(&path).unwrap()).unwrap();
    assert_eq!(parsed.len(), 3);
    for (read, written) in parsed.iter().zip(&view.entries) {
        assert_eq!(read.rank, written.rank);
        assert_eq!(read.station, written.station);
        assert_eq!(read.peak_time_slot, written.peak_time_slot);
        assert_eq!(read.peak_value, round_to(written.peak_value, 1));
        assert_eq!(read.mean_value, round_to(written.mean_value, 1));
    }
}

#[test]
fn test_compare_keeps_request_order() {
    let names = vec!["시청".to_string(), "강남".to_string(), "없는역".to_string()];
    let view = fixture_dashboard().compare(&FilterParams::default(), &names).unwrap();

    let stations: Vec<_> = view.profiles.iter().map(|p| p.summary.station.as_str()).collect();
    assert_eq!(stations, vec!["시청", "강남"]);
    // Two directions, 39 slots each.
    assert_eq!(view.profiles[1].series.len(), 78);
}

#[test]
fn test_canonical_grid() {
    let canonical = SlotSequence::canonical();
    assert_eq!(canonical.len(), 39);
    assert_eq!(canonical.last(), Some(slot("00:30")));
    assert_eq!(slot("00:30").ordinal(), 1470);
}
