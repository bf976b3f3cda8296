// Integration tests for the lap pipeline
//
// Runs record files through the loader, the lap filter, both aggregators
// and the race table assembler, checking the figures a race overview shows.

use std::io::Write;

use paddock::{
    AppConfig, ColumnCatalog, DriverIdentity, DriverNumber, LapRecord, PaddockError,
    SessionOverview, SessionResult, best_lap_times, build_race_table, process_lap_data,
    race_lap_times, records::loader::load_records, session_overview,
};
use tempfile::NamedTempFile;

/// Writes `contents` to a temporary file with the given suffix
fn record_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn driver_one_laps() -> Vec<LapRecord> {
    vec![
        LapRecord::new(1, 1)
            .with_duration(90.5)
            .with_sectors(30.0, 30.0, 30.5)
            .with_speeds(200.0, 210.0, 220.0),
        LapRecord::new(1, 2)
            .with_duration(89.0)
            .with_sectors(29.0, 30.0, 30.0)
            .with_speeds(205.0, 215.0, 225.0),
        LapRecord::new(1, 3),
    ]
}

#[test]
fn test_single_driver_best_lap_and_aggregate() {
    let timed = process_lap_data(&driver_one_laps());
    assert_eq!(timed.len(), 2);

    let best = best_lap_times(&timed);
    assert_eq!(best.len(), 1);
    assert_eq!(best[0].lap_duration, 89.0);
    assert_eq!(best[0].duration_sector_1, Some(29.0));
    assert_eq!(best[0].st_speed, Some(225.0));

    let aggregates = race_lap_times(&timed);
    assert_eq!(aggregates.len(), 1);
    let aggregate = &aggregates[0];
    assert_eq!(aggregate.best_lap_duration, Some(89.0));
    assert_eq!(aggregate.best_sector_1, Some(29.0));
    assert_eq!(aggregate.best_sector_2, Some(30.0));
    assert_eq!(aggregate.best_sector_3, Some(30.0));
    assert_eq!(aggregate.mean_i1_speed, Some(202.5));
    assert_eq!(aggregate.mean_i2_speed, Some(212.5));
    assert_eq!(aggregate.mean_st_speed, Some(222.5));
}

#[test]
fn test_driver_without_result_keeps_lap_statistics() {
    let laps = vec![
        LapRecord::new(1, 1).with_duration(89.0),
        LapRecord::new(2, 1).with_duration(90.0).with_speeds(300.0, 310.0, 320.0),
    ];
    let drivers = vec![
        DriverIdentity::new(1, "Max VERSTAPPEN", "Red Bull Racing"),
        DriverIdentity::new(2, "Sergio PEREZ", "Red Bull Racing"),
    ];
    let results = vec![SessionResult::new(1).classified(1, 57)];
    let columns = ColumnCatalog::race_table().unwrap();

    let aggregates = race_lap_times(&process_lap_data(&laps));
    let table = build_race_table(&drivers, &aggregates, &results, &columns);

    assert_eq!(table.len(), 2);
    let second = &table.rows[1];
    assert_eq!(second.driver.driver_number, Some(DriverNumber::Number(2)));
    assert!(second.result.is_none());
    assert!(second.position().is_none());
    let stats = second.lap_statistics.as_ref().unwrap();
    assert_eq!(stats.best_lap_duration, Some(90.0));
    assert_eq!(stats.mean_st_speed, Some(320.0));
}

#[test]
fn test_overview_from_record_files() {
    let laps = record_file(
        ".jsonl",
        concat!(
            r#"{"driver_number": 1, "lap_number": 1, "lap_duration": 90.5, "i1_speed": 200}"#,
            "\n",
            r#"{"driver_number": 1, "lap_number": 2, "lap_duration": 89.0, "i1_speed": 205}"#,
            "\n",
            r#"{"driver_number": 1, "lap_number": 3, "lap_duration": null}"#,
            "\n",
            r#"{"driver_number": 44, "lap_number": 1, "lap_duration": 91.2}"#,
            "\n",
        ),
    );
    let drivers = record_file(
        ".json",
        r#"[
            {"driver_number": 1, "full_name": "Max VERSTAPPEN", "team_name": "Red Bull Racing"},
            {"driver_number": 44, "full_name": "Lewis HAMILTON", "team_name": "Mercedes"}
        ]"#,
    );
    let results = record_file(
        ".json",
        r#"[
            {"driver_number": 44, "position": 2, "points": 18, "gap_to_leader": "+1 LAP", "number_of_laps": 56},
            {"driver_number": 1, "position": 1, "points": 25, "gap_to_leader": 0, "number_of_laps": 57}
        ]"#,
    );

    let laps = load_records::<LapRecord>(laps.path()).unwrap();
    let drivers = load_records::<DriverIdentity>(drivers.path()).unwrap();
    let results = load_records::<SessionResult>(results.path()).unwrap();
    let columns = ColumnCatalog::race_table().unwrap();

    let overview = session_overview(
        "Race",
        &laps,
        &drivers,
        &results,
        &AppConfig::default(),
        &columns,
    );
    let SessionOverview::Race(table) = overview else {
        panic!("expected a race table");
    };

    let order: Vec<_> = table.rows.iter().map(|row| row.position()).collect();
    assert_eq!(order, vec![Some(1), Some(2)]);

    let rendered = table.formatted_rows();
    let labels: Vec<_> = columns.columns().iter().map(|c| c.label).collect();
    let gap = labels.iter().position(|l| *l == "Time Gap").unwrap();
    assert_eq!(rendered[1][gap], "+1 LAP");
    let mean_i1 = labels.iter().position(|l| *l == "Mean Interval 1 Speed").unwrap();
    assert_eq!(rendered[0][mean_i1], "202.50");
}

#[test]
fn test_qualifying_lists_best_laps() {
    let overview = session_overview(
        "Qualifying",
        &driver_one_laps(),
        &[],
        &[],
        &AppConfig::default(),
        &ColumnCatalog::race_table().unwrap(),
    );
    match overview {
        SessionOverview::BestLaps(best) => {
            assert_eq!(best.len(), 1);
            assert_eq!(best[0].lap_duration, 89.0);
        }
        other => panic!("expected best laps, got {:?}", other),
    }
}

#[test]
fn test_text_keyed_drivers_match_nothing() {
    let laps = vec![LapRecord::new(1, 1).with_duration(89.0)];
    let drivers: Vec<DriverIdentity> =
        serde_json::from_str(r#"[{"driver_number": "1", "full_name": "Max VERSTAPPEN"}]"#).unwrap();
    let results = vec![SessionResult::new(1).classified(1, 57)];

    let table = build_race_table(
        &drivers,
        &race_lap_times(&process_lap_data(&laps)),
        &results,
        &ColumnCatalog::race_table().unwrap(),
    );

    assert_eq!(table.len(), 1);
    assert!(table.rows[0].result.is_none());
    assert!(table.rows[0].lap_statistics.is_none());
}

#[test]
fn test_session_without_laps_is_empty() {
    let overview = session_overview(
        "Sprint",
        &[],
        &[],
        &[],
        &AppConfig::default(),
        &ColumnCatalog::race_table().unwrap(),
    );
    assert!(overview.is_empty());
    assert!(matches!(overview, SessionOverview::Race(_)));
}

#[test]
fn test_lap_file_without_driver_numbers_is_rejected() {
    let laps = record_file(".json", r#"[{"lap_number": 1, "lap_duration": 90.0}]"#);
    let result = load_records::<LapRecord>(laps.path());
    assert!(matches!(
        result,
        Err(PaddockError::MissingKeyColumn { .. })
    ));
}
