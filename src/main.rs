use std::path::PathBuf;

use clap::{Parser, Subcommand};
use itertools::Itertools;
use log::warn;
use paddock::{
    AppConfig, BestLapSummary, ColumnCatalog, DriverIdentity, LapRecord, PaddockError,
    SessionOverview, SessionResult,
    laps::{DriverPace, race_pace},
    race_table::columns::NumberFormat,
    records::{
        Meeting, SessionInfo,
        loader::load_records,
        metadata::{FIRST_SEASON, available_seasons},
    },
    session_overview, writer,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Race table or best laps of one session
    Overview {
        #[arg(short, long)]
        laps: PathBuf,

        #[arg(short, long)]
        drivers: PathBuf,

        #[arg(short, long)]
        results: PathBuf,

        #[arg(short, long, default_value = "Race")]
        session: String,

        /// Write the rows as JSON lines instead of printing a table
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Quick-lap times of the best classified drivers
    Pace {
        #[arg(short, long)]
        laps: PathBuf,

        #[arg(short, long)]
        results: PathBuf,

        #[arg(short = 'n', long)]
        drivers: Option<usize>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Meetings of a season and the sessions of one meeting
    Sessions {
        #[arg(short, long)]
        meetings: PathBuf,

        #[arg(short, long)]
        sessions: PathBuf,

        /// Season to list, defaults to the latest one in the meetings file
        #[arg(long)]
        season: Option<i32>,

        /// Meeting display name, defaults to the latest completed meeting
        #[arg(long)]
        meeting: Option<String>,
    },
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .join(" | ")
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut lines = vec![format_line(headers.iter().copied(), &widths)];
    lines.push(widths.iter().map(|w| "-".repeat(*w)).join("-+-"));
    for row in rows {
        lines.push(format_line(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn best_lap_rows(best_laps: &[BestLapSummary]) -> Vec<Vec<String>> {
    let seconds = NumberFormat::Fixed(3);
    let speed = NumberFormat::Fixed(2);
    let optional = |value: Option<f64>, format: NumberFormat| {
        value.map(|v| format.apply(v)).unwrap_or_default()
    };
    best_laps
        .iter()
        .map(|lap| {
            vec![
                lap.driver_number.to_string(),
                seconds.apply(lap.lap_duration),
                optional(lap.duration_sector_1, seconds),
                optional(lap.duration_sector_2, seconds),
                optional(lap.duration_sector_3, seconds),
                optional(lap.i1_speed, speed),
                optional(lap.i2_speed, speed),
                optional(lap.st_speed, speed),
            ]
        })
        .collect()
}

fn print_overview(overview: &SessionOverview) -> Result<(), PaddockError> {
    if overview.is_empty() {
        println!("No lap data available for this session");
        return Ok(());
    }
    match overview {
        SessionOverview::Race(table) => {
            let headers = table.columns.columns().iter().map(|c| c.label).collect_vec();
            println!("{}", render_table(&headers, &table.formatted_rows()));
        }
        SessionOverview::BestLaps(best_laps) => {
            let headers = [
                "Driver",
                "Lap Duration",
                "Sector 1",
                "Sector 2",
                "Sector 3",
                "I1 Speed",
                "I2 Speed",
                "ST Speed",
            ];
            println!("{}", render_table(&headers, &best_lap_rows(best_laps)));
        }
    }
    Ok(())
}

fn overview_document(overview: &SessionOverview) -> Result<String, PaddockError> {
    serde_json::to_string_pretty(overview)
        .map_err(|e| PaddockError::OutputSerializeError { source: e })
}

fn overview(
    laps: &PathBuf,
    drivers: &PathBuf,
    results: &PathBuf,
    session: &str,
    output: Option<&PathBuf>,
    json: bool,
    config: &AppConfig,
) -> Result<(), PaddockError> {
    let columns = ColumnCatalog::race_table()?;
    let laps = load_records::<LapRecord>(laps)?;
    let drivers = load_records::<DriverIdentity>(drivers)?;
    let results = load_records::<SessionResult>(results)?;

    let overview = session_overview(session, &laps, &drivers, &results, config, &columns);
    match (output, &overview) {
        (Some(output), SessionOverview::Race(table)) => {
            writer::write_json_lines(output, table.records())?;
        }
        (Some(output), SessionOverview::BestLaps(best_laps)) => {
            writer::write_json_lines(output, best_laps)?;
        }
        (None, _) if json => println!("{}", overview_document(&overview)?),
        (None, _) => print_overview(&overview)?,
    }
    Ok(())
}

fn pace(
    laps: &PathBuf,
    results: &PathBuf,
    driver_count: usize,
    output: Option<&PathBuf>,
    config: &AppConfig,
) -> Result<(), PaddockError> {
    let laps = load_records::<LapRecord>(laps)?;
    let results = load_records::<SessionResult>(results)?;
    let pace = race_pace(&laps, &results, driver_count, config.quick_lap_threshold);

    if let Some(output) = output {
        writer::write_json_lines(output, &pace)?;
        return Ok(());
    }
    let seconds = NumberFormat::Fixed(3);
    for DriverPace {
        driver_number,
        position,
        laps,
    } in &pace
    {
        let times = laps
            .iter()
            .map(|p| format!("{}:{}", p.lap_number, seconds.apply(p.lap_duration)))
            .join(" ");
        let position = position.map(|p| p.to_string()).unwrap_or_default();
        println!("P{} #{} {}", position, driver_number, times);
    }
    Ok(())
}

fn selection_marker(selected: bool) -> &'static str {
    if selected { "*" } else { " " }
}

fn sessions(
    meetings: &PathBuf,
    sessions: &PathBuf,
    season: Option<i32>,
    meeting: Option<&str>,
) -> Result<(), PaddockError> {
    let meetings = load_records::<Meeting>(meetings)?;
    let sessions = load_records::<SessionInfo>(sessions)?;

    let latest = meetings
        .iter()
        .filter_map(|m| m.year)
        .max()
        .unwrap_or(FIRST_SEASON);
    let season = season.unwrap_or(latest);
    println!("Seasons: {}", available_seasons(latest).iter().join(", "));

    let season_meetings = meetings
        .into_iter()
        .filter(|m| m.year.is_none_or(|year| year == season))
        .collect_vec();
    let selected = match meeting {
        Some(name) => Meeting::find_by_display_name(&season_meetings, name),
        None => Meeting::default_selection(&season_meetings),
    };

    println!("Meetings of {}:", season);
    for m in &season_meetings {
        let is_selected = selected.is_some_and(|s| s.meeting_key == m.meeting_key);
        println!("{} {}", selection_marker(is_selected), m.display_name());
    }
    let Some(selected) = selected else {
        warn!("No meeting matches {:?}", meeting);
        return Ok(());
    };

    let meeting_sessions = sessions
        .into_iter()
        .filter(|s| s.meeting_key.is_none_or(|key| key == selected.meeting_key))
        .collect_vec();
    let default_session = SessionInfo::default_selection(&meeting_sessions);
    println!("Sessions of {}:", selected.display_name());
    for s in &meeting_sessions {
        let is_default = default_session.is_some_and(|d| d.session_key == s.session_key);
        println!("{} {} ({})", selection_marker(is_default), s.session_name, s.session_key);
    }
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    let config = AppConfig::from_local_file()
        .unwrap_or_else(|e| {
            warn!("Could not read config file, using defaults: {}", e);
            None
        })
        .unwrap_or_default();

    let result = match &cli.command {
        Commands::Overview {
            laps,
            drivers,
            results,
            session,
            output,
            json,
        } => overview(
            laps,
            drivers,
            results,
            session,
            output.as_ref(),
            *json,
            &config,
        ),
        Commands::Pace {
            laps,
            results,
            drivers,
            output,
        } => pace(
            laps,
            results,
            drivers.unwrap_or(config.pace_driver_count),
            output.as_ref(),
            &config,
        ),
        Commands::Sessions {
            meetings,
            sessions: session_file,
            season,
            meeting,
        } => sessions(meetings, session_file, *season, meeting.as_deref()),
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
