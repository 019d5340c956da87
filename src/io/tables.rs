//! CSV table ingest.
//!
//! Turns the processed CSV files into typed `TableSet` rows. Design goals:
//!
//! - **Strict schema** for required columns (clear errors + exit code 2),
//!   checked once here so downstream code never branches on table shape
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Graceful absence**: a missing table file is an empty table, not an
//!   error; "no data" is a narrative outcome, not a crash

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::{
    DailyUsageRow, KpiRow, NewUserRow, ObservationPeriod, Peak48hRow, Peak7dRow, ReleaseInfo,
    TableSet,
};
use crate::error::AppError;

pub const KPI_FILE: &str = "kpi.csv";
pub const PEAK_7D_FILE: &str = "peak_7d.csv";
pub const PEAK_48H_FILE: &str = "peak_48h.csv";
pub const DAILY_USAGE_FILE: &str = "daily_usage.csv";
pub const NEW_USERS_FILE: &str = "new_users.csv";
pub const OBSERVATION_FILE: &str = "observation_period.csv";
pub const RELEASE_FILE: &str = "release_info.csv";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub file: String,
    pub line: usize,
    pub message: String,
}

/// Ingest output: typed tables + row errors + read counters.
#[derive(Debug, Clone)]
pub struct LoadedTables {
    pub tables: TableSet,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load every table file found under `dir`.
///
/// Missing individual files yield empty tables; if none of the five data
/// tables exist at all, the directory is considered unusable.
pub fn load_dir(dir: &Path) -> Result<LoadedTables, AppError> {
    let mut tables = TableSet::default();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut any_found = false;

    if let Some(file) = open_optional(&dir.join(KPI_FILE))? {
        any_found = true;
        tables.kpi = read_kpi(file, KPI_FILE, &mut row_errors, &mut rows_read)?;
    }
    if let Some(file) = open_optional(&dir.join(PEAK_7D_FILE))? {
        any_found = true;
        tables.peak_7d = read_peak_7d(file, PEAK_7D_FILE, &mut row_errors, &mut rows_read)?;
    }
    if let Some(file) = open_optional(&dir.join(PEAK_48H_FILE))? {
        any_found = true;
        tables.peak_48h = read_peak_48h(file, PEAK_48H_FILE, &mut row_errors, &mut rows_read)?;
    }
    if let Some(file) = open_optional(&dir.join(DAILY_USAGE_FILE))? {
        any_found = true;
        tables.daily_usage =
            read_daily_usage(file, DAILY_USAGE_FILE, &mut row_errors, &mut rows_read)?;
    }
    if let Some(file) = open_optional(&dir.join(NEW_USERS_FILE))? {
        any_found = true;
        tables.new_users = read_new_users(file, NEW_USERS_FILE, &mut row_errors, &mut rows_read)?;
    }

    if !any_found {
        return Err(AppError::no_data(format!(
            "No data tables found in '{}'. Run `insight mock` to generate a sample dataset.",
            dir.display()
        )));
    }

    if let Some(file) = open_optional(&dir.join(OBSERVATION_FILE))? {
        tables.observation =
            read_observation(file, OBSERVATION_FILE, &mut row_errors, &mut rows_read)?;
    }
    if let Some(file) = open_optional(&dir.join(RELEASE_FILE))? {
        tables.releases = read_releases(file, RELEASE_FILE, &mut row_errors, &mut rows_read)?;
    }

    Ok(LoadedTables {
        tables,
        row_errors,
        rows_read,
    })
}

fn open_optional(path: &Path) -> Result<Option<File>, AppError> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::internal(format!(
            "Failed to open '{}': {e}",
            path.display()
        ))),
    }
}

pub fn read_kpi(
    input: impl Read,
    file: &str,
    errors: &mut Vec<RowError>,
    rows_read: &mut usize,
) -> Result<Vec<KpiRow>, AppError> {
    parse_table(input, file, &["product_line", "metric_name", "value"], errors, rows_read, |record, map| {
        Ok(KpiRow {
            product_line: required_field(record, map, "product_line")?,
            metric_name: required_field(record, map, "metric_name")?,
            value: parse_u64(record, map, "value")?,
        })
    })
}

pub fn read_peak_7d(
    input: impl Read,
    file: &str,
    errors: &mut Vec<RowError>,
    rows_read: &mut usize,
) -> Result<Vec<Peak7dRow>, AppError> {
    parse_table(input, file, &["product_line", "date", "feature_id", "task_cnt"], errors, rows_read, |record, map| {
        Ok(Peak7dRow {
            product_line: required_field(record, map, "product_line")?,
            date: parse_date(record, map, "date")?,
            feature_id: parse_u64(record, map, "feature_id")? as u32,
            task_cnt: parse_u64(record, map, "task_cnt")?,
        })
    })
}

pub fn read_peak_48h(
    input: impl Read,
    file: &str,
    errors: &mut Vec<RowError>,
    rows_read: &mut usize,
) -> Result<Vec<Peak48hRow>, AppError> {
    parse_table(input, file, &["product_line", "hour_slot", "task_cnt"], errors, rows_read, |record, map| {
        let label = required_field(record, map, "hour_slot")?;
        let slot = parse_slot(&label)?;
        Ok(Peak48hRow {
            product_line: required_field(record, map, "product_line")?,
            slot,
            slot_label: label,
            task_cnt: parse_u64(record, map, "task_cnt")?,
        })
    })
}

pub fn read_daily_usage(
    input: impl Read,
    file: &str,
    errors: &mut Vec<RowError>,
    rows_read: &mut usize,
) -> Result<Vec<DailyUsageRow>, AppError> {
    parse_table(
        input,
        file,
        &["product_line", "date", "avg_daily_usage_per_user", "total_usage_count", "dau"],
        errors,
        rows_read,
        |record, map| {
            Ok(DailyUsageRow {
                product_line: required_field(record, map, "product_line")?,
                date: parse_date(record, map, "date")?,
                avg_daily_usage_per_user: parse_f64(record, map, "avg_daily_usage_per_user")?,
                total_usage_count: parse_u64(record, map, "total_usage_count")?,
                dau: parse_u64(record, map, "dau")?,
            })
        },
    )
}

pub fn read_new_users(
    input: impl Read,
    file: &str,
    errors: &mut Vec<RowError>,
    rows_read: &mut usize,
) -> Result<Vec<NewUserRow>, AppError> {
    parse_table(input, file, &["product_line", "date", "new_ai_users"], errors, rows_read, |record, map| {
        Ok(NewUserRow {
            product_line: required_field(record, map, "product_line")?,
            date: parse_date(record, map, "date")?,
            new_ai_users: parse_u64(record, map, "new_ai_users")?,
        })
    })
}

/// Read the observation-period record (first row wins).
pub fn read_observation(
    input: impl Read,
    file: &str,
    errors: &mut Vec<RowError>,
    rows_read: &mut usize,
) -> Result<Option<ObservationPeriod>, AppError> {
    let rows = parse_table(input, file, &["start_date", "end_date"], errors, rows_read, |record, map| {
        Ok(ObservationPeriod {
            start_date: parse_date(record, map, "start_date")?,
            end_date: parse_date(record, map, "end_date")?,
        })
    })?;
    Ok(rows.into_iter().next())
}

pub fn read_releases(
    input: impl Read,
    file: &str,
    errors: &mut Vec<RowError>,
    rows_read: &mut usize,
) -> Result<Vec<ReleaseInfo>, AppError> {
    parse_table(input, file, &["region", "release_date"], errors, rows_read, |record, map| {
        Ok(ReleaseInfo {
            region: required_field(record, map, "region")?,
            release_date: parse_date(record, map, "release_date")?,
        })
    })
}

/// Shared table-parsing scaffold: header validation, then row-by-row parse
/// with per-row error collection.
fn parse_table<R: Read, T>(
    input: R,
    file: &str,
    required: &[&str],
    errors: &mut Vec<RowError>,
    rows_read: &mut usize,
    parse_row: impl Fn(&StringRecord, &HashMap<String, usize>) -> Result<T, String>,
) -> Result<Vec<T>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::config(format!("Failed to read headers of {file}: {e}")))?
        .clone();
    let map = header_map(&headers);

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !map.contains_key(*col))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::config(format!(
            "{file} is missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, and CSV lines are 1-based.
        let line = idx + 2;
        *rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                errors.push(RowError {
                    file: file.to_string(),
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &map) {
            Ok(row) => rows.push(row),
            Err(message) => errors.push(RowError {
                file: file.to_string(),
                line,
                message,
            }),
        }
    }

    Ok(rows)
}

fn header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header; strip it so schema validation doesn't report the
    // column as missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn required_field(
    record: &StringRecord,
    map: &HashMap<String, usize>,
    name: &str,
) -> Result<String, String> {
    let value = map
        .get(name)
        .and_then(|&idx| record.get(idx))
        .unwrap_or("");
    if value.is_empty() {
        return Err(format!("Missing value for '{name}'"));
    }
    Ok(value.to_string())
}

fn parse_u64(
    record: &StringRecord,
    map: &HashMap<String, usize>,
    name: &str,
) -> Result<u64, String> {
    let raw = required_field(record, map, name)?;
    raw.parse::<u64>()
        .map_err(|_| format!("Invalid count for '{name}': '{raw}'"))
}

fn parse_f64(
    record: &StringRecord,
    map: &HashMap<String, usize>,
    name: &str,
) -> Result<f64, String> {
    let raw = required_field(record, map, name)?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("Invalid number for '{name}': '{raw}'"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("Out-of-range value for '{name}': '{raw}'"));
    }
    Ok(value)
}

fn parse_date(
    record: &StringRecord,
    map: &HashMap<String, usize>,
    name: &str,
) -> Result<NaiveDate, String> {
    let raw = required_field(record, map, name)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date for '{name}': '{raw}' (expected YYYY-MM-DD)"))
}

fn parse_slot(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .map_err(|_| format!("Invalid hour slot: '{raw}' (expected YYYY-MM-DD HH:00)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn kpi_parses_and_strips_bom() {
        let csv = "\u{feff}product_line,metric_name,value\nbasketball,total_users,16\nsoccer,total_users,12\n";
        let mut errors = Vec::new();
        let mut rows_read = 0;
        let rows = read_kpi(csv.as_bytes(), KPI_FILE, &mut errors, &mut rows_read).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_line, "basketball");
        assert_eq!(rows[0].value, 16);
        assert!(errors.is_empty());
        assert_eq!(rows_read, 2);
    }

    #[test]
    fn bad_rows_are_collected_not_fatal() {
        let csv = "product_line,date,new_ai_users\nbasketball,2026-02-01,3\nbasketball,not-a-date,1\nsoccer,2026-02-02,oops\n";
        let mut errors = Vec::new();
        let mut rows_read = 0;
        let rows = read_new_users(csv.as_bytes(), NEW_USERS_FILE, &mut errors, &mut rows_read).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, d("2026-02-01"));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].line, 3);
        assert_eq!(errors[1].line, 4);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let csv = "product_line,value\nbasketball,16\n";
        let mut errors = Vec::new();
        let mut rows_read = 0;
        let err = read_kpi(csv.as_bytes(), KPI_FILE, &mut errors, &mut rows_read).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn hour_slots_parse_into_timestamps() {
        let csv = "product_line,hour_slot,task_cnt\nbasketball,2026-02-25 13:00,2\n";
        let mut errors = Vec::new();
        let mut rows_read = 0;
        let rows =
            read_peak_48h(csv.as_bytes(), PEAK_48H_FILE, &mut errors, &mut rows_read).unwrap();
        assert_eq!(rows[0].slot.date(), d("2026-02-25"));
        assert_eq!(rows[0].slot_label, "2026-02-25 13:00");
    }

    #[test]
    fn observation_takes_first_row() {
        let csv = "start_date,end_date\n2026-01-31,2026-02-26\n2020-01-01,2020-01-02\n";
        let mut errors = Vec::new();
        let mut rows_read = 0;
        let obs = read_observation(csv.as_bytes(), OBSERVATION_FILE, &mut errors, &mut rows_read)
            .unwrap()
            .unwrap();
        assert_eq!(obs.start_date, d("2026-01-31"));
        assert_eq!(obs.end_date, d("2026-02-26"));
    }

    #[test]
    fn empty_table_body_is_fine() {
        let csv = "product_line,metric_name,value\n";
        let mut errors = Vec::new();
        let mut rows_read = 0;
        let rows = read_kpi(csv.as_bytes(), KPI_FILE, &mut errors, &mut rows_read).unwrap();
        assert!(rows.is_empty());
        assert!(errors.is_empty());
    }
}
