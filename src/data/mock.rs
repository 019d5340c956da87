//! Seeded mock dataset generation.
//!
//! Produces a schema-consistent sample dataset (two product lines, one
//! observation window) for demos and tests, plus a CSV writer so
//! `insight mock` can seed a data directory. Generation is deterministic
//! per seed.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Poisson;

use crate::domain::{
    DailyUsageRow, KpiRow, NewUserRow, ObservationPeriod, Peak48hRow, Peak7dRow, ReleaseInfo,
    TableSet,
};
use crate::error::AppError;
use crate::io::tables::{
    DAILY_USAGE_FILE, KPI_FILE, NEW_USERS_FILE, OBSERVATION_FILE, PEAK_48H_FILE, PEAK_7D_FILE,
    RELEASE_FILE,
};

const PRODUCTS: [&str; 2] = ["basketball", "soccer"];
const KPI_VALUES: [u64; 2] = [16, 12];
const FEATURE_IDS: [u32; 5] = [19, 3, 2, 5, 8];

/// Mean tasks per hour slot (sparse arrivals).
const SLOT_TASK_RATE: f64 = 0.45;
/// Mean signups per product and day (sparse arrivals).
const NEW_USER_RATE: f64 = 0.9;

/// Generate the full mock table set for a seed.
pub fn generate_mock_tables(seed: u64) -> Result<TableSet, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);

    let obs_start = ymd(2026, 1, 31)?;
    let obs_end = ymd(2026, 2, 26)?;

    let kpi = PRODUCTS
        .iter()
        .zip(KPI_VALUES)
        .map(|(product, value)| KpiRow {
            product_line: product.to_string(),
            metric_name: "total_users".to_string(),
            value,
        })
        .collect();

    // 7-day peak window: the last week of the observation period, one row per
    // product, date and feature.
    let week_start = ymd(2026, 2, 19)?;
    let mut peak_7d = Vec::with_capacity(PRODUCTS.len() * 7 * FEATURE_IDS.len());
    for product in PRODUCTS {
        for day in 0..7 {
            let date = week_start + Duration::days(day);
            for feature_id in FEATURE_IDS {
                peak_7d.push(Peak7dRow {
                    product_line: product.to_string(),
                    date,
                    feature_id,
                    task_cnt: rng.gen_range(0..=2),
                });
            }
        }
    }

    // 48 hourly slots ending at the observation end.
    let slot_base = ymd(2026, 2, 25)?
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::internal("Invalid mock slot base time."))?;
    let slot_tasks = Poisson::new(SLOT_TASK_RATE)
        .map_err(|e| AppError::internal(format!("Mock distribution error: {e}")))?;
    let mut peak_48h = Vec::with_capacity(PRODUCTS.len() * 48);
    for product in PRODUCTS {
        for hour in 0..48 {
            let slot: NaiveDateTime = slot_base + Duration::hours(hour);
            peak_48h.push(Peak48hRow {
                product_line: product.to_string(),
                slot,
                slot_label: slot.format("%Y-%m-%d %H:00").to_string(),
                task_cnt: slot_tasks.sample(&mut rng) as u64,
            });
        }
    }

    // Daily usage and signups across the whole observation window.
    let n_days = (obs_end - obs_start).num_days() + 1;
    let signups = Poisson::new(NEW_USER_RATE)
        .map_err(|e| AppError::internal(format!("Mock distribution error: {e}")))?;
    let mut daily_usage = Vec::with_capacity(PRODUCTS.len() * n_days as usize);
    let mut new_users = Vec::with_capacity(PRODUCTS.len() * n_days as usize);
    for product in PRODUCTS {
        for day in 0..n_days {
            let date = obs_start + Duration::days(day);

            let dau: u64 = rng.gen_range(0..=4);
            let total = if dau > 0 { dau * rng.gen_range(1..=2) } else { 0 };
            let avg = if dau > 0 {
                round2(total as f64 / dau as f64)
            } else {
                0.0
            };
            daily_usage.push(DailyUsageRow {
                product_line: product.to_string(),
                date,
                avg_daily_usage_per_user: avg,
                total_usage_count: total,
                dau,
            });

            new_users.push(NewUserRow {
                product_line: product.to_string(),
                date,
                new_ai_users: signups.sample(&mut rng) as u64,
            });
        }
    }

    Ok(TableSet {
        kpi,
        peak_7d,
        peak_48h,
        daily_usage,
        new_users,
        observation: Some(ObservationPeriod {
            start_date: obs_start,
            end_date: obs_end,
        }),
        releases: vec![
            ReleaseInfo {
                region: "domestic".to_string(),
                release_date: ymd(2026, 2, 9)?,
            },
            ReleaseInfo {
                region: "overseas".to_string(),
                release_date: ymd(2026, 2, 11)?,
            },
        ],
    })
}

/// Write the table set as the CSV files the loader expects.
pub fn write_mock_csvs(dir: &Path, tables: &TableSet) -> Result<(), AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::internal(format!("Failed to create '{}': {e}", dir.display())))?;

    let mut kpi = create(dir, KPI_FILE)?;
    wline(&mut kpi, KPI_FILE, "product_line,metric_name,value")?;
    for r in &tables.kpi {
        wline(
            &mut kpi,
            KPI_FILE,
            &format!("{},{},{}", r.product_line, r.metric_name, r.value),
        )?;
    }

    let mut peak_7d = create(dir, PEAK_7D_FILE)?;
    wline(&mut peak_7d, PEAK_7D_FILE, "product_line,date,feature_id,task_cnt")?;
    for r in &tables.peak_7d {
        wline(
            &mut peak_7d,
            PEAK_7D_FILE,
            &format!("{},{},{},{}", r.product_line, r.date, r.feature_id, r.task_cnt),
        )?;
    }

    let mut peak_48h = create(dir, PEAK_48H_FILE)?;
    wline(&mut peak_48h, PEAK_48H_FILE, "product_line,hour_slot,task_cnt")?;
    for r in &tables.peak_48h {
        wline(
            &mut peak_48h,
            PEAK_48H_FILE,
            &format!("{},{},{}", r.product_line, r.slot_label, r.task_cnt),
        )?;
    }

    let mut daily = create(dir, DAILY_USAGE_FILE)?;
    wline(
        &mut daily,
        DAILY_USAGE_FILE,
        "product_line,date,avg_daily_usage_per_user,total_usage_count,dau",
    )?;
    for r in &tables.daily_usage {
        wline(
            &mut daily,
            DAILY_USAGE_FILE,
            &format!(
                "{},{},{},{},{}",
                r.product_line, r.date, r.avg_daily_usage_per_user, r.total_usage_count, r.dau
            ),
        )?;
    }

    let mut new_users = create(dir, NEW_USERS_FILE)?;
    wline(&mut new_users, NEW_USERS_FILE, "product_line,date,new_ai_users")?;
    for r in &tables.new_users {
        wline(
            &mut new_users,
            NEW_USERS_FILE,
            &format!("{},{},{}", r.product_line, r.date, r.new_ai_users),
        )?;
    }

    if let Some(obs) = tables.observation {
        let mut file = create(dir, OBSERVATION_FILE)?;
        wline(&mut file, OBSERVATION_FILE, "start_date,end_date")?;
        wline(
            &mut file,
            OBSERVATION_FILE,
            &format!("{},{}", obs.start_date, obs.end_date),
        )?;
    }

    if !tables.releases.is_empty() {
        let mut file = create(dir, RELEASE_FILE)?;
        wline(&mut file, RELEASE_FILE, "region,release_date")?;
        for r in &tables.releases {
            wline(
                &mut file,
                RELEASE_FILE,
                &format!("{},{}", r.region, r.release_date),
            )?;
        }
    }

    Ok(())
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, AppError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AppError::internal("Invalid mock calendar date."))
}

fn create(dir: &Path, name: &str) -> Result<File, AppError> {
    let path = dir.join(name);
    File::create(&path)
        .map_err(|e| AppError::internal(format!("Failed to create '{}': {e}", path.display())))
}

fn wline(file: &mut File, name: &str, line: &str) -> Result<(), AppError> {
    writeln!(file, "{line}").map_err(|e| AppError::internal(format!("Failed to write {name}: {e}")))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = generate_mock_tables(42).unwrap();
        let b = generate_mock_tables(42).unwrap();
        let c = generate_mock_tables(7).unwrap();

        let json_a = serde_json::to_string(&a).unwrap();
        let json_b = serde_json::to_string(&b).unwrap();
        let json_c = serde_json::to_string(&c).unwrap();
        assert_eq!(json_a, json_b);
        assert_ne!(json_a, json_c);
    }

    #[test]
    fn shapes_match_the_dashboard_schema() {
        let tables = generate_mock_tables(42).unwrap();
        assert_eq!(tables.kpi.len(), 2);
        assert_eq!(tables.peak_7d.len(), 2 * 7 * 5);
        assert_eq!(tables.peak_48h.len(), 2 * 48);
        assert_eq!(tables.daily_usage.len(), 2 * 27);
        assert_eq!(tables.new_users.len(), 2 * 27);
        assert_eq!(tables.releases.len(), 2);

        let obs = tables.observation.unwrap();
        assert_eq!(obs.start_date, d("2026-01-31"));
        assert_eq!(obs.end_date, d("2026-02-26"));
    }

    #[test]
    fn daily_usage_rows_are_internally_consistent() {
        let tables = generate_mock_tables(42).unwrap();
        for row in &tables.daily_usage {
            if row.dau == 0 {
                assert_eq!(row.total_usage_count, 0);
                assert_eq!(row.avg_daily_usage_per_user, 0.0);
            } else {
                let avg = row.total_usage_count as f64 / row.dau as f64;
                assert!((row.avg_daily_usage_per_user - avg).abs() < 0.01);
            }
        }
    }

    #[test]
    fn slot_labels_cover_48_hours() {
        let tables = generate_mock_tables(42).unwrap();
        let first = &tables.peak_48h[0];
        let last = &tables.peak_48h[47];
        assert_eq!(first.slot_label, "2026-02-25 00:00");
        assert_eq!(last.slot_label, "2026-02-26 23:00");
    }
}
