//! Monthly prayer schedule joined with Hijri dates (Imsakiyah).

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::api::MonthlyScheduleResponse;
use crate::calendar;
use crate::display::{DAY_NAMES_ID, GREGORIAN_MONTHS_ID};
use crate::prayer::{PrayerKey, format_time, imsak_time};
use crate::traits::Clock;

/// One day of the schedule, flattened for printing and CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub day_name: &'static str,
    pub hijri: String,
    pub is_ramadan: bool,
    /// Only set on Ramadan days.
    pub imsak: Option<String>,
    pub subuh: String,
    pub terbit: String,
    pub dhuha: String,
    pub dzuhur: String,
    pub ashar: String,
    pub maghrib: String,
    pub isya: String,
}

#[derive(Debug, Clone)]
pub struct MonthlySchedule {
    pub month: u32,
    pub year: i32,
    pub days: Vec<ScheduleDay>,
}

impl MonthlySchedule {
    /// Join the backend's rows with the Hijri calendar.
    ///
    /// Fails when the backend reported an error or a row names a day that
    /// does not exist in the month.
    pub fn from_response(response: MonthlyScheduleResponse, imsak_offset_minutes: u32) -> Result<Self> {
        if let Some(err) = response.error {
            bail!("Backend could not build the schedule: {}", err);
        }

        let mut days = Vec::with_capacity(response.schedule.len());
        for row in &response.schedule {
            let date = NaiveDate::from_ymd_opt(response.year, response.month, row.day)
                .with_context(|| {
                    format!(
                        "Invalid schedule day {} for {}-{:02}",
                        row.day, response.year, response.month
                    )
                })?;
            let hijri = calendar::resolve(date);
            let times = row.time_set();

            let imsak = if hijri.is_ramadan {
                times
                    .time_of(PrayerKey::Subuh)
                    .map(|subuh| imsak_time(subuh, imsak_offset_minutes).format("%H:%M").to_string())
            } else {
                None
            };

            days.push(ScheduleDay {
                date,
                day_name: DAY_NAMES_ID[date.weekday().num_days_from_sunday() as usize],
                hijri: hijri.format_latin(),
                is_ramadan: hijri.is_ramadan,
                imsak,
                subuh: format_time(times.get(PrayerKey::Subuh)),
                terbit: format_time(times.get(PrayerKey::Terbit)),
                dhuha: format_time(times.get(PrayerKey::Dhuha)),
                dzuhur: format_time(times.get(PrayerKey::Dzuhur)),
                ashar: format_time(times.get(PrayerKey::Ashar)),
                maghrib: format_time(times.get(PrayerKey::Maghrib)),
                isya: format_time(times.get(PrayerKey::Isya)),
            });
        }
        days.sort_by_key(|d| d.date);

        Ok(Self {
            month: response.month,
            year: response.year,
            days,
        })
    }

    /// `"Februari 2026"`
    pub fn title(&self) -> String {
        let month = self
            .month
            .checked_sub(1)
            .and_then(|i| GREGORIAN_MONTHS_ID.get(i as usize))
            .copied()
            .unwrap_or("?");
        format!("{} {}", month, self.year)
    }

    pub fn has_ramadan(&self) -> bool {
        self.days.iter().any(|d| d.is_ramadan)
    }

    /// Plain-text table; adds an Imsak column when the month touches Ramadan.
    pub fn render_table(&self) -> String {
        let with_imsak = self.has_ramadan();
        let mut out = String::new();

        let _ = writeln!(out, "Jadwal Sholat {}", self.title());
        let imsak_header = if with_imsak { "Imsak  " } else { "" };
        let _ = writeln!(
            out,
            "{:<10} {:<7} {:<22} {}Subuh  Terbit Dhuha  Dzuhur Ashar  Maghrib Isya",
            "Tanggal", "Hari", "Hijriyah", imsak_header
        );

        for day in &self.days {
            let imsak = match (&day.imsak, with_imsak) {
                (Some(t), _) => format!("{:<7}", t),
                (None, true) => format!("{:<7}", ""),
                (None, false) => String::new(),
            };
            let _ = writeln!(
                out,
                "{:<10} {:<7} {:<22} {}{:<6} {:<6} {:<6} {:<6} {:<6} {:<7} {}",
                day.date.format("%Y-%m-%d"),
                day.day_name,
                day.hijri,
                imsak,
                day.subuh,
                day.terbit,
                day.dhuha,
                day.dzuhur,
                day.ashar,
                day.maghrib,
                day.isya
            );
        }

        out
    }

    /// Write the schedule to `jadwal_sholat_YYYYMM_<timestamp>.csv` in `output_dir`.
    pub async fn export_to_csv<C: Clock>(&self, output_dir: &Path, clock: &C) -> Result<PathBuf> {
        let export_time = clock.now_local();
        let filename = format!(
            "jadwal_sholat_{}{:02}_{}.csv",
            self.year,
            self.month,
            export_time.format("%Y%m%d_%H%M%S")
        );

        let output_path = output_dir.join(&filename);

        let path = output_path.clone();
        let days = self.days.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut wtr = csv::Writer::from_path(&path).context("Failed to create CSV writer")?;

            for day in days {
                wtr.serialize(day)
                    .context("Failed to serialize schedule day")?;
            }

            wtr.flush().context("Failed to flush CSV writer")?;
            Ok(())
        })
        .await
        .context("CSV export task failed")??;

        tracing::info!(path = %output_path.display(), "Exported monthly schedule");
        Ok(output_path)
    }
}
