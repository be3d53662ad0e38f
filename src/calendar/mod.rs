//! Table-driven Gregorian to Hijri conversion.
//!
//! This module provides:
//! - `HijriCalendarTable`: an ordered list of month ranges for one Hijri year
//! - `resolve`: total mapping from any Gregorian date to a `HijriDate`
//! - Latin and Arabic-Indic formatting, Ramadan helpers
//! - Upcoming Islamic events (see [`events`])
//!
//! Dates outside the covered year are estimated. Before the table only the
//! immediately preceding month is known; after the table every month is
//! assumed to be 30 days long. The estimate drifts from real lunar months
//! and is not astronomically accurate.

pub mod events;
pub mod table;

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;

pub use events::{ISLAMIC_EVENTS_1447, IslamicEvent, UpcomingEvent, next_event_in, next_islamic_event};
pub use table::{KHGT_1447, KHGT_YEAR, MONTH_NAMES_ARABIC, MONTH_NAMES_LATIN};

/// Month number of Ramadan.
pub const RAMADAN: u32 = 9;

/// Days per month used when extrapolating past the table.
const EXTRAPOLATED_MONTH_DAYS: i64 = 30;

const ARABIC_INDIC_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

/// One Hijri month and the Gregorian days it spans (inclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HijriMonthEntry {
    pub month: u32,
    pub name_latin: &'static str,
    pub name_arabic: &'static str,
    pub gregorian_start: NaiveDate,
    pub gregorian_end: NaiveDate,
}

impl HijriMonthEntry {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.gregorian_start <= date && date <= self.gregorian_end
    }

    /// 1-based day of this month for `date`. Caller checks `contains`.
    fn day_of(&self, date: NaiveDate) -> u32 {
        ((date - self.gregorian_start).num_days() + 1) as u32
    }

    pub fn length_days(&self) -> i64 {
        (self.gregorian_end - self.gregorian_start).num_days() + 1
    }
}

/// A resolved Hijri date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HijriDate {
    pub day: u32,
    pub month: u32,
    pub year: u32,
    pub month_name: &'static str,
    pub month_name_ar: &'static str,
    pub is_ramadan: bool,
}

impl HijriDate {
    /// Build a date, taking month names from the standard tables.
    ///
    /// Month numbers outside 1..=12 fall back to Muharram's names.
    pub fn new(day: u32, month: u32, year: u32) -> Self {
        let idx = month.checked_sub(1).map(|i| i as usize).filter(|&i| i < 12);
        let (month_name, month_name_ar) = match idx {
            Some(i) => (MONTH_NAMES_LATIN[i], MONTH_NAMES_ARABIC[i]),
            None => (MONTH_NAMES_LATIN[0], MONTH_NAMES_ARABIC[0]),
        };

        Self {
            day,
            month,
            year,
            month_name,
            month_name_ar,
            is_ramadan: month == RAMADAN,
        }
    }

    /// `"1 Ramadan 1447 H"`
    pub fn format_latin(&self) -> String {
        format!("{} {} {} H", self.day, self.month_name, self.year)
    }

    /// `"١ رمضان ١٤٤٧ هـ"`
    pub fn format_arabic(&self) -> String {
        format!(
            "{} {} {} هـ",
            to_arabic_digits(self.day),
            self.month_name_ar,
            to_arabic_digits(self.year)
        )
    }

    /// Day of Ramadan, or `None` outside Ramadan.
    pub fn ramadan_day(&self) -> Option<u32> {
        self.is_ramadan.then_some(self.day)
    }
}

impl fmt::Display for HijriDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_latin())
    }
}

/// Render a number with Arabic-Indic digits.
pub fn to_arabic_digits(n: u32) -> String {
    n.to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => ARABIC_INDIC_DIGITS[d as usize],
            None => c,
        })
        .collect()
}

/// Month ranges for a single Hijri year, scanned in order.
#[derive(Debug, Clone)]
pub struct HijriCalendarTable {
    year: u32,
    months: Vec<HijriMonthEntry>,
    preceding: Option<HijriMonthEntry>,
}

impl HijriCalendarTable {
    /// `months` must be non-empty and in chronological order. `preceding`
    /// is the last month of the previous year, if known.
    pub fn new(
        year: u32,
        months: Vec<HijriMonthEntry>,
        preceding: Option<HijriMonthEntry>,
    ) -> Self {
        assert!(!months.is_empty(), "a Hijri table needs at least one month");
        Self {
            year,
            months,
            preceding,
        }
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn months(&self) -> &[HijriMonthEntry] {
        &self.months
    }

    pub fn preceding_month(&self) -> Option<&HijriMonthEntry> {
        self.preceding.as_ref()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.months[0].gregorian_start
    }

    pub fn last_day(&self) -> NaiveDate {
        self.months[self.months.len() - 1].gregorian_end
    }

    /// Resolve a Gregorian date. Never fails.
    ///
    /// Inside the table the first entry whose range contains the date wins.
    /// Outside it the fallback rules described at module level apply, and
    /// anything still unmatched returns day 1 of Muharram of the table year.
    pub fn resolve(&self, date: NaiveDate) -> HijriDate {
        if let Some(entry) = self.months.iter().find(|m| m.contains(date)) {
            return HijriDate::new(entry.day_of(date), entry.month, self.year);
        }

        if date < self.first_day() {
            if let Some(prev) = self.preceding.as_ref().filter(|p| p.contains(date)) {
                return HijriDate::new(prev.day_of(date), prev.month, self.year.saturating_sub(1));
            }
        } else if date > self.last_day() {
            return self.extrapolate_after(date);
        }

        tracing::debug!(%date, year = self.year, "No Hijri rule matched, using sentinel date");
        HijriDate::new(1, 1, self.year)
    }

    /// Resolve the local calendar day of a timestamp. Time of day is ignored.
    pub fn resolve_datetime<Tz: TimeZone>(&self, when: &DateTime<Tz>) -> HijriDate {
        self.resolve(when.date_naive())
    }

    /// Thirty-day months counted from the day after the table ends.
    ///
    /// Past twelve estimated months the year keeps advancing, so the month
    /// number always stays within 1..=12.
    fn extrapolate_after(&self, date: NaiveDate) -> HijriDate {
        let days_after = (date - self.last_day()).num_days() - 1;
        let months_after = days_after / EXTRAPOLATED_MONTH_DAYS;
        let day = (days_after % EXTRAPOLATED_MONTH_DAYS) as u32 + 1;
        let month = (months_after % 12) as u32 + 1;
        let year = self.year + 1 + (months_after / 12) as u32;
        HijriDate::new(day, month, year)
    }

    /// Gregorian span of a month of the covered year.
    pub fn month_range(&self, month: u32) -> Option<(NaiveDate, NaiveDate)> {
        self.months
            .iter()
            .find(|m| m.month == month)
            .map(|m| (m.gregorian_start, m.gregorian_end))
    }

    /// Inverse of `resolve` for dates inside the covered year.
    pub fn to_gregorian(&self, hijri: &HijriDate) -> Option<NaiveDate> {
        if hijri.year != self.year || hijri.day == 0 {
            return None;
        }
        let entry = self.months.iter().find(|m| m.month == hijri.month)?;
        let date = entry.gregorian_start + chrono::Duration::days(i64::from(hijri.day) - 1);
        entry.contains(date).then_some(date)
    }
}

/// Resolve against the built-in KHGT 1447 H table.
pub fn resolve(date: NaiveDate) -> HijriDate {
    KHGT_1447.resolve(date)
}

pub fn is_ramadan(date: NaiveDate) -> bool {
    resolve(date).is_ramadan
}

/// Day of Ramadan for `date`, `None` when not in Ramadan.
pub fn ramadan_day(date: NaiveDate) -> Option<u32> {
    resolve(date).ramadan_day()
}
