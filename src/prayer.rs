//! Daily prayer times, per-prayer calibration and display rows.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Placeholder shown for a missing or unreadable time.
pub const TIME_PLACEHOLDER: &str = "--:--";

/// Minutes between Imsak and Subuh.
pub const DEFAULT_IMSAK_OFFSET_MINUTES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerKey {
    Subuh,
    Terbit,
    Dhuha,
    Dzuhur,
    Ashar,
    Maghrib,
    Isya,
}

/// Prayers that take part in current/next determination, in daily order.
/// Terbit and Dhuha are shown but have no adzan or iqamah.
pub const COUNTDOWN_SEQUENCE: [PrayerKey; 5] = [
    PrayerKey::Subuh,
    PrayerKey::Dzuhur,
    PrayerKey::Ashar,
    PrayerKey::Maghrib,
    PrayerKey::Isya,
];

impl PrayerKey {
    pub const ALL: [PrayerKey; 7] = [
        PrayerKey::Subuh,
        PrayerKey::Terbit,
        PrayerKey::Dhuha,
        PrayerKey::Dzuhur,
        PrayerKey::Ashar,
        PrayerKey::Maghrib,
        PrayerKey::Isya,
    ];

    /// Key as used by the backend (`"subuh"`, `"isya"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            PrayerKey::Subuh => "subuh",
            PrayerKey::Terbit => "terbit",
            PrayerKey::Dhuha => "dhuha",
            PrayerKey::Dzuhur => "dzuhur",
            PrayerKey::Ashar => "ashar",
            PrayerKey::Maghrib => "maghrib",
            PrayerKey::Isya => "isya",
        }
    }

    /// Indonesian name.
    pub fn name_id(self) -> &'static str {
        match self {
            PrayerKey::Subuh => "Subuh",
            PrayerKey::Terbit => "Terbit",
            PrayerKey::Dhuha => "Dhuha",
            PrayerKey::Dzuhur => "Dzuhur",
            PrayerKey::Ashar => "Ashar",
            PrayerKey::Maghrib => "Maghrib",
            PrayerKey::Isya => "Isya",
        }
    }

    pub fn name_ar(self) -> &'static str {
        match self {
            PrayerKey::Subuh => "الفجر",
            PrayerKey::Terbit => "الشروق",
            PrayerKey::Dhuha => "الضحى",
            PrayerKey::Dzuhur => "الظهر",
            PrayerKey::Ashar => "العصر",
            PrayerKey::Maghrib => "المغرب",
            PrayerKey::Isya => "العشاء",
        }
    }

    /// Whether the prayer is congregational (has adzan and iqamah).
    pub fn has_iqomah(self) -> bool {
        COUNTDOWN_SEQUENCE.contains(&self)
    }
}

impl fmt::Display for PrayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse `"HH:MM"` or `"HH:MM:SS"`.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// Zero-padded `HH:MM`, or [`TIME_PLACEHOLDER`] when absent or unreadable.
pub fn format_time(value: Option<&str>) -> String {
    value
        .and_then(parse_time_of_day)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| TIME_PLACEHOLDER.to_string())
}

/// One day's prayer times as received from the backend.
///
/// Values are kept as raw strings; parsing happens per lookup so one bad
/// entry never hides the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrayerTimeSet {
    times: BTreeMap<PrayerKey, String>,
}

impl PrayerTimeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: PrayerKey, time: impl Into<String>) -> Self {
        self.insert(key, time);
        self
    }

    pub fn insert(&mut self, key: PrayerKey, time: impl Into<String>) {
        self.times.insert(key, time.into());
    }

    pub fn get(&self, key: PrayerKey) -> Option<&str> {
        self.times.get(&key).map(String::as_str)
    }

    /// Parsed time of day, `None` if missing or malformed.
    pub fn time_of(&self, key: PrayerKey) -> Option<NaiveTime> {
        self.get(key).and_then(parse_time_of_day)
    }

    /// True when every countdown prayer has a readable time.
    pub fn is_complete(&self) -> bool {
        COUNTDOWN_SEQUENCE.iter().all(|&k| self.time_of(k).is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(PrayerKey, S)> for PrayerTimeSet {
    fn from_iter<I: IntoIterator<Item = (PrayerKey, S)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, time) in iter {
            set.insert(key, time);
        }
        set
    }
}

/// Settings that drive the countdown for a single prayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrayerCalibration {
    pub iqomah_minutes: u32,
    pub bell_enabled: bool,
    pub bell_before_minutes: u32,
}

/// Mosque-wide prayer settings: per-prayer iqomah plus global bell and
/// iqamah cue options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrayerSettings {
    iqomah: BTreeMap<PrayerKey, u32>,
    pub bell_enabled: bool,
    pub bell_before_minutes: u32,
    /// Cue with one minute of iqamah left.
    pub sound_pre_iqamah: bool,
    /// Cue as the iqamah countdown runs out.
    pub sound_iqamah: bool,
}

impl Default for PrayerSettings {
    fn default() -> Self {
        Self {
            iqomah: BTreeMap::from([
                (PrayerKey::Subuh, 15),
                (PrayerKey::Dzuhur, 10),
                (PrayerKey::Ashar, 10),
                (PrayerKey::Maghrib, 5),
                (PrayerKey::Isya, 10),
            ]),
            bell_enabled: true,
            bell_before_minutes: 5,
            sound_pre_iqamah: true,
            sound_iqamah: true,
        }
    }
}

impl PrayerSettings {
    pub fn with_iqomah(mut self, key: PrayerKey, minutes: u32) -> Self {
        self.iqomah.insert(key, minutes);
        self
    }

    pub fn with_bell(mut self, enabled: bool, before_minutes: u32) -> Self {
        self.bell_enabled = enabled;
        self.bell_before_minutes = before_minutes;
        self
    }

    pub fn with_iqamah_cues(mut self, pre_iqamah: bool, iqamah: bool) -> Self {
        self.sound_pre_iqamah = pre_iqamah;
        self.sound_iqamah = iqamah;
        self
    }

    /// Iqomah minutes for `key`, 0 for prayers without iqamah.
    pub fn iqomah_minutes(&self, key: PrayerKey) -> u32 {
        if !key.has_iqomah() {
            return 0;
        }
        self.iqomah.get(&key).copied().unwrap_or(0)
    }

    pub fn calibration_for(&self, key: PrayerKey) -> PrayerCalibration {
        PrayerCalibration {
            iqomah_minutes: self.iqomah_minutes(key),
            bell_enabled: self.bell_enabled,
            bell_before_minutes: self.bell_before_minutes,
        }
    }
}

/// Imsak for a given Subuh. Borrows from the hour and wraps past midnight.
pub fn imsak_time(subuh: NaiveTime, offset_minutes: u32) -> NaiveTime {
    subuh
        .overflowing_sub_signed(TimeDelta::minutes(i64::from(offset_minutes)))
        .0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplaySlot {
    /// Display-only, shown in Ramadan.
    Imsak,
    Prayer(PrayerKey),
}

/// One row of the board's prayer table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub slot: DisplaySlot,
    pub name: &'static str,
    pub name_ar: &'static str,
    /// `HH:MM` or [`TIME_PLACEHOLDER`].
    pub time: String,
}

const DISPLAY_ORDER: [PrayerKey; 6] = [
    PrayerKey::Subuh,
    PrayerKey::Terbit,
    PrayerKey::Dzuhur,
    PrayerKey::Ashar,
    PrayerKey::Maghrib,
    PrayerKey::Isya,
];

/// Rows for the board: Imsak first during Ramadan, then the daily times.
pub fn display_rows(times: &PrayerTimeSet, ramadan: bool, imsak_offset_minutes: u32) -> Vec<DisplayRow> {
    let mut rows = Vec::with_capacity(DISPLAY_ORDER.len() + 1);

    if ramadan {
        let time = times
            .time_of(PrayerKey::Subuh)
            .map(|subuh| imsak_time(subuh, imsak_offset_minutes).format("%H:%M").to_string())
            .unwrap_or_else(|| TIME_PLACEHOLDER.to_string());
        rows.push(DisplayRow {
            slot: DisplaySlot::Imsak,
            name: "Imsak",
            name_ar: "الإمساك",
            time,
        });
    }

    rows.extend(DISPLAY_ORDER.iter().map(|&key| DisplayRow {
        slot: DisplaySlot::Prayer(key),
        name: if key == PrayerKey::Terbit { "Syuruq" } else { key.name_id() },
        name_ar: key.name_ar(),
        time: format_time(times.get(key)),
    }));

    rows
}
