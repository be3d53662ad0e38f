//! The TV board: latest backend snapshot in, one rendered frame per tick out.
//!
//! A `DisplaySession` owns its own bell debounce, so every board (or viewer)
//! gets an independent countdown stream.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::api::{MosqueIdentity, Snapshot};
use crate::calendar::{self, HijriDate};
use crate::config::DisplayConfig;
use crate::countdown::{CountdownState, Cue, Phase, PrayerCountdownEngine, determine_current_and_next};
use crate::prayer::{DisplaySlot, PrayerSettings, PrayerTimeSet, display_rows};
use crate::traits::Notifier;

/// Typed refresh errors shown on the board's status line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Data validation error: {0}")]
    Validation(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl DisplayError {
    /// Classify a failed refresh. Unreadable responses are validation
    /// errors, everything else that is not local IO is the network.
    pub fn from_refresh(err: &anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        let is_decode = err.chain().any(|cause| {
            cause.is::<serde_json::Error>()
                || cause
                    .downcast_ref::<reqwest::Error>()
                    .is_some_and(reqwest::Error::is_decode)
        });

        if is_decode {
            DisplayError::Validation(message)
        } else if err.chain().any(|cause| cause.is::<std::io::Error>()) {
            DisplayError::Io(message)
        } else {
            DisplayError::Network(message)
        }
    }
}

pub const COUNTDOWN_PLACEHOLDER: &str = "--:--:--";

pub const GREGORIAN_MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Sunday first.
pub const DAY_NAMES_ID: [&str; 7] = ["Minggu", "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu"];

/// `"Rabu, 18 Februari 2026"`
pub fn format_date_indonesian(date: NaiveDate) -> String {
    let day_name = DAY_NAMES_ID[date.weekday().num_days_from_sunday() as usize];
    let month = GREGORIAN_MONTHS_ID[date.month0() as usize];
    format!("{}, {} {} {}", day_name, date.day(), month, date.year())
}

/// `HH:MM:SS`; hours keep growing past 99.
pub fn format_countdown(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hrs, mins, secs)
}

/// One prayer row as drawn on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrayerRowView {
    pub name: &'static str,
    pub name_ar: &'static str,
    pub time: String,
    pub is_current: bool,
    pub is_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventView {
    pub name: &'static str,
    pub hijri: &'static str,
    pub days_until: i64,
}

/// Everything the board shows for one tick.
#[derive(Debug, Clone)]
pub struct Frame {
    pub mosque_name: String,
    pub mosque_address: String,
    pub gregorian: String,
    pub clock: String,
    pub hijri: HijriDate,
    pub hijri_latin: String,
    pub hijri_arabic: String,
    pub ramadan_day: Option<u32>,
    pub rows: Vec<PrayerRowView>,
    pub countdown: Option<CountdownState>,
    pub countdown_text: String,
    pub label: String,
    pub urgent: bool,
    pub next_event: Option<EventView>,
    pub status: Option<String>,
}

/// Countdown caption, e.g. `"Menuju Ashar"` or `"Iqomah Isya"`.
pub fn countdown_label(state: Option<&CountdownState>) -> String {
    match state {
        Some(s) if s.phase == Phase::Iqamah => match s.current_prayer {
            Some(current) => format!("Iqomah {}", current.name_id()),
            None => "Iqomah".to_string(),
        },
        Some(s) => format!("Menuju {}", s.next_prayer.name_id()),
        None => "Jadwal belum tersedia".to_string(),
    }
}

pub struct DisplaySession {
    config: DisplayConfig,
    notifier: Arc<dyn Notifier>,
    bell_notifications: bool,
    snapshot: Option<Snapshot>,
    engine: PrayerCountdownEngine,
    last_error: Option<DisplayError>,
}

impl DisplaySession {
    pub fn new(config: DisplayConfig, notifier: Arc<dyn Notifier>, bell_notifications: bool) -> Self {
        Self {
            config,
            notifier,
            bell_notifications,
            snapshot: None,
            engine: PrayerCountdownEngine::new(),
            last_error: None,
        }
    }

    /// Replace the snapshot. Incomplete prayer times are kept but flagged.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.last_error = (!snapshot.prayer_times.is_complete()).then(|| {
            DisplayError::Validation("prayer times are incomplete".to_string())
        });
        if let Some(err) = &self.last_error {
            tracing::warn!("{}", err);
        }
        self.snapshot = Some(snapshot);
    }

    /// Record a failed refresh; the previous snapshot stays on screen.
    pub fn record_refresh_error(&mut self, err: DisplayError) {
        tracing::error!("Snapshot refresh failed: {}", err);
        self.last_error = Some(err);
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn last_error(&self) -> Option<&DisplayError> {
        self.last_error.as_ref()
    }

    /// True when there is no snapshot yet or it belongs to another day.
    pub fn needs_refresh(&self, now: NaiveDateTime) -> bool {
        match &self.snapshot {
            None => true,
            Some(s) => s.for_date.is_some_and(|d| d != now.date()),
        }
    }

    /// Deliver the bell or an iqamah cue raised on this tick.
    fn announce(&self, state: &CountdownState) {
        let (title, body) = match (state.bell_should_fire, state.cue) {
            (true, _) => (
                "Bel Sholat",
                format!(
                    "{} dalam {} menit",
                    state.next_prayer.name_id(),
                    state.remaining_seconds.div_ceil(60)
                ),
            ),
            (false, Some(cue)) => {
                let prayer = state.current_prayer.map_or("Sholat", |p| p.name_id());
                match cue {
                    Cue::PreIqamah => ("Iqomah", format!("{} 1 menit lagi", prayer)),
                    Cue::Iqamah => ("Iqomah", format!("{} sekarang", prayer)),
                }
            }
            (false, None) => return,
        };

        if !self.bell_notifications {
            tracing::debug!(title, body = %body, "Notifications disabled, cue not delivered");
            return;
        }
        if let Err(e) = self.notifier.notify(title, &body) {
            tracing::warn!("Failed to deliver {} notification: {}", title, e);
        }
    }

    /// Evaluate one tick and ring the bell or cue if this is the tick for it.
    pub fn tick(&mut self, now: NaiveDateTime) -> Frame {
        let default_times = PrayerTimeSet::new();
        let default_settings = PrayerSettings::default();
        let default_identity = MosqueIdentity::default();
        let (times, settings, identity) = match &self.snapshot {
            Some(s) => (&s.prayer_times, &s.settings, &s.identity),
            None => (&default_times, &default_settings, &default_identity),
        };

        let today = now.date();
        let hijri = calendar::resolve(today);

        let countdown = self.engine.tick(times, settings, now);
        if let Some(state) = &countdown {
            self.announce(state);
        }

        let position = determine_current_and_next(times, now);
        let rows = display_rows(times, hijri.is_ramadan, self.config.imsak_offset_minutes)
            .into_iter()
            .map(|row| {
                let (is_current, is_next) = match row.slot {
                    DisplaySlot::Prayer(key) => (
                        position.current == Some(key),
                        position.next == key && position.next_at.is_some(),
                    ),
                    DisplaySlot::Imsak => (false, false),
                };
                PrayerRowView {
                    name: row.name,
                    name_ar: row.name_ar,
                    time: row.time,
                    is_current,
                    is_next,
                }
            })
            .collect();

        let urgent = countdown.is_some_and(|s| {
            s.phase == Phase::Adzan && s.remaining_seconds < self.config.urgent_threshold_secs
        });

        let next_event = calendar::next_islamic_event(today).map(|up| EventView {
            name: up.event.name,
            hijri: up.event.hijri_label,
            days_until: up.days_until,
        });

        Frame {
            mosque_name: identity.name.clone(),
            mosque_address: identity.address.clone(),
            gregorian: format_date_indonesian(today),
            clock: now.format("%H:%M:%S").to_string(),
            hijri,
            hijri_latin: hijri.format_latin(),
            hijri_arabic: hijri.format_arabic(),
            ramadan_day: hijri.ramadan_day(),
            rows,
            countdown,
            countdown_text: countdown
                .map(|s| format_countdown(s.remaining_seconds))
                .unwrap_or_else(|| COUNTDOWN_PLACEHOLDER.to_string()),
            label: countdown_label(countdown.as_ref()),
            urgent,
            next_event,
            status: self.last_error.as_ref().map(ToString::to_string),
        }
    }
}

/// Plain-text board for a terminal or kiosk console.
pub fn render_board(frame: &Frame) -> String {
    let mut out = String::new();

    if !frame.mosque_name.is_empty() {
        let _ = writeln!(out, "{}", frame.mosque_name);
    }
    if !frame.mosque_address.is_empty() {
        let _ = writeln!(out, "{}", frame.mosque_address);
    }
    let _ = writeln!(out, "{}    {}", frame.gregorian, frame.clock);
    let _ = writeln!(out, "{}    {}", frame.hijri_latin, frame.hijri_arabic);
    if let Some(day) = frame.ramadan_day {
        let _ = writeln!(out, "Ramadan hari ke-{}", day);
    }
    let _ = writeln!(out);

    for row in &frame.rows {
        let marker = if row.is_current {
            '*'
        } else if row.is_next {
            '>'
        } else {
            ' '
        };
        let _ = writeln!(out, "{} {:<8} {}  {}", marker, row.name, row.time, row.name_ar);
    }
    let _ = writeln!(out);

    let urgent = if frame.urgent { "  !" } else { "" };
    let _ = writeln!(out, "{}: {}{}", frame.label, frame.countdown_text, urgent);

    if let Some(event) = &frame.next_event {
        let when = match event.days_until {
            0 => "hari ini".to_string(),
            n => format!("{} hari lagi", n),
        };
        let _ = writeln!(out, "{} ({}) - {}", event.name, event.hijri, when);
    }

    if let Some(status) = &frame.status {
        let _ = writeln!(out, "[{}]", status);
    }

    out
}
