//! Major Islamic observances for 1447 H and countdown to the next one.

use std::sync::LazyLock;

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IslamicEvent {
    pub name: &'static str,
    pub date: NaiveDate,
    /// Hijri label as published, e.g. `"1 Ramadan 1447 H"`.
    pub hijri_label: &'static str,
}

/// An event on or after a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpcomingEvent<'a> {
    pub event: &'a IslamicEvent,
    /// Whole days until the event, 0 on the day itself.
    pub days_until: i64,
}

const EVENTS_1447: [(&str, (i32, u32, u32), &str); 10] = [
    ("Tahun Baru Hijriyah 1447 H", (2025, 6, 27), "1 Muharram 1447 H"),
    ("Asyura", (2025, 7, 6), "10 Muharram 1447 H"),
    ("Maulid Nabi Muhammad SAW", (2025, 9, 6), "12 Rabiul Awal 1447 H"),
    ("Isra Mi'raj", (2026, 1, 17), "27 Rajab 1447 H"),
    ("Nisfu Sya'ban", (2026, 2, 4), "15 Syakban 1447 H"),
    ("Awal Ramadan 1447 H", (2026, 2, 18), "1 Ramadan 1447 H"),
    ("Nuzulul Quran", (2026, 3, 7), "17 Ramadan 1447 H"),
    ("Lailatul Qadr (malam 27)", (2026, 3, 16), "27 Ramadan 1447 H"),
    ("Idul Fitri 1447 H", (2026, 3, 20), "1 Syawal 1447 H"),
    ("Idul Adha 1447 H", (2026, 5, 27), "10 Zulhijah 1447 H"),
];

/// Chronologically ordered events for 1447 H.
pub static ISLAMIC_EVENTS_1447: LazyLock<Vec<IslamicEvent>> = LazyLock::new(|| {
    EVENTS_1447
        .iter()
        .map(|&(name, (y, m, d), hijri_label)| IslamicEvent {
            name,
            date: NaiveDate::from_ymd_opt(y, m, d).expect("event literal must be a valid date"),
            hijri_label,
        })
        .collect()
});

/// First event dated `today` or later. `events` must be chronological;
/// ties keep table order.
pub fn next_event_in(events: &[IslamicEvent], today: NaiveDate) -> Option<UpcomingEvent<'_>> {
    events.iter().find(|e| e.date >= today).map(|event| UpcomingEvent {
        event,
        days_until: (event.date - today).num_days(),
    })
}

/// Next event from the built-in 1447 H list, `None` once all have passed.
pub fn next_islamic_event(today: NaiveDate) -> Option<UpcomingEvent<'static>> {
    next_event_in(&ISLAMIC_EVENTS_1447, today)
}
