//! Mosque Display Library
//!
//! This module exposes the core components of the mosque TV display
//! (Hijri calendar, prayer countdown, backend client and board rendering)
//! for testing and reuse.

pub mod api;
pub mod board;
pub mod calendar;
pub mod config;
pub mod countdown;
pub mod display;
pub mod prayer;
pub mod schedule;
pub mod traits;

// Re-export commonly used types
pub use api::{BackendClient, MosqueIdentity, Snapshot};
pub use board::{BoardCadence, run_board};
pub use calendar::{
    HijriCalendarTable,
    HijriDate,
    HijriMonthEntry,
    IslamicEvent,
    KHGT_1447,
    UpcomingEvent,
    is_ramadan,
    next_islamic_event,
    ramadan_day,
    resolve,
};
pub use config::AppConfig;
pub use countdown::{
    BellState,
    CountdownState,
    Cue,
    Phase,
    PrayerCountdownEngine,
    PrayerPosition,
    determine_current_and_next,
    evaluate,
};
pub use display::{DisplayError, DisplaySession, Frame, render_board};
pub use prayer::{PrayerCalibration, PrayerKey, PrayerSettings, PrayerTimeSet};
pub use schedule::{MonthlySchedule, ScheduleDay};
pub use traits::{Clock, CombinedNotifier, MockClock, MockNotifier, Notifier, SystemClock};
#[cfg(feature = "desktop")]
pub use traits::SystemNotifier;
