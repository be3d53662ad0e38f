//! Prayer countdown engine.
//!
//! Classifies "now" against the day's prayer sequence and produces the
//! countdown for the board. Evaluation is pure: the only value carried from
//! one tick to the next is the [`BellState`], which the caller threads
//! through [`evaluate`] (or keeps inside a [`PrayerCountdownEngine`]).
//!
//! Timeline for each prayer:
//! - ADZAN: counting down to the next prayer time; the bell fires once when
//!   the countdown enters the `bell_before_minutes` window
//! - IQAMAH: from the prayer time until `iqomah_minutes` have elapsed; a
//!   pre-iqamah cue fires once with a minute left and an iqamah cue once as
//!   the countdown runs out
//! - back to ADZAN for the following prayer

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::prayer::{COUNTDOWN_SEQUENCE, PrayerKey, PrayerSettings, PrayerTimeSet};

/// Width of the bell trigger window. Ticks are one second apart, so a two
/// second window is always hit without needing exact-second equality.
pub const BELL_WINDOW_SECS: i64 = 2;

/// Iqamah time left when the pre-iqamah cue fires.
pub const PRE_IQAMAH_CUE_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Adzan,
    Iqamah,
}

/// One-shot cues raised during the iqamah countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    PreIqamah,
    Iqamah,
}

/// Countdown for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountdownState {
    pub phase: Phase,
    pub current_prayer: Option<PrayerKey>,
    pub next_prayer: PrayerKey,
    pub remaining_seconds: u64,
    /// True only on the tick the bell should ring.
    pub bell_should_fire: bool,
    /// Set only on the tick an iqamah cue should play.
    pub cue: Option<Cue>,
}

/// Bell debounce carried between ticks.
///
/// Remembers which prayer instant the bell and each iqamah cue already
/// fired for, so each fires once per prayer, and the last evaluated time to
/// detect clock jumps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BellState {
    fired_for: Option<NaiveDateTime>,
    pre_iqamah_for: Option<NaiveDateTime>,
    iqamah_for: Option<NaiveDateTime>,
    last_tick: Option<NaiveDateTime>,
}

impl BellState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the bell already rang for the current approach.
    pub fn has_fired(&self) -> bool {
        self.fired_for.is_some()
    }
}

/// Where `now` sits in the day's prayer sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrayerPosition {
    pub current: Option<PrayerKey>,
    pub current_at: Option<NaiveDateTime>,
    pub next: PrayerKey,
    /// `None` when the next prayer's time is missing or unreadable.
    pub next_at: Option<NaiveDateTime>,
}

/// Find the current and next prayer.
///
/// The current prayer is the last one in sequence whose time today is at
/// or before `now`. After Isya the next prayer is tomorrow's Subuh; before
/// Subuh there is no current prayer. Missing or malformed times count as
/// not yet passed.
pub fn determine_current_and_next(times: &PrayerTimeSet, now: NaiveDateTime) -> PrayerPosition {
    let today = now.date();
    let at_today = |key: PrayerKey| times.time_of(key).map(|t| today.and_time(t));

    let mut current = None;
    for (idx, &key) in COUNTDOWN_SEQUENCE.iter().enumerate() {
        if let Some(at) = at_today(key).filter(|at| *at <= now) {
            current = Some((idx, key, at));
        }
    }

    match current {
        Some((idx, key, at)) if idx + 1 < COUNTDOWN_SEQUENCE.len() => {
            let next = COUNTDOWN_SEQUENCE[idx + 1];
            PrayerPosition {
                current: Some(key),
                current_at: Some(at),
                next,
                next_at: at_today(next),
            }
        }
        Some((_, key, at)) => {
            let tomorrow = today.succ_opt();
            let next_at = tomorrow
                .zip(times.time_of(PrayerKey::Subuh))
                .map(|(d, t)| d.and_time(t));
            PrayerPosition {
                current: Some(key),
                current_at: Some(at),
                next: PrayerKey::Subuh,
                next_at,
            }
        }
        None => PrayerPosition {
            current: None,
            current_at: None,
            next: PrayerKey::Subuh,
            next_at: at_today(PrayerKey::Subuh),
        },
    }
}

/// Whole seconds from `now` until `target`, rounded down.
fn seconds_until(target: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (target - now).num_milliseconds().div_euclid(1000)
}

/// Evaluate one tick.
///
/// Returns `None` for the state when the countdown is indeterminate (the
/// next prayer time is missing or unreadable); the bell state is still
/// returned and must be passed to the next call.
///
/// If `now` is earlier than the previous tick the clock was moved back, and
/// the debounce is cleared so the bell can ring for the re-entered approach.
pub fn evaluate(
    times: &PrayerTimeSet,
    settings: &PrayerSettings,
    now: NaiveDateTime,
    prior: BellState,
) -> (Option<CountdownState>, BellState) {
    let mut bell = prior;
    if bell.last_tick.is_some_and(|last| now < last) {
        tracing::debug!(%now, "Clock moved backwards, clearing bell debounce");
        bell.fired_for = None;
        bell.pre_iqamah_for = None;
        bell.iqamah_for = None;
    }
    bell.last_tick = Some(now);

    let pos = determine_current_and_next(times, now);

    if let (Some(current), Some(current_at)) = (pos.current, pos.current_at) {
        let iqomah_secs = i64::from(settings.iqomah_minutes(current)) * 60;
        let diff = seconds_until(current_at, now);
        if diff > -iqomah_secs {
            let remaining = (iqomah_secs + diff).max(0);
            let cue = iqamah_cue(&mut bell, settings, current_at, remaining);
            let state = CountdownState {
                phase: Phase::Iqamah,
                current_prayer: Some(current),
                next_prayer: pos.next,
                remaining_seconds: remaining as u64,
                bell_should_fire: false,
                cue,
            };
            return (Some(state), bell);
        }
    }

    let Some(next_at) = pos.next_at else {
        return (None, bell);
    };

    // A new approach starts once the previous iqamah window has closed.
    if bell.fired_for.is_some_and(|at| at != next_at) {
        bell.fired_for = None;
    }

    let calibration = settings.calibration_for(pos.next);
    let diff = seconds_until(next_at, now);
    let window_top = i64::from(calibration.bell_before_minutes) * 60;
    let in_window = diff > window_top - BELL_WINDOW_SECS && diff <= window_top;
    let bell_should_fire = calibration.bell_enabled && in_window && bell.fired_for.is_none();
    if bell_should_fire {
        bell.fired_for = Some(next_at);
    }

    let state = CountdownState {
        phase: Phase::Adzan,
        current_prayer: pos.current,
        next_prayer: pos.next,
        remaining_seconds: diff.max(0) as u64,
        bell_should_fire,
        cue: None,
    };
    (Some(state), bell)
}

/// Cue due for an iqamah countdown with `remaining` seconds left, debounced
/// per prayer instant.
fn iqamah_cue(
    bell: &mut BellState,
    settings: &PrayerSettings,
    prayer_at: NaiveDateTime,
    remaining: i64,
) -> Option<Cue> {
    if settings.sound_iqamah && remaining <= BELL_WINDOW_SECS && bell.iqamah_for != Some(prayer_at) {
        bell.iqamah_for = Some(prayer_at);
        return Some(Cue::Iqamah);
    }

    let in_window = remaining > PRE_IQAMAH_CUE_SECS - BELL_WINDOW_SECS && remaining <= PRE_IQAMAH_CUE_SECS;
    if settings.sound_pre_iqamah && in_window && bell.pre_iqamah_for != Some(prayer_at) {
        bell.pre_iqamah_for = Some(prayer_at);
        return Some(Cue::PreIqamah);
    }

    None
}

/// Stateful wrapper for a single evaluation stream (one board).
#[derive(Debug, Clone, Default)]
pub struct PrayerCountdownEngine {
    bell: BellState,
}

impl PrayerCountdownEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(
        &mut self,
        times: &PrayerTimeSet,
        settings: &PrayerSettings,
        now: NaiveDateTime,
    ) -> Option<CountdownState> {
        let (state, bell) = evaluate(times, settings, now, self.bell);
        self.bell = bell;
        state
    }

    pub fn bell_state(&self) -> BellState {
        self.bell
    }
}
