//! Integration tests for the board's countdown using mock dependencies.
//!
//! These tests drive a DisplaySession with MockClock and MockNotifier for
//! deterministic, reproducible walks through a prayer day.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use mosque_display::{
    Clock, DisplayError, DisplaySession, MockClock, MockNotifier, MosqueIdentity, Phase,
    PrayerKey, PrayerSettings, PrayerTimeSet, Snapshot, config::DisplayConfig, evaluate,
};

fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

fn day_times() -> PrayerTimeSet {
    PrayerTimeSet::new()
        .with(PrayerKey::Subuh, "04:30")
        .with(PrayerKey::Terbit, "05:45")
        .with(PrayerKey::Dzuhur, "12:00")
        .with(PrayerKey::Ashar, "15:15")
        .with(PrayerKey::Maghrib, "18:00")
        .with(PrayerKey::Isya, "19:15")
}

fn snapshot(settings: PrayerSettings) -> Snapshot {
    Snapshot {
        for_date: None,
        prayer_times: day_times(),
        settings,
        identity: MosqueIdentity::default(),
        fetched_at: Utc::now(),
    }
}

fn session_with(notifier: &MockNotifier, settings: PrayerSettings) -> DisplaySession {
    let mut session =
        DisplaySession::new(DisplayConfig::default(), Arc::new(notifier.clone()), true);
    session.apply_snapshot(snapshot(settings));
    session
}

// ==================== Worked Scenarios ====================

/// Midday, between Dzuhur's iqamah and Ashar.
#[test]
fn test_adzan_countdown_to_ashar() {
    let settings = PrayerSettings::default()
        .with_iqomah(PrayerKey::Dzuhur, 5)
        .with_iqomah(PrayerKey::Isya, 10);
    let (state, _) = evaluate(&day_times(), &settings, at(2026, 1, 10, 12, 5, 0), Default::default());
    let state = state.unwrap();

    assert_eq!(state.phase, Phase::Adzan);
    assert_eq!(state.current_prayer, Some(PrayerKey::Dzuhur));
    assert_eq!(state.next_prayer, PrayerKey::Ashar);
    assert_eq!(state.remaining_seconds, 11_400);
    assert!(!state.bell_should_fire);
}

/// Inside Isya's iqamah window.
#[test]
fn test_iqamah_countdown_after_isya() {
    let settings = PrayerSettings::default().with_iqomah(PrayerKey::Isya, 10);
    let (state, _) = evaluate(&day_times(), &settings, at(2026, 1, 10, 19, 16, 30), Default::default());
    let state = state.unwrap();

    assert_eq!(state.phase, Phase::Iqamah);
    assert_eq!(state.current_prayer, Some(PrayerKey::Isya));
    assert_eq!(state.remaining_seconds, 510);
}

// ==================== Full Day Walk ====================

/// Ticking once a second through a whole day rings the bell once per prayer.
#[test]
fn test_full_day_rings_each_bell_once() {
    let notifier = MockNotifier::new();
    let mut session = session_with(&notifier, PrayerSettings::default());
    let clock = MockClock::new(at(2026, 1, 10, 0, 0, 0));

    let end = at(2026, 1, 10, 23, 59, 59);
    while clock.now_naive_local() <= end {
        session.tick(clock.now_naive_local());
        clock.advance(Duration::seconds(1));
    }

    let bodies: Vec<String> = notifier
        .get_notifications()
        .into_iter()
        .filter(|(title, _)| title == "Bel Sholat")
        .map(|(_, body)| body)
        .collect();
    assert_eq!(
        bodies,
        [
            "Subuh dalam 5 menit",
            "Dzuhur dalam 5 menit",
            "Ashar dalam 5 menit",
            "Maghrib dalam 5 menit",
            "Isya dalam 5 menit",
        ]
    );
}

/// The same walk announces each iqamah twice: a minute before and at the end.
#[test]
fn test_full_day_announces_each_iqamah_cue_once() {
    let notifier = MockNotifier::new();
    let mut session = session_with(&notifier, PrayerSettings::default());
    let clock = MockClock::new(at(2026, 1, 10, 0, 0, 0));

    let end = at(2026, 1, 10, 23, 59, 59);
    while clock.now_naive_local() <= end {
        session.tick(clock.now_naive_local());
        clock.advance(Duration::seconds(1));
    }

    let cues: Vec<String> = notifier
        .get_notifications()
        .into_iter()
        .filter(|(title, _)| title == "Iqomah")
        .map(|(_, body)| body)
        .collect();
    assert_eq!(
        cues,
        [
            "Subuh 1 menit lagi",
            "Subuh sekarang",
            "Dzuhur 1 menit lagi",
            "Dzuhur sekarang",
            "Ashar 1 menit lagi",
            "Ashar sekarang",
            "Maghrib 1 menit lagi",
            "Maghrib sekarang",
            "Isya 1 menit lagi",
            "Isya sekarang",
        ]
    );
}

#[test]
fn test_iqamah_cues_follow_settings() {
    let notifier = MockNotifier::new();
    let settings = PrayerSettings::default()
        .with_bell(false, 5)
        .with_iqamah_cues(false, true);
    let mut session = session_with(&notifier, settings);
    let clock = MockClock::new(at(2026, 1, 10, 12, 0, 0));

    while clock.now_naive_local() < at(2026, 1, 10, 12, 11, 0) {
        session.tick(clock.now_naive_local());
        clock.advance(Duration::seconds(1));
    }

    assert_eq!(
        notifier.get_notifications(),
        vec![("Iqomah".to_string(), "Dzuhur sekarang".to_string())]
    );
}

/// Half-second ticks still ring only once per approach.
#[test]
fn test_sub_second_ticks_ring_once() {
    let notifier = MockNotifier::new();
    let mut session = session_with(&notifier, PrayerSettings::default());
    let clock = MockClock::new(at(2026, 1, 10, 15, 9, 50));

    for _ in 0..40 {
        session.tick(clock.now_naive_local());
        clock.advance(Duration::milliseconds(500));
    }

    assert_eq!(notifier.notification_count(), 1);
}

/// Phases switch at the prayer time and at the end of iqamah.
#[test]
fn test_phase_transitions_around_dzuhur() {
    let notifier = MockNotifier::new();
    let mut session = session_with(&notifier, PrayerSettings::default());

    let before = session.tick(at(2026, 1, 10, 11, 59, 59));
    assert_eq!(before.label, "Menuju Dzuhur");
    assert_eq!(before.countdown_text, "00:00:01");

    let start = session.tick(at(2026, 1, 10, 12, 0, 0));
    assert_eq!(start.label, "Iqomah Dzuhur");
    assert_eq!(start.countdown_text, "00:10:00");

    let last = session.tick(at(2026, 1, 10, 12, 9, 59));
    assert_eq!(last.label, "Iqomah Dzuhur");
    assert_eq!(last.countdown_text, "00:00:01");

    let after = session.tick(at(2026, 1, 10, 12, 10, 0));
    assert_eq!(after.label, "Menuju Ashar");
    assert_eq!(after.countdown_text, "03:05:00");
}

/// Counting toward tomorrow's Subuh continues smoothly across midnight.
#[test]
fn test_countdown_across_midnight() {
    let notifier = MockNotifier::new();
    let mut session = session_with(&notifier, PrayerSettings::default());
    let clock = MockClock::new(at(2026, 1, 10, 23, 59, 59));

    let before = session.tick(clock.now_naive_local()).countdown.unwrap();
    clock.advance(Duration::seconds(1));
    let after = session.tick(clock.now_naive_local()).countdown.unwrap();

    assert_eq!(before.next_prayer, PrayerKey::Subuh);
    assert_eq!(after.next_prayer, PrayerKey::Subuh);
    assert_eq!(before.current_prayer, Some(PrayerKey::Isya));
    assert_eq!(after.current_prayer, None);
    assert_eq!(before.remaining_seconds, 4 * 3600 + 30 * 60 + 1);
    assert_eq!(after.remaining_seconds, before.remaining_seconds - 1);
}

// ==================== Bell Settings ====================

#[test]
fn test_bell_disabled_never_rings() {
    let notifier = MockNotifier::new();
    let settings = PrayerSettings::default().with_bell(false, 5);
    let mut session = session_with(&notifier, settings);
    let clock = MockClock::new(at(2026, 1, 10, 15, 9, 0));

    for _ in 0..120 {
        session.tick(clock.now_naive_local());
        clock.advance(Duration::seconds(1));
    }

    assert!(!notifier.was_called());
}

#[test]
fn test_bell_lead_time_follows_settings() {
    let notifier = MockNotifier::new();
    let settings = PrayerSettings::default().with_bell(true, 2);
    let mut session = session_with(&notifier, settings);

    session.tick(at(2026, 1, 10, 15, 10, 0));
    assert!(!notifier.was_called());
    session.tick(at(2026, 1, 10, 15, 13, 0));
    assert_eq!(notifier.get_notifications()[0].1, "Ashar dalam 2 menit");
}

/// Moving the clock back before the bell window re-arms the bell.
#[test]
fn test_clock_moved_back_rings_again() {
    let notifier = MockNotifier::new();
    let mut session = session_with(&notifier, PrayerSettings::default());
    let clock = MockClock::new(at(2026, 1, 10, 15, 10, 0));

    session.tick(clock.now_naive_local());
    assert_eq!(notifier.notification_count(), 1);

    clock.set_time(at(2026, 1, 10, 15, 9, 30));
    session.tick(clock.now_naive_local());
    clock.set_time(at(2026, 1, 10, 15, 10, 0));
    session.tick(clock.now_naive_local());

    assert_eq!(notifier.notification_count(), 2);
}

// ==================== Refresh Handling ====================

/// A failed refresh keeps the board counting on the previous data.
#[test]
fn test_stale_snapshot_survives_refresh_failure() {
    let notifier = MockNotifier::new();
    let mut session = session_with(&notifier, PrayerSettings::default());
    session.record_refresh_error(DisplayError::Network("connection refused".to_string()));

    let frame = session.tick(at(2026, 1, 10, 13, 0, 0));
    assert_eq!(frame.label, "Menuju Ashar");
    assert!(frame.status.unwrap().contains("connection refused"));
}

/// A later successful refresh clears the status line.
#[test]
fn test_successful_refresh_clears_status() {
    let notifier = MockNotifier::new();
    let mut session = session_with(&notifier, PrayerSettings::default());
    session.record_refresh_error(DisplayError::Network("timeout".to_string()));
    session.apply_snapshot(snapshot(PrayerSettings::default()));

    let frame = session.tick(at(2026, 1, 10, 13, 0, 0));
    assert!(frame.status.is_none());
}

/// Separate sessions keep separate bell state.
#[test]
fn test_sessions_are_independent() {
    let first = MockNotifier::new();
    let second = MockNotifier::new();
    let mut a = session_with(&first, PrayerSettings::default());
    let mut b = session_with(&second, PrayerSettings::default());

    a.tick(at(2026, 1, 10, 15, 10, 0));
    b.tick(at(2026, 1, 10, 15, 10, 0));
    a.tick(at(2026, 1, 10, 15, 10, 1));

    assert_eq!(first.notification_count(), 1);
    assert_eq!(second.notification_count(), 1);
}
