//! Abstractions for time and side effects to enable testing.
//!
//! This module provides traits for:
//! - `Clock`: Abstracting wall-clock access for the board's ticks
//! - `Notifier`: Delivering the bell cue (ntfy.sh, desktop, or recorded)

use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDateTime, Utc};

// ==================== Clock Trait ====================

/// Trait for abstracting time access.
///
/// This allows injecting mock clocks during testing to create
/// deterministic, reproducible countdown simulations.
pub trait Clock: Send + Sync {
    /// Get the current time in UTC.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Get the current time in the local timezone.
    fn now_local(&self) -> DateTime<Local>;

    /// Local wall-clock time without offset, as the countdown engine expects.
    fn now_naive_local(&self) -> NaiveDateTime {
        self.now_local().naive_local()
    }
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Mock clock for testing with controllable time.
///
/// Holds a local wall-clock time so simulations do not depend on the
/// machine's timezone.
#[derive(Debug, Clone)]
pub struct MockClock {
    local_time: Arc<Mutex<NaiveDateTime>>,
}

impl MockClock {
    /// Create a new mock clock set to the given local time.
    pub fn new(time: NaiveDateTime) -> Self {
        Self {
            local_time: Arc::new(Mutex::new(time)),
        }
    }

    /// Set the mock clock to a new time.
    pub fn set_time(&self, time: NaiveDateTime) {
        *self.local_time.lock().unwrap() = time;
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut time = self.local_time.lock().unwrap();
        *time += duration;
    }
}

impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now_local().with_timezone(&Utc)
    }

    fn now_local(&self) -> DateTime<Local> {
        let naive = *self.local_time.lock().unwrap();
        naive
            .and_local_timezone(Local)
            .earliest()
            .unwrap_or_else(|| naive.and_utc().with_timezone(&Local))
    }

    fn now_naive_local(&self) -> NaiveDateTime {
        *self.local_time.lock().unwrap()
    }
}

// ==================== Notifier Trait ====================

/// Trait for abstracting notifications.
///
/// The board rings the bell through this trait so the cue can go to a
/// phone, the desktop, or a test recorder.
pub trait Notifier: Send + Sync {
    /// Send a notification with the given title and body.
    fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Sends notifications to an ntfy.sh topic.
#[derive(Debug, Clone)]
pub struct NtfyNotifier {
    topic: String,
}

impl NtfyNotifier {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }
}

impl Notifier for NtfyNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        let url = format!("https://ntfy.sh/{}", self.topic);
        let message = format!("{}\n{}", title, body);

        // Fire and forget so a slow network never delays a tick
        std::thread::spawn(move || {
            match reqwest::blocking::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
            {
                Ok(client) => {
                    if let Err(e) = client.post(&url).body(message).send() {
                        tracing::warn!("Failed to send ntfy notification: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Failed to build ntfy client: {}", e),
            }
        });

        Ok(())
    }
}

/// Desktop notifier implementation using notify-rust.
#[cfg(feature = "desktop")]
#[derive(Debug, Clone, Default)]
pub struct SystemNotifier;

#[cfg(feature = "desktop")]
impl Notifier for SystemNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .appname("Mosque Display")
            .show()?;
        Ok(())
    }
}

/// Logs the cue; always present so headless boards still record bells.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        tracing::info!(title, body, "Notification");
        Ok(())
    }
}

/// Fans a notification out to several notifiers.
///
/// Every notifier is tried; the first error is returned after all ran.
#[derive(Default)]
pub struct CombinedNotifier {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl CombinedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifiers.push(Box::new(notifier));
        self
    }

    /// Build from configuration: always logs, adds ntfy.sh when a topic is
    /// set and the desktop when built with the `desktop` feature.
    pub fn from_topic(ntfy_topic: Option<&str>) -> Self {
        let mut combined = Self::new().with(LogNotifier);
        if let Some(topic) = ntfy_topic {
            combined = combined.with(NtfyNotifier::new(topic));
        }
        #[cfg(feature = "desktop")]
        {
            combined = combined.with(SystemNotifier);
        }
        combined
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Notifier for CombinedNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        let mut first_err = None;
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify(title, body) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Mock notifier for testing that records all notifications.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    notifications: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockNotifier {
    /// Create a new mock notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all notifications that have been sent.
    pub fn get_notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().unwrap().clone()
    }

    /// Get the count of notifications sent.
    pub fn notification_count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }

    /// Clear all recorded notifications.
    pub fn clear(&self) {
        self.notifications.lock().unwrap().clear();
    }

    /// Check if any notification was sent.
    pub fn was_called(&self) -> bool {
        !self.notifications.lock().unwrap().is_empty()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        self.notifications
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}
