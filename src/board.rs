//! The board's run loop.
//!
//! Frames are drawn on one interval and snapshots refreshed on another. The
//! backend is called from a separate task, so a slow or hanging fetch never
//! holds up a tick (and with it the bell).

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::api::{BackendClient, Snapshot};
use crate::config::RefreshConfig;
use crate::display::{DisplayError, DisplaySession, Frame};
use crate::traits::Clock;

/// How often the board redraws and how often it refreshes its snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCadence {
    pub tick: Duration,
    pub fetch: Duration,
}

impl From<&RefreshConfig> for BoardCadence {
    fn from(config: &RefreshConfig) -> Self {
        Self {
            tick: Duration::from_millis(config.tick_interval_ms.max(1)),
            fetch: Duration::from_secs(config.data_fetch_interval_secs.max(1)),
        }
    }
}

impl Default for BoardCadence {
    fn default() -> Self {
        Self::from(&RefreshConfig::default())
    }
}

/// Outstanding and past snapshot requests.
#[derive(Debug, Default)]
struct RefreshTracker {
    in_flight: Option<NaiveDate>,
    last_requested: Option<NaiveDate>,
}

impl RefreshTracker {
    /// Queue a fetch for `date` unless one is already running.
    fn request(&mut self, tx: &mpsc::Sender<NaiveDate>, date: NaiveDate) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        match tx.try_send(date) {
            Ok(()) => {
                tracing::debug!(%date, "Requested snapshot");
                self.in_flight = Some(date);
                self.last_requested = Some(date);
                true
            }
            Err(e) => {
                tracing::warn!("Could not queue snapshot request: {}", e);
                false
            }
        }
    }

    fn finished(&mut self) {
        self.in_flight = None;
    }
}

/// Run the board until `shutdown` resolves, handing every frame to `on_frame`.
///
/// The periodic refresh always asks for the clock's current day. A day
/// change asks once more straight away; if that fails, the next periodic
/// refresh retries.
pub async fn run_board<C, S, F>(
    client: BackendClient,
    session: &mut DisplaySession,
    clock: &C,
    cadence: BoardCadence,
    shutdown: S,
    mut on_frame: F,
) where
    C: Clock,
    S: Future<Output = ()>,
    F: FnMut(&Frame),
{
    let (request_tx, mut request_rx) = mpsc::channel::<NaiveDate>(1);
    let (result_tx, mut result_rx) = mpsc::channel::<(NaiveDate, Result<Snapshot>)>(1);

    let fetcher = tokio::spawn(async move {
        while let Some(date) = request_rx.recv().await {
            let result = client.fetch_snapshot(Some(date)).await;
            if result_tx.send((date, result)).await.is_err() {
                break;
            }
        }
    });

    let mut fetch_interval = tokio::time::interval(cadence.fetch);
    fetch_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut tick_interval = tokio::time::interval(cadence.tick);
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut tracker = RefreshTracker::default();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutting down");
                break;
            }
            Some((date, result)) = result_rx.recv() => {
                tracker.finished();
                match result {
                    Ok(snapshot) => {
                        tracing::debug!(%date, "Snapshot refreshed");
                        session.apply_snapshot(snapshot);
                    }
                    Err(e) => session.record_refresh_error(DisplayError::from_refresh(&e)),
                }
            }
            _ = fetch_interval.tick() => {
                let today = clock.now_naive_local().date();
                tracker.request(&request_tx, today);
            }
            _ = tick_interval.tick() => {
                let now = clock.now_naive_local();
                let today = now.date();
                if session.needs_refresh(now) && tracker.last_requested != Some(today) {
                    tracing::info!(%today, "Day changed, refreshing snapshot");
                    tracker.request(&request_tx, today);
                }
                let frame = session.tick(now);
                on_frame(&frame);
            }
        }
    }

    fetcher.abort();
}
