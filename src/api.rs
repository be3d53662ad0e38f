use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::NetworkConfig;
use crate::prayer::{PrayerKey, PrayerSettings, PrayerTimeSet};

fn collect_times(fields: [(PrayerKey, &Option<String>); 7]) -> PrayerTimeSet {
    fields
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
        .collect()
}

/// Daily prayer times from `GET /api/prayer-times`.
///
/// Every time field is optional so a partial day still deserializes; the
/// countdown treats missing entries as unknown.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrayerTimesResponse {
    pub date: Option<String>,
    #[serde(default)]
    pub hijri: Option<String>,
    pub subuh: Option<String>,
    pub terbit: Option<String>,
    pub dhuha: Option<String>,
    pub dzuhur: Option<String>,
    pub ashar: Option<String>,
    pub maghrib: Option<String>,
    pub isya: Option<String>,
}

impl PrayerTimesResponse {
    pub fn time_set(&self) -> PrayerTimeSet {
        collect_times([
            (PrayerKey::Subuh, &self.subuh),
            (PrayerKey::Terbit, &self.terbit),
            (PrayerKey::Dhuha, &self.dhuha),
            (PrayerKey::Dzuhur, &self.dzuhur),
            (PrayerKey::Ashar, &self.ashar),
            (PrayerKey::Maghrib, &self.maghrib),
            (PrayerKey::Isya, &self.isya),
        ])
    }

    /// The date the backend computed the times for, if it sent a valid one.
    pub fn for_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }
}

/// Prayer settings from `GET /api/settings/prayer`.
///
/// Absent fields take the backend's own defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrayerSettingsResponse {
    pub iqomah_subuh: u32,
    pub iqomah_dzuhur: u32,
    pub iqomah_ashar: u32,
    pub iqomah_maghrib: u32,
    pub iqomah_isya: u32,
    pub bell_enabled: bool,
    pub bell_before_minutes: u32,
    pub sound_pre_iqamah: bool,
    pub sound_iqamah: bool,
}

impl Default for PrayerSettingsResponse {
    fn default() -> Self {
        Self {
            iqomah_subuh: 15,
            iqomah_dzuhur: 10,
            iqomah_ashar: 10,
            iqomah_maghrib: 5,
            iqomah_isya: 10,
            bell_enabled: true,
            bell_before_minutes: 5,
            sound_pre_iqamah: true,
            sound_iqamah: true,
        }
    }
}

impl From<PrayerSettingsResponse> for PrayerSettings {
    fn from(r: PrayerSettingsResponse) -> Self {
        PrayerSettings::default()
            .with_iqomah(PrayerKey::Subuh, r.iqomah_subuh)
            .with_iqomah(PrayerKey::Dzuhur, r.iqomah_dzuhur)
            .with_iqomah(PrayerKey::Ashar, r.iqomah_ashar)
            .with_iqomah(PrayerKey::Maghrib, r.iqomah_maghrib)
            .with_iqomah(PrayerKey::Isya, r.iqomah_isya)
            .with_bell(r.bell_enabled, r.bell_before_minutes)
            .with_iqamah_cues(r.sound_pre_iqamah, r.sound_iqamah)
    }
}

/// Mosque identity from `GET /api/mosque/identity`. Shown as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MosqueIdentity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub logo_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone_offset: Option<i32>,
}

/// One row of `GET /api/prayer-times/monthly`.
#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyScheduleDay {
    pub day: u32,
    pub subuh: Option<String>,
    pub terbit: Option<String>,
    pub dhuha: Option<String>,
    pub dzuhur: Option<String>,
    pub ashar: Option<String>,
    pub maghrib: Option<String>,
    pub isya: Option<String>,
}

impl MonthlyScheduleDay {
    pub fn time_set(&self) -> PrayerTimeSet {
        collect_times([
            (PrayerKey::Subuh, &self.subuh),
            (PrayerKey::Terbit, &self.terbit),
            (PrayerKey::Dhuha, &self.dhuha),
            (PrayerKey::Dzuhur, &self.dzuhur),
            (PrayerKey::Ashar, &self.ashar),
            (PrayerKey::Maghrib, &self.maghrib),
            (PrayerKey::Isya, &self.isya),
        ])
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyScheduleResponse {
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub schedule: Vec<MonthlyScheduleDay>,
    /// Set by the backend when its upstream source failed.
    pub error: Option<String>,
}

/// Everything the board needs from one refresh.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Day the times belong to, when the backend reported one.
    pub for_date: Option<NaiveDate>,
    pub prayer_times: PrayerTimeSet,
    pub settings: PrayerSettings,
    pub identity: MosqueIdentity,
    pub fetched_at: DateTime<Utc>,
}

/// API client for the mosque backend.
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a new API client with configurable timeouts.
    pub fn new(base_url: String, network_config: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network_config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(network_config.connect_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// GET `path` with a pre-built query string (values are dates and
    /// numbers only, so no escaping is needed).
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &str) -> Result<T> {
        let mut url = self.endpoint(path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("API returned error status: {} for {}", status, path);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", path))
    }

    /// Prayer times for `date`, or the backend's "today" when `None`.
    pub async fn fetch_prayer_times(&self, date: Option<NaiveDate>) -> Result<PrayerTimesResponse> {
        let query = date
            .map(|d| format!("date={}", d.format("%Y-%m-%d")))
            .unwrap_or_default();
        self.get_json("/prayer-times", &query).await
    }

    pub async fn fetch_prayer_settings(&self) -> Result<PrayerSettingsResponse> {
        self.get_json("/settings/prayer", "").await
    }

    pub async fn fetch_mosque_identity(&self) -> Result<MosqueIdentity> {
        self.get_json("/mosque/identity", "").await
    }

    pub async fn fetch_monthly_schedule(&self, month: u32, year: i32) -> Result<MonthlyScheduleResponse> {
        let query = format!("month={}&year={}", month, year);
        self.get_json("/prayer-times/monthly", &query).await
    }

    /// Fetch times, settings and identity concurrently.
    ///
    /// With `date` set, the snapshot belongs to that day even when the
    /// backend labels its times differently.
    pub async fn fetch_snapshot(&self, date: Option<NaiveDate>) -> Result<Snapshot> {
        let (times, settings, identity) = tokio::try_join!(
            self.fetch_prayer_times(date),
            self.fetch_prayer_settings(),
            self.fetch_mosque_identity(),
        )?;

        let reported = times.for_date();
        if let (Some(requested), Some(reported)) = (date, reported)
            && requested != reported
        {
            tracing::warn!(%requested, %reported, "Backend answered with times for another day");
        }

        Ok(Snapshot {
            for_date: date.or(reported),
            prayer_times: times.time_set(),
            settings: settings.into(),
            identity,
            fetched_at: Utc::now(),
        })
    }
}
