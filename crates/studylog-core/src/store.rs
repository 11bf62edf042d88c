use std::{
    collections::BTreeMap,
    future::Future,
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    dates::{format_iso, parse_iso},
    error::{StatsError, StatsResult},
    model::{DailyMetricRecord, MetricKind, TimeEntry},
};

/// Read side of the document store the aggregator depends on.
pub trait MetricSource {
    /// Records of one metric collection for `user_id` whose `date` lies in
    /// `[start_iso, end_iso]` by string comparison. Order is unspecified.
    fn daily_metrics(
        &self,
        kind: MetricKind,
        user_id: &str,
        start_iso: &str,
        end_iso: &str,
    ) -> impl Future<Output = StatsResult<Vec<DailyMetricRecord>>> + Send;

    /// Entries for `user_id` with `from <= start_time <= to`.
    fn time_entries(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = StatsResult<Vec<TimeEntry>>> + Send;
}

/// Write side used by the trackers.
pub trait MetricSink {
    /// Updates the first record for (user, date) or inserts a new one.
    fn upsert_daily_metric(
        &self,
        kind: MetricKind,
        user_id: &str,
        date: &str,
        value: f64,
    ) -> impl Future<Output = StatsResult<()>> + Send;

    fn save_time_entry(&self, entry: TimeEntry) -> impl Future<Output = StatsResult<()>> + Send;

    fn delete_time_entry(
        &self,
        user_id: &str,
        id: &str,
    ) -> impl Future<Output = StatsResult<bool>> + Send;

    fn list_time_entries(
        &self,
        user_id: &str,
    ) -> impl Future<Output = StatsResult<Vec<TimeEntry>>> + Send;
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub collections: BTreeMap<String, Vec<DailyMetricRecord>>,
    #[serde(default, rename = "timeEntries")]
    pub time_entries: Vec<TimeEntry>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> StatsResult<StoreSnapshot> {
        Ok(self.lock()?.clone())
    }

    /// Appends without lookup. Lets callers reproduce duplicate documents.
    pub fn insert_record(&self, kind: MetricKind, record: DailyMetricRecord) -> StatsResult<()> {
        self.lock()?
            .collections
            .entry(kind.collection().to_string())
            .or_default()
            .push(record);
        Ok(())
    }

    fn lock(&self) -> StatsResult<MutexGuard<'_, StoreSnapshot>> {
        self.state
            .lock()
            .map_err(|e| StatsError::Store(format!("mutex poisoned: {e}")))
    }
}

impl MetricSource for MemoryStore {
    async fn daily_metrics(
        &self,
        kind: MetricKind,
        user_id: &str,
        start_iso: &str,
        end_iso: &str,
    ) -> StatsResult<Vec<DailyMetricRecord>> {
        let guard = self.lock()?;
        let Some(records) = guard.collections.get(kind.collection()) else {
            return Ok(Vec::new());
        };
        Ok(records
            .iter()
            .filter(|record| record.user_id == user_id)
            .filter(|record| record.date.as_str() >= start_iso && record.date.as_str() <= end_iso)
            .cloned()
            .collect())
    }

    async fn time_entries(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StatsResult<Vec<TimeEntry>> {
        let guard = self.lock()?;
        Ok(guard
            .time_entries
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .filter(|entry| entry.start_time >= from && entry.start_time <= to)
            .cloned()
            .collect())
    }
}

impl MetricSink for MemoryStore {
    async fn upsert_daily_metric(
        &self,
        kind: MetricKind,
        user_id: &str,
        date: &str,
        value: f64,
    ) -> StatsResult<()> {
        let date = parse_iso(date)?;
        let date = format_iso(date);
        if !value.is_finite() || value < 0.0 {
            return Err(StatsError::InvalidValue(format!("{kind} value {value}")));
        }

        let mut guard = self.lock()?;
        let records = guard
            .collections
            .entry(kind.collection().to_string())
            .or_default();
        match records
            .iter_mut()
            .find(|record| record.user_id == user_id && record.date == date)
        {
            Some(existing) => existing.value = value,
            None => records.push(DailyMetricRecord::new(user_id, date, value)),
        }
        Ok(())
    }

    async fn save_time_entry(&self, entry: TimeEntry) -> StatsResult<()> {
        let mut guard = self.lock()?;
        match guard
            .time_entries
            .iter_mut()
            .find(|existing| existing.id == entry.id)
        {
            Some(existing) => *existing = entry,
            None => guard.time_entries.push(entry),
        }
        Ok(())
    }

    async fn delete_time_entry(&self, user_id: &str, id: &str) -> StatsResult<bool> {
        let mut guard = self.lock()?;
        let before = guard.time_entries.len();
        guard
            .time_entries
            .retain(|entry| !(entry.user_id == user_id && entry.id == id));
        Ok(guard.time_entries.len() != before)
    }

    async fn list_time_entries(&self, user_id: &str) -> StatsResult<Vec<TimeEntry>> {
        let guard = self.lock()?;
        Ok(guard
            .time_entries
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_updates_existing_day() {
        let store = MemoryStore::new();
        store
            .upsert_daily_metric(MetricKind::Sleep, "u1", "2024-03-04", 6.0)
            .await
            .expect("insert");
        store
            .upsert_daily_metric(MetricKind::Sleep, "u1", "2024-03-04", 7.5)
            .await
            .expect("update");

        let records = store
            .daily_metrics(MetricKind::Sleep, "u1", "2024-03-01", "2024-03-31")
            .await
            .expect("fetch");
        assert_eq!(records, vec![DailyMetricRecord::new("u1", "2024-03-04", 7.5)]);
    }

    #[tokio::test]
    async fn upsert_rejects_bad_input() {
        let store = MemoryStore::new();
        let bad_date = store
            .upsert_daily_metric(MetricKind::Water, "u1", "04.03.2024", 3.0)
            .await;
        assert!(matches!(bad_date, Err(StatsError::InvalidDate(_))));

        let negative = store
            .upsert_daily_metric(MetricKind::Water, "u1", "2024-03-04", -1.0)
            .await;
        assert!(matches!(negative, Err(StatsError::InvalidValue(_))));
    }

    #[tokio::test]
    async fn range_filter_is_inclusive_and_per_user() {
        let store = MemoryStore::new();
        for (user, date) in [
            ("u1", "2024-03-03"),
            ("u1", "2024-03-04"),
            ("u1", "2024-03-10"),
            ("u1", "2024-03-11"),
            ("u2", "2024-03-05"),
        ] {
            store
                .insert_record(MetricKind::Study, DailyMetricRecord::new(user, date, 1.0))
                .expect("insert");
        }

        let dates: Vec<String> = store
            .daily_metrics(MetricKind::Study, "u1", "2024-03-04", "2024-03-10")
            .await
            .expect("fetch")
            .into_iter()
            .map(|record| record.date)
            .collect();
        assert_eq!(dates, vec!["2024-03-04", "2024-03-10"]);
    }

    #[test]
    fn snapshot_uses_collection_names() {
        let store = MemoryStore::new();
        store
            .insert_record(MetricKind::Meals, DailyMetricRecord::new("u1", "2024-03-04", 3.0))
            .expect("insert");

        let json = serde_json::to_value(store.snapshot().expect("snapshot")).expect("json");
        assert_eq!(json["collections"]["mealTracking"][0]["date"], "2024-03-04");
        assert!(json["timeEntries"].as_array().expect("entries").is_empty());
    }
}
