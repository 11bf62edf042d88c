use std::collections::BTreeMap;

use chrono::NaiveDate;
use futures_util::future::{try_join, try_join5};
use tracing::{debug, warn};

use crate::{
    config::Settings,
    dates::{DateWindow, average, parse_iso, round1, today},
    distribution::fold_entries,
    error::StatsResult,
    insights::StatisticsReport,
    model::{DailyMetricRecord, Granularity, MetricKind, ProductivityData, TimeEntry, UserIdentity},
    request::LatestResult,
    store::MetricSource,
};

const DAYS_PER_BUCKET: u64 = 7;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DailyValues {
    by_date: BTreeMap<NaiveDate, f64>,
    pub skipped: usize,
    pub duplicates: usize,
}

impl DailyValues {
    /// Later records win when a day repeats. Records whose date does not
    /// parse are counted and dropped.
    pub fn from_records(kind: MetricKind, records: Vec<DailyMetricRecord>) -> Self {
        let mut values = Self::default();
        for record in records {
            let Ok(date) = parse_iso(&record.date) else {
                values.skipped += 1;
                warn!(metric = %kind, date = %record.date, "skipping record with malformed date");
                continue;
            };
            if values.by_date.insert(date, record.value).is_some() {
                values.duplicates += 1;
                debug!(metric = %kind, %date, "duplicate daily record, keeping the last one read");
            }
        }
        values
    }

    pub fn get(&self, date: NaiveDate) -> f64 {
        self.by_date.get(&date).copied().unwrap_or(0.0)
    }

    pub fn sum(&self) -> f64 {
        self.by_date.values().sum()
    }
}

#[derive(Clone, Debug, Default)]
struct WindowData {
    metrics: BTreeMap<MetricKind, DailyValues>,
    entries: Vec<TimeEntry>,
}

impl WindowData {
    fn values(&self, kind: MetricKind) -> &DailyValues {
        static EMPTY: DailyValues = DailyValues {
            by_date: BTreeMap::new(),
            skipped: 0,
            duplicates: 0,
        };
        self.metrics.get(&kind).unwrap_or(&EMPTY)
    }
}

pub struct StatisticsService<S> {
    store: S,
    settings: Settings,
}

impl<S: MetricSource> StatisticsService<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn weekly_data(
        &self,
        identity: Option<&UserIdentity>,
        end_date: Option<NaiveDate>,
    ) -> StatsResult<ProductivityData> {
        self.productivity_data(identity, end_date, Granularity::Week)
            .await
    }

    pub async fn monthly_data(
        &self,
        identity: Option<&UserIdentity>,
        end_date: Option<NaiveDate>,
    ) -> StatsResult<ProductivityData> {
        self.productivity_data(identity, end_date, Granularity::Month)
            .await
    }

    pub async fn productivity_data(
        &self,
        identity: Option<&UserIdentity>,
        end_date: Option<NaiveDate>,
        granularity: Granularity,
    ) -> StatsResult<ProductivityData> {
        let Some(user) = identity else {
            return Ok(ProductivityData::empty(granularity));
        };

        let end = end_date.unwrap_or_else(|| today(self.settings.offset()));
        let window = DateWindow::ending_at(end, granularity);
        let data = self.fetch_window(&user.id, &window).await?;

        Ok(match granularity {
            Granularity::Week => self.week_view(&window, &data),
            Granularity::Month => self.month_view(&window, &data),
        })
    }

    pub async fn report(
        &self,
        identity: Option<&UserIdentity>,
        end_date: Option<NaiveDate>,
        granularity: Granularity,
    ) -> StatsResult<StatisticsReport> {
        let data = self
            .productivity_data(identity, end_date, granularity)
            .await?;
        Ok(StatisticsReport::new(granularity, data, &self.settings))
    }

    /// Recomputes into `latest`. Returns false when a newer refresh was
    /// issued while this one was in flight and the result was dropped.
    pub async fn refresh(
        &self,
        latest: &LatestResult<ProductivityData>,
        identity: Option<&UserIdentity>,
        end_date: Option<NaiveDate>,
        granularity: Granularity,
    ) -> StatsResult<bool> {
        let ticket = latest.begin();
        let data = self
            .productivity_data(identity, end_date, granularity)
            .await?;
        Ok(latest.complete(ticket, data))
    }

    async fn fetch_window(&self, user_id: &str, window: &DateWindow) -> StatsResult<WindowData> {
        let start_iso = window.start_iso();
        let end_iso = window.end_iso();
        let (from, to) = window.instant_bounds(self.settings.offset());
        debug!(user_id, %start_iso, %end_iso, "fetching statistics window");

        let (entries, (sleep, study, water, exercise, meals)) = try_join(
            self.store.time_entries(user_id, from, to),
            try_join5(
                self.daily_values(MetricKind::Sleep, user_id, &start_iso, &end_iso),
                self.daily_values(MetricKind::Study, user_id, &start_iso, &end_iso),
                self.daily_values(MetricKind::Water, user_id, &start_iso, &end_iso),
                self.daily_values(MetricKind::Exercise, user_id, &start_iso, &end_iso),
                self.daily_values(MetricKind::Meals, user_id, &start_iso, &end_iso),
            ),
        )
        .await?;

        let metrics = BTreeMap::from([
            (MetricKind::Sleep, sleep),
            (MetricKind::Study, study),
            (MetricKind::Water, water),
            (MetricKind::Exercise, exercise),
            (MetricKind::Meals, meals),
        ]);
        Ok(WindowData { metrics, entries })
    }

    async fn daily_values(
        &self,
        kind: MetricKind,
        user_id: &str,
        start_iso: &str,
        end_iso: &str,
    ) -> StatsResult<DailyValues> {
        let records = self
            .store
            .daily_metrics(kind, user_id, start_iso, end_iso)
            .await?;
        Ok(DailyValues::from_records(kind, records))
    }

    fn week_view(&self, window: &DateWindow, data: &WindowData) -> ProductivityData {
        let series = |kind: MetricKind| -> Vec<f64> {
            let values = data.values(kind);
            window.days().map(|day| round1(values.get(day))).collect()
        };

        let sleep_total = round1(series(MetricKind::Sleep).iter().sum());
        self.assemble(Granularity::Week, series, sleep_total, &data.entries)
    }

    /// Four 7-day buckets from the window start. The end date itself falls
    /// past the last bucket and only counts toward the sleep total.
    fn month_view(&self, window: &DateWindow, data: &WindowData) -> ProductivityData {
        let series = |kind: MetricKind| -> Vec<f64> {
            let values = data.values(kind);
            (0..Granularity::Month.slots() as u64)
                .map(|bucket| {
                    let daily: Vec<f64> = (0..DAYS_PER_BUCKET)
                        .filter_map(|offset| window.day(bucket * DAYS_PER_BUCKET + offset))
                        .map(|day| values.get(day))
                        .collect();
                    round1(average(&daily))
                })
                .collect()
        };

        let sleep_total = round1(data.values(MetricKind::Sleep).sum());
        self.assemble(Granularity::Month, series, sleep_total, &data.entries)
    }

    fn assemble(
        &self,
        granularity: Granularity,
        series: impl Fn(MetricKind) -> Vec<f64>,
        sleep_total: f64,
        entries: &[TimeEntry],
    ) -> ProductivityData {
        let totals = fold_entries(entries);
        let mut activity_distribution = totals.distribution;
        activity_distribution.sleep = sleep_total;

        ProductivityData {
            sleep_hours: series(MetricKind::Sleep),
            study_hours: series(MetricKind::Study),
            water_glasses: series(MetricKind::Water),
            exercise_minutes: series(MetricKind::Exercise),
            meal_count: series(MetricKind::Meals),
            labels: granularity.labels(),
            activity_distribution,
            total_study_time_hours: round1(totals.study_hours),
            total_timer_hours: round1(totals.timer_hours),
        }
    }
}
