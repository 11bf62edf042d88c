use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StatsError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Sleep,
    Study,
    Water,
    Exercise,
    Meals,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Sleep,
        MetricKind::Study,
        MetricKind::Water,
        MetricKind::Exercise,
        MetricKind::Meals,
    ];

    pub fn collection(self) -> &'static str {
        match self {
            MetricKind::Sleep => "sleepTracking",
            MetricKind::Study => "studyTracking",
            MetricKind::Water => "waterTracking",
            MetricKind::Exercise => "exerciseTracking",
            MetricKind::Meals => "mealTracking",
        }
    }

}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::Sleep => "sleep",
            MetricKind::Study => "study",
            MetricKind::Water => "water",
            MetricKind::Exercise => "exercise",
            MetricKind::Meals => "meals",
        };
        f.write_str(name)
    }
}

impl FromStr for MetricKind {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sleep" => Ok(MetricKind::Sleep),
            "study" => Ok(MetricKind::Study),
            "water" => Ok(MetricKind::Water),
            "exercise" => Ok(MetricKind::Exercise),
            "meals" | "meal" => Ok(MetricKind::Meals),
            other => Err(StatsError::InvalidValue(format!("unknown metric: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMetricRecord {
    pub user_id: String,
    pub date: String,
    #[serde(alias = "glasses", default)]
    pub value: f64,
}

impl DailyMetricRecord {
    pub fn new(user_id: impl Into<String>, date: impl Into<String>, value: f64) -> Self {
        Self {
            user_id: user_id.into(),
            date: date.into(),
            value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Study,
    Work,
    Exercise,
    #[serde(other)]
    Other,
}

impl FromStr for Category {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "study" => Ok(Category::Study),
            "work" => Ok(Category::Work),
            "exercise" => Ok(Category::Exercise),
            "other" => Ok(Category::Other),
            other => Err(StatsError::InvalidValue(format!("unknown category: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub category: Category,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Milliseconds. Only set once the entry is stopped.
    #[serde(default, rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub is_running: bool,
}

impl TimeEntry {
    pub fn recorded_ms(&self) -> i64 {
        self.duration_ms.unwrap_or(0).max(0)
    }

    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        if self.is_running {
            (now - self.start_time).num_milliseconds().max(0)
        } else {
            self.recorded_ms()
        }
    }
}

pub const WEEK_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
pub const MONTH_LABELS: [&str; 4] = ["Week 1", "Week 2", "Week 3", "Week 4"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Week,
    Month,
}

impl Granularity {
    pub fn slots(self) -> usize {
        match self {
            Granularity::Week => 7,
            Granularity::Month => 4,
        }
    }

    /// One label per slot. Fixed so labels and series always line up.
    pub fn labels(self) -> Vec<String> {
        let labels: &[&str] = match self {
            Granularity::Week => &WEEK_LABELS,
            Granularity::Month => &MONTH_LABELS,
        };
        labels.iter().map(|label| label.to_string()).collect()
    }

    /// Days before the end date that open the window.
    pub fn lookback_days(self) -> i64 {
        match self {
            Granularity::Week => 6,
            Granularity::Month => 28,
        }
    }
}

impl FromStr for Granularity {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            other => Err(StatsError::InvalidValue(format!("unknown granularity: {other}"))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityDistribution {
    pub study: f64,
    pub sleep: f64,
    pub rest: f64,
    pub other: f64,
}

impl ActivityDistribution {
    pub fn total(&self) -> f64 {
        self.study + self.sleep + self.rest + self.other
    }

    /// Whole-number shares in `[study, sleep, rest, other]` order.
    pub fn percentages(&self) -> [u32; 4] {
        let total = self.total();
        if total <= 0.0 {
            return [0; 4];
        }
        [self.study, self.sleep, self.rest, self.other]
            .map(|value| (value / total * 100.0).round() as u32)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityData {
    pub sleep_hours: Vec<f64>,
    pub study_hours: Vec<f64>,
    pub water_glasses: Vec<f64>,
    pub exercise_minutes: Vec<f64>,
    pub meal_count: Vec<f64>,
    pub labels: Vec<String>,
    pub activity_distribution: ActivityDistribution,
    pub total_study_time_hours: f64,
    pub total_timer_hours: f64,
}

impl ProductivityData {
    pub fn empty(granularity: Granularity) -> Self {
        let zeros = vec![0.0; granularity.slots()];
        Self {
            sleep_hours: zeros.clone(),
            study_hours: zeros.clone(),
            water_glasses: zeros.clone(),
            exercise_minutes: zeros.clone(),
            meal_count: zeros,
            labels: granularity.labels(),
            activity_distribution: ActivityDistribution::default(),
            total_study_time_hours: 0.0,
            total_timer_hours: 0.0,
        }
    }

    pub fn series(&self, kind: MetricKind) -> &[f64] {
        match kind {
            MetricKind::Sleep => &self.sleep_hours,
            MetricKind::Study => &self.study_hours,
            MetricKind::Water => &self.water_glasses,
            MetricKind::Exercise => &self.exercise_minutes,
            MetricKind::Meals => &self.meal_count,
        }
    }
}
