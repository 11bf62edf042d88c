use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    config::WaterSettings,
    dates::{DateWindow, round1},
    error::{StatsError, StatsResult},
};

/// Heat-map intensity for a day's glass count.
pub fn level(glasses: u32) -> u8 {
    match glasses {
        0 => 0,
        1..=2 => 1,
        3..=4 => 2,
        5..=6 => 3,
        _ => 4,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WaterSummary {
    pub today: u32,
    pub weekly_average: f64,
    pub best_streak: u32,
    pub active_days: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphCell {
    pub date: NaiveDate,
    pub glasses: u32,
    pub level: u8,
}

#[derive(Clone, Debug, Default)]
pub struct WaterLog {
    settings: WaterSettings,
    by_date: BTreeMap<NaiveDate, u32>,
}

impl WaterLog {
    pub fn new(settings: WaterSettings) -> Self {
        Self {
            settings,
            by_date: BTreeMap::new(),
        }
    }

    pub fn with_days(
        settings: WaterSettings,
        days: impl IntoIterator<Item = (NaiveDate, u32)>,
    ) -> Self {
        let mut log = Self::new(settings);
        for (day, glasses) in days {
            let glasses = glasses.min(log.settings.max_glasses);
            log.by_date.insert(day, glasses);
        }
        log
    }

    pub fn glasses(&self, day: NaiveDate) -> u32 {
        self.by_date.get(&day).copied().unwrap_or(0)
    }

    /// Returns the new count. Stays put at the daily maximum.
    pub fn increment(&mut self, day: NaiveDate) -> u32 {
        let current = self.glasses(day);
        if current < self.settings.max_glasses {
            self.by_date.insert(day, current + 1);
        }
        self.glasses(day)
    }

    pub fn decrement(&mut self, day: NaiveDate) -> u32 {
        let current = self.glasses(day);
        if current > 0 {
            self.by_date.insert(day, current - 1);
        }
        self.glasses(day)
    }

    pub fn set(&mut self, day: NaiveDate, glasses: u32) -> StatsResult<()> {
        if glasses > self.settings.max_glasses {
            return Err(StatsError::InvalidValue(format!(
                "{glasses} glasses exceeds the daily maximum of {}",
                self.settings.max_glasses
            )));
        }
        self.by_date.insert(day, glasses);
        Ok(())
    }

    fn window(&self, today: NaiveDate) -> DateWindow {
        let days = u64::from(self.settings.weeks_to_show.max(1)) * 7;
        DateWindow::trailing(today, days - 1)
    }

    pub fn graph(&self, today: NaiveDate) -> Vec<GraphCell> {
        self.window(today)
            .days()
            .map(|date| {
                let glasses = self.glasses(date);
                GraphCell {
                    date,
                    glasses,
                    level: level(glasses),
                }
            })
            .collect()
    }

    pub fn summary(&self, today: NaiveDate) -> WaterSummary {
        let week_total: u32 = DateWindow::trailing(today, 6)
            .days()
            .map(|day| self.glasses(day))
            .sum();

        let mut current = 0;
        let mut best_streak = 0;
        let mut active_days = 0;
        for day in self.window(today).days() {
            let glasses = self.glasses(day);
            if glasses >= self.settings.goal_glasses {
                current += 1;
                best_streak = best_streak.max(current);
            } else {
                current = 0;
            }
            if glasses > 0 {
                active_days += 1;
            }
        }

        WaterSummary {
            today: self.glasses(today),
            weekly_average: round1(f64::from(week_total) / 7.0),
            best_streak,
            active_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_iso;

    fn date(value: &str) -> NaiveDate {
        parse_iso(value).expect("valid date")
    }

    #[test]
    fn levels_step_every_two_glasses() {
        let levels: Vec<u8> = [0, 1, 2, 3, 4, 5, 6, 7, 20].into_iter().map(level).collect();
        assert_eq!(levels, vec![0, 1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn increment_stops_at_daily_maximum() {
        let today = date("2024-03-10");
        let mut log = WaterLog::new(WaterSettings::default());
        log.set(today, 19).expect("set");

        assert_eq!(log.increment(today), 20);
        assert_eq!(log.increment(today), 20);
        assert!(log.set(today, 21).is_err());
    }

    #[test]
    fn decrement_never_goes_negative() {
        let today = date("2024-03-10");
        let mut log = WaterLog::new(WaterSettings::default());
        assert_eq!(log.decrement(today), 0);
        log.increment(today);
        assert_eq!(log.decrement(today), 0);
    }

    #[test]
    fn summary_tracks_streaks_and_active_days() {
        let today = date("2024-03-10");
        let log = WaterLog::with_days(
            WaterSettings::default(),
            [
                (date("2024-03-01"), 8),
                (date("2024-03-02"), 9),
                (date("2024-03-03"), 8),
                (date("2024-03-04"), 2),
                (date("2024-03-08"), 10),
                (date("2024-03-09"), 8),
                (date("2024-03-10"), 5),
                (date("2023-11-01"), 12),
            ],
        );

        let summary = log.summary(today);
        assert_eq!(summary.today, 5);
        assert_eq!(summary.best_streak, 3);
        assert_eq!(summary.active_days, 7);
        assert_eq!(summary.weekly_average, 3.6);
    }

    #[test]
    fn graph_covers_configured_weeks() {
        let today = date("2024-03-10");
        let log = WaterLog::new(WaterSettings::default());
        let cells = log.graph(today);
        assert_eq!(cells.len(), 84);
        assert_eq!(cells.last().map(|cell| cell.date), Some(today));
    }
}
