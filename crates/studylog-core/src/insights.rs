use serde::Serialize;

use crate::{
    config::Settings,
    dates::{average, round1},
    model::{Granularity, ProductivityData},
};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub avg_sleep: f64,
    pub avg_study: f64,
    pub total_study_time: f64,
    pub productivity_score: u32,
}

impl SummaryStats {
    pub fn from_data(data: &ProductivityData, settings: &Settings) -> Self {
        let avg_sleep = round1(average(&data.sleep_hours));
        let avg_study = round1(average(&data.study_hours));
        let total_study_time = round1(data.study_hours.iter().sum());
        let productivity_score = if settings.daily_study_target_hours > 0.0 {
            (avg_study / settings.daily_study_target_hours * 100.0)
                .round()
                .max(0.0) as u32
        } else {
            0
        };

        Self {
            avg_sleep,
            avg_study,
            total_study_time,
            productivity_score,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepInsight {
    TooLittle,
    BelowOptimal,
    Ideal,
    TooMuch,
}

impl SleepInsight {
    pub fn from_average(hours: f64) -> Self {
        if hours < 6.0 {
            SleepInsight::TooLittle
        } else if hours < 7.0 {
            SleepInsight::BelowOptimal
        } else if hours <= 9.0 {
            SleepInsight::Ideal
        } else {
            SleepInsight::TooMuch
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            SleepInsight::TooLittle => {
                "You are sleeping too little. 7-9 hours of sleep is recommended for steady productivity."
            }
            SleepInsight::BelowOptimal => {
                "Your sleep is below the optimal level. Try adding another hour."
            }
            SleepInsight::Ideal => "Great! Your sleep pattern is ideal for productive days.",
            SleepInsight::TooMuch => "You may be sleeping too much. Aim to keep it at 7-9 hours.",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyInsight {
    BelowAverage,
    Progressing,
    Balanced,
    BurnoutRisk,
}

impl StudyInsight {
    pub fn from_average(hours: f64) -> Self {
        if hours < 3.0 {
            StudyInsight::BelowAverage
        } else if hours < 5.0 {
            StudyInsight::Progressing
        } else if hours < 7.0 {
            StudyInsight::Balanced
        } else {
            StudyInsight::BurnoutRisk
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            StudyInsight::BelowAverage => {
                "Study time is below average. Try working up to at least 4-5 hours a day."
            }
            StudyInsight::Progressing => "Good progress! A bit more focus gets you to excellent.",
            StudyInsight::Balanced => "Excellent! You keep a solid balance of study and rest.",
            StudyInsight::BurnoutRisk => {
                "You are studying a lot. Take breaks so you don't burn out."
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductivityInsight {
    Low,
    Good,
    Excellent,
}

impl ProductivityInsight {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..40 => ProductivityInsight::Low,
            40..70 => ProductivityInsight::Good,
            _ => ProductivityInsight::Excellent,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ProductivityInsight::Low => {
                "Productivity is low. Consider planning your time and setting goals."
            }
            ProductivityInsight::Good => {
                "Good productivity! Small improvements will take you further."
            }
            ProductivityInsight::Excellent => "Outstanding productivity! Keep up the current pace.",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Insights {
    pub sleep: SleepInsight,
    pub study: StudyInsight,
    pub productivity: ProductivityInsight,
}

impl Insights {
    pub fn from_summary(summary: &SummaryStats) -> Self {
        Self {
            sleep: SleepInsight::from_average(summary.avg_sleep),
            study: StudyInsight::from_average(summary.avg_study),
            productivity: ProductivityInsight::from_score(summary.productivity_score),
        }
    }

    pub fn messages(&self) -> [&'static str; 3] {
        [
            self.sleep.message(),
            self.study.message(),
            self.productivity.message(),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub granularity: Granularity,
    pub data: ProductivityData,
    pub summary: SummaryStats,
    pub insights: Insights,
    pub messages: [&'static str; 3],
    pub distribution_percentages: [u32; 4],
}

impl StatisticsReport {
    pub fn new(granularity: Granularity, data: ProductivityData, settings: &Settings) -> Self {
        let summary = SummaryStats::from_data(&data, settings);
        let insights = Insights::from_summary(&summary);
        let messages = insights.messages();
        let distribution_percentages = data.activity_distribution.percentages();
        Self {
            granularity,
            data,
            summary,
            insights,
            messages,
            distribution_percentages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week_with(sleep: [f64; 7], study: [f64; 7]) -> ProductivityData {
        let mut data = ProductivityData::empty(Granularity::Week);
        data.sleep_hours = sleep.to_vec();
        data.study_hours = study.to_vec();
        data
    }

    #[test]
    fn summary_averages_series() {
        let data = week_with(
            [8.0, 7.0, 7.5, 6.5, 8.0, 9.0, 7.0],
            [4.0, 5.0, 6.0, 3.0, 4.0, 2.0, 4.0],
        );

        let summary = SummaryStats::from_data(&data, &Settings::default());
        assert_eq!(summary.avg_sleep, 7.6);
        assert_eq!(summary.avg_study, 4.0);
        assert_eq!(summary.total_study_time, 28.0);
        assert_eq!(summary.productivity_score, 50);
    }

    #[test]
    fn tiers_follow_thresholds() {
        assert_eq!(SleepInsight::from_average(5.9), SleepInsight::TooLittle);
        assert_eq!(SleepInsight::from_average(6.0), SleepInsight::BelowOptimal);
        assert_eq!(SleepInsight::from_average(9.0), SleepInsight::Ideal);
        assert_eq!(SleepInsight::from_average(9.1), SleepInsight::TooMuch);

        assert_eq!(StudyInsight::from_average(2.9), StudyInsight::BelowAverage);
        assert_eq!(StudyInsight::from_average(5.0), StudyInsight::Balanced);
        assert_eq!(StudyInsight::from_average(7.0), StudyInsight::BurnoutRisk);

        assert_eq!(ProductivityInsight::from_score(39), ProductivityInsight::Low);
        assert_eq!(ProductivityInsight::from_score(40), ProductivityInsight::Good);
        assert_eq!(ProductivityInsight::from_score(70), ProductivityInsight::Excellent);
    }

    #[test]
    fn empty_data_reports_lowest_tiers() {
        let data = ProductivityData::empty(Granularity::Month);
        let report = StatisticsReport::new(Granularity::Month, data, &Settings::default());

        assert_eq!(report.summary, SummaryStats::default());
        assert_eq!(report.insights.sleep, SleepInsight::TooLittle);
        assert_eq!(report.insights.productivity, ProductivityInsight::Low);
        assert_eq!(report.messages[0], SleepInsight::TooLittle.message());
        assert_eq!(report.messages[2], ProductivityInsight::Low.message());
        assert_eq!(report.distribution_percentages, [0, 0, 0, 0]);
    }
}
