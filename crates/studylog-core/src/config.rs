use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Missing keys fall back to their defaults so an older state file still
/// loads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub daily_study_target_hours: f64,
    pub water: WaterSettings,
    /// Offset used to turn calendar days into timestamp ranges.
    pub utc_offset_minutes: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterSettings {
    pub goal_glasses: u32,
    pub max_glasses: u32,
    pub weeks_to_show: u32,
}

impl Default for WaterSettings {
    fn default() -> Self {
        Self {
            goal_glasses: 8,
            max_glasses: 20,
            weeks_to_show: 12,
        }
    }
}

impl Settings {
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_study_target_hours: 8.0,
            water: WaterSettings::default(),
            utc_offset_minutes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let settings = Settings {
            utc_offset_minutes: 48 * 60,
            ..Settings::default()
        };
        assert_eq!(settings.offset().local_minus_utc(), 0);

        let settings = Settings {
            utc_offset_minutes: 90,
            ..Settings::default()
        };
        assert_eq!(settings.offset().local_minus_utc(), 5_400);
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let settings: Settings = serde_json::from_str(
            r#"{"utc_offset_minutes":60,"water":{"goal_glasses":10},"week_labels":["a","b","c"]}"#,
        )
        .expect("settings");

        assert_eq!(settings.utc_offset_minutes, 60);
        assert_eq!(settings.daily_study_target_hours, 8.0);
        assert_eq!(settings.water.goal_glasses, 10);
        assert_eq!(settings.water.max_glasses, 20);
    }
}
