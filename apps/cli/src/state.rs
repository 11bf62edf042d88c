use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use studylog_core::{
    StatisticsService, StatsError, config::Settings,
    store::{MemoryStore, StoreSnapshot},
};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("io error: {0}")]
    Io(String),
    #[error("state file error: {0}")]
    State(String),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error("no user set, export STUDYLOG_USER")]
    MissingUser,
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::State(value.to_string())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct StateOnDisk {
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    store: StoreSnapshot,
}

pub struct AppState {
    path: PathBuf,
    pub service: StatisticsService<MemoryStore>,
}

impl AppState {
    pub fn init(base: &Path, utc_offset_minutes: Option<i32>) -> Result<Self, AppError> {
        fs::create_dir_all(base)?;
        let path = base.join("state.json");

        let mut data = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            match serde_json::from_str(&raw) {
                Ok(data) => data,
                Err(e) => {
                    let backup = path.with_extension("json.bak");
                    fs::rename(&path, &backup)?;
                    warn!(
                        backup = %backup.display(),
                        "unreadable state file moved aside, starting fresh: {e}"
                    );
                    StateOnDisk::default()
                }
            }
        } else {
            StateOnDisk::default()
        };
        if let Some(offset) = utc_offset_minutes {
            data.settings.utc_offset_minutes = offset;
        }

        let state = Self {
            path,
            service: StatisticsService::new(MemoryStore::from_snapshot(data.store), data.settings),
        };
        state.save()?;
        Ok(state)
    }

    pub fn store(&self) -> &MemoryStore {
        self.service.store()
    }

    pub fn settings(&self) -> &Settings {
        self.service.settings()
    }

    pub fn save(&self) -> Result<(), AppError> {
        let data = StateOnDisk {
            settings: self.settings().clone(),
            store: self.store().snapshot()?,
        };
        let payload = serde_json::to_string_pretty(&data)?;
        fs::write(&self.path, payload)?;
        debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}
