use std::{
    env,
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use tracing::{debug, warn};

pub struct Config {
    pub user_id: Option<String>,
    pub data_dir: PathBuf,
    pub utc_offset_minutes: Option<i32>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            user_id: var("STUDYLOG_USER").filter(|id| !id.trim().is_empty()),
            data_dir: var("STUDYLOG_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            utc_offset_minutes: try_load("STUDYLOG_UTC_OFFSET_MINUTES"),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .map_err(|_| {
            debug!("{key} not set");
        })
        .ok()
}

fn try_load<T: FromStr>(key: &str) -> Option<T>
where
    T::Err: Display,
{
    var(key)?
        .trim()
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value, ignoring it: {e}");
        })
        .ok()
}

fn default_data_dir() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("studylog");
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".local/share/studylog")
}
