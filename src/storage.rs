use crate::errors::{AppError, TrackerError};
use crate::models::{DEFAULT_GOAL, TrackerState};
use serde_json::{Map, Value};
use std::{env, ffi::OsString, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, warn};

/// Key the tracker owns inside the store file.
pub const STORAGE_KEY: &str = "goalTracker";

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

/// Restores the tracker, falling back to defaults when nothing usable is stored.
pub async fn load_state(path: &Path) -> TrackerState {
    match read_state(path).await {
        Ok(Some(state)) => state,
        Ok(None) => TrackerState::default(),
        Err(err) => {
            error!("failed to restore tracker state: {err}");
            TrackerState::default()
        }
    }
}

async fn read_state(path: &Path) -> Result<Option<TrackerState>, TrackerError> {
    let mut store = match read_store(path).await? {
        Some(store) => store,
        None => return Ok(None),
    };
    let Some(value) = store.remove(STORAGE_KEY) else {
        return Ok(None);
    };

    let state: TrackerState = serde_json::from_value(value).map_err(TrackerError::corrupt)?;
    Ok(Some(repair(state)))
}

async fn read_store(path: &Path) -> Result<Option<Map<String, Value>>, TrackerError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(TrackerError::corrupt(err)),
    };

    let value: Value = serde_json::from_slice(&bytes).map_err(TrackerError::corrupt)?;
    match value {
        Value::Object(store) => Ok(Some(store)),
        _ => Err(TrackerError::corrupt("store root is not an object")),
    }
}

fn repair(mut state: TrackerState) -> TrackerState {
    if state.goal <= 0 {
        warn!(goal = state.goal, "stored goal is not positive, using default");
        state.goal = DEFAULT_GOAL;
    }

    let stored = state.history.len();
    state.history.retain(|entry| entry.is_consistent());
    if state.history.len() != stored {
        warn!(
            dropped = stored - state.history.len(),
            "dropping stored history entries with a zero or mismatched delta"
        );
    }

    if state.wins.saturating_add(state.losses) != state.history.len() as u64 {
        let wins = state.history.iter().filter(|entry| entry.is_win()).count() as u64;
        let losses = state.history.len() as u64 - wins;
        warn!(
            wins = state.wins,
            losses = state.losses,
            entries = state.history.len(),
            "stored counters disagree with history, recounting"
        );
        state.wins = wins;
        state.losses = losses;
    }

    state
}

/// Writes the whole snapshot under [`STORAGE_KEY`], keeping other keys in the file.
pub async fn persist_state(path: &Path, state: &TrackerState) -> Result<(), AppError> {
    let mut store = match read_store(path).await {
        Ok(Some(store)) => store,
        Ok(None) => Map::new(),
        Err(err) => {
            warn!("overwriting unreadable store: {err}");
            Map::new()
        }
    };
    store.insert(STORAGE_KEY.to_string(), serde_json::to_value(state)?);

    let payload = serde_json::to_vec_pretty(&Value::Object(store))?;
    let staging = staging_path(path);
    fs::write(&staging, payload).await?;
    fs::rename(&staging, path).await?;
    Ok(())
}

/// Sibling file the snapshot is written to before it replaces the store.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("state.json"));
    name.push(".tmp");
    path.with_file_name(name)
}
