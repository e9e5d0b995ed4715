use crate::models::TrackerState;
use std::{num::NonZeroI64, path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub point_step: NonZeroI64,
    pub tracker: Arc<Mutex<TrackerState>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, point_step: NonZeroI64, tracker: TrackerState) -> Self {
        Self {
            data_path,
            point_step,
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }
}
