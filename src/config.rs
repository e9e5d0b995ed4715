use crate::storage::resolve_data_path;
use std::{env, num::NonZeroI64, path::PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_POINT_STEP: NonZeroI64 = match NonZeroI64::new(25) {
    Some(step) => step,
    None => unreachable!(),
};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    /// Magnitude of one add/subtract action.
    pub point_step: NonZeroI64,
}

impl Config {
    pub fn from_env() -> Result<Self, std::io::Error> {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            port,
            data_path: resolve_data_path()?,
            point_step: parse_point_step(env::var("POINT_STEP").ok().as_deref()),
        })
    }
}

/// Filter for the tracing subscriber: `RUST_LOG` when it parses, `info` otherwise.
pub fn log_filter(raw: Option<&str>) -> EnvFilter {
    raw.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn parse_point_step(raw: Option<&str>) -> NonZeroI64 {
    let Some(raw) = raw else {
        return DEFAULT_POINT_STEP;
    };

    match raw.trim().parse::<i64>().ok().filter(|step| *step > 0) {
        Some(step) => NonZeroI64::new(step).unwrap_or(DEFAULT_POINT_STEP),
        None => {
            warn!(value = raw, "POINT_STEP must be a positive integer, using {DEFAULT_POINT_STEP}");
            DEFAULT_POINT_STEP
        }
    }
}
