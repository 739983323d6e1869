//! JSON-lines replay format

use geofence::GeoPoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vision_targets::{DetectionFrame, RawDetection};

/// One recorded input event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEvent {
    /// Already-annotated detection frame
    Frame(DetectionFrame),

    /// Raw classifier output, adapted with the configured labels
    Detections {
        sequence: u32,
        timestamp_ns: u64,
        #[serde(default)]
        detections: Vec<RawDetection>,
    },

    /// GPS fix
    Fix(GeoPoint),
}

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Malformed replay event on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a replay file, one event per line
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_replay(text: &str) -> Result<Vec<ReplayEvent>, ReplayError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| ReplayError::Parse {
                line: idx + 1,
                source,
            })
        })
        .collect()
}
