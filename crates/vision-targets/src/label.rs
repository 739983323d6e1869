//! Raw classifier output adaptation

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::detection::{BoundingRect, DetectedBox};

/// One label candidate from the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassLabel {
    pub text: String,
    pub confidence: f32,
}

/// Detector output before labels are normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub rect: BoundingRect,

    /// Candidate labels, best first
    pub labels: Vec<ClassLabel>,
}

/// Label normalization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Lowercased classifier label -> display name (species names to "Goose")
    #[serde(deserialize_with = "lowercase_keys")]
    pub aliases: HashMap<String, String>,

    /// Minimum classifier confidence to keep a detection
    pub min_confidence: f32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            aliases: HashMap::from([("branta canadensis".to_string(), "Goose".to_string())]),
            min_confidence: 0.6,
        }
    }
}

/// Alias keys are matched case-insensitively; on a case-only clash the
/// later entry wins.
fn lowercase_keys<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = deserializer.deserialize_map(OrderedEntries)?;
    Ok(entries
        .into_iter()
        .map(|(raw, alias)| (raw.to_lowercase(), alias))
        .collect())
}

struct OrderedEntries;

impl<'de> serde::de::Visitor<'de> for OrderedEntries {
    type Value = Vec<(String, String)>;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("a map of label aliases")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry()? {
            entries.push(entry);
        }
        Ok(entries)
    }
}

impl LabelConfig {
    /// Register an alias, normalizing the classifier label
    pub fn with_alias(mut self, raw: &str, alias: impl Into<String>) -> Self {
        self.aliases.insert(raw.to_lowercase(), alias.into());
        self
    }

    /// Turn a raw detection into an annotated box ("Goose, 90%")
    ///
    /// Only the best label is considered. Unlabelled or low-confidence
    /// detections are dropped.
    pub fn adapt(&self, raw: &RawDetection) -> Option<DetectedBox> {
        let best = raw.labels.first()?;
        if best.confidence < self.min_confidence {
            debug!(
                "Dropping '{}' at confidence {} < {}",
                best.text, best.confidence, self.min_confidence
            );
            return None;
        }

        let name = self
            .aliases
            .get(&best.text.to_lowercase())
            .map(String::as_str)
            .unwrap_or(best.text.as_str());
        let percent = (best.confidence * 100.0) as u32;

        Some(DetectedBox::new(
            raw.rect,
            format!("{}, {}%", name, percent),
            best.confidence,
        ))
    }

    /// Adapt a whole detector result, keeping only usable detections
    pub fn adapt_all(&self, raw: &[RawDetection]) -> Vec<DetectedBox> {
        raw.iter().filter_map(|r| self.adapt(r)).collect()
    }
}

/// Split an annotated label ("Goose, 90%") into name and confidence
pub fn parse_annotation(label: &str) -> Option<(&str, f32)> {
    let (name, percent) = label.rsplit_once(", ")?;
    let percent: u32 = percent.trim().strip_suffix('%')?.parse().ok()?;
    Some((name, percent as f32 / 100.0))
}
