//! Primary / secondary candidate selection

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::detection::DetectedBox;

/// Selector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Label prefix of the chase target class
    pub target_label: String,

    /// Non-target boxes must be strictly smaller than this (px^2)
    pub small_box_threshold: i64,

    /// Image row of the horizontal center line (pixels)
    pub image_center_pixel_y: f64,

    /// Only explore boxes whose bottom edge is above the center line
    pub require_upper_half: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            target_label: "Goose".to_string(),
            small_box_threshold: 2100,
            image_center_pixel_y: 240.0,
            require_upper_half: true,
        }
    }
}

/// Candidates picked from one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Selection<'a> {
    /// Smallest target-class box
    pub primary: Option<&'a DetectedBox>,

    /// Smallest eligible non-target box
    pub secondary: Option<&'a DetectedBox>,
}

impl Selection<'_> {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }
}

/// Frame-local target selector. Holds no history.
#[derive(Debug, Clone)]
pub struct TargetSelector {
    config: SelectorConfig,
}

impl TargetSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Whether a label names the chase target class
    pub fn is_target(&self, label: &str) -> bool {
        label.starts_with(self.config.target_label.as_str())
    }

    /// Pick at most one primary and one secondary candidate
    ///
    /// The smallest box wins each slot. Equal sizes fall back to a canonical
    /// ordering so the result does not depend on input order.
    pub fn select<'a>(&self, boxes: &'a [DetectedBox]) -> Selection<'a> {
        let mut selection = Selection::default();

        for candidate in boxes {
            if let Err(e) = candidate.validate() {
                debug!("Skipping malformed box '{}': {}", candidate.label, e);
                continue;
            }

            let slot = if self.is_target(&candidate.label) {
                &mut selection.primary
            } else if self.is_explorable(candidate) {
                &mut selection.secondary
            } else {
                continue;
            };

            let replace = match *slot {
                Some(current) => canonical_order(candidate, current) == Ordering::Less,
                None => true,
            };
            if replace {
                *slot = Some(candidate);
            }
        }

        trace!(
            primary = ?selection.primary.map(|b| b.size()),
            secondary = ?selection.secondary.map(|b| b.size()),
            "frame selection"
        );
        selection
    }

    fn is_explorable(&self, candidate: &DetectedBox) -> bool {
        if candidate.size() >= self.config.small_box_threshold {
            return false;
        }
        !self.config.require_upper_half
            || f64::from(candidate.rect.bottom) < self.config.image_center_pixel_y
    }
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::new(SelectorConfig::default())
    }
}

/// Size first, then geometry, then higher confidence, then label
fn canonical_order(a: &DetectedBox, b: &DetectedBox) -> Ordering {
    a.size()
        .cmp(&b.size())
        .then_with(|| a.rect.left.cmp(&b.rect.left))
        .then_with(|| a.rect.top.cmp(&b.rect.top))
        .then_with(|| a.rect.right.cmp(&b.rect.right))
        .then_with(|| a.rect.bottom.cmp(&b.rect.bottom))
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| a.label.cmp(&b.label))
}
