//! Detected objects and per-frame snapshots

use serde::{Deserialize, Serialize};
use crate::InputError;

/// Axis-aligned rectangle in image pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Rectangle of `width` x `height` centered on `(center_x, center_y)`
    pub fn centered(center_x: i32, center_y: i32, width: i32, height: i32) -> Self {
        let left = center_x - width / 2;
        let top = center_y - height / 2;
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> i64 {
        i64::from(self.right) - i64::from(self.left)
    }

    pub fn height(&self) -> i64 {
        i64::from(self.bottom) - i64::from(self.top)
    }

    /// Pixel area (width * height)
    pub fn area(&self) -> i64 {
        self.width().saturating_mul(self.height())
    }

    /// Horizontal center in pixels
    pub fn center_x(&self) -> f64 {
        (f64::from(self.left) + f64::from(self.right)) / 2.0
    }
}

/// Classified detection produced by the object detector for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedBox {
    /// Bounding box in image pixels
    pub rect: BoundingRect,

    /// Class label, e.g. "Goose, 90%"
    pub label: String,

    /// Detection confidence (0-1)
    pub confidence: f32,
}

impl DetectedBox {
    pub fn new(rect: BoundingRect, label: impl Into<String>, confidence: f32) -> Self {
        Self {
            rect,
            label: label.into(),
            confidence,
        }
    }

    /// Pixel area of the bounding box
    pub fn size(&self) -> i64 {
        self.rect.area()
    }

    /// Check the box can take part in selection
    pub fn validate(&self) -> Result<(), InputError> {
        let width = self.rect.width();
        if width <= 0 {
            return Err(InputError::NonPositiveWidth(width));
        }
        let height = self.rect.height();
        if height <= 0 {
            return Err(InputError::NonPositiveHeight(height));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(InputError::ConfidenceOutOfRange(self.confidence));
        }
        Ok(())
    }
}

/// Owned snapshot of one processed camera frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    /// Frame sequence number
    pub sequence: u32,

    /// Capture timestamp (nanoseconds, monotonic)
    pub timestamp_ns: u64,

    /// Detections in no particular order; may be empty
    #[serde(default)]
    pub boxes: Vec<DetectedBox>,
}

impl DetectionFrame {
    pub fn new(sequence: u32, timestamp_ns: u64, boxes: Vec<DetectedBox>) -> Self {
        Self {
            sequence,
            timestamp_ns,
            boxes,
        }
    }

    /// Frame with no detections
    pub fn empty(sequence: u32, timestamp_ns: u64) -> Self {
        Self::new(sequence, timestamp_ns, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
