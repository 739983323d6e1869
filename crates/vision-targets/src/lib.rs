//! Vision Targets
//!
//! Detection data handed over by the on-device object detector and the
//! frame-local heuristic that picks what the robot should go after:
//! - Bounding boxes, labels and per-frame snapshots
//! - Adaptation of raw classifier output into annotated boxes
//! - Primary (chase) and secondary (explore) candidate selection

pub mod detection;
pub mod error;
pub mod label;
pub mod selector;

pub use detection::{BoundingRect, DetectedBox, DetectionFrame};
pub use error::InputError;
pub use label::{parse_annotation, ClassLabel, LabelConfig, RawDetection};
pub use selector::{Selection, SelectorConfig, TargetSelector};
