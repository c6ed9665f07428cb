//! Per-frame detector output consumed by the tracker.

use crate::error::{Result, TrackerError};
use crate::tracker::rect::Rect;

/// Detection input for the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Bounding box, stored TLWH, built from TLBR (x_min, y_min, x_max, y_max)
    pub bbox: Rect,
    /// Detection confidence score in [0, 1]
    pub score: f32,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            score,
        }
    }

    pub fn from_rect(bbox: Rect, score: f32) -> Self {
        Self { bbox, score }
    }

    /// Check the box geometry and the score range. `index` is the position of
    /// the detection in its frame and is only used for the error report.
    pub fn validate(&self, index: usize) -> Result<()> {
        if !self.bbox.is_well_formed() {
            return Err(TrackerError::InvalidDetection {
                index,
                reason: format!(
                    "box must be finite with positive width and height, got {:?}",
                    self.bbox.to_tlbr()
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.score) {
            return Err(TrackerError::InvalidDetection {
                index,
                reason: format!("confidence {} outside [0, 1]", self.score),
            });
        }
        Ok(())
    }
}
