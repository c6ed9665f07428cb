//! Tracker configuration.

use crate::error::{Result, TrackerError};

/// Configuration for the [`BYTETracker`](crate::BYTETracker).
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Detections at or above this confidence take part in the first
    /// association stage, the rest in the second.
    pub high_conf_threshold: f32,
    /// Detections below this confidence are ignored entirely. Off (0.0) by
    /// default, so every valid detection takes part in the second stage.
    pub low_conf_floor: f32,
    /// Matches whose cost (`1 - IoU`) reaches this value are rejected.
    pub max_cost: f32,
    /// Consecutive hits needed before a track is reported.
    pub min_hits_to_confirm: u32,
    /// Frames a lost track is kept around for re-matching.
    pub max_frames_lost: u32,
    /// Minimum confidence for an unmatched detection to start a new track.
    pub new_track_threshold: f32,
    /// Weight first-stage IoU by detection confidence.
    pub fuse_score: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            high_conf_threshold: 0.5,
            low_conf_floor: 0.0,
            max_cost: 1.0,
            min_hits_to_confirm: 3,
            max_frames_lost: 30,
            new_track_threshold: 0.0,
            fuse_score: false,
        }
    }
}

impl TrackerConfig {
    /// Derive the lost-track buffer from the stream frame rate, so that
    /// `track_buffer` frames at 30 fps span the same wall-clock time at any
    /// other rate. A non-positive or non-finite `frame_rate` yields a buffer of
    /// zero frames.
    pub fn with_frame_rate(mut self, frame_rate: f32, track_buffer: u32) -> Self {
        let scaled = frame_rate / 30.0 * track_buffer as f32;
        self.max_frames_lost = if scaled.is_finite() && scaled > 0.0 {
            scaled as u32
        } else {
            0
        };
        self
    }

    pub fn with_high_conf_threshold(mut self, threshold: f32) -> Self {
        self.high_conf_threshold = threshold;
        self
    }

    pub fn with_min_hits_to_confirm(mut self, hits: u32) -> Self {
        self.min_hits_to_confirm = hits;
        self
    }

    pub fn with_max_frames_lost(mut self, frames: u32) -> Self {
        self.max_frames_lost = frames;
        self
    }

    /// Check every parameter. Called by the tracker constructor.
    pub fn validate(&self) -> Result<()> {
        check_unit("high_conf_threshold", self.high_conf_threshold)?;
        check_unit("low_conf_floor", self.low_conf_floor)?;
        check_unit("new_track_threshold", self.new_track_threshold)?;

        if self.low_conf_floor > self.high_conf_threshold {
            return Err(TrackerError::InvalidConfig(format!(
                "low_conf_floor ({}) must not exceed high_conf_threshold ({})",
                self.low_conf_floor, self.high_conf_threshold
            )));
        }
        if !(self.max_cost > 0.0 && self.max_cost <= 1.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "max_cost must be in (0, 1], got {}",
                self.max_cost
            )));
        }
        if self.min_hits_to_confirm == 0 {
            return Err(TrackerError::InvalidConfig(
                "min_hits_to_confirm must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TrackerError::InvalidConfig(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}
