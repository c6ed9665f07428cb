//! A single tracked object and its per-frame state transitions.

use std::sync::atomic::{AtomicU64, Ordering};

use log::{trace, warn};

use crate::tracker::detection::Detection;
use crate::tracker::kalman_filter::{KalmanFilter, StateCovariance, StateMean};
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// Process-wide id source. Ids are never handed out twice, even across
/// tracker instances.
static TRACK_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_track_id() -> u64 {
    TRACK_ID_COUNTER.fetch_add(1, Ordering::Relaxed) + 1
}

/// Confirmed track as reported to the caller after each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedObject {
    pub track_id: u64,
    /// Box of the most recent matched detection
    pub bbox: Rect,
    /// Confidence of the most recent matched detection
    pub score: f32,
}

impl TrackedObject {
    /// Box as (x_min, y_min, x_max, y_max).
    pub fn tlbr(&self) -> [f32; 4] {
        self.bbox.to_tlbr()
    }
}

/// Single object track.
#[derive(Debug, Clone)]
pub struct Track {
    track_id: u64,
    state: TrackState,
    score: f32,
    /// Consecutive frames with a match
    hits: u32,
    /// Frames survived since creation
    age: u32,
    time_since_update: u32,
    start_frame: u32,
    /// Frame of the last match
    frame_id: u32,
    mean: StateMean,
    covariance: StateCovariance,
    last_box: Rect,
}

impl Track {
    /// Start a track from an unmatched detection. The track counts its first
    /// hit immediately, so `min_hits_to_confirm == 1` confirms it on creation.
    pub(crate) fn new(
        detection: &Detection,
        kalman_filter: &KalmanFilter,
        frame_id: u32,
        min_hits_to_confirm: u32,
    ) -> Self {
        let (mean, covariance) = kalman_filter.initiate(&detection.bbox);
        let state = if min_hits_to_confirm <= 1 {
            TrackState::Confirmed
        } else {
            TrackState::Tentative
        };

        Self {
            track_id: next_track_id(),
            state,
            score: detection.score,
            hits: 1,
            age: 0,
            time_since_update: 0,
            start_frame: frame_id,
            frame_id,
            mean,
            covariance,
            last_box: detection.bbox,
        }
    }

    pub fn track_id(&self) -> u64 {
        self.track_id
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn time_since_update(&self) -> u32 {
        self.time_since_update
    }

    pub fn start_frame(&self) -> u32 {
        self.start_frame
    }

    pub fn end_frame(&self) -> u32 {
        self.frame_id
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn last_box(&self) -> Rect {
        self.last_box
    }

    /// Box implied by the current motion state. After `predict` this is
    /// where the track is expected in the current frame.
    pub fn predicted_rect(&self) -> Rect {
        KalmanFilter::to_rect(&self.mean)
    }

    pub fn to_output(&self) -> TrackedObject {
        TrackedObject {
            track_id: self.track_id,
            bbox: self.last_box,
            score: self.score,
        }
    }

    pub(crate) fn predict(&mut self, kalman_filter: &KalmanFilter) {
        let mut mean = self.mean;
        if self.state == TrackState::Lost {
            mean[7] = 0.0;
        }
        let (mean, covariance) = kalman_filter.predict(&mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;
    }

    pub(crate) fn mark_matched(
        &mut self,
        detection: &Detection,
        kalman_filter: &KalmanFilter,
        frame_id: u32,
        min_hits_to_confirm: u32,
    ) {
        match kalman_filter.update(&self.mean, &self.covariance, &detection.bbox) {
            Some((mean, covariance)) => {
                self.mean = mean;
                self.covariance = covariance;
            }
            None => warn!(
                "track {}: motion correction skipped, innovation covariance not positive definite",
                self.track_id
            ),
        }

        self.hits += 1;
        self.time_since_update = 0;
        self.frame_id = frame_id;
        self.last_box = detection.bbox;
        self.score = detection.score;

        let next = match self.state {
            TrackState::Tentative if self.hits >= min_hits_to_confirm => TrackState::Confirmed,
            TrackState::Lost => TrackState::Confirmed,
            other => other,
        };
        if next != self.state {
            trace!("track {}: {:?} -> {:?}", self.track_id, self.state, next);
        }
        self.state = next;
    }

    pub(crate) fn mark_missed(&mut self, max_frames_lost: u32) {
        let missed_before = self.time_since_update;
        self.hits = 0;
        self.time_since_update += 1;

        let next = match self.state {
            TrackState::Tentative => TrackState::Removed,
            TrackState::Confirmed => TrackState::Lost,
            TrackState::Lost if missed_before >= max_frames_lost => TrackState::Removed,
            other => other,
        };
        if next != self.state {
            trace!("track {}: {:?} -> {:?}", self.track_id, self.state, next);
        }
        self.state = next;
    }

    pub(crate) fn increment_age(&mut self) {
        self.age += 1;
    }
}
