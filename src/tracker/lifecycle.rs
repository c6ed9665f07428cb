//! Ownership of the live track set and the per-frame state transitions.

use std::collections::{BTreeMap, HashMap};

use log::trace;

use crate::tracker::detection::Detection;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::rect::Rect;
use crate::tracker::track::{Track, TrackedObject};
use crate::tracker::track_state::TrackState;

/// Counts of what one frame did to the track set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleSummary {
    pub matched: usize,
    pub missed: usize,
    pub created: usize,
    pub removed: usize,
}

/// Live tracks keyed by id. Iteration is in ascending id order, which fixes
/// the row order of every cost matrix and the order of the output.
#[derive(Debug, Clone)]
pub struct TrackManager {
    tracks: BTreeMap<u64, Track>,
    min_hits_to_confirm: u32,
    max_frames_lost: u32,
}

impl TrackManager {
    pub fn new(min_hits_to_confirm: u32, max_frames_lost: u32) -> Self {
        Self {
            tracks: BTreeMap::new(),
            min_hits_to_confirm,
            max_frames_lost,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, track_id: u64) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// All live tracks in any state, ascending by id.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn predict_all(&mut self, kalman_filter: &KalmanFilter) {
        for track in self.tracks.values_mut() {
            track.predict(kalman_filter);
        }
    }

    /// Track ids with their predicted boxes, ascending by id.
    pub fn predictions(&self) -> Vec<(u64, Rect)> {
        self.tracks
            .values()
            .map(|t| (t.track_id(), t.predicted_rect()))
            .collect()
    }

    /// Apply one frame of association results. Every live track that is not
    /// in `matches` counts as missed. Tracks for `new_detections` are created
    /// after the existing ones have been advanced, then removed tracks are
    /// evicted.
    pub fn apply(
        &mut self,
        matches: &[(u64, Detection)],
        new_detections: &[Detection],
        kalman_filter: &KalmanFilter,
        frame_id: u32,
    ) -> LifecycleSummary {
        let mut summary = LifecycleSummary::default();
        let matched: HashMap<u64, &Detection> =
            matches.iter().map(|(id, det)| (*id, det)).collect();

        for track in self.tracks.values_mut() {
            match matched.get(&track.track_id()) {
                Some(det) => {
                    track.mark_matched(det, kalman_filter, frame_id, self.min_hits_to_confirm);
                    summary.matched += 1;
                }
                None => {
                    track.mark_missed(self.max_frames_lost);
                    summary.missed += 1;
                }
            }
            track.increment_age();
        }

        for det in new_detections {
            let track = Track::new(det, kalman_filter, frame_id, self.min_hits_to_confirm);
            trace!("track {}: created at frame {}", track.track_id(), frame_id);
            self.tracks.insert(track.track_id(), track);
            summary.created += 1;
        }

        let before = self.tracks.len();
        self.tracks.retain(|id, t| {
            let keep = t.state() != TrackState::Removed;
            if !keep {
                trace!("track {}: evicted", id);
            }
            keep
        });
        summary.removed = before - self.tracks.len();

        summary
    }

    /// Confirmed tracks, ascending by id.
    pub fn confirmed(&self) -> Vec<TrackedObject> {
        self.tracks
            .values()
            .filter(|t| t.is_confirmed())
            .map(Track::to_output)
            .collect()
    }
}
