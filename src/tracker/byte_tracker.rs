//! Frame-by-frame tracker: prediction, two-stage association, lifecycle.

use log::{debug, warn};

use crate::error::Result;
use crate::tracker::assignment::{self, AssignmentResult};
use crate::tracker::config::TrackerConfig;
use crate::tracker::detection::Detection;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::lifecycle::TrackManager;
use crate::tracker::matching;
use crate::tracker::rect::Rect;
use crate::tracker::track::{Track, TrackedObject};

/// ByteTrack-style multi-object tracker for a single video stream.
///
/// Calls to [`update`](Self::update) must come in frame order; one tracker
/// per stream.
#[derive(Debug, Clone)]
pub struct BYTETracker {
    manager: TrackManager,
    frame_id: u32,
    config: TrackerConfig,
    kalman_filter: KalmanFilter,
}

impl BYTETracker {
    /// Build a tracker, rejecting an invalid configuration up front.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            manager: TrackManager::new(config.min_hits_to_confirm, config.max_frames_lost),
            frame_id: 0,
            config,
            kalman_filter: KalmanFilter::default(),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of frames processed so far.
    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    /// Every live track, including tentative and lost ones, ascending by id.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.manager.tracks()
    }

    /// Process one frame and return the confirmed tracks, ascending by id.
    ///
    /// Malformed detections are dropped with a warning; the rest of the frame
    /// is processed normally. An empty frame is valid and ages every track.
    pub fn update(&mut self, detections: Vec<Detection>) -> Vec<TrackedObject> {
        let detections = detections
            .into_iter()
            .enumerate()
            .filter_map(|(index, det)| match det.validate(index) {
                Ok(()) => Some(det),
                Err(e) => {
                    warn!("frame {}: dropping detection: {}", self.frame_id + 1, e);
                    None
                }
            })
            .collect();

        self.step(detections)
    }

    /// Like [`update`](Self::update), but rejects the whole frame if any
    /// detection is malformed. The tracker is left untouched on error.
    pub fn try_update(&mut self, detections: Vec<Detection>) -> Result<Vec<TrackedObject>> {
        for (index, det) in detections.iter().enumerate() {
            det.validate(index)?;
        }
        Ok(self.step(detections))
    }

    fn step(&mut self, detections: Vec<Detection>) -> Vec<TrackedObject> {
        self.frame_id += 1;

        // Step 1: Split detections into high-score and low-score
        let mut detections_high = Vec::new();
        let mut detections_low = Vec::new();
        for det in detections {
            if det.score >= self.config.high_conf_threshold {
                detections_high.push(det);
            } else if det.score >= self.config.low_conf_floor {
                detections_low.push(det);
            }
        }

        // Step 2: Predict every live track into this frame
        self.manager.predict_all(&self.kalman_filter);
        let pool = self.manager.predictions();

        // Step 3: First association, all tracks with high score detections
        let pool_rects: Vec<Rect> = pool.iter().map(|(_, rect)| *rect).collect();
        let high_rects: Vec<Rect> = detections_high.iter().map(|d| d.bbox).collect();
        let mut dists = matching::iou_distance(&pool_rects, &high_rects);
        if self.config.fuse_score {
            matching::fuse_score(&mut dists, &detections_high);
        }

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = assignment::linear_assignment(&dists, self.config.max_cost);

        let mut track_matches: Vec<(u64, Detection)> = matches
            .iter()
            .map(|&(itracked, idet)| (pool[itracked].0, detections_high[idet]))
            .collect();
        let first_stage = track_matches.len();

        // Step 4: Second association, leftover tracks with low score detections
        let remaining: Vec<(u64, Rect)> = unmatched_tracks.iter().map(|&i| pool[i]).collect();
        let remaining_rects: Vec<Rect> = remaining.iter().map(|(_, rect)| *rect).collect();
        let low_rects: Vec<Rect> = detections_low.iter().map(|d| d.bbox).collect();
        let dists_second = matching::iou_distance(&remaining_rects, &low_rects);

        let AssignmentResult {
            matches: matches_second,
            unmatched_detections: unmatched_low,
            ..
        } = assignment::linear_assignment(&dists_second, self.config.max_cost);

        track_matches.extend(
            matches_second
                .iter()
                .map(|&(itracked, idet)| (remaining[itracked].0, detections_low[idet])),
        );

        // Step 5: Detections left over from both stages start new tracks
        let new_detections: Vec<Detection> = unmatched_detections
            .iter()
            .map(|&i| detections_high[i])
            .chain(unmatched_low.iter().map(|&i| detections_low[i]))
            .filter(|d| d.score >= self.config.new_track_threshold)
            .collect();

        // Step 6: Advance the lifecycle of every track, evict removed ones
        let summary = self.manager.apply(
            &track_matches,
            &new_detections,
            &self.kalman_filter,
            self.frame_id,
        );

        debug!(
            "frame {}: {} high / {} low detections, {} + {} matched, {} missed, {} created, {} removed, {} live",
            self.frame_id,
            detections_high.len(),
            detections_low.len(),
            first_stage,
            track_matches.len() - first_stage,
            summary.missed,
            summary.created,
            summary.removed,
            self.manager.len()
        );

        self.manager.confirmed()
    }
}
