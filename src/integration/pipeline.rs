//! TrackerPipeline for combining detection with tracking.

use crate::error::Result;
use crate::tracker::{BYTETracker, TrackedObject, TrackerConfig};

use super::{DetectionSource, IntoDetections};

/// One detector feeding one tracker, i.e. one video stream.
///
/// Frames must be submitted in order; share a pipeline between threads only
/// behind external synchronization.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    tracker: BYTETracker,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    pub fn new(detector: D, config: TrackerConfig) -> Result<Self> {
        Ok(Self {
            detector,
            tracker: BYTETracker::new(config)?,
        })
    }

    pub fn with_default_config(detector: D) -> Result<Self> {
        Self::new(detector, TrackerConfig::default())
    }

    /// Run the detector on one frame and feed its output to the tracker.
    ///
    /// A detector failure leaves the tracker untouched, so the frame can be
    /// retried or skipped by the caller.
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> std::result::Result<Vec<TrackedObject>, D::Error> {
        let detections = self.detector.detect(input, width, height)?.into_detections();
        Ok(self.tracker.update(detections))
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn tracker(&self) -> &BYTETracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDetector {
        frames: Vec<Vec<([f32; 4], f32)>>,
    }

    impl DetectionSource for MockDetector {
        type Error = String;
        type Output = Vec<([f32; 4], f32)>;

        fn detect(
            &mut self,
            _input: &[u8],
            _width: u32,
            _height: u32,
        ) -> std::result::Result<Self::Output, Self::Error> {
            if self.frames.is_empty() {
                return Err("no more frames".to_string());
            }
            Ok(self.frames.remove(0))
        }
    }

    #[test]
    fn test_tracker_pipeline() {
        let frame = vec![([10.0, 20.0, 50.0, 80.0], 0.9)];
        let detector = MockDetector {
            frames: vec![frame.clone(), frame.clone(), frame],
        };

        let mut pipeline = TrackerPipeline::with_default_config(detector).unwrap();
        assert!(pipeline.process_frame(&[], 640, 480).unwrap().is_empty());
        assert!(pipeline.process_frame(&[], 640, 480).unwrap().is_empty());

        let tracks = pipeline.process_frame(&[], 640, 480).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].tlbr(), [10.0, 20.0, 50.0, 80.0]);
    }

    #[test]
    fn test_detector_error_leaves_tracker_untouched() {
        let detector = MockDetector { frames: vec![] };
        let mut pipeline = TrackerPipeline::with_default_config(detector).unwrap();
        assert!(pipeline.process_frame(&[], 640, 480).is_err());
        assert_eq!(pipeline.tracker().frame_id(), 0);
    }
}
