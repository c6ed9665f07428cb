//! # crowdtrack
//!
//! Tracking-by-detection for a single object class. Per-frame detections
//! (boxes with confidence scores) go in, confirmed tracks with stable ids come
//! out. The detector itself stays outside the crate, behind
//! [`DetectionSource`].
//!
//! ```rust,ignore
//! use crowdtrack::{BYTETracker, Detection, TrackerConfig};
//!
//! let mut tracker = BYTETracker::new(TrackerConfig::default())?;
//! let tracks = tracker.update(vec![Detection::new(10.0, 10.0, 50.0, 50.0, 0.9)]);
//! for t in tracks {
//!     println!("{} {:?}", t.track_id, t.tlbr());
//! }
//! ```

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{Result, TrackerError};
pub use integration::{DetectionBuilder, DetectionSource, IntoDetections, TrackerPipeline};
pub use tracker::{BYTETracker, Detection, Rect, Track, TrackState, TrackedObject, TrackerConfig};
