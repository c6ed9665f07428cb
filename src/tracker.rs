mod assignment;
mod byte_tracker;
mod config;
mod detection;
mod kalman_filter;
mod lifecycle;
mod matching;
mod rect;
mod track;
mod track_state;

pub use assignment::{AssignmentResult, linear_assignment};
pub use byte_tracker::BYTETracker;
pub use config::TrackerConfig;
pub use detection::Detection;
pub use kalman_filter::KalmanFilter;
pub use lifecycle::{LifecycleSummary, TrackManager};
pub use matching::{FORBIDDEN_COST, fuse_score, iou_distance};
pub use rect::Rect;
pub use track::{Track, TrackedObject};
pub use track_state::TrackState;
