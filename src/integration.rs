//! Integration with object detection backends.
//!
//! The detector is an external collaborator: this module only defines the
//! trait it must implement and a small pipeline that feeds its output to the
//! tracker.

mod builder;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections};
pub use pipeline::TrackerPipeline;
