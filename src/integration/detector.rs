//! Boundary to the external object detector.

use crate::tracker::Detection;

/// Any detector that turns a raw frame into per-object boxes and scores.
///
/// The tracker never looks inside the detector: model loading, preprocessing,
/// inference and NMS all live behind this trait. Implementations are expected
/// to have already applied their own confidence threshold and class filter.
///
/// # Example
///
/// ```ignore
/// use crowdtrack::{Detection, DetectionSource};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///     type Output = Vec<Detection>;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Self::Output, Self::Error> {
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Whatever the detector produces natively, convertible to detections.
    type Output: IntoDetections;

    /// Run inference on one raw frame.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(&mut self, input: &[u8], width: u32, height: u32)
    -> Result<Self::Output, Self::Error>;
}

/// Conversion from a detector's native output to tracker input.
pub trait IntoDetections {
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

/// `([x_min, y_min, x_max, y_max], confidence)` pairs, the layout most
/// detectors emit after NMS.
impl IntoDetections for Vec<([f32; 4], f32)> {
    fn into_detections(self) -> Vec<Detection> {
        self.into_iter()
            .map(|([x1, y1, x2, y2], score)| Detection::new(x1, y1, x2, y2, score))
            .collect()
    }
}
