//! Cost matrices between predicted tracks and detections.

use ndarray::Array2;

use crate::tracker::detection::Detection;
use crate::tracker::rect::Rect;

/// Cost of a pair whose boxes do not overlap at all. It sits above every
/// accepted `max_cost`, so such a pair is never matched.
pub const FORBIDDEN_COST: f32 = 1.0 + 1e-3;

/// `1 - IoU` for every (track, detection) pair, with disjoint pairs set to
/// [`FORBIDDEN_COST`]. Shape is `(track_boxes.len(), det_boxes.len())`.
pub fn iou_distance(track_boxes: &[Rect], det_boxes: &[Rect]) -> Array2<f32> {
    Array2::from_shape_fn((track_boxes.len(), det_boxes.len()), |(i, j)| {
        let iou = track_boxes[i].iou(&det_boxes[j]);
        if iou > 0.0 { 1.0 - iou } else { FORBIDDEN_COST }
    })
}

/// Scale the IoU similarity of each column by that detection's confidence.
/// Forbidden entries stay forbidden.
pub fn fuse_score(cost_matrix: &mut Array2<f32>, detections: &[Detection]) {
    for ((_, j), cost) in cost_matrix.indexed_iter_mut() {
        if *cost >= FORBIDDEN_COST {
            continue;
        }
        let iou_sim = 1.0 - *cost;
        *cost = 1.0 - iou_sim * detections[j].score;
    }
}
