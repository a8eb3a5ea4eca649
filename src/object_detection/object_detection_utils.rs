use crate::annotations::bounding_box::BoundingBoxGeometry;
use crate::object_detection::object_detection_model::RawDetection;
use std::cmp::Ordering;

/// Non maxmimum suppression is a way of removing duplicate detections.
///
/// Class-aware: boxes only suppress boxes of the same class. Survivors come back sorted by
/// descending confidence, which is the emission order downstream stages preserve.
pub fn non_maximum_suppression(
    mut detections: Vec<RawDetection>,
    iou_threshold: f32,
) -> Vec<RawDetection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
    let mut detections_to_remove: Vec<bool> = vec![false; detections.len()];
    for (current_index, current_det) in detections.iter().enumerate() {
        if detections_to_remove[current_index] {
            continue;
        }
        for (other_index, other_det) in detections[current_index + 1..].iter().enumerate() {
            let other_index = current_index + other_index + 1;
            if detections_to_remove[other_index] {
                continue;
            }
            if current_det.class_index != other_det.class_index {
                continue;
            }
            if current_det.intersection_over_union(other_det) > iou_threshold {
                detections_to_remove[other_index] = true;
            }
        }
    }
    detections
        .into_iter()
        .zip(detections_to_remove)
        .filter_map(|(det, removed)| (!removed).then_some(det))
        .collect()
}
