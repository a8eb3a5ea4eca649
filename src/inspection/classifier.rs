use crate::annotations::detection::Detection;
use crate::annotations::taxonomy::TaxonomyLabel;
use crate::inspection::batch::DetectionBatch;
use crate::object_detection::object_detection_model::RawDetection;

/// Minimum detector confidence for a row to be reported.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Filters raw detector rows and tags them against the PPE taxonomy.
///
/// A row is kept iff `confidence >= confidence_threshold`. Every kept row becomes exactly one
/// [`Detection`] in emission order; nothing is reordered or merged. Class indices outside the
/// taxonomy resolve to [`TaxonomyLabel::Unknown`], which is reported but never a violation.
pub fn classify(
    rows: &[RawDetection],
    confidence_threshold: f32,
    image_dimensions: (u32, u32),
) -> DetectionBatch {
    let detections = rows
        .iter()
        .filter(|row| row.confidence >= confidence_threshold)
        .map(|row| {
            let label = TaxonomyLabel::from_class_index(row.class_index);
            if label == TaxonomyLabel::Unknown {
                log::warn!(
                    "detector emitted class index {} outside the taxonomy, reporting as {}",
                    row.class_index,
                    label
                );
            }
            Detection::new(label, row.confidence, row.bbox)
        })
        .collect();
    DetectionBatch::from_detections(detections, image_dimensions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::BoundingBox;
    use crate::inspection::batch::SafetyStatus;

    const DIMS: (u32, u32) = (600, 1020);

    fn row(class_index: usize, confidence: f32) -> RawDetection {
        RawDetection {
            class_index,
            confidence,
            bbox: BoundingBox::new(10.0, 10.0, 50.0, 60.0).unwrap(),
        }
    }

    #[test]
    fn single_hard_hat_violation() {
        let batch = classify(&[row(2, 0.81)], DEFAULT_CONFIDENCE_THRESHOLD, DIMS);
        assert_eq!(batch.status(), SafetyStatus::Violation);
        assert_eq!(batch.detections().len(), 1);
        assert_eq!(batch.violations().len(), 1);
        let det = &batch.violations()[0];
        assert_eq!(det.label(), TaxonomyLabel::NoHardhat);
        assert_eq!(det.reported_confidence(), 0.81);
        assert_eq!(det.reported_box(), [10, 10, 50, 60]);
    }

    #[test]
    fn below_threshold_rows_are_dropped() {
        let batch = classify(&[row(2, 0.29)], DEFAULT_CONFIDENCE_THRESHOLD, DIMS);
        assert!(batch.detections().is_empty());
        assert!(batch.violations().is_empty());
        assert_eq!(batch.status(), SafetyStatus::Safe);
    }

    #[test]
    fn threshold_is_inclusive() {
        let batch = classify(&[row(5, 0.3), row(5, 0.2999)], 0.3, DIMS);
        assert_eq!(batch.detections().len(), 1);
    }

    #[test]
    fn unknown_index_is_reported_but_not_a_violation() {
        let batch = classify(&[row(99, 0.9)], DEFAULT_CONFIDENCE_THRESHOLD, DIMS);
        assert_eq!(batch.detections().len(), 1);
        assert_eq!(batch.detections()[0].label(), TaxonomyLabel::Unknown);
        assert!(batch.violations().is_empty());
        assert_eq!(batch.status(), SafetyStatus::Safe);
    }

    #[test]
    fn emission_order_and_duplicates_are_preserved() {
        let rows = [row(2, 0.5), row(5, 0.9), row(3, 0.4), row(2, 0.7), row(0, 0.1)];
        let batch = classify(&rows, DEFAULT_CONFIDENCE_THRESHOLD, DIMS);
        let labels: Vec<_> = batch.detections().iter().map(|d| d.label()).collect();
        assert_eq!(
            labels,
            vec![
                TaxonomyLabel::NoHardhat,
                TaxonomyLabel::Person,
                TaxonomyLabel::NoMask,
                TaxonomyLabel::NoHardhat
            ]
        );
        let violations: Vec<_> = batch.violations().iter().map(|d| d.label()).collect();
        assert_eq!(
            violations,
            vec![TaxonomyLabel::NoHardhat, TaxonomyLabel::NoMask, TaxonomyLabel::NoHardhat]
        );
        assert_eq!(batch.image_dimensions(), DIMS);
    }

    #[test]
    fn threshold_and_status_properties_hold_over_a_sweep() {
        let rows: Vec<RawDetection> = (0..=20)
            .flat_map(|step| {
                let confidence = step as f32 / 20.0;
                (0..12).map(move |class_index| row(class_index, confidence))
            })
            .collect();
        for threshold in [0.0, 0.05, 0.3, 0.55, 0.95, 1.0] {
            let batch = classify(&rows, threshold, DIMS);
            assert!(batch.detections().iter().all(|d| d.confidence() >= threshold));
            let expected = rows.iter().filter(|r| r.confidence >= threshold).count();
            assert_eq!(batch.detections().len(), expected);
            assert_eq!(
                batch.status() == SafetyStatus::Violation,
                !batch.violations().is_empty()
            );
            assert!(batch.violations().iter().all(|d| d.is_violation()));
        }
    }
}
