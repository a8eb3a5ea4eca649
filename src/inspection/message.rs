use crate::annotations::taxonomy::TaxonomyLabel;
use crate::inspection::batch::DetectionBatch;
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

pub const ALL_CLEAR_MESSAGE: &str = "All safety equipment detected. Workplace is safe!";

/// Human-readable verdict for one image, suitable for display and speech.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SafetyMessage(String);

impl SafetyMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_all_clear(&self) -> bool {
        self.0 == ALL_CLEAR_MESSAGE
    }
}

impl fmt::Display for SafetyMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed sentence spoken for a missing piece of equipment.
///
/// Labels that are not violations have no sentence.
pub fn violation_sentence(label: TaxonomyLabel) -> Option<&'static str> {
    match label {
        TaxonomyLabel::NoHardhat => {
            Some("SAFETY VIOLATION: Hard hat not detected. Please wear a hard hat.")
        }
        TaxonomyLabel::NoMask => {
            Some("SAFETY VIOLATION: Face mask not detected. Please wear a face mask.")
        }
        TaxonomyLabel::NoSafetyVest => {
            Some("SAFETY VIOLATION: Safety vest not detected. Please wear a safety vest.")
        }
        _ => None,
    }
}

/// Builds the safety message from the distinct violation labels in `batch`.
///
/// Sentences follow taxonomy declaration order, so the result depends only on which violation
/// labels are present: not on detection order, duplicate count, or non-violation detections.
/// A label without a sentence is skipped.
pub fn summarize(batch: &DetectionBatch) -> SafetyMessage {
    if batch.violations().is_empty() {
        return SafetyMessage(ALL_CLEAR_MESSAGE.to_string());
    }
    let present: BTreeSet<TaxonomyLabel> =
        batch.violations().iter().map(|det| det.label()).collect();
    SafetyMessage(present.into_iter().filter_map(violation_sentence).join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::BoundingBox;
    use crate::inspection::classifier::classify;
    use crate::object_detection::object_detection_model::RawDetection;

    const HARD_HAT: &str = "SAFETY VIOLATION: Hard hat not detected. Please wear a hard hat.";
    const MASK: &str = "SAFETY VIOLATION: Face mask not detected. Please wear a face mask.";
    const VEST: &str = "SAFETY VIOLATION: Safety vest not detected. Please wear a safety vest.";

    fn batch_of(class_indices: &[usize]) -> DetectionBatch {
        let rows: Vec<RawDetection> = class_indices
            .iter()
            .enumerate()
            .map(|(i, class_index)| RawDetection {
                class_index: *class_index,
                confidence: 0.9,
                bbox: BoundingBox::new(i as f32, 0.0, i as f32 + 10.0, 10.0).unwrap(),
            })
            .collect();
        classify(&rows, 0.3, (600, 1020))
    }

    #[test]
    fn no_violations_is_all_clear() {
        let message = summarize(&batch_of(&[]));
        assert_eq!(message.as_str(), ALL_CLEAR_MESSAGE);
        assert!(message.is_all_clear());
        assert!(summarize(&batch_of(&[0, 1, 5, 7, 99])).is_all_clear());
    }

    #[test]
    fn single_hard_hat_sentence() {
        assert_eq!(summarize(&batch_of(&[2])).as_str(), HARD_HAT);
    }

    #[test]
    fn duplicates_collapse_to_one_sentence_each() {
        let message = summarize(&batch_of(&[2, 3, 2]));
        assert_eq!(message.as_str(), format!("{HARD_HAT} {MASK}"));
        assert_eq!(message.as_str().matches(HARD_HAT).count(), 1);
        assert_eq!(message.as_str().matches(MASK).count(), 1);
    }

    #[test]
    fn message_depends_only_on_the_violation_label_set() {
        let reference = summarize(&batch_of(&[4, 3, 2]));
        assert_eq!(reference.as_str(), format!("{HARD_HAT} {MASK} {VEST}"));
        for permutation in [
            vec![2, 3, 4],
            vec![3, 4, 2],
            vec![4, 4, 4, 2, 3, 3],
            vec![5, 4, 0, 3, 99, 2, 8],
        ] {
            assert_eq!(summarize(&batch_of(&permutation)), reference);
        }
    }

    #[test]
    fn only_violation_labels_have_sentences() {
        for label in TaxonomyLabel::KNOWN.iter().chain([&TaxonomyLabel::Unknown]) {
            assert_eq!(violation_sentence(*label).is_some(), label.is_violation());
        }
    }
}
