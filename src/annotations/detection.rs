use crate::annotations::bounding_box::{BoundingBox, BoundingBoxGeometry};
use crate::annotations::taxonomy::TaxonomyLabel;

/// A classified detection: one object instance that survived confidence filtering.
///
/// Read-only once built. The box keeps the detector's sub-pixel coordinates for rendering; the
/// `reported_*` accessors give the rounded values that go into reports.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    label: TaxonomyLabel,
    confidence: f32,
    bbox: BoundingBox,
}

impl Detection {
    pub(crate) fn new(label: TaxonomyLabel, confidence: f32, bbox: BoundingBox) -> Self {
        Detection { label, confidence, bbox }
    }

    pub fn label(&self) -> TaxonomyLabel {
        self.label
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn is_violation(&self) -> bool {
        self.label.is_violation()
    }

    /// Confidence rounded to two decimals, ties to even. Both the JSON report and the drawn
    /// label use this value.
    ///
    /// Scaling an `f32` by 100 is exact in `f64`, so a tie here is a true decimal tie.
    pub fn reported_confidence(&self) -> f64 {
        (f64::from(self.confidence) * 100.0).round_ties_even() / 100.0
    }

    pub fn reported_box(&self) -> [i32; 4] {
        self.bbox.rounded()
    }
}

impl BoundingBoxGeometry for Detection {
    fn left(&self) -> f32 {
        self.bbox.left()
    }

    fn top(&self) -> f32 {
        self.bbox.top()
    }

    fn right(&self) -> f32 {
        self.bbox.right()
    }

    fn bottom(&self) -> f32 {
        self.bbox.bottom()
    }
}
