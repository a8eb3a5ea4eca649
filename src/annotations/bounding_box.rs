use crate::error::BoundingBoxError;

/// A struct representing a bounding box.
///
/// An axis-aligned rectangle in image pixel coordinates, as emitted by the detector and drawn by
/// the annotation renderer.
///
/// This project uses the standard convention of the left side of the image being x=0 and the top
/// of the image being y=0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl BoundingBox {
    /// Checks if a box has valid parameters before constructing.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Result<Self, BoundingBoxError> {
        if left > right {
            Err(BoundingBoxError::InvertedHorizontal { left, right })
        } else if top > bottom {
            Err(BoundingBoxError::InvertedVertical { top, bottom })
        } else {
            Ok(BoundingBox { left, top, right, bottom })
        }
    }

    /// Builds a box from the centre/size encoding YOLO heads produce.
    ///
    /// Negative sizes collapse to a zero-area box at the centre.
    pub fn from_center(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        let half_w = width.max(0.0) / 2.0;
        let half_h = height.max(0.0) / 2.0;
        BoundingBox {
            left: center_x - half_w,
            top: center_y - half_h,
            right: center_x + half_w,
            bottom: center_y + half_h,
        }
    }

    pub fn scaled(&self, scale_x: f32, scale_y: f32) -> Self {
        BoundingBox {
            left: self.left * scale_x,
            top: self.top * scale_y,
            right: self.right * scale_x,
            bottom: self.bottom * scale_y,
        }
    }

    /// Clips the box to a `width` x `height` canvas.
    pub fn clamped(&self, width: f32, height: f32) -> Self {
        let max_x = (width - 1.0).max(0.0);
        let max_y = (height - 1.0).max(0.0);
        BoundingBox {
            left: self.left.clamp(0.0, max_x),
            top: self.top.clamp(0.0, max_y),
            right: self.right.clamp(0.0, max_x),
            bottom: self.bottom.clamp(0.0, max_y),
        }
    }

    /// Coordinates rounded to the nearest pixel, `[x1, y1, x2, y2]`.
    pub fn rounded(&self) -> [i32; 4] {
        [
            self.left.round() as i32,
            self.top.round() as i32,
            self.right.round() as i32,
            self.bottom.round() as i32,
        ]
    }
}

pub trait BoundingBoxGeometry {
    fn left(&self) -> f32;
    fn top(&self) -> f32;
    fn right(&self) -> f32;
    fn bottom(&self) -> f32;

    fn area(&self) -> f32 {
        (self.right() - self.left()) * (self.bottom() - self.top())
    }

    fn center(&self) -> (f32, f32) {
        (
            (self.left() + self.right()) / 2.0,
            (self.top() + self.bottom()) / 2.0,
        )
    }

    fn as_xyxy(&self) -> (f32, f32, f32, f32) {
        (self.left(), self.top(), self.right(), self.bottom())
    }

    fn intersection_over_union(&self, other: &impl BoundingBoxGeometry) -> f32 {
        let inter_w = (self.right().min(other.right()) - self.left().max(other.left())).max(0.0);
        let inter_h = (self.bottom().min(other.bottom()) - self.top().max(other.top())).max(0.0);
        let intersection = inter_w * inter_h;
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

impl BoundingBoxGeometry for BoundingBox {
    fn left(&self) -> f32 {
        self.left
    }

    fn top(&self) -> f32 {
        self.top
    }

    fn right(&self) -> f32 {
        self.right
    }

    fn bottom(&self) -> f32 {
        self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_boxes() {
        assert_eq!(
            BoundingBox::new(5.0, 0.0, 1.0, 1.0),
            Err(BoundingBoxError::InvertedHorizontal { left: 5.0, right: 1.0 })
        );
        assert_eq!(
            BoundingBox::new(0.0, 5.0, 1.0, 1.0),
            Err(BoundingBoxError::InvertedVertical { top: 5.0, bottom: 1.0 })
        );
    }

    #[test]
    fn center_encoding_converts_to_corners() {
        let bbox = BoundingBox::from_center(30.0, 35.0, 40.0, 50.0);
        assert_eq!(bbox.as_xyxy(), (10.0, 10.0, 50.0, 60.0));
        assert_eq!(bbox.center(), (30.0, 35.0));
        assert_eq!(bbox.area(), 2000.0);
    }

    #[test]
    fn clamping_keeps_box_on_canvas() {
        let bbox = BoundingBox::new(-20.0, -5.0, 1100.0, 700.0).unwrap();
        assert_eq!(bbox.clamped(1020.0, 600.0).as_xyxy(), (0.0, 0.0, 1019.0, 599.0));
    }

    #[test]
    fn rounding_goes_to_nearest_pixel() {
        let bbox = BoundingBox::new(10.4, 10.5, 49.6, 60.49).unwrap();
        assert_eq!(bbox.rounded(), [10, 11, 50, 60]);
    }

    #[test]
    fn iou_of_identical_and_disjoint_boxes() {
        let a = BoundingBox::new(0.0, 0.0, 4.0, 4.0).unwrap();
        let b = BoundingBox::new(6.0, 6.0, 10.0, 10.0).unwrap();
        assert_eq!(a.intersection_over_union(&a), 1.0);
        assert_eq!(a.intersection_over_union(&b), 0.0);
    }
}
