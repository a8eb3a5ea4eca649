use crate::annotations::bounding_box::BoundingBoxGeometry;
use crate::annotations::detection::Detection;
use crate::inspection::batch::DetectionBatch;
use crate::inspection::glyphs::{GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH, glyph_bits, text_width};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

pub const ALERT_COLOUR: Rgb<u8> = Rgb([255, 0, 0]);
pub const SAFE_COLOUR: Rgb<u8> = Rgb([0, 255, 0]);
pub const TEXT_COLOUR: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Clone, Debug)]
pub struct RenderStyle {
    pub alert_colour: Rgb<u8>,
    pub safe_colour: Rgb<u8>,
    pub text_colour: Rgb<u8>,
    pub line_thickness: u32,
    /// Integer scale applied to the 5x7 glyphs.
    pub text_scale: u32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        RenderStyle {
            alert_colour: ALERT_COLOUR,
            safe_colour: SAFE_COLOUR,
            text_colour: TEXT_COLOUR,
            line_thickness: 2,
            text_scale: 2,
        }
    }
}

impl RenderStyle {
    fn colour_for(&self, detection: &Detection) -> Rgb<u8> {
        if detection.is_violation() {
            self.alert_colour
        } else {
            self.safe_colour
        }
    }

    fn padding(&self) -> u32 {
        2 * self.text_scale.max(1)
    }
}

/// Draws every detection of `batch` onto a copy of `image`.
///
/// Boxes and labels go down in detection order, so later boxes may cover earlier ones. All
/// drawing is clipped to the canvas; a batch with no detections returns an identical copy.
pub fn render(image: &RgbImage, batch: &DetectionBatch, style: &RenderStyle) -> RgbImage {
    let mut annotated = image.clone();
    for detection in batch.detections() {
        let colour = style.colour_for(detection);
        draw_box(&mut annotated, detection, colour, style.line_thickness);
        draw_label(&mut annotated, detection, &label_text(detection), colour, style);
    }
    annotated
}

/// `"<label>: <confidence>"`, with the same two-decimal confidence the report carries.
pub fn label_text(detection: &Detection) -> String {
    format!("{}: {:.2}", detection.label(), detection.reported_confidence())
}

fn draw_box(
    image: &mut RgbImage,
    detection: &impl BoundingBoxGeometry,
    colour: Rgb<u8>,
    thickness: u32,
) {
    let left = detection.left().round() as i32;
    let top = detection.top().round() as i32;
    let right = detection.right().round() as i32;
    let bottom = detection.bottom().round() as i32;
    for inset in 0..thickness.max(1) as i32 {
        let width = right - left - 2 * inset + 1;
        let height = bottom - top - 2 * inset + 1;
        if width <= 0 || height <= 0 {
            break;
        }
        let rect = Rect::at(left + inset, top + inset).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(image, rect, colour);
    }
}

/// Top-left corner of a `block_w` x `block_h` label block for a box whose top-left corner is
/// (`box_left`, `box_top`).
///
/// The block sits directly on top of the box. When the box touches the top of the canvas the
/// block moves just inside the box instead, and it is pulled left when it would run past the
/// right edge.
pub fn label_origin(
    box_left: i32,
    box_top: i32,
    block_w: u32,
    block_h: u32,
    canvas: (u32, u32),
) -> (i32, i32) {
    let (canvas_w, canvas_h) = (canvas.0 as i32, canvas.1 as i32);
    let x = box_left.min(canvas_w - block_w as i32).max(0);
    let above = box_top - block_h as i32;
    let y = if above >= 0 {
        above
    } else {
        box_top.min(canvas_h - block_h as i32).max(0)
    };
    (x, y)
}

fn draw_label(
    image: &mut RgbImage,
    detection: &Detection,
    text: &str,
    background: Rgb<u8>,
    style: &RenderStyle,
) {
    let scale = style.text_scale.max(1);
    let padding = style.padding();
    let block_w = text_width(text) * scale + 2 * padding;
    let block_h = GLYPH_HEIGHT * scale + 2 * padding;
    let (x, y) = label_origin(
        detection.left().round() as i32,
        detection.top().round() as i32,
        block_w,
        block_h,
        image.dimensions(),
    );
    draw_filled_rect_mut(image, Rect::at(x, y).of_size(block_w, block_h), background);
    draw_text(image, x + padding as i32, y + padding as i32, text, scale, style.text_colour);
}

fn draw_text(image: &mut RgbImage, x: i32, y: i32, text: &str, scale: u32, colour: Rgb<u8>) {
    let mut pen_x = x;
    for ch in text.chars() {
        if let Some(glyph) = glyph_bits(ch) {
            for (row, pattern) in glyph.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (pattern >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                        let px = pen_x + (col * scale) as i32;
                        let py = y + (row as u32 * scale) as i32;
                        draw_filled_rect_mut(image, Rect::at(px, py).of_size(scale, scale), colour);
                    }
                }
            }
        }
        pen_x += (GLYPH_ADVANCE * scale) as i32;
    }
}
