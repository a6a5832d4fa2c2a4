use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::contours::Region;
use crate::segment::Mask;

/// Fill color for positive-marker pixels in overlay mode.
pub const OVERLAY_DAB_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
/// Fill color for nuclear pixels in overlay mode.
pub const OVERLAY_NUCLEUS_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
/// Outline color for accepted positive-marker regions.
pub const BOX_DAB_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
/// Outline color for accepted nuclear regions.
pub const BOX_NUCLEUS_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
/// Outline thickness in pixels, grown inwards from the bounding box.
pub const BOX_LINE_WIDTH: u32 = 2;

/// Recolors masked pixels and blends the result over the original.
///
/// Where both masks are set, the nuclear color wins. Each channel becomes
/// `original * (1 - alpha) + recolored * alpha`, truncated to 8 bits.
///
/// # Panics
///
/// Panics if either mask's dimensions differ from those of `original`.
pub fn render_overlay(original: &RgbImage, dab: &Mask, nucleus: &Mask, alpha: f64) -> RgbImage {
    assert_eq!(
        dab.dimensions(),
        original.dimensions(),
        "positive-marker mask must match the image size"
    );
    assert_eq!(
        nucleus.dimensions(),
        original.dimensions(),
        "nuclear mask must match the image size"
    );

    let mut output = original.clone();

    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let overlay = if nucleus.get(x, y) {
            OVERLAY_NUCLEUS_COLOR
        } else if dab.get(x, y) {
            OVERLAY_DAB_COLOR
        } else {
            *pixel
        };

        for (channel, over) in pixel.0.iter_mut().zip(overlay.0) {
            let blended = f64::from(*channel) * (1.0 - alpha) + f64::from(over) * alpha;
            *channel = blended as u8;
        }
    }

    output
}

/// Draws the bounding box of every accepted region on a copy of the original.
///
/// Boxes are `BOX_LINE_WIDTH` pixels thick and clipped to the image. Nuclear boxes are drawn
/// after the positive-marker boxes.
pub fn render_bounding_boxes(original: &RgbImage, dab: &[Region], nucleus: &[Region]) -> RgbImage {
    let mut output = original.clone();

    for region in dab {
        draw_region_box(&mut output, region, BOX_DAB_COLOR);
    }
    for region in nucleus {
        draw_region_box(&mut output, region, BOX_NUCLEUS_COLOR);
    }

    output
}

fn draw_region_box(canvas: &mut RgbImage, region: &Region, color: Rgb<u8>) {
    let (width, height) = canvas.dimensions();
    let Some(bounds) = region
        .bounding_box()
        .and_then(|b| b.to_pixel_rect(width, height))
    else {
        return;
    };

    for inset in 0..BOX_LINE_WIDTH {
        if bounds.width <= 2 * inset || bounds.height <= 2 * inset {
            break;
        }
        // Pixel coordinates are bounded by the image size, which fits in i32 for any image
        // that can be allocated.
        let rect = Rect::at((bounds.x + inset) as i32, (bounds.y + inset) as i32)
            .of_size(bounds.width - 2 * inset, bounds.height - 2 * inset);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}
