use image::{GrayImage, Luma};
use rayon::prelude::*;

use crate::colors::HsvImage;
use crate::config::ThresholdRange;

/// Intensity used for foreground pixels in the grayscale backing store.
pub const FOREGROUND: u8 = 255;

/// A binary mask over an image.
///
/// Backed by a [`GrayImage`] holding only `0` and [`FOREGROUND`], so it can be handed to
/// [imageproc] routines directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask(GrayImage);

impl Mask {
    /// An all-false mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self(GrayImage::new(width, height))
    }

    /// Builds a mask by evaluating `f(x, y)` for every pixel, row by row.
    ///
    /// # Arguments
    ///
    /// * `width`, `height` - Dimensions of the mask.
    /// * `f` - Returns `true` for foreground pixels.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        Self(GrayImage::from_fn(width, height, |x, y| {
            Luma([if f(x, y) { FOREGROUND } else { 0 }])
        }))
    }

    /// Wraps a grayscale image, treating every non-zero pixel as foreground.
    pub fn from_gray(mut image: GrayImage) -> Self {
        for pixel in image.pixels_mut() {
            if pixel.0[0] != 0 {
                pixel.0[0] = FOREGROUND;
            }
        }
        Self(image)
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// `(width, height)`, as [`GrayImage::dimensions`].
    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    /// Whether the pixel at column `x`, row `y` is foreground.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y).0[0] != 0
    }

    /// Number of foreground pixels.
    pub fn count(&self) -> usize {
        self.0.as_raw().iter().filter(|&&v| v != 0).count()
    }

    /// `true` when no pixel is foreground.
    pub fn is_empty(&self) -> bool {
        self.0.as_raw().iter().all(|&v| v == 0)
    }

    /// The backing image, `0` for background and [`FOREGROUND`] for foreground.
    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }

    /// Consumes the mask and returns its backing image.
    pub fn into_gray(self) -> GrayImage {
        self.0
    }
}

/// Thresholds an HSV image against an inclusive per-channel range.
///
/// A pixel is foreground iff `lower[i] <= hsv[i] <= upper[i]` for all three channels. A
/// crossed range (`lower[i] > upper[i]` for any `i`) therefore selects nothing.
pub fn segment(hsv: &HsvImage, range: &ThresholdRange) -> Mask {
    let mut image = GrayImage::new(hsv.width(), hsv.height());
    let raw: &mut [u8] = &mut image;

    raw.par_iter_mut()
        .zip(hsv.pixels().par_iter())
        .for_each(|(out, pixel)| {
            if range.contains(pixel) {
                *out = FOREGROUND;
            }
        });

    Mask(image)
}
