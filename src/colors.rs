use image::{GrayImage, Luma, RgbImage};
use palette::{FromColor, Hsv, Srgb, encoding};
use rayon::prelude::*;

/// An image in normalized Hue/Saturation/Value space.
///
/// Every component lies in `[0, 1]`; hue is the angle on the color wheel divided by 360.
/// Pixels are stored row-major, like [`image::ImageBuffer`].
#[derive(Debug, Clone, PartialEq)]
pub struct HsvImage {
    width: u32,
    height: u32,
    pixels: Vec<[f64; 3]>,
}

impl HsvImage {
    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`, in the order used by [`image::ImageBuffer::dimensions`].
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Row-major pixel slice, `[h, s, v]` per pixel.
    pub fn pixels(&self) -> &[[f64; 3]] {
        &self.pixels
    }

    /// Returns the `[h, s, v]` triple at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> [f64; 3] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// The value channel quantized back to 8 bits.
    ///
    /// `V = max(r, g, b) / 255`, so the quantization is lossless for images that came
    /// from [`to_hsv`].
    pub fn value_channel(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let v = self.get_pixel(x, y)[2];
            Luma([(v * 255.0).round().clamp(0.0, 255.0) as u8])
        })
    }
}

/// Converts a single 8-bit sRGB pixel to normalized `[h, s, v]`.
///
/// Achromatic pixels get a hue of 0, black pixels a saturation of 0.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [f64; 3] {
    let srgb: Srgb<f64> = Srgb::new(rgb[0], rgb[1], rgb[2]).into_format();
    let hsv = Hsv::<encoding::Srgb, f64>::from_color(srgb);

    // into_positive_degrees is in [0, 360), so the hue never wraps to 1.0.
    let hue = hsv.hue.into_positive_degrees() / 360.0;

    [hue, hsv.saturation, hsv.value]
}

/// Converts an RGB raster into an [`HsvImage`] of the same dimensions.
///
/// A 0×0 input yields an empty output.
pub fn to_hsv(image: &RgbImage) -> HsvImage {
    let (width, height) = image.dimensions();
    let pixels = image
        .as_raw()
        .par_chunks_exact(3)
        .map(|p| rgb_to_hsv([p[0], p[1], p[2]]))
        .collect();

    HsvImage {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn assert_hsv_eq(actual: [f64; 3], expected: [f64; 3]) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!(
                (a - e).abs() < 1e-9,
                "Assertion failed: expected {:?}, got {:?}",
                expected,
                actual
            );
        }
    }

    #[test]
    fn primary_colors() {
        assert_hsv_eq(rgb_to_hsv([255, 0, 0]), [0.0, 1.0, 1.0]);
        assert_hsv_eq(rgb_to_hsv([0, 255, 0]), [1.0 / 3.0, 1.0, 1.0]);
        assert_hsv_eq(rgb_to_hsv([0, 0, 255]), [2.0 / 3.0, 1.0, 1.0]);
    }

    #[test]
    fn achromatic_pixels() {
        assert_hsv_eq(rgb_to_hsv([0, 0, 0]), [0.0, 0.0, 0.0]);
        assert_hsv_eq(rgb_to_hsv([255, 255, 255]), [0.0, 0.0, 1.0]);
        assert_hsv_eq(rgb_to_hsv([51, 51, 51]), [0.0, 0.0, 0.2]);
    }

    #[test]
    fn brownish_stain() {
        // max = r, hue = 60 * (g - b) / (max - min) = 30 degrees.
        assert_hsv_eq(rgb_to_hsv([150, 75, 0]), [30.0 / 360.0, 1.0, 150.0 / 255.0]);
    }

    #[test]
    fn converts_whole_image() {
        let mut image = RgbImage::new(3, 2);
        image.put_pixel(2, 1, Rgb([0, 0, 255]));

        let hsv = to_hsv(&image);

        assert_eq!(hsv.dimensions(), (3, 2));
        assert_eq!(hsv.pixels().len(), 6);
        assert_hsv_eq(hsv.get_pixel(2, 1), [2.0 / 3.0, 1.0, 1.0]);
        assert_hsv_eq(hsv.get_pixel(0, 0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn get_pixel_indexes_row_major() {
        // Wider than tall, so swapped or truncated indexing picks the wrong pixel.
        let image = RgbImage::from_fn(7, 3, |x, y| Rgb([x as u8 * 30, y as u8 * 100, 0]));
        let hsv = to_hsv(&image);

        for y in 0..3 {
            for x in 0..7 {
                let expected = rgb_to_hsv(image.get_pixel(x, y).0);
                assert_eq!(hsv.get_pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    #[should_panic(expected = "pixel out of bounds")]
    fn get_pixel_rejects_out_of_bounds() {
        let hsv = to_hsv(&RgbImage::new(4, 2));
        hsv.get_pixel(0, 2);
    }

    #[test]
    fn empty_image() {
        let hsv = to_hsv(&RgbImage::new(0, 0));
        assert_eq!(hsv.dimensions(), (0, 0));
        assert!(hsv.pixels().is_empty());
    }

    #[test]
    fn value_channel_round_trips_max_component() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([10, 200, 30]));
        image.put_pixel(1, 0, Rgb([77, 3, 3]));

        let value = to_hsv(&image).value_channel();

        assert_eq!(value.get_pixel(0, 0), &Luma([200]));
        assert_eq!(value.get_pixel(1, 0), &Luma([77]));
    }
}
