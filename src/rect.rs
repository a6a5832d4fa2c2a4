use image::math::Rect;
use imageproc::point::Point;
use num_traits::ToPrimitive;

/// Axis-aligned bounds of a set of points, in `(row, col)` image coordinates.
///
/// Rows grow downwards and correspond to `Point::y`; columns correspond to `Point::x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_row: f64,
    pub min_col: f64,
    pub max_row: f64,
    pub max_col: f64,
}

impl BoundingBox {
    /// Extent along the rows.
    pub fn height(&self) -> f64 {
        self.max_row - self.min_row
    }

    /// Extent along the columns.
    pub fn width(&self) -> f64 {
        self.max_col - self.min_col
    }

    /// Snaps the box to whole pixels and clips it to a `width` x `height` image.
    ///
    /// The returned `Rect` covers every pixel the box touches after rounding, so a box
    /// spanning a single pixel has a width and height of 1. Returns `None` when the box
    /// lies completely outside the image.
    pub fn to_pixel_rect(&self, width: u32, height: u32) -> Option<Rect> {
        if width == 0 || height == 0 {
            return None;
        }

        let max_x = f64::from(width - 1);
        let max_y = f64::from(height - 1);

        let x0 = self.min_col.round();
        let y0 = self.min_row.round();
        let x1 = self.max_col.round();
        let y1 = self.max_row.round();

        if x1 < 0.0 || y1 < 0.0 || x0 > max_x || y0 > max_y {
            return None;
        }

        // Clamped to [0, width - 1] / [0, height - 1], so the casts cannot truncate.
        let x0 = x0.clamp(0.0, max_x) as u32;
        let y0 = y0.clamp(0.0, max_y) as u32;
        let x1 = x1.clamp(0.0, max_x) as u32;
        let y1 = y1.clamp(0.0, max_y) as u32;

        Some(Rect {
            x: x0,
            y: y0,
            width: x1 - x0 + 1,
            height: y1 - y0 + 1,
        })
    }
}

/// Calculates the axis-aligned bounding box of an arbitrary set of points.
///
/// This function is generic over numeric types that implement `PartialOrd`, making it
/// suitable both for integer pixel contours (as produced by
/// `imageproc::contours::find_contours`) and for sub-pixel `f64` isocontours.
///
/// # Arguments
///
/// * `points` - The points to enclose, with `x` as column and `y` as row.
///
/// # Returns
///
/// `None` for an empty slice, otherwise the smallest box containing every point.
/// Coordinates that cannot be represented as `f64` are treated as `0.0`.
///
/// # Examples
///
/// ```
/// use imageproc::point::Point;
/// use cps_analyzer::rect::to_axis_aligned_bounding_box;
///
/// let diamond = [
///     Point { x: 50.0, y: 10.0 },
///     Point { x: 90.0, y: 50.0 },
///     Point { x: 50.0, y: 90.0 },
///     Point { x: 10.0, y: 50.0 },
/// ];
///
/// let bounds = to_axis_aligned_bounding_box(&diamond).unwrap();
///
/// assert_eq!(bounds.min_col, 10.0);
/// assert_eq!(bounds.min_row, 10.0);
/// assert_eq!(bounds.width(), 80.0);
/// assert_eq!(bounds.height(), 80.0);
/// ```
pub fn to_axis_aligned_bounding_box<T>(points: &[Point<T>]) -> Option<BoundingBox>
where
    T: Copy + PartialOrd + ToPrimitive,
{
    let (first, rest) = points.split_first()?;
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;

    // `T` only has a `PartialOrd`, which rules out `Iterator::min`/`max` for floats.
    for p in rest {
        if p.x < min_x {
            min_x = p.x;
        }
        if p.x > max_x {
            max_x = p.x;
        }
        if p.y < min_y {
            min_y = p.y;
        }
        if p.y > max_y {
            max_y = p.y;
        }
    }

    let to_f64 = |v: T| v.to_f64().unwrap_or(0.0);

    Some(BoundingBox {
        min_row: to_f64(min_y),
        min_col: to_f64(min_x),
        max_row: to_f64(max_y),
        max_col: to_f64(max_x),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_points() {
        let points: [Point<i32>; 0] = [];
        assert_eq!(to_axis_aligned_bounding_box(&points), None);
    }

    #[test]
    fn test_bounding_box_for_integer_contour() {
        let points = [
            Point { x: 20, y: 30 },
            Point { x: 120, y: 30 },
            Point { x: 120, y: 80 },
            Point { x: 20, y: 80 },
            Point { x: 70, y: 55 },
        ];
        let expected = BoundingBox {
            min_row: 30.0,
            min_col: 20.0,
            max_row: 80.0,
            max_col: 120.0,
        };
        assert_eq!(to_axis_aligned_bounding_box(&points), Some(expected));

        // The order of points doesn't matter.
        let shuffled = [points[4], points[2], points[0], points[3], points[1]];
        assert_eq!(to_axis_aligned_bounding_box(&shuffled), Some(expected));
    }

    #[test]
    fn test_bounding_box_with_subpixel_coordinates() {
        let points = [
            Point { x: 4.8, y: -0.2 },
            Point { x: 9.2, y: 3.0 },
            Point { x: 7.0, y: 6.8 },
        ];
        let bounds = to_axis_aligned_bounding_box(&points).unwrap();
        assert_eq!(bounds.min_row, -0.2);
        assert_eq!(bounds.max_row, 6.8);
        assert_eq!(bounds.min_col, 4.8);
        assert_eq!(bounds.max_col, 9.2);
    }

    #[test]
    fn test_single_point() {
        let bounds = to_axis_aligned_bounding_box(&[Point { x: 100, y: 100 }]).unwrap();
        assert_eq!(bounds.width(), 0.0);
        assert_eq!(bounds.height(), 0.0);
        assert_eq!(
            bounds.to_pixel_rect(200, 200),
            Some(Rect {
                x: 100,
                y: 100,
                width: 1,
                height: 1
            })
        );
    }

    #[test]
    fn test_pixel_rect_is_clipped() {
        let bounds = BoundingBox {
            min_row: -0.2,
            min_col: 4.8,
            max_row: 12.4,
            max_col: 30.0,
        };
        assert_eq!(
            bounds.to_pixel_rect(20, 10),
            Some(Rect {
                x: 5,
                y: 0,
                width: 15,
                height: 10
            })
        );
    }

    #[test]
    fn test_pixel_rect_outside_image() {
        let bounds = BoundingBox {
            min_row: 50.0,
            min_col: 50.0,
            max_row: 60.0,
            max_col: 60.0,
        };
        assert_eq!(bounds.to_pixel_rect(20, 20), None);
        assert_eq!(bounds.to_pixel_rect(0, 0), None);
    }
}
