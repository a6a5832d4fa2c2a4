use std::collections::{BTreeMap, HashMap, VecDeque};

use imageproc::{
    contours::{BorderType, find_contours},
    point::Point,
};
use serde::{Deserialize, Serialize};

use crate::config::AreaRange;
use crate::rect::{BoundingBox, to_axis_aligned_bounding_box};
use crate::segment::Mask;

/// Level at which the {0, 1} mask field is cut by [`ContourTracer::MarchingSquares`].
pub const CONTOUR_LEVEL: f64 = 0.8;

/// One traced boundary of a connected foreground region.
///
/// Points use `x` for the column and `y` for the row. Closed isocontours repeat their first
/// point at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    points: Vec<Point<f64>>,
}

impl Region {
    /// Wraps an ordered boundary polyline.
    pub fn new(points: Vec<Point<f64>>) -> Self {
        Self { points }
    }

    /// The boundary points in tracing order.
    pub fn points(&self) -> &[Point<f64>] {
        &self.points
    }

    /// Number of boundary points, the size proxy used by [`filter_by_point_count`].
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` for a region without points; [`extract_regions`] never returns one.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the polyline ends on its first point.
    pub fn is_closed(&self) -> bool {
        self.points.len() > 1 && self.points.first() == self.points.last()
    }

    /// Axis-aligned bounds of the boundary points, `None` for an empty region.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        to_axis_aligned_bounding_box(&self.points)
    }
}

/// Algorithm used to turn a mask into [`Region`]s.
///
/// The two tracers sample boundaries at different densities, so area bounds tuned for one
/// do not carry over to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourTracer {
    /// Sub-pixel isocontours at [`CONTOUR_LEVEL`] of the zero-padded mask.
    ///
    /// Foreground is 4-connected. Every boundary is reported, holes included, as a closed
    /// polyline with one point per crossed cell edge.
    #[default]
    MarchingSquares,
    /// Outer borders found by `imageproc::contours::find_contours` (Suzuki-Abe).
    ///
    /// Foreground is 8-connected and every boundary pixel is one point.
    BorderFollowing,
}

/// Extracts the boundaries of the foreground regions of `mask`.
///
/// The output order is deterministic for a given mask. Regions without points are dropped.
pub fn extract_regions(mask: &Mask, tracer: ContourTracer) -> Vec<Region> {
    if mask.width() == 0 || mask.height() == 0 {
        return Vec::new();
    }

    let regions = match tracer {
        ContourTracer::MarchingSquares => trace_isocontours(mask),
        ContourTracer::BorderFollowing => trace_outer_borders(mask),
    };

    regions.into_iter().filter(|r| !r.is_empty()).collect()
}

/// Keeps the regions whose point count lies within `range`, inclusive on both ends.
///
/// This function takes ownership of the input vector and moves accepted regions into the
/// result without cloning. The number of accepted objects is the length of the result.
pub fn filter_by_point_count(regions: Vec<Region>, range: &AreaRange) -> Vec<Region> {
    regions
        .into_iter()
        .filter(|region| range.contains(region.len()))
        .collect()
}

fn trace_outer_borders(mask: &Mask) -> Vec<Region> {
    find_contours::<i32>(mask.as_gray())
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer)
        .map(|contour| {
            let points = contour
                .points
                .into_iter()
                .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
                .collect();
            Region::new(points)
        })
        .collect()
}

/// A crossing point, identified by the grid edge it lies on.
///
/// On a binary field every crossed edge carries exactly one point, so edges make exact
/// hash keys where floating-point coordinates would not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Edge {
    /// Between pixel `(row, col)` and `(row, col + 1)`.
    Across { row: i64, col: i64 },
    /// Between pixel `(row, col)` and `(row + 1, col)`.
    Down { row: i64, col: i64 },
}

/// The mask seen as a {0, 1} field surrounded by a one-pixel ring of zeros.
struct PaddedField<'a> {
    mask: &'a Mask,
    rows: i64,
    cols: i64,
}

impl<'a> PaddedField<'a> {
    fn new(mask: &'a Mask) -> Self {
        Self {
            mask,
            rows: i64::from(mask.height()),
            cols: i64::from(mask.width()),
        }
    }

    fn at(&self, row: i64, col: i64) -> f64 {
        let inside = (0..self.rows).contains(&row) && (0..self.cols).contains(&col);
        // In bounds, so the casts are lossless.
        if inside && self.mask.get(col as u32, row as u32) {
            1.0
        } else {
            0.0
        }
    }

    /// Linear interpolation of the level crossing between two samples.
    fn fraction(from: f64, to: f64) -> f64 {
        if from == to {
            return 0.0;
        }
        (CONTOUR_LEVEL - from) / (to - from)
    }

    fn locate(&self, edge: Edge) -> Point<f64> {
        match edge {
            Edge::Across { row, col } => {
                let t = Self::fraction(self.at(row, col), self.at(row, col + 1));
                Point::new(col as f64 + t, row as f64)
            }
            Edge::Down { row, col } => {
                let t = Self::fraction(self.at(row, col), self.at(row + 1, col));
                Point::new(col as f64, row as f64 + t)
            }
        }
    }
}

/// Joins directed segments into polylines as they are produced.
///
/// Chains are keyed by creation order so that merged chains keep the identity of the
/// older one and the final output follows the scan order.
#[derive(Default)]
struct ChainAssembler {
    next_id: usize,
    chains: BTreeMap<usize, VecDeque<Edge>>,
    starts: HashMap<Edge, usize>,
    ends: HashMap<Edge, usize>,
}

impl ChainAssembler {
    fn push(&mut self, from: Edge, to: Edge) {
        let tail = self.starts.remove(&to);
        let head = self.ends.remove(&from);

        match (head, tail) {
            (Some(h), Some(t)) if h == t => {
                // The segment closes the loop.
                self.chains.entry(h).or_default().push_back(to);
            }
            (Some(h), Some(t)) if t > h => {
                let tail_chain = self.chains.remove(&t).unwrap_or_default();
                let head_chain = self.chains.entry(h).or_default();
                head_chain.extend(tail_chain);
                if let Some(&last) = head_chain.back() {
                    self.ends.insert(last, h);
                }
            }
            (Some(h), Some(t)) => {
                let head_chain = self.chains.remove(&h).unwrap_or_default();
                let tail_chain = self.chains.entry(t).or_default();
                for edge in head_chain.into_iter().rev() {
                    tail_chain.push_front(edge);
                }
                if let Some(&first) = tail_chain.front() {
                    self.starts.insert(first, t);
                }
            }
            (None, Some(t)) => {
                self.chains.entry(t).or_default().push_front(from);
                self.starts.insert(from, t);
            }
            (Some(h), None) => {
                self.chains.entry(h).or_default().push_back(to);
                self.ends.insert(to, h);
            }
            (None, None) => {
                let id = self.next_id;
                self.next_id += 1;
                self.chains.insert(id, VecDeque::from([from, to]));
                self.starts.insert(from, id);
                self.ends.insert(to, id);
            }
        }
    }

    fn into_chains(self) -> impl Iterator<Item = VecDeque<Edge>> {
        self.chains.into_values()
    }
}

/// Marching squares over the padded mask.
///
/// Cells are visited row by row. Saddle cells keep the background diagonal connected, which
/// separates foreground pixels that only touch at a corner.
fn trace_isocontours(mask: &Mask) -> Vec<Region> {
    let field = PaddedField::new(mask);
    let mut assembler = ChainAssembler::default();

    for r in -1..field.rows {
        for c in -1..field.cols {
            let ul = field.at(r, c) > CONTOUR_LEVEL;
            let ur = field.at(r, c + 1) > CONTOUR_LEVEL;
            let ll = field.at(r + 1, c) > CONTOUR_LEVEL;
            let lr = field.at(r + 1, c + 1) > CONTOUR_LEVEL;
            let case = u8::from(ul) | u8::from(ur) << 1 | u8::from(ll) << 2 | u8::from(lr) << 3;

            let top = Edge::Across { row: r, col: c };
            let bottom = Edge::Across { row: r + 1, col: c };
            let left = Edge::Down { row: r, col: c };
            let right = Edge::Down { row: r, col: c + 1 };

            match case {
                1 => assembler.push(top, left),
                2 => assembler.push(right, top),
                3 => assembler.push(right, left),
                4 => assembler.push(left, bottom),
                5 => assembler.push(top, bottom),
                6 => {
                    assembler.push(right, top);
                    assembler.push(left, bottom);
                }
                7 => assembler.push(right, bottom),
                8 => assembler.push(bottom, right),
                9 => {
                    assembler.push(top, left);
                    assembler.push(bottom, right);
                }
                10 => assembler.push(bottom, top),
                11 => assembler.push(bottom, left),
                12 => assembler.push(left, right),
                13 => assembler.push(top, right),
                14 => assembler.push(left, top),
                // 0 and 15: the cell is entirely on one side of the level.
                _ => {}
            }
        }
    }

    assembler
        .into_chains()
        .map(|chain| Region::new(chain.into_iter().map(|edge| field.locate(edge)).collect()))
        .collect()
}
