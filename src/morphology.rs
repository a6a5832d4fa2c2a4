use imageproc::morphology::{Mask as StructuringElement, grayscale_open};
use log::debug;

use crate::segment::Mask;

/// Radius of the disk used to open both stain masks.
pub const DEFAULT_OPENING_RADIUS: u8 = 3;

/// Morphological opening of a binary mask with a disk of the given radius.
///
/// A pixel survives the erosion only if the whole disk centered on it lies in the
/// foreground; the survivors are then dilated by the same disk. Foreground blobs narrower
/// than the disk disappear and boundaries are smoothed.
///
/// A radius of `0` returns the mask unchanged.
pub fn open_mask(mask: &Mask, radius: u8) -> Mask {
    if radius == 0 {
        return mask.clone();
    }

    let disk = StructuringElement::disk(radius);
    let opened = Mask::from_gray(grayscale_open(mask.as_gray(), &disk));

    debug!(
        "opening with radius {radius}: {} -> {} foreground pixels",
        mask.count(),
        opened.count()
    );

    opened
}
