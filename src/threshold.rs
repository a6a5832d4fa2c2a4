use imageproc::contrast::otsu_level;
use log::debug;

use crate::colors::HsvImage;
use crate::error::{CpsError, Result};

/// Splits the value channel into dark and bright classes with Otsu's method.
///
/// The channel is histogrammed over its 256 possible 8-bit levels and the level that
/// maximizes the between-class variance is returned, normalized to `[0, 1]`. Pixels at or
/// below the returned value fall in the dark class.
///
/// # Errors
///
/// Returns [`CpsError::CannotEstimate`] when the image is empty or its value channel is
/// constant, since there is then nothing to separate.
pub fn estimate_value_threshold(hsv: &HsvImage) -> Result<f64> {
    let value = hsv.value_channel();

    let mut levels = value.as_raw().iter().copied();
    let Some(first) = levels.next() else {
        return Err(CpsError::CannotEstimate("image has no pixels".into()));
    };
    let (min, max) = levels.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min == max {
        return Err(CpsError::CannotEstimate(format!(
            "value channel is constant ({:.3})",
            f64::from(min) / 255.0
        )));
    }

    let level = otsu_level(&value);
    debug!("otsu level {level} over value range {min}..={max}");

    Ok(f64::from(level) / 255.0)
}
