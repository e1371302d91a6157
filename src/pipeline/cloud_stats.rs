use crate::components::{Geometry, Image, Reducer};

use super::{CLOUDY_PERCENTAGE_ROI, CLOUD_MASK};

/// Nominal scale of the reduction, meters.
pub const STATS_SCALE: f64 = 10.0;

/// Sets `CLOUDY_PERCENTAGE_ROI`: the share of `roi`, in percent, covered by
/// `cloudMask`.
///
/// A zero-area `roi` is not guarded against; the service decides what the
/// division yields.
pub fn compute(image: &Image, roi: &Geometry) -> Image {
    if image.has_property(CLOUDY_PERCENTAGE_ROI) {
        return image.clone();
    }
    log::debug!("building ROI cloud statistics at {STATS_SCALE} m");

    let cloud_area = image.select(&[CLOUD_MASK]).multiply(Image::pixel_area());
    let stats = cloud_area.reduce_region(&Reducer::sum(), roi, STATS_SCALE, true);
    let percentage = stats
        .get_number(CLOUD_MASK)
        .divide(roi.area())
        .multiply(100.0);
    image.set(CLOUDY_PERCENTAGE_ROI, percentage)
}
