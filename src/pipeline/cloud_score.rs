use crate::{
    components::{Image, Kernel, KernelType, Reducer},
    params::CloudScoreParams,
    sensors::{
        sentinel2::{B11, B3, B8},
        Sensor, Sentinel2,
    },
};

use super::{CLOUD_MASK, CLOUD_SCORE};

/// What a cloud heuristic is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Top-of-atmosphere reflectance bands.
    Toa,
    /// Normalized difference of B8 and B11.
    Moisture,
    /// Normalized difference of B3 and B11.
    Snow,
}

/// A band expression rescaled so that `[low, high]` becomes `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heuristic {
    pub source: Source,
    pub expression: &'static str,
    pub low: f64,
    pub high: f64,
}

/// The score is the minimum of all of these.
pub const HEURISTICS: [Heuristic; 6] = [
    // Bright in the blue and cirrus bands.
    Heuristic { source: Source::Toa, expression: "img.B2", low: 0.1, high: 0.5 },
    Heuristic { source: Source::Toa, expression: "img.B1", low: 0.1, high: 0.3 },
    Heuristic { source: Source::Toa, expression: "img.B1 + img.B10", low: 0.15, high: 0.2 },
    // Bright in all visible bands.
    Heuristic { source: Source::Toa, expression: "img.B4 + img.B3 + img.B2", low: 0.2, high: 0.8 },
    // Moist.
    Heuristic { source: Source::Moisture, expression: "img", low: -0.1, high: 0.1 },
    // Not snow.
    Heuristic { source: Source::Snow, expression: "img", low: -0.8, high: 0.6 },
];

/// Lower bound of the raw score.
pub const SCORE_FLOOR: f64 = 0.001;
/// Radius of the square smoothing kernel.
pub const SMOOTHING_RADIUS: f64 = 5.0;
const MORPHOLOGY_ITERATIONS: u32 = 3;

fn rescale(image: &Image, heuristic: &Heuristic) -> Image {
    image
        .expression(heuristic.expression)
        .unit_scale(heuristic.low, heuristic.high)
}

/// Morphological opening: erosion drops isolated high pixels, dilation then
/// fills holes and restores cloud edges.
pub fn dilated_erosion(score: &Image, erosion: f64, dilation: f64) -> Image {
    score
        .focal_min(erosion, KernelType::Circle, MORPHOLOGY_ITERATIONS)
        .focal_max(dilation, KernelType::Circle, MORPHOLOGY_ITERATIONS)
}

/// Adds `cloudScore` and `cloudMask` to a Sentinel-2 image.
pub fn compute(image: &Image, params: &CloudScoreParams) -> Image {
    if image.has_band(CLOUD_SCORE) {
        return image.clone();
    }
    log::debug!("building cloud score, mask threshold {}", params.cloud_thresh);

    let toa = Sentinel2::toa(image);
    let moisture = image.normalized_difference(B8, B11);
    let snow = image.normalized_difference(B3, B11);

    let score = HEURISTICS
        .iter()
        .fold(Image::constant(1.0), |score, heuristic| {
            let source = match heuristic.source {
                Source::Toa => &toa,
                Source::Moisture => &moisture,
                Source::Snow => &snow,
            };
            score.min(rescale(source, heuristic))
        })
        .max(SCORE_FLOOR);

    // Both radii are the dilation radius at this call site.
    let opened = dilated_erosion(&score, params.dilation, params.dilation).min(1.0);
    let smoothed = opened.reduce_neighborhood(&Reducer::mean(), &Kernel::square(SMOOTHING_RADIUS));

    let image = image.add_bands(&smoothed.rename(&[CLOUD_SCORE]));
    let cloud_mask = image
        .select(&[CLOUD_SCORE])
        .gt(params.cloud_thresh)
        .rename(&[CLOUD_MASK]);
    image.add_bands(&cloud_mask)
}
