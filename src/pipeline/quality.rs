use crate::components::{Image, Kernel, Reducer};

use super::{cloud_score::SMOOTHING_RADIUS, CLOUD_SCORE, CLOUD_SHADOW_SCORE, SHADOW_SCORE};

/// Adds `cloudShadowScore` from `cloudScore` and `shadowScore`.
pub fn with_shadow(image: &Image) -> Image {
    if image.has_band(CLOUD_SHADOW_SCORE) {
        return image.clone();
    }
    let score = image
        .select(&[CLOUD_SCORE])
        .max(image.select(&[SHADOW_SCORE]));
    add_quality_band(image, &score)
}

/// Adds `cloudShadowScore` from `cloudScore` alone.
pub fn without_shadow(image: &Image) -> Image {
    if image.has_band(CLOUD_SHADOW_SCORE) {
        return image.clone();
    }
    add_quality_band(image, &image.select(&[CLOUD_SCORE]))
}

/// Smooths and negates, so a max-reduction prefers clear pixels.
fn add_quality_band(image: &Image, score: &Image) -> Image {
    let quality = score
        .reduce_neighborhood(&Reducer::mean(), &Kernel::square(SMOOTHING_RADIUS))
        .multiply(-1.0);
    image.add_bands(&quality.rename(&[CLOUD_SHADOW_SCORE]))
}
