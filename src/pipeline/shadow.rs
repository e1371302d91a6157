use crate::{
    components::{Image, ImageCollection, Kernel, Reducer},
    params::{CloudScoreParams, ShadowParams},
    sensors::{
        sentinel2::{B11, B12, B4, B8},
        Sensor, Sentinel2,
    },
};

use super::{cloud_score::dilated_erosion, CLOUD_MASK, CLOUD_SCORE, SHADOW_SCORE};

/// Candidate cloud heights in meters: 200, 450, ..., 9950.
pub fn cloud_heights() -> impl Iterator<Item = f64> {
    (200u32..=10_000).step_by(250).map(f64::from)
}

/// Adds `shadowScore`, a per-pixel likelihood of cloud shadow.
///
/// The cloud base height is unknown, so the cloud score is cast along the
/// solar direction from every height in [cloud_heights] and the casts are
/// averaged. The result only counts on dark, dry, cloud-free pixels.
pub fn project(image: &Image, cloud: &CloudScoreParams, params: &ShadowParams) -> Image {
    if image.has_band(SHADOW_SCORE) {
        return image.clone();
    }
    log::debug!(
        "building shadow projection, ndvi < {} is water, ir sum < {} is dark",
        params.ndvi_thresh,
        params.ir_sum_thresh
    );

    let cloud_mask = image.select(&[CLOUD_MASK]);
    let dark = image
        .select(&[B8, B11, B12])
        .divide(Sentinel2::REFLECTANCE_SCALE)
        .reduce(&Reducer::sum())
        .lt(params.ir_sum_thresh);
    let water = image.normalized_difference(B8, B4).lt(params.ndvi_thresh);
    let candidates = dark.and(water.not()).and(cloud_mask.not());

    let azimuth = image.get(Sentinel2::SOLAR_AZIMUTH_KEY).add(180.0).to_radians();
    let zenith = image.get(Sentinel2::SOLAR_ZENITH_KEY).to_radians();
    let (tan_zenith, sin_azimuth, cos_azimuth) = (zenith.tan(), azimuth.sin(), azimuth.cos());

    let cloud_score = image.select(&[CLOUD_SCORE]);
    let casts = cloud_heights().map(|height| {
        let distance = tan_zenith.multiply(height);
        let x = sin_azimuth.multiply(distance.clone()).multiply(-1.0);
        let y = cos_azimuth.multiply(distance).multiply(-1.0);
        cloud_score.displace(&Image::constant(x).add_bands(&Image::constant(y)))
    });
    let projected = ImageCollection::from_images(casts).mean();

    let shadow = dilated_erosion(&projected.multiply(&candidates), cloud.erosion, cloud.dilation)
        .reduce_neighborhood(&Reducer::max(), &Kernel::square(1.0));
    image.add_bands(&shadow.rename(&[SHADOW_SCORE]))
}
