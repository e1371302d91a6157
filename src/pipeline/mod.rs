//! Cloud-free compositing, after Schmitt et al. (2019), "Aggregating
//! cloud-free Sentinel-2 images with Google Earth Engine".
//!
//! Every stage is a pure function from image handle to image handle. The
//! stages only describe work; the service runs it when a result is
//! requested.

pub mod cloud_score;
pub mod cloud_stats;
pub mod composite;
pub mod quality;
pub mod shadow;

use crate::{
    components::{Filter, Geometry, Image, ImageCollection, MetadataOp},
    params::{CloudFreeParams, ShadowMode},
    sensors::{Sensor, Sentinel2},
};

pub const CLOUD_SCORE: &str = "cloudScore";
pub const CLOUD_MASK: &str = "cloudMask";
pub const SHADOW_SCORE: &str = "shadowScore";
pub const CLOUD_SHADOW_SCORE: &str = "cloudShadowScore";
pub const CLOUDY_PERCENTAGE_ROI: &str = "CLOUDY_PERCENTAGE_ROI";

impl ShadowMode {
    /// Bands each pipeline variant adds to every image, in order.
    pub fn output_bands(&self) -> &'static [&'static str] {
        match self {
            ShadowMode::Disabled => &[CLOUD_SCORE, CLOUD_MASK, CLOUD_SHADOW_SCORE],
            ShadowMode::Enabled(_) => &[CLOUD_SCORE, CLOUD_MASK, SHADOW_SCORE, CLOUD_SHADOW_SCORE],
        }
    }
}

/// Runs the per-image stages: clip, cloud score, ROI statistics, shadows
/// when enabled, quality score.
pub fn score_image(image: &Image, roi: &Geometry, params: &CloudFreeParams) -> Image {
    let clipped = image.clip(roi);
    let clouds = cloud_score::compute(&clipped, &params.cloud);
    let stats = cloud_stats::compute(&clouds, roi);
    match &params.shadow {
        ShadowMode::Disabled => quality::without_shadow(&stats),
        ShadowMode::Enabled(shadow_params) => {
            quality::with_shadow(&shadow::project(&stats, &params.cloud, shadow_params))
        }
    }
}

/// Scores every image of `collection` over `roi` and merges the result into
/// one cloud-free composite.
pub fn export_cloud_free(
    collection: &ImageCollection,
    roi: &Geometry,
    params: &CloudFreeParams,
) -> Image {
    log::info!(
        "building cloud-free composite, bands {:?}",
        params.shadow.output_bands()
    );
    let scored = collection
        .filter_bounds(roi)
        .map(|image| score_image(&image, roi, params))
        .sort(CLOUDY_PERCENTAGE_ROI, true);
    composite::merge_collection(&scored, params.mosaic_roi_cloud_thresh)
}

/// Sentinel-2 scenes over `roi` acquired in `[start, end)` whose scene-level
/// cloud cover is under `max_scene_cloud` percent.
pub fn sentinel2_collection(
    roi: &Geometry,
    start: &str,
    end: &str,
    max_scene_cloud: f64,
) -> ImageCollection {
    ImageCollection::load(Sentinel2::COLLECTION_ID)
        .filter_bounds(roi)
        .filter_date(start, end)
        .filter(&Filter::metadata(
            Sentinel2::SCENE_CLOUD_KEY,
            MetadataOp::LessThan,
            max_scene_cloud,
        ))
}
