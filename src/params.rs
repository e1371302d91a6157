use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Cloud scoring parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudScoreParams {
    /// Erosion kernel radius, pixels.
    pub erosion: f64,
    /// Dilation kernel radius, pixels.
    pub dilation: f64,
    /// Score above which a pixel is masked as cloud. Lower masks more;
    /// 0.1-0.3 works in most scenes.
    pub cloud_thresh: f64,
}

impl Default for CloudScoreParams {
    fn default() -> Self {
        Self {
            erosion: 1.5,
            dilation: 3.0,
            cloud_thresh: 0.2,
        }
    }
}

/// Shadow projection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowParams {
    /// NDVI below which a pixel is treated as water.
    pub ndvi_thresh: f64,
    /// Reflectance sum of B8, B11 and B12 below which a pixel is dark.
    /// Lower values mask out less.
    pub ir_sum_thresh: f64,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            ndvi_thresh: -0.1,
            ir_sum_thresh: 0.3,
        }
    }
}

/// Selects the pipeline variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ShadowMode {
    Disabled,
    Enabled(ShadowParams),
}

impl Default for ShadowMode {
    fn default() -> Self {
        ShadowMode::Enabled(ShadowParams::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudFreeParams {
    pub cloud: CloudScoreParams,
    pub shadow: ShadowMode,
    /// Images with a larger cloudy share of the ROI, in percent, only fill
    /// gaps through the quality mosaic.
    pub mosaic_roi_cloud_thresh: f64,
}

impl Default for CloudFreeParams {
    fn default() -> Self {
        Self {
            cloud: CloudScoreParams::default(),
            shadow: ShadowMode::default(),
            mosaic_roi_cloud_thresh: 5.0,
        }
    }
}

impl CloudFreeParams {
    pub fn without_shadow(mut self) -> Self {
        self.shadow = ShadowMode::Disabled;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
