use super::Sensor;

/// Sentinel-2 MSI level-1C.
#[derive(Debug)]
pub struct Sentinel2;

impl Sensor for Sentinel2 {
    const COLLECTION_ID: &'static str = "COPERNICUS/S2";
    const BAND_PATTERN: &'static str = "^(B|QA60).*";
    const REFLECTANCE_SCALE: f64 = 10000.0;
    const SOLAR_AZIMUTH_KEY: &'static str = "MEAN_SOLAR_AZIMUTH_ANGLE";
    const SOLAR_ZENITH_KEY: &'static str = "MEAN_SOLAR_ZENITH_ANGLE";
}

impl Sentinel2 {
    /// Scene-level cloud cover from the product metadata, in percent.
    pub const SCENE_CLOUD_KEY: &'static str = "CLOUDY_PIXEL_PERCENTAGE";
}

pub const B1: &str = "B1";
pub const B2: &str = "B2";
pub const B3: &str = "B3";
pub const B4: &str = "B4";
pub const B8: &str = "B8";
pub const B10: &str = "B10";
pub const B11: &str = "B11";
pub const B12: &str = "B12";
