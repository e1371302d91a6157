use std::fmt::Debug;

pub mod sentinel2;
pub use sentinel2::Sentinel2;

use crate::components::Image;

pub trait Sensor: Debug {
    /// Catalogue id of the image collection.
    const COLLECTION_ID: &'static str;
    /// Band selector keeping reflectance and quality bands.
    const BAND_PATTERN: &'static str;
    /// Digital numbers per unit of reflectance.
    const REFLECTANCE_SCALE: f64;
    const SOLAR_AZIMUTH_KEY: &'static str;
    const SOLAR_ZENITH_KEY: &'static str;

    /// Top-of-atmosphere reflectance of the sensor bands.
    fn toa(image: &Image) -> Image {
        image
            .select(&[Self::BAND_PATTERN])
            .divide(Self::REFLECTANCE_SCALE)
    }
}
