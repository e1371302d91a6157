use crate::components::{Filter, Image, ImageCollection, MetadataOp};

use super::{CLOUDY_PERCENTAGE_ROI, CLOUD_SHADOW_SCORE};

/// Flattens a scored collection into one composite.
///
/// Images under `roi_cloud_thresh` percent ROI cloud cover are mosaicked
/// worst to best, so the clearest is on top. Underneath, a quality mosaic
/// of the whole collection on `cloudShadowScore` fills whatever the
/// accepted images leave uncovered.
pub fn merge_collection(collection: &ImageCollection, roi_cloud_thresh: f64) -> Image {
    log::debug!("merging collection, accepting images under {roi_cloud_thresh}% ROI cloud");
    let best = collection
        .filter(&Filter::metadata(
            CLOUDY_PERCENTAGE_ROI,
            MetadataOp::LessThan,
            roi_cloud_thresh,
        ))
        .sort(CLOUDY_PERCENTAGE_ROI, false);
    let fallback = collection.quality_mosaic(CLOUD_SHADOW_SCORE);
    ImageCollection::from_images([fallback, best.mosaic()]).mosaic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Node;
    use serde_json::Value;

    #[test]
    fn accepted_mosaic_is_layered_on_top() {
        let collection = ImageCollection::load("COPERNICUS/S2");
        let composite = merge_collection(&collection, 5.0);
        assert_eq!(composite.function(), Some("ImageCollection.mosaic"));

        let layers = composite.arg("collection").unwrap().arg("images").unwrap();
        let Node::Array(layers) = layers.node() else {
            panic!("layers are not an array");
        };
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].function(), Some("ImageCollection.qualityMosaic"));
        assert_eq!(
            layers[0].arg("qualityBand").unwrap().as_constant(),
            Some(&Value::from("cloudShadowScore"))
        );
        assert_eq!(layers[1].function(), Some("ImageCollection.mosaic"));
    }

    #[test]
    fn accepted_images_are_sorted_worst_first() {
        let composite = merge_collection(&ImageCollection::load("COPERNICUS/S2"), 5.0);
        let sort = composite.invocations_of("Collection.limit");
        assert_eq!(sort.len(), 1);
        assert_eq!(sort[0].arg("ascending").unwrap().as_constant(), Some(&Value::from(false)));

        let filter = sort[0].arg("collection").unwrap().arg("filter").unwrap();
        assert_eq!(filter.function(), Some("Filter.lessThan"));
        assert_eq!(filter.arg("rightValue").unwrap().as_constant(), Some(&Value::from(5.0)));
        assert_eq!(
            filter.arg("leftField").unwrap().as_constant(),
            Some(&Value::from(CLOUDY_PERCENTAGE_ROI))
        );
    }
}
