use shrinkwraprs::Shrinkwrap;

use crate::{
    components::{Filter, Geometry, Image, MetadataOp},
    errors::Result,
    expr::Expr,
    service::ComputeService,
};

/// Remote, ordered sequence of images.
#[derive(Shrinkwrap, Clone, Debug, PartialEq)]
pub struct ImageCollection(Expr);

impl ImageCollection {
    pub fn from_expr(expr: Expr) -> Self {
        Self(expr)
    }

    /// Catalogue collection, e.g. `COPERNICUS/S2`.
    pub fn load(id: &str) -> Self {
        Self(Expr::invoke("ImageCollection.load", [("id", id.into())]))
    }

    pub fn from_images(images: impl IntoIterator<Item = Image>) -> Self {
        Self(Expr::invoke(
            "ImageCollection.fromImages",
            [("images", Expr::array(images.into_iter().map(Expr::from)))],
        ))
    }

    pub fn filter(&self, filter: &Filter) -> Self {
        Self(Expr::invoke(
            "Collection.filter",
            [("collection", self.0.clone()), ("filter", (**filter).clone())],
        ))
    }

    pub fn filter_bounds(&self, geometry: &Geometry) -> Self {
        self.filter(&Filter::bounds(geometry))
    }

    pub fn filter_date(&self, start: &str, end: &str) -> Self {
        self.filter(&Filter::date(start, end))
    }

    /// Filter on a metadata property with an operator spelled as the
    /// service spells it, e.g. `"less_than"`.
    pub fn filter_metadata(&self, name: &str, op: &str, value: impl Into<Expr>) -> Result<Self> {
        let op: MetadataOp = op.parse()?;
        Ok(self.filter(&Filter::metadata(name, op, value)))
    }

    /// Applies `algorithm` to every image on the service.
    ///
    /// The closure runs once, locally, to describe the per-image graph.
    pub fn map(&self, algorithm: impl FnOnce(Image) -> Image) -> Self {
        let base_algorithm = Expr::lambda(|image| algorithm(Image::from_expr(image)).into());
        Self(Expr::invoke(
            "Collection.map",
            [
                ("collection", self.0.clone()),
                ("baseAlgorithm", base_algorithm),
            ],
        ))
    }

    pub fn sort(&self, property: &str, ascending: bool) -> Self {
        Self(Expr::invoke(
            "Collection.limit",
            [
                ("collection", self.0.clone()),
                ("key", property.into()),
                ("ascending", ascending.into()),
            ],
        ))
    }

    /// Flattens the collection; later images are drawn on top.
    pub fn mosaic(&self) -> Image {
        Image::from_expr(Expr::invoke(
            "ImageCollection.mosaic",
            [("collection", self.0.clone())],
        ))
    }

    /// Per pixel, the image with the highest `quality_band`.
    pub fn quality_mosaic(&self, quality_band: &str) -> Image {
        Image::from_expr(Expr::invoke(
            "ImageCollection.qualityMosaic",
            [
                ("collection", self.0.clone()),
                ("qualityBand", quality_band.into()),
            ],
        ))
    }

    /// Per-pixel mean over the collection.
    pub fn mean(&self) -> Image {
        Image::from_expr(Expr::invoke("reduce.mean", [("collection", self.0.clone())]))
    }

    pub fn get_info(&self, service: &impl ComputeService) -> Result<serde_json::Value> {
        service.compute_value(&self.0.encode())
    }
}
