use std::rc::Rc;

use shrinkwraprs::Shrinkwrap;

use crate::{
    components::{Dictionary, Geometry, Kernel, KernelType, Number, Reducer},
    errors::Result,
    expr::Expr,
    service::{ComputeService, MapId, VisParams},
};

/// Remote multi-band image.
///
/// Besides its expression, an image remembers which bands and metadata keys
/// this client has attached to it. That set is only a lower bound of what
/// the service holds, but it is exact for everything the pipeline adds.
#[derive(Shrinkwrap, Clone, Debug)]
pub struct Image {
    #[shrinkwrap(main_field)]
    expr: Expr,
    known_bands: Rc<[String]>,
    known_properties: Rc<[String]>,
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl Image {
    pub fn from_expr(expr: Expr) -> Self {
        Self {
            expr,
            known_bands: Rc::from([]),
            known_properties: Rc::from([]),
        }
    }

    fn derived(&self, expr: Expr) -> Self {
        Self {
            expr,
            known_bands: Rc::clone(&self.known_bands),
            known_properties: Rc::clone(&self.known_properties),
        }
    }

    /// Catalogue image by asset id.
    pub fn load(id: &str) -> Self {
        Self::from_expr(Expr::invoke("Image.load", [("id", id.into())]))
    }

    pub fn constant(value: impl Into<Expr>) -> Self {
        Self::from_expr(Expr::invoke("Image.constant", [("value", value.into())]))
    }

    /// Area of each pixel in m².
    pub fn pixel_area() -> Self {
        Self::from_expr(Expr::invoke("Image.pixelArea", std::iter::empty()))
    }

    pub fn known_bands(&self) -> &[String] {
        &self.known_bands
    }

    pub fn has_band(&self, name: &str) -> bool {
        self.known_bands.iter().any(|band| band == name)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.known_properties.iter().any(|property| property == key)
    }

    fn binary(&self, function: &str, rhs: impl Into<Image>) -> Self {
        Self::from_expr(Expr::invoke(
            function,
            [("image1", self.expr.clone()), ("image2", rhs.into().expr)],
        ))
    }

    pub fn add(&self, rhs: impl Into<Image>) -> Self {
        self.binary("Image.add", rhs)
    }

    pub fn multiply(&self, rhs: impl Into<Image>) -> Self {
        self.binary("Image.multiply", rhs)
    }

    pub fn divide(&self, rhs: impl Into<Image>) -> Self {
        self.binary("Image.divide", rhs)
    }

    pub fn min(&self, rhs: impl Into<Image>) -> Self {
        self.binary("Image.min", rhs)
    }

    pub fn max(&self, rhs: impl Into<Image>) -> Self {
        self.binary("Image.max", rhs)
    }

    pub fn gt(&self, rhs: impl Into<Image>) -> Self {
        self.binary("Image.gt", rhs)
    }

    pub fn lt(&self, rhs: impl Into<Image>) -> Self {
        self.binary("Image.lt", rhs)
    }

    pub fn and(&self, rhs: impl Into<Image>) -> Self {
        self.binary("Image.and", rhs)
    }

    pub fn not(&self) -> Self {
        Self::from_expr(Expr::invoke("Image.not", [("value", self.expr.clone())]))
    }

    /// Selects bands by name or regular expression.
    pub fn select<S: AsRef<str>>(&self, selectors: &[S]) -> Self {
        Self::from_expr(Expr::invoke(
            "Image.select",
            [
                ("input", self.expr.clone()),
                ("bandSelectors", Expr::strings(selectors)),
            ],
        ))
    }

    pub fn rename<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let mut renamed = Self::from_expr(Expr::invoke(
            "Image.rename",
            [("input", self.expr.clone()), ("names", Expr::strings(names))],
        ));
        renamed.known_bands = names.iter().map(|name| name.as_ref().to_string()).collect();
        renamed
    }

    /// Appends the bands of `other`.
    pub fn add_bands(&self, other: &Image) -> Self {
        let mut combined = self.derived(Expr::invoke(
            "Image.addBands",
            [("dstImg", self.expr.clone()), ("srcImg", other.expr.clone())],
        ));
        combined.known_bands = self
            .known_bands
            .iter()
            .chain(other.known_bands.iter())
            .cloned()
            .collect();
        combined
    }

    /// Maps `[low, high]` linearly onto `[0, 1]`, without clamping.
    pub fn unit_scale(&self, low: f64, high: f64) -> Self {
        Self::from_expr(Expr::invoke(
            "Image.unitScale",
            [
                ("input", self.expr.clone()),
                ("low", low.into()),
                ("high", high.into()),
            ],
        ))
    }

    /// Band math expression in which this image is bound to `img`.
    pub fn expression(&self, expression: &str) -> Self {
        Self::from_expr(Expr::invoke(
            "Image.expression",
            [
                ("expression", expression.into()),
                ("map", Expr::dictionary([("img", self.expr.clone())])),
            ],
        ))
    }

    /// `(first - second) / (first + second)`.
    pub fn normalized_difference(&self, first: &str, second: &str) -> Self {
        Self::from_expr(Expr::invoke(
            "Image.normalizedDifference",
            [
                ("input", self.expr.clone()),
                ("bandNames", Expr::strings(&[first, second])),
            ],
        ))
    }

    fn focal(&self, function: &str, radius: f64, kernel_type: KernelType, iterations: u32) -> Self {
        Self::from_expr(Expr::invoke(
            function,
            [
                ("image", self.expr.clone()),
                ("radius", radius.into()),
                ("kernelType", kernel_type.as_str().into()),
                ("units", "pixels".into()),
                ("iterations", i64::from(iterations).into()),
            ],
        ))
    }

    pub fn focal_min(&self, radius: f64, kernel_type: KernelType, iterations: u32) -> Self {
        self.focal("Image.focalMin", radius, kernel_type, iterations)
    }

    pub fn focal_max(&self, radius: f64, kernel_type: KernelType, iterations: u32) -> Self {
        self.focal("Image.focalMax", radius, kernel_type, iterations)
    }

    pub fn reduce_neighborhood(&self, reducer: &Reducer, kernel: &Kernel) -> Self {
        Self::from_expr(Expr::invoke(
            "Image.reduceNeighborhood",
            [
                ("image", self.expr.clone()),
                ("reducer", (**reducer).clone()),
                ("kernel", (**kernel).clone()),
            ],
        ))
    }

    /// Reduces all bands of each pixel to one value.
    pub fn reduce(&self, reducer: &Reducer) -> Self {
        Self::from_expr(Expr::invoke(
            "Image.reduce",
            [("image", self.expr.clone()), ("reducer", (**reducer).clone())],
        ))
    }

    pub fn reduce_region(
        &self,
        reducer: &Reducer,
        geometry: &Geometry,
        scale: f64,
        best_effort: bool,
    ) -> Dictionary {
        Dictionary::from_expr(Expr::invoke(
            "Image.reduceRegion",
            [
                ("image", self.expr.clone()),
                ("reducer", (**reducer).clone()),
                ("geometry", (**geometry).clone()),
                ("scale", scale.into()),
                ("bestEffort", best_effort.into()),
            ],
        ))
    }

    /// Shifts pixels by a two-band `(dx, dy)` image, in meters.
    pub fn displace(&self, displacement: &Image) -> Self {
        Self::from_expr(Expr::invoke(
            "Image.displace",
            [
                ("image", self.expr.clone()),
                ("displacement", displacement.expr.clone()),
            ],
        ))
    }

    pub fn clip(&self, geometry: &Geometry) -> Self {
        self.derived(Expr::invoke(
            "Image.clip",
            [("input", self.expr.clone()), ("geometry", (**geometry).clone())],
        ))
    }

    pub fn update_mask(&self, mask: &Image) -> Self {
        self.derived(Expr::invoke(
            "Image.updateMask",
            [("image", self.expr.clone()), ("mask", mask.expr.clone())],
        ))
    }

    pub fn get(&self, property: &str) -> Number {
        Number::from_expr(Expr::invoke(
            "Element.get",
            [("object", self.expr.clone()), ("property", property.into())],
        ))
    }

    /// Attaches a metadata value. A key already set through this client is
    /// left as it is.
    pub fn set(&self, key: &str, value: impl Into<Expr>) -> Self {
        if self.has_property(key) {
            log::debug!("property {key} already set, keeping the existing value");
            return self.clone();
        }
        let mut updated = self.derived(Expr::invoke(
            "Element.set",
            [
                ("object", self.expr.clone()),
                ("key", key.into()),
                ("value", value.into()),
            ],
        ));
        updated.known_properties = self
            .known_properties
            .iter()
            .cloned()
            .chain(std::iter::once(key.to_string()))
            .collect();
        updated
    }

    pub fn get_info(&self, service: &impl ComputeService) -> Result<serde_json::Value> {
        service.compute_value(&self.expr.encode())
    }

    pub fn get_map_id(&self, service: &impl ComputeService, vis: &VisParams) -> Result<MapId> {
        service.get_map_id(&self.expr.encode(), vis)
    }
}

impl From<f64> for Image {
    fn from(value: f64) -> Self {
        Image::constant(value)
    }
}

impl From<&Image> for Image {
    fn from(value: &Image) -> Self {
        value.clone()
    }
}

impl From<Image> for Expr {
    fn from(value: Image) -> Self {
        value.expr
    }
}
