use geo::{Area, Centroid, Coord, LineString, Polygon};
use itertools::Itertools;
use serde_json::{json, Value};
use shrinkwraprs::Shrinkwrap;

use crate::{
    components::Number,
    errors::{CloudFreeError, Result},
    expr::Expr,
};

/// Polygon region of interest, in longitude/latitude (EPSG:4326).
///
/// The polygon is kept locally next to its remote handle so display code
/// can derive the map center and a GeoJSON overlay without a round trip.
#[derive(Shrinkwrap, Clone, Debug)]
pub struct Geometry {
    #[shrinkwrap(main_field)]
    expr: Expr,
    polygon: Polygon<f64>,
}

impl Geometry {
    pub fn polygon(ring: impl IntoIterator<Item = (f64, f64)>) -> Result<Self> {
        let exterior = LineString::from(ring.into_iter().map(Coord::from).collect::<Vec<_>>());
        let distinct = exterior.coords().unique_by(|c| (c.x.to_bits(), c.y.to_bits())).count();
        if distinct < 3 {
            return Err(CloudFreeError::InvalidGeometry(format!(
                "a polygon needs at least 3 distinct vertices, got {distinct}"
            )));
        }
        // Polygon::new closes the ring.
        let polygon = Polygon::new(exterior, vec![]);
        let expr = Expr::invoke(
            "GeometryConstructors.Polygon",
            [
                ("coordinates", Expr::constant(Self::rings(&polygon))),
                ("evenOdd", true.into()),
            ],
        );
        Ok(Self { expr, polygon })
    }

    fn rings(polygon: &Polygon<f64>) -> Value {
        let exterior: Vec<[f64; 2]> = polygon.exterior().coords().map(|c| [c.x, c.y]).collect();
        json!([exterior])
    }

    pub fn as_polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Geodesic area in m², computed remotely.
    pub fn area(&self) -> Number {
        Number::from_expr(Expr::invoke(
            "Geometry.area",
            [("geometry", self.expr.clone()), ("maxError", 1.0.into())],
        ))
    }

    /// Planar centroid as `(lon, lat)`.
    pub fn centroid(&self) -> Result<(f64, f64)> {
        if self.polygon.unsigned_area() == 0.0 {
            return Err(CloudFreeError::InvalidGeometry(
                "zero-area polygon has no centroid".into(),
            ));
        }
        self.polygon
            .centroid()
            .map(|point| point.x_y())
            .ok_or_else(|| CloudFreeError::InvalidGeometry("polygon has no centroid".into()))
    }

    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "Polygon",
            "coordinates": Self::rings(&self.polygon),
        })
    }
}
