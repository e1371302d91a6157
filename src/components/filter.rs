use std::str::FromStr;

use shrinkwraprs::Shrinkwrap;

use crate::{
    components::Geometry,
    errors::{CloudFreeError, Result},
    expr::Expr,
};

/// Comparison used by [Filter::metadata], spelled as in the service's
/// `filterMetadata` (`"less_than"`, `"not_equals"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataOp {
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    NotLessThan,
    NotGreaterThan,
}

impl FromStr for MetadataOp {
    type Err = CloudFreeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "equals" => Ok(Self::Equals),
            "not_equals" => Ok(Self::NotEquals),
            "less_than" => Ok(Self::LessThan),
            "greater_than" => Ok(Self::GreaterThan),
            "not_less_than" => Ok(Self::NotLessThan),
            "not_greater_than" => Ok(Self::NotGreaterThan),
            _ => Err(CloudFreeError::UnknownOperator(s.into())),
        }
    }
}

#[derive(Shrinkwrap, Clone, Debug, PartialEq)]
pub struct Filter(Expr);

impl Filter {
    /// Images whose footprint intersects `geometry`.
    pub fn bounds(geometry: &Geometry) -> Self {
        Self(Expr::invoke(
            "Filter.intersects",
            [
                ("leftField", ".all".into()),
                ("rightValue", (**geometry).clone()),
            ],
        ))
    }

    /// Acquisition time in `[start, end)`, dates as ISO strings.
    pub fn date(start: &str, end: &str) -> Self {
        let range = Expr::invoke("DateRange", [("start", start.into()), ("end", end.into())]);
        Self(Expr::invoke(
            "Filter.dateRangeContains",
            [("leftValue", range), ("rightField", "system:time_start".into())],
        ))
    }

    pub fn metadata(name: &str, op: MetadataOp, value: impl Into<Expr>) -> Self {
        let compare = |function: &str| {
            Expr::invoke(
                function,
                [("leftField", name.into()), ("rightValue", value.into())],
            )
        };
        let filter = match op {
            MetadataOp::Equals => compare("Filter.equals"),
            MetadataOp::NotEquals => compare("Filter.neq"),
            MetadataOp::LessThan => compare("Filter.lessThan"),
            MetadataOp::GreaterThan => compare("Filter.greaterThan"),
            MetadataOp::NotLessThan => Self::not(compare("Filter.lessThan")),
            MetadataOp::NotGreaterThan => Self::not(compare("Filter.greaterThan")),
        };
        Self(filter)
    }

    fn not(filter: Expr) -> Expr {
        Expr::invoke("Filter.not", [("filter", filter)])
    }
}
