use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;

use crate::expr::Expr;

/// Aggregation descriptor.
#[derive(Shrinkwrap, Clone, Debug, PartialEq)]
pub struct Reducer(Expr);

impl Reducer {
    fn named(function: &str) -> Self {
        Self(Expr::invoke(function, std::iter::empty()))
    }

    pub fn sum() -> Self {
        Self::named("Reducer.sum")
    }

    pub fn mean() -> Self {
        Self::named("Reducer.mean")
    }

    pub fn max() -> Self {
        Self::named("Reducer.max")
    }

    pub fn min() -> Self {
        Self::named("Reducer.min")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelType {
    Circle,
    Square,
}

impl KernelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KernelType::Circle => "circle",
            KernelType::Square => "square",
        }
    }
}

/// Neighborhood descriptor, radius in pixels.
#[derive(Shrinkwrap, Clone, Debug, PartialEq)]
pub struct Kernel(Expr);

impl Kernel {
    pub fn new(kernel_type: KernelType, radius: f64) -> Self {
        let function = match kernel_type {
            KernelType::Circle => "Kernel.circle",
            KernelType::Square => "Kernel.square",
        };
        Self(Expr::invoke(
            function,
            [
                ("radius", radius.into()),
                ("units", "pixels".into()),
                ("normalize", true.into()),
            ],
        ))
    }

    pub fn square(radius: f64) -> Self {
        Self::new(KernelType::Square, radius)
    }

    pub fn circle(radius: f64) -> Self {
        Self::new(KernelType::Circle, radius)
    }
}
