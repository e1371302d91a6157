use shrinkwraprs::Shrinkwrap;

use crate::{errors::Result, expr::Expr, service::ComputeService};

/// Remote scalar.
#[derive(Shrinkwrap, Clone, Debug, PartialEq)]
pub struct Number(Expr);

impl Number {
    pub fn from_expr(expr: Expr) -> Self {
        Self(expr)
    }

    fn binary(&self, function: &str, rhs: impl Into<Number>) -> Self {
        Self(Expr::invoke(
            function,
            [("left", self.0.clone()), ("right", rhs.into().0)],
        ))
    }

    fn unary(&self, function: &str) -> Self {
        Self(Expr::invoke(function, [("input", self.0.clone())]))
    }

    pub fn add(&self, rhs: impl Into<Number>) -> Self {
        self.binary("Number.add", rhs)
    }

    pub fn multiply(&self, rhs: impl Into<Number>) -> Self {
        self.binary("Number.multiply", rhs)
    }

    pub fn divide(&self, rhs: impl Into<Number>) -> Self {
        self.binary("Number.divide", rhs)
    }

    pub fn sin(&self) -> Self {
        self.unary("Number.sin")
    }

    pub fn cos(&self) -> Self {
        self.unary("Number.cos")
    }

    pub fn tan(&self) -> Self {
        self.unary("Number.tan")
    }

    /// Degrees to radians.
    pub fn to_radians(&self) -> Self {
        self.multiply(std::f64::consts::PI).divide(180.0)
    }

    /// Blocking round trip to the service.
    pub fn get_info(&self, service: &impl ComputeService) -> Result<Option<f64>> {
        Ok(service.compute_value(&self.0.encode())?.as_f64())
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self(Expr::from(value))
    }
}

impl From<Number> for Expr {
    fn from(value: Number) -> Self {
        value.0
    }
}
