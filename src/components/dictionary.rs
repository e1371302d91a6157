use shrinkwraprs::Shrinkwrap;

use crate::{components::Number, expr::Expr};

/// Remote key/value result, e.g. of a region reduction.
#[derive(Shrinkwrap, Clone, Debug, PartialEq)]
pub struct Dictionary(Expr);

impl Dictionary {
    pub fn from_expr(expr: Expr) -> Self {
        Self(expr)
    }

    pub fn get(&self, key: &str) -> Expr {
        Expr::invoke(
            "Dictionary.get",
            [("dictionary", self.0.clone()), ("key", key.into())],
        )
    }

    pub fn get_number(&self, key: &str) -> Number {
        Number::from_expr(self.get(key))
    }
}
