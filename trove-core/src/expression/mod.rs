mod expression;
mod join_expression;
mod ordered;

pub use expression::*;
pub use join_expression::*;
pub use ordered::*;
