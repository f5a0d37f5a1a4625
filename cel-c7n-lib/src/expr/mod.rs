//! Policy expressions and the evaluation entry point
//!
//! A [`PolicyExpression`] is compiled once, when a policy file is loaded, and then run
//! against each resource with [`evaluate`] or [`matches`]. Every run gets a fresh CEL
//! context holding the [`Activation`] bindings and the full set of extension functions,
//! and installs the filter in the ambient slot for exactly as long as the run lasts.

mod activation;
mod evaluator;
mod expression;

pub use activation::Activation;
pub use evaluator::{evaluate, matches};
pub use expression::PolicyExpression;
