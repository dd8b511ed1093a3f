//! The circuit façade and its query engines.
mod condition;
mod count;
#[allow(clippy::module_inception)]
mod graph;
mod nnf;
mod objective;
mod search;
mod weights;

pub use crate::graph::graph::Graph;
pub use crate::graph::nnf::{parse_nnf, parse_weights};
pub use crate::graph::objective::LinearObjective;
pub use crate::graph::weights::{update_weights, WeightVector};
