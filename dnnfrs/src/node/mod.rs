//! The circuit DAG: node variants and shared references.
#[allow(clippy::module_inception)]
mod node;
mod node_ref;

pub use crate::node::node::{Node, OrBranch};
pub use crate::node::node_ref::{NodeId, NodeRef};
