//! Partial and total models of a circuit.
mod model;

pub use crate::model::model::*;
