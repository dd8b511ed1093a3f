//! # Query engine for d-DNNF circuits.
//!
//! Load, query, and transform Boolean circuits in
//! [deterministic Decomposable Negation Normal Form (d-DNNF)](https://jair.org/index.php/jair/article/view/10311):
//! the target language of knowledge compilers such as `c2d` and `d4`.
//! Once a formula has been compiled, the following queries run without
//! ever calling a SAT solver again:
//!
//! * weighted model counting under partial assignments, with exact
//!   rational arithmetic,
//! * extraction of one model consistent with a partial assignment,
//! * in-place conditioning of the circuit by a partial assignment,
//! * minimization of a linear objective function over the models of the
//!   circuit, and pruning of all models exceeding a weight bound.
//!
//! The following snippet parses a circuit equivalent to `1 ∨ ¬1`,
//! counts its models, and extracts one of them:
//!
//! ```rust
//! use dnnfrs::graph::parse_nnf;
//! use dnnfrs::model::Model;
//! use std::io::BufReader;
//!
//! let nnf = "nnf 5 4 1
//! L 1
//! A 1 0
//! L -1
//! A 1 2
//! O 1 2 1 3";
//! let graph = parse_nnf(&mut BufReader::new(nnf.as_bytes())).unwrap();
//!
//! let count = graph.model_count(&Model::new(graph.nb_vars()));
//! assert_eq!(count.to_string(), "2");
//!
//! let model = graph.valid_model(&Model::new(graph.nb_vars())).unwrap();
//! assert_eq!(graph.model_count(&model).to_string(), "1");
//! ```
//!
//! Main types:
//!
//! * [`crate::graph::Graph`] -- a parsed circuit together with its weight
//!   vector; entry point for every query
//! * [`crate::model::Model`] -- a partial assignment of variables to
//!   [`crate::model::Binding`]s
//! * [`crate::graph::WeightVector`] -- per-literal rational weights
//! * [`crate::graph::LinearObjective`] -- per-literal integer weights and
//!   the minimization queries
//!
//! Circuits are read with [`crate::graph::parse_nnf`] and written back
//! with [`crate::graph::Graph::write_nnf`]; the two are round-trip
//! compatible.

/// Variables, polarities, and literals.
pub mod literal;
pub mod model;
pub mod node;
#[macro_use]
pub(crate) mod util;
pub mod graph;
pub(crate) mod nnf_writer;
