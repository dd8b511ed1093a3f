use crate::graph::weights::{update_weights, WeightVector};
use crate::graph::{condition, count, search};
use crate::literal::{Literal, Polarity, Variable};
use crate::model::{Binding, Model};
use crate::node::NodeRef;
use crate::nnf_writer::write_nnf;
use anyhow::Result;
use num_rational::BigRational;
use num_traits::Zero;
use std::collections::{HashMap, HashSet};

/// A d-DNNF circuit together with its counting-weight vector.
///
/// The circuit is trusted to be decomposable and deterministic; nothing
/// here validates it. Queries are read-only except for
/// [`Graph::condition_to`] and [`Graph::set_weights`], which require the
/// usual single-owner discipline `&mut self` enforces.
#[derive(Debug)]
pub struct Graph {
    nb_vars: u32,
    root: NodeRef,
    weights: WeightVector,
}

impl Graph {
    /// Wrap a circuit rooted at `root`, with uniform weights.
    #[must_use]
    pub fn new(nb_vars: u32, root: NodeRef) -> Graph {
        Graph {
            nb_vars,
            root,
            weights: WeightVector::new(nb_vars),
        }
    }

    #[must_use]
    pub fn nb_vars(&self) -> u32 {
        self.nb_vars
    }

    #[must_use]
    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// Number of nodes of the circuit, counting a shared node once per
    /// path reaching it.
    #[must_use]
    pub fn nb_nodes(&self) -> usize {
        self.root.nb_nodes()
    }

    /// Replace the weight vector used by [`Graph::model_count`].
    pub fn set_weights(&mut self, weights: WeightVector) {
        debug_assert_eq!(weights.nb_vars(), self.nb_vars);
        self.weights = weights;
    }

    /// Weighted count of the models extending `partial_model`, as an
    /// exact rational. With uniform weights this is the number of
    /// satisfying total assignments.
    ///
    /// The query owns a fresh memoization table, so shared subgraphs are
    /// counted once per call, and a fresh copy of the weight vector with
    /// the partial model folded in.
    #[must_use]
    pub fn model_count(&self, partial_model: &Model) -> BigRational {
        let mut weights = self.weights.clone();
        update_weights(&mut weights, partial_model);

        let mut cache = HashMap::new();
        let mut count = count::model_count(&self.root, &weights, &mut cache);

        // The root may not mention every variable of the preamble; each
        // missing variable is a free binary choice.
        for var in (1..=self.nb_vars).map(Variable) {
            if count.is_zero() {
                break;
            }
            if !self.root.seen(var) {
                count *= weights.weight_for_var(var);
            }
        }
        count
    }

    /// One model of the circuit extending `partial_model`, or `None`
    /// exactly when `model_count(partial_model)` is zero under weights
    /// that forbid nothing.
    #[must_use]
    pub fn valid_model(&self, partial_model: &Model) -> Option<Model> {
        search::valid_model(&self.root, partial_model)
    }

    /// Fold `partial_model` into the circuit so later queries no longer
    /// need to pass it: the weight vector drops the falsified literals,
    /// a new conjunction root pins the bound literals, and the DAG below
    /// is rewritten in place (shared nodes exactly once).
    ///
    /// `Unsat` bindings pin both polarities, making the circuit count
    /// zero, like the queries they came from.
    pub fn condition_to(&mut self, partial_model: &Model) {
        update_weights(&mut self.weights, partial_model);

        let mut unit_lits = Vec::new();
        for var in partial_model.variables() {
            match partial_model.binding_for(var) {
                Binding::True => unit_lits.push(Literal::new(Polarity::Positive, var)),
                Binding::False => unit_lits.push(Literal::new(Polarity::Negative, var)),
                Binding::Unsat => {
                    unit_lits.push(Literal::new(Polarity::Positive, var));
                    unit_lits.push(Literal::new(Polarity::Negative, var));
                }
                Binding::Free => {}
            }
        }

        let previous_root = self.root.clone();
        condition::condition(&previous_root, partial_model, &mut HashSet::new());
        self.root = NodeRef::new_and(unit_lits, vec![previous_root]);
    }

    /// Write the circuit in the NNF text format, round-trip compatible
    /// with [`crate::graph::parse_nnf`].
    ///
    /// # Errors
    ///
    /// Returns an error when the writer fails or on a structurally
    /// broken circuit (a child missing from the export index).
    pub fn write_nnf(&self, out: &mut dyn std::io::Write) -> Result<()> {
        write_nnf(&self.root, self.nb_vars, out)
    }
}

#[cfg(test)]
mod test {
    use super::Graph;
    use crate::graph::parse_nnf;
    use crate::graph::weights::WeightVector;
    use crate::literal::{Literal, Variable};
    use crate::model::{Binding, Model};
    use crate::node::NodeRef;
    use num_rational::BigRational;
    use pretty_assertions::assert_eq;
    use std::io::BufReader;

    const DECISION: &str = "nnf 5 4 1
L 1
A 1 0
L -1
A 1 2
O 1 2 1 3";

    fn rational(numer: i64, denom: i64) -> BigRational {
        BigRational::new(numer.into(), denom.into())
    }

    fn graph(contents: &str) -> Graph {
        parse_nnf(&mut BufReader::new(contents.as_bytes())).unwrap()
    }

    #[test]
    fn literal_circuit_queries() {
        let g = graph("nnf 1 0 1\nL 1");

        assert_eq!(g.model_count(&Model::new(1)), rational(1, 1));

        let model = g.valid_model(&Model::new(1)).unwrap();
        assert_eq!(model.binding_for(Variable(1)), Binding::True);

        let mut forbidden = Model::new(1);
        forbidden.set_binding_for(Variable(1), Binding::False);
        assert_eq!(g.model_count(&forbidden), rational(0, 1));
        assert_eq!(g.valid_model(&forbidden), None);
    }

    #[test]
    fn an_unconstrained_circuit_counts_every_assignment() {
        let g = Graph::new(3, NodeRef::new_true());
        assert_eq!(g.model_count(&Model::new(3)), rational(8, 1));
    }

    #[test]
    fn free_variables_double_the_count() {
        // Two literals over three declared variables: variable 3 never
        // appears and contributes a factor of two.
        let g = graph("nnf 3 2 3\nL 1\nL 2\nA 2 0 1");
        assert_eq!(g.model_count(&Model::new(3)), rational(2, 1));
    }

    #[test]
    fn weighted_count_is_exact() {
        let mut g = graph("nnf 3 2 2\nL 1\nL 2\nA 2 0 1");
        let mut weights = WeightVector::new(2);
        weights.set_weight_for(Literal::from_dimacs(1), rational(3, 10));
        weights.set_weight_for(Literal::from_dimacs(-1), rational(7, 10));
        weights.set_weight_for(Literal::from_dimacs(2), rational(2, 5));
        weights.set_weight_for(Literal::from_dimacs(-2), rational(3, 5));
        g.set_weights(weights);

        assert_eq!(g.model_count(&Model::new(2)), rational(3, 25));
    }

    #[test]
    fn total_models_count_zero_or_one() {
        let g = graph(DECISION);
        let mut m = Model::new(1);
        m.set_binding_for(Variable(1), Binding::True);
        assert_eq!(g.model_count(&m), rational(1, 1));

        m.set_binding_for(Variable(1), Binding::Unsat);
        assert_eq!(g.model_count(&m), rational(0, 1));
    }

    #[test]
    fn a_fresh_variable_scales_the_count_by_its_var_weight() {
        // The same circuit declared over one more variable counts
        // exactly (w(v') + w(-v')) more models.
        let narrow = graph(DECISION);
        let wide = graph(&DECISION.replacen("nnf 5 4 1", "nnf 5 4 2", 1));
        assert_eq!(
            wide.model_count(&Model::new(2)),
            narrow.model_count(&Model::new(1)) * rational(2, 1)
        );
    }

    #[test]
    fn conditioning_matches_the_partial_model_count() {
        let mut g = graph(DECISION);
        let mut m = Model::new(1);
        m.set_binding_for(Variable(1), Binding::True);
        let expected = g.model_count(&m);

        g.condition_to(&m);
        assert_eq!(g.model_count(&Model::new(1)), expected);
        assert_eq!(g.model_count(&Model::new(1)), rational(1, 1));

        // The conditioned circuit refuses the opposite binding.
        let mut opposite = Model::new(1);
        opposite.set_binding_for(Variable(1), Binding::False);
        assert_eq!(g.model_count(&opposite), rational(0, 1));
    }

    #[test]
    fn conditioning_is_idempotent() {
        let mut once = graph(DECISION);
        let mut m = Model::new(1);
        m.set_binding_for(Variable(1), Binding::True);
        once.condition_to(&m);

        let mut twice = graph(DECISION);
        twice.condition_to(&m);
        twice.condition_to(&m);

        assert_eq!(
            once.model_count(&Model::new(1)),
            twice.model_count(&Model::new(1))
        );
    }

    #[test]
    fn unsat_binding_conditions_to_an_empty_circuit() {
        let mut g = graph(DECISION);
        let mut m = Model::new(1);
        m.set_binding_for(Variable(1), Binding::Unsat);
        g.condition_to(&m);
        assert_eq!(g.model_count(&Model::new(1)), rational(0, 1));
    }

    #[test]
    fn valid_model_agrees_with_model_count() {
        let g = graph(DECISION);
        for binding in [Binding::True, Binding::False, Binding::Unsat] {
            let mut m = Model::new(1);
            m.set_binding_for(Variable(1), binding);
            let found = g.valid_model(&m);
            assert_eq!(found.is_none(), g.model_count(&m) == rational(0, 1));
            if let Some(out) = found {
                assert!(g.model_count(&out) > rational(0, 1));
                assert!(!out.has_free_vars());
            }
        }
    }

    #[test]
    fn nb_nodes_counts_the_tree() {
        let g = graph(DECISION);
        // The decision and its two implicit conjunctions.
        assert_eq!(g.nb_nodes(), 3);
        assert_eq!(Graph::new(2, NodeRef::new_true()).nb_nodes(), 1);
    }
}
