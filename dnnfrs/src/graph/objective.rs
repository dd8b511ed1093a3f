//! Linear objective functions over the models of a circuit.
//!
//! An objective assigns an integer weight to every literal; the value of
//! a total model is the sum of the weights of the literals it makes
//! true. Minimization exploits the circuit structure directly: no model
//! is ever enumerated.
use crate::graph::Graph;
use crate::literal::{Literal, Polarity, Variable};
use crate::model::{Binding, Model};
use crate::node::{Node, NodeRef, OrBranch};
use anyhow::Result;
use std::io::BufRead;

/// A linear objective function: a weight for each literal, `0` by
/// default. Objective weights are integers and never mix with the
/// rational weights of model counting.
#[derive(Debug, Clone)]
pub struct LinearObjective {
    // Same layout as the counting weight table: literal v at slot
    // 2*(v-1), -v at slot 2*(v-1) + 1.
    weights: Vec<i64>,
}

impl LinearObjective {
    #[must_use]
    pub fn new(nb_vars: u32) -> LinearObjective {
        LinearObjective {
            weights: vec![0; nb_vars as usize * 2],
        }
    }

    /// Read an objective from lines of `<literal> <weight>`. Blank lines
    /// are skipped; malformed lines are warned about and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error when the reader itself fails; malformed content
    /// never aborts the parse.
    pub fn from_reader(nb_vars: u32, reader: &mut dyn BufRead) -> Result<LinearObjective> {
        let mut objective = LinearObjective::new(nb_vars);
        for line in reader.lines() {
            let line = line?;
            let fields: Vec<_> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            let parsed = match fields.as_slice() {
                [lit, weight] => lit
                    .parse::<i32>()
                    .ok()
                    .filter(|lit| *lit != 0 && lit.unsigned_abs() <= nb_vars)
                    .zip(weight.parse::<i64>().ok()),
                _ => None,
            };
            match parsed {
                Some((lit, weight)) => objective.set(Literal::from_dimacs(lit), weight),
                None => tracing::warn!(line = %line, "ignoring malformed objective line"),
            }
        }
        Ok(objective)
    }

    #[must_use]
    pub fn nb_vars(&self) -> u32 {
        u32::try_from(self.weights.len() / 2).unwrap_or(u32::MAX)
    }

    fn slot(lit: Literal) -> usize {
        lit.variable().slot() * 2 + usize::from(lit.polarity() == Polarity::Negative)
    }

    pub fn set(&mut self, lit: Literal, weight: i64) {
        self.weights[LinearObjective::slot(lit)] = weight;
    }

    #[must_use]
    pub fn get(&self, lit: Literal) -> i64 {
        self.weights[LinearObjective::slot(lit)]
    }

    /// Cheapest objective value of any total assignment that makes every
    /// literal of `lits` true: forced literals score at their forced
    /// polarity, every other variable at its cheaper literal.
    fn min_weight(&self, lits: &[Literal]) -> i64 {
        let mut assigned = vec![false; self.nb_vars() as usize];
        let mut value = 0;
        for lit in lits {
            value += self.get(*lit);
            assigned[lit.variable().slot()] = true;
        }
        for var in (1..=self.nb_vars()).map(Variable) {
            if !assigned[var.slot()] {
                value += self.cheaper(var).1;
            }
        }
        value
    }

    /// The cheaper literal of `var` and its weight; ties go to the
    /// positive literal.
    fn cheaper(&self, var: Variable) -> (Literal, i64) {
        let positive = self.get(Literal::new(Polarity::Positive, var));
        let negative = self.get(Literal::new(Polarity::Negative, var));
        if positive > negative {
            (Literal::new(Polarity::Negative, var), negative)
        } else {
            (Literal::new(Polarity::Positive, var), positive)
        }
    }

    /// Minimize the objective over the models of the circuit. Returns
    /// the minimal value together with a model attaining it, or `None`
    /// when the circuit is unsatisfiable.
    #[must_use]
    pub fn optimize_under_constraint(&self, graph: &Graph) -> Option<(i64, Model)> {
        let forced = self.forced_literals(graph.root())?;

        let mut model = Model::new(self.nb_vars());
        let mut assigned = vec![false; self.nb_vars() as usize];
        let mut value = 0;
        for lit in &forced {
            value += self.get(*lit);
            assigned[lit.variable().slot()] = true;
            model.set_binding_for(lit.variable(), Binding::from(lit.polarity()));
        }
        for var in (1..=self.nb_vars()).map(Variable) {
            if !assigned[var.slot()] {
                let (lit, weight) = self.cheaper(var);
                value += weight;
                model.set_binding_for(var, Binding::from(lit.polarity()));
            }
        }
        Some((value, model))
    }

    /// The literals forced true along the cheapest path through the
    /// subgraph, or `None` when the subgraph is unsatisfiable.
    fn forced_literals(&self, node: &NodeRef) -> Option<Vec<Literal>> {
        match &*node.borrow() {
            Node::False => None,
            Node::True => Some(Vec::new()),
            Node::Literal(lit) => Some(vec![*lit]),
            Node::And {
                unit_lits,
                children,
                ..
            } => {
                let mut forced = unit_lits.clone();
                for child in children {
                    forced.extend(self.forced_literals(child)?);
                }
                Some(forced)
            }
            Node::Or { branches, .. } => {
                let fst = self.branch_literals(&branches[0]);
                let snd = self.branch_literals(&branches[1]);
                match (fst, snd) {
                    (Some(fst), Some(snd)) => {
                        if self.min_weight(&fst) <= self.min_weight(&snd) {
                            Some(fst)
                        } else {
                            Some(snd)
                        }
                    }
                    (forced, None) | (None, forced) => forced,
                }
            }
        }
    }

    /// Unit literals of a branch plus the forced literals of its child.
    fn branch_literals(&self, branch: &OrBranch) -> Option<Vec<Literal>> {
        let mut forced = branch.unit_lits.clone();
        forced.extend(self.forced_literals(&branch.child)?);
        Some(forced)
    }

    /// Rewrite a circuit so that exactly the models whose objective value
    /// is at most `bound` survive. The result carries a fresh uniform
    /// counting-weight vector.
    #[must_use]
    pub fn keep_bounded_weight_models(&self, graph: &Graph, bound: i64) -> Graph {
        let (_, root) = self.keep_bounded(graph.root(), bound);
        Graph::new(graph.nb_vars(), root)
    }

    /// Bound filtering over one subgraph. Yields the replacement node
    /// together with the literals every surviving model is forced to
    /// set, the lower bound of any model through the subgraph.
    fn keep_bounded(&self, node: &NodeRef, bound: i64) -> (Vec<Literal>, NodeRef) {
        let false_pair = || (Vec::new(), NodeRef::new_false());
        match &*node.borrow() {
            Node::False => false_pair(),
            Node::True => {
                if self.min_weight(&[]) <= bound {
                    (Vec::new(), NodeRef::new_true())
                } else {
                    false_pair()
                }
            }
            Node::Literal(lit) => {
                if self.min_weight(&[*lit]) <= bound {
                    (vec![*lit], NodeRef::new_literal(*lit))
                } else {
                    false_pair()
                }
            }
            Node::And {
                unit_lits,
                children,
                ..
            } => {
                let mut forced = unit_lits.clone();
                let mut new_children = Vec::with_capacity(children.len());
                for child in children {
                    let (child_forced, child_node) = self.keep_bounded(child, bound);
                    if child_node.is_false() {
                        return false_pair();
                    }
                    forced.extend(child_forced);
                    new_children.push(child_node);
                }
                if self.min_weight(&forced) > bound {
                    return false_pair();
                }
                (forced, NodeRef::new_and(unit_lits.clone(), new_children))
            }
            Node::Or {
                variable, branches, ..
            } => {
                let (fst_forced, fst) = self.keep_bounded_branch(&branches[0], bound);
                let (snd_forced, snd) = self.keep_bounded_branch(&branches[1], bound);
                if fst.is_false() {
                    return (snd_forced, snd);
                }
                if snd.is_false() {
                    return (fst_forced, fst);
                }
                // Both branches stay feasible: keep the cheaper one, or
                // both when their bounds agree. Mutual exclusion of the
                // branches makes the collapse safe.
                let fst_bound = self.min_weight(&fst_forced);
                let snd_bound = self.min_weight(&snd_forced);
                if fst_bound > snd_bound {
                    return (snd_forced, snd);
                }
                if snd_bound > fst_bound {
                    return (fst_forced, fst);
                }
                let or = NodeRef::new_or(
                    *variable,
                    [
                        OrBranch {
                            unit_lits: Vec::new(),
                            child: fst,
                        },
                        OrBranch {
                            unit_lits: Vec::new(),
                            child: snd,
                        },
                    ],
                );
                (fst_forced, or)
            }
        }
    }

    /// Bound filtering over one Or branch: the branch's unit literals
    /// wrap the rewritten child in a fresh And and join its forced set.
    fn keep_bounded_branch(&self, branch: &OrBranch, bound: i64) -> (Vec<Literal>, NodeRef) {
        let (mut forced, node) = self.keep_bounded(&branch.child, bound);
        if node.is_false() {
            return (Vec::new(), node);
        }
        let node = if branch.unit_lits.is_empty() {
            node
        } else {
            forced.extend(branch.unit_lits.iter().copied());
            NodeRef::new_and(branch.unit_lits.clone(), vec![node])
        };
        if self.min_weight(&forced) > bound {
            return (Vec::new(), NodeRef::new_false());
        }
        (forced, node)
    }
}

#[cfg(test)]
mod test {
    use super::LinearObjective;
    use crate::graph::{parse_nnf, Graph};
    use crate::literal::{Literal, Variable};
    use crate::model::{Binding, Model};
    use pretty_assertions::assert_eq;
    use std::io::BufReader;

    // (1 ∧ ⊤) ∨ (¬1 ∧ ⊤): the two-model decision on a single variable.
    const DECISION: &str = "nnf 5 4 1
L 1
A 1 0
L -1
A 1 2
O 1 2 1 3";

    fn decision_graph() -> Graph {
        parse_nnf(&mut BufReader::new(DECISION.as_bytes())).unwrap()
    }

    fn objective(pairs: &[(i32, i64)], nb_vars: u32) -> LinearObjective {
        let mut objective = LinearObjective::new(nb_vars);
        for (lit, weight) in pairs {
            objective.set(Literal::from_dimacs(*lit), *weight);
        }
        objective
    }

    #[test]
    fn from_reader_skips_malformed_lines() {
        let contents = "1 5\n\nnot a line\n-1 2\n2 3 4\n";
        let objective =
            LinearObjective::from_reader(1, &mut BufReader::new(contents.as_bytes())).unwrap();
        assert_eq!(objective.get(Literal::from_dimacs(1)), 5);
        assert_eq!(objective.get(Literal::from_dimacs(-1)), 2);
    }

    #[test]
    fn min_weight_prefers_cheaper_polarity() {
        let objective = objective(&[(1, 5), (-1, 2), (2, -3)], 2);
        // Nothing forced: -1 (2) and 2 (-3).
        assert_eq!(objective.min_weight(&[]), -1);
        // Forcing 1 overrides the cheaper polarity of variable 1.
        assert_eq!(objective.min_weight(&[Literal::from_dimacs(1)]), 2);
    }

    #[test]
    fn optimizes_the_single_variable_decision() {
        let graph = decision_graph();
        let objective = objective(&[(1, 5), (-1, 2)], 1);

        let (value, model) = objective.optimize_under_constraint(&graph).unwrap();
        assert_eq!(value, 2);
        assert_eq!(model.binding_for(Variable(1)), Binding::False);
    }

    #[test]
    fn optimize_reports_unsatisfiable_circuits() {
        let graph = Graph::new(1, crate::node::NodeRef::new_false());
        let objective = objective(&[], 1);
        assert_eq!(objective.optimize_under_constraint(&graph), None);
    }

    #[test]
    fn free_variables_take_their_cheaper_polarity() {
        // Circuit forcing nothing over two variables.
        let graph = Graph::new(2, crate::node::NodeRef::new_true());
        let objective = objective(&[(1, 7), (-1, 9), (2, 4), (-2, 1)], 2);

        let (value, model) = objective.optimize_under_constraint(&graph).unwrap();
        assert_eq!(value, 8);
        assert_eq!(model.binding_for(Variable(1)), Binding::True);
        assert_eq!(model.binding_for(Variable(2)), Binding::False);
    }

    #[test]
    fn bound_filter_drops_expensive_branches() {
        let graph = decision_graph();
        let objective = objective(&[(1, 5), (-1, 2)], 1);

        let filtered = objective.keep_bounded_weight_models(&graph, 3);
        let count = filtered.model_count(&Model::new(1));
        assert_eq!(count.to_string(), "1");

        let model = filtered.valid_model(&Model::new(1)).unwrap();
        assert_eq!(model.binding_for(Variable(1)), Binding::False);
    }

    #[test]
    fn bound_filter_keeps_equal_branches() {
        let graph = decision_graph();
        let objective = objective(&[(1, 2), (-1, 2)], 1);

        let filtered = objective.keep_bounded_weight_models(&graph, 2);
        assert_eq!(filtered.model_count(&Model::new(1)).to_string(), "2");
    }

    #[test]
    fn bound_filter_can_empty_the_circuit() {
        let graph = decision_graph();
        let objective = objective(&[(1, 5), (-1, 2)], 1);

        let filtered = objective.keep_bounded_weight_models(&graph, 1);
        assert!(filtered.root().is_false());
        assert_eq!(filtered.model_count(&Model::new(1)).to_string(), "0");
    }
}
