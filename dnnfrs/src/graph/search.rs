//! Depth-first extraction of one model consistent with a partial
//! assignment.
use crate::model::Model;
use crate::node::{Node, NodeRef};

/// Extend `partial_model` into a model satisfying the subgraph, or
/// `None` when no extension exists. Determinism of the circuit makes the
/// search backtrack-free: within an Or, the first branch whose unit
/// literals are compatible either succeeds or proves the whole node
/// unsatisfiable under the assignment.
pub(crate) fn valid_model(node: &NodeRef, partial_model: &Model) -> Option<Model> {
    match &*node.borrow() {
        Node::False => None,
        Node::True => Some(partial_model.clone()),
        Node::Literal(lit) => {
            let mut model = partial_model.clone();
            model.assert_literal(*lit).then_some(model)
        }
        Node::And {
            unit_lits,
            children,
            ..
        } => {
            let mut result = partial_model.clone();
            for lit in unit_lits {
                if !result.assert_literal(*lit) {
                    return None;
                }
            }
            for child in children {
                let child_model = valid_model(child, &result)?;
                result = Model::mix(&result, &child_model)?;
            }
            Some(result)
        }
        Node::Or { branches, .. } => {
            for branch in branches {
                let mut model = partial_model.clone();
                if !branch
                    .unit_lits
                    .iter()
                    .all(|lit| model.assert_literal(*lit))
                {
                    continue;
                }
                if let Some(result) = valid_model(&branch.child, &model) {
                    return Some(result);
                }
            }
            None
        }
    }
}
