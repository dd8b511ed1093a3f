//! Destructive conditioning of a DAG by a partial assignment.
use crate::model::{Binding, Model};
use crate::node::{Node, NodeId, NodeRef};
use std::collections::HashSet;

/// Rewrite the subgraph so it embeds `partial_model`: branches and
/// conjunctions whose unit literals contradict a binding collapse to
/// False, and every bound variable is erased from the seen-vars of the
/// nodes it passes through (root-level smoothing re-accounts for them).
///
/// Children shared by several parents are rewritten exactly once; the
/// visited set is keyed on node identity so every parent observes the
/// same rewrite.
pub(crate) fn condition(node: &NodeRef, partial_model: &Model, cache: &mut HashSet<NodeId>) {
    if !cache.insert(node.id()) {
        return;
    }

    let to_visit: Vec<NodeRef> = match &mut *node.borrow_mut() {
        Node::False | Node::True | Node::Literal(..) => Vec::new(),
        Node::Or {
            branches,
            seen_vars,
            ..
        } => {
            for branch in branches.iter_mut() {
                let contradicted = branch.unit_lits.iter().any(|lit| {
                    partial_model
                        .binding_for(lit.variable())
                        .falsifies(lit.polarity())
                });
                if contradicted {
                    branch.child = NodeRef::new_false();
                    branch.unit_lits.clear();
                }
            }
            seen_vars.retain(|var| partial_model.binding_for(*var) == Binding::Free);
            branches.iter().map(|branch| branch.child.clone()).collect()
        }
        Node::And {
            unit_lits,
            children,
            seen_vars,
        } => {
            seen_vars.retain(|var| partial_model.binding_for(*var) == Binding::Free);
            let contradicted = unit_lits.iter().any(|lit| {
                partial_model
                    .binding_for(lit.variable())
                    .falsifies(lit.polarity())
            });
            if contradicted {
                children.clear();
                children.push(NodeRef::new_false());
                unit_lits.clear();
                Vec::new()
            } else {
                children.clone()
            }
        }
    };

    for child in &to_visit {
        condition(child, partial_model, cache);
    }
}
