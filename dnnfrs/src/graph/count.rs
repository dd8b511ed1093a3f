//! The weighted model-count engine.
//!
//! Circuits coming out of d-DNNF compilers are usually not smooth: a
//! branch of a decision may mention a strict subset of the variables its
//! sibling mentions. Counting compensates at query time, multiplying by
//! `w(v) + w(-v)` for every variable absent from a branch; baking
//! smoothing into the circuit instead would enlarge it for every query.
use crate::graph::weights::WeightVector;
use crate::node::{Node, NodeId, NodeRef};
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::collections::HashMap;

/// Weighted model count of the subgraph under fixed weights. The cache
/// is keyed on node identity and lives for a single query: with the
/// weights pinned, every node's count is a pure function of its
/// subgraph, so shared subgraphs are counted once.
pub(crate) fn model_count(
    node: &NodeRef,
    weights: &WeightVector,
    cache: &mut HashMap<NodeId, BigRational>,
) -> BigRational {
    if let Some(count) = cache.get(&node.id()) {
        return count.clone();
    }

    let count = match &*node.borrow() {
        Node::False => BigRational::zero(),
        Node::True => BigRational::one(),
        Node::Literal(lit) => weights.weight_for(*lit).clone(),
        Node::And {
            unit_lits,
            children,
            ..
        } => {
            let mut count = BigRational::one();
            for lit in unit_lits {
                count *= weights.weight_for(*lit);
                if count.is_zero() {
                    break;
                }
            }
            for child in children {
                if count.is_zero() {
                    break;
                }
                count *= model_count(child, weights, cache);
            }
            count
        }
        Node::Or {
            branches,
            seen_vars,
            ..
        } => {
            let mut count = BigRational::zero();
            for branch in branches {
                let mut local = model_count(&branch.child, weights, cache);
                for lit in &branch.unit_lits {
                    if local.is_zero() {
                        break;
                    }
                    local *= weights.weight_for(*lit);
                }
                // Smooth: variables this node has seen but the branch
                // has not contribute a free binary choice.
                for var in seen_vars {
                    if local.is_zero() {
                        break;
                    }
                    if branch.child.seen(*var)
                        || branch.unit_lits.iter().any(|lit| lit.variable() == *var)
                    {
                        continue;
                    }
                    local *= weights.weight_for_var(*var);
                }
                count += local;
            }
            count
        }
    };

    cache.insert(node.id(), count.clone());
    count
}
