use crate::literal::{Literal, Variable};
use crate::node::NodeRef;
use std::collections::BTreeSet;

/// One branch of an [`Node::Or`]: unit literals forced along the branch
/// plus the branch's child. Parsed circuits keep the unit literals inside
/// the child (the implicit And preceding the Or line), so the list is
/// usually empty, but every algorithm treats a populated list as an
/// implicit conjunction with the child.
#[derive(Debug, Clone)]
pub struct OrBranch {
    pub unit_lits: Vec<Literal>,
    pub child: NodeRef,
}

/// A node of the circuit.
///
/// And nodes decompose over disjoint variable sets; Or nodes are binary
/// decisions on `variable` with mutually exclusive branches. Neither
/// property is checked here: the input is trusted to be d-DNNF.
///
/// Single-literal conjuncts are held as `unit_lits` instead of literal
/// child nodes; a standalone `Literal` node only appears where the parser
/// could not coalesce it (e.g. a literal-rooted circuit or a bare literal
/// below an Or).
///
/// `seen_vars` caches the set of variables mentioned anywhere in the
/// subgraph. Circuits are not assumed smooth: a subgraph may omit
/// variables, and the model-count engine compensates at query time.
#[derive(Debug)]
pub enum Node {
    False,
    True,
    Literal(Literal),
    And {
        unit_lits: Vec<Literal>,
        children: Vec<NodeRef>,
        seen_vars: BTreeSet<Variable>,
    },
    Or {
        variable: Variable,
        branches: [OrBranch; 2],
        seen_vars: BTreeSet<Variable>,
    },
}
