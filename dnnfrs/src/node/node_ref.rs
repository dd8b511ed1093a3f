use crate::literal::{Literal, Variable};
use crate::node::{Node, OrBranch};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Identity of a node, stable for as long as the node is alive. Keys the
/// per-call memoization and visited sets; two references are the same
/// node exactly when their ids coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// A shared, mutable reference to a [`Node`]. Children of And and Or
/// nodes may be shared by several parents; the circuit forms a DAG, never
/// a cycle, so borrowing a child while its parent is borrowed is safe.
#[derive(Debug, Clone)]
pub struct NodeRef(Rc<RefCell<Node>>);

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for NodeRef {}

impl NodeRef {
    pub(crate) fn new(node: Node) -> Self {
        NodeRef(Rc::new(RefCell::new(node)))
    }

    #[must_use]
    pub fn new_false() -> Self {
        NodeRef::new(Node::False)
    }

    #[must_use]
    pub fn new_true() -> Self {
        NodeRef::new(Node::True)
    }

    #[must_use]
    pub fn new_literal(lit: Literal) -> Self {
        NodeRef::new(Node::Literal(lit))
    }

    /// Build an And node, deriving its seen-vars from the unit literals
    /// and the children.
    #[must_use]
    pub fn new_and(unit_lits: Vec<Literal>, children: Vec<NodeRef>) -> Self {
        let mut seen_vars: BTreeSet<Variable> =
            unit_lits.iter().map(|lit| lit.variable()).collect();
        for child in &children {
            child.collect_seen_vars(&mut seen_vars);
        }
        NodeRef::new(Node::And {
            unit_lits,
            children,
            seen_vars,
        })
    }

    /// Build an Or decision node, deriving its seen-vars from both
    /// branches.
    #[must_use]
    pub fn new_or(variable: Variable, branches: [OrBranch; 2]) -> Self {
        let mut seen_vars = BTreeSet::new();
        for branch in &branches {
            seen_vars.extend(branch.unit_lits.iter().map(|lit| lit.variable()));
            branch.child.collect_seen_vars(&mut seen_vars);
        }
        NodeRef::new(Node::Or {
            variable,
            branches,
            seen_vars,
        })
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        NodeId(Rc::as_ptr(&self.0) as usize)
    }

    pub(crate) fn borrow(&self) -> Ref<'_, Node> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, Node> {
        self.0.borrow_mut()
    }

    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(&*self.borrow(), Node::True)
    }

    #[must_use]
    pub fn is_false(&self) -> bool {
        matches!(&*self.borrow(), Node::False)
    }

    /// Whether `var` is mentioned anywhere in this subgraph.
    #[must_use]
    pub fn seen(&self, var: Variable) -> bool {
        match &*self.borrow() {
            Node::False | Node::True => false,
            Node::Literal(lit) => lit.variable() == var,
            Node::And { seen_vars, .. } | Node::Or { seen_vars, .. } => seen_vars.contains(&var),
        }
    }

    /// The set of variables mentioned in this subgraph.
    #[must_use]
    pub fn seen_vars(&self) -> BTreeSet<Variable> {
        let mut seen_vars = BTreeSet::new();
        self.collect_seen_vars(&mut seen_vars);
        seen_vars
    }

    pub(crate) fn collect_seen_vars(&self, out: &mut BTreeSet<Variable>) {
        match &*self.borrow() {
            Node::False | Node::True => {}
            Node::Literal(lit) => {
                out.insert(lit.variable());
            }
            Node::And { seen_vars, .. } | Node::Or { seen_vars, .. } => {
                out.extend(seen_vars.iter().copied());
            }
        }
    }

    /// Number of nodes in the subgraph, counting a shared node once per
    /// path reaching it. Unit literals do not count as nodes.
    #[must_use]
    pub fn nb_nodes(&self) -> usize {
        match &*self.borrow() {
            Node::False | Node::True | Node::Literal(..) => 1,
            Node::And { children, .. } => {
                1 + children.iter().map(NodeRef::nb_nodes).sum::<usize>()
            }
            Node::Or { branches, .. } => {
                1 + branches
                    .iter()
                    .map(|branch| branch.child.nb_nodes())
                    .sum::<usize>()
            }
        }
    }

    /// Structural size reported in the NNF header: for an And, its unit
    /// literals plus one edge per child subgraph; for an Or, each branch
    /// contributes its implicit wrapper, its unit literals, and its child
    /// unless that child is the canonical True.
    #[must_use]
    pub fn nb_descendants(&self) -> usize {
        match &*self.borrow() {
            Node::False | Node::True | Node::Literal(..) => 0,
            Node::And {
                unit_lits,
                children,
                ..
            } => {
                unit_lits.len()
                    + children
                        .iter()
                        .map(|child| 1 + child.nb_descendants())
                        .sum::<usize>()
            }
            Node::Or { branches, .. } => branches
                .iter()
                .map(|branch| {
                    let mut count = 1 + branch.unit_lits.len();
                    if !branch.child.is_true() {
                        count += 1 + branch.child.nb_descendants();
                    }
                    count
                })
                .sum(),
        }
    }
}
