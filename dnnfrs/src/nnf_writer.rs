//! Writer for the textual NNF circuit format.
//!
//! The format is line-oriented and bottom-up: every node line refers to
//! previously written lines. Lines 0 and 1 are reserved for the
//! canonical False (`O 0 0`) and True (`A 0`) nodes, emitted even when
//! nothing refers to them so that exported files always canonicalize
//! the constants the same way.
use crate::node::{Node, NodeId, NodeRef};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Write;

/// Write the circuit rooted at `root` in NNF format.
pub(crate) fn write_nnf(root: &NodeRef, nb_vars: u32, out: &mut dyn Write) -> Result<()> {
    let mut index = LineIndex::new();
    index.index(root);

    writeln!(
        out,
        "nnf {} {} {}",
        index.next_line,
        root.nb_descendants(),
        nb_vars
    )?;
    writeln!(out, "O 0 0")?;
    writeln!(out, "A 0")?;
    for node in &index.ordered {
        emit(&index, node, out)?;
    }
    Ok(())
}

/// Post-order line assignment. A node's unit literals occupy the lines
/// immediately preceding the node's own line; each Or branch owns one
/// extra line for the implicit conjunction wrapping its unit literals.
/// Shared nodes are indexed, and therefore written, once.
struct LineIndex {
    node_to_line: HashMap<NodeId, usize>,
    ordered: Vec<NodeRef>,
    next_line: usize,
}

impl LineIndex {
    fn new() -> LineIndex {
        LineIndex {
            node_to_line: HashMap::new(),
            ordered: Vec::new(),
            // Lines 0 and 1 hold the canonical constants.
            next_line: 2,
        }
    }

    fn index(&mut self, node: &NodeRef) {
        if self.node_to_line.contains_key(&node.id()) {
            return;
        }
        match &*node.borrow() {
            // Constants live on the reserved lines.
            Node::False | Node::True => return,
            Node::Literal(..) => {}
            Node::And {
                unit_lits,
                children,
                ..
            } => {
                for child in children {
                    self.index(child);
                }
                self.next_line += unit_lits.len();
            }
            Node::Or { branches, .. } => {
                for branch in branches {
                    self.index(&branch.child);
                }
                for branch in branches {
                    self.next_line += branch.unit_lits.len() + 1;
                }
            }
        }
        self.node_to_line.insert(node.id(), self.next_line);
        self.next_line += 1;
        self.ordered.push(node.clone());
    }

    fn line_for(&self, node: &NodeRef) -> Result<usize> {
        if node.is_false() {
            return Ok(0);
        }
        if node.is_true() {
            return Ok(1);
        }
        self.node_to_line
            .get(&node.id())
            .copied()
            .context("node missing from the export index")
    }
}

fn emit(index: &LineIndex, node: &NodeRef, out: &mut dyn Write) -> Result<()> {
    match &*node.borrow() {
        Node::False | Node::True => {}
        Node::Literal(lit) => writeln!(out, "L {lit}")?,
        Node::And {
            unit_lits,
            children,
            ..
        } => {
            let line = index.line_for(node)?;
            for lit in unit_lits {
                writeln!(out, "L {lit}")?;
            }
            write!(out, "A {}", unit_lits.len() + children.len())?;
            for child in children {
                write!(out, " {}", index.line_for(child)?)?;
            }
            for offset in 0..unit_lits.len() {
                write!(out, " {}", line - unit_lits.len() + offset)?;
            }
            writeln!(out)?;
        }
        Node::Or {
            variable, branches, ..
        } => {
            let line = index.line_for(node)?;
            let branch_lines = [line - 1, line - branches[0].unit_lits.len() - 2];
            // The second branch's lines precede the first branch's.
            for (branch, branch_line) in branches.iter().zip(branch_lines).rev() {
                for lit in &branch.unit_lits {
                    writeln!(out, "L {lit}")?;
                }
                if branch.child.is_true() {
                    write!(out, "A {}", branch.unit_lits.len())?;
                } else {
                    write!(
                        out,
                        "A {} {}",
                        branch.unit_lits.len() + 1,
                        index.line_for(&branch.child)?
                    )?;
                }
                for offset in 0..branch.unit_lits.len() {
                    write!(out, " {}", branch_line - branch.unit_lits.len() + offset)?;
                }
                writeln!(out)?;
            }
            writeln!(out, "O {variable} 2 {} {}", branch_lines[0], branch_lines[1])?;
        }
    }
    Ok(())
}
