//! Parsers for the textual NNF circuit format and for weight files.
use crate::graph::weights::{parse_decimal, WeightVector};
use crate::graph::Graph;
use crate::literal::{Literal, Variable};
use crate::node::{Node, NodeRef, OrBranch};
use anyhow::{bail, Context, Result};
use std::io::BufRead;

/// Parse a circuit in the NNF format emitted by d-DNNF compilers.
///
/// The first line is the preamble `nnf <nbNodes> <nbEdges> <nbVars>`.
/// Every following non-blank line defines one node referring to earlier
/// lines by index: `L <lit>` a literal, `A <k> <idx>*k` a conjunction
/// (`A 0` is the canonical True), `O <var> <k> <idx>*k` a decision
/// (`O 0 0` is the canonical False). The last node is the root.
///
/// Literal children of a conjunction are coalesced into its unit
/// literals, so a standalone literal node survives parsing only where it
/// is the child of a decision or the root itself.
///
/// # Errors
///
/// Returns an error on an unreadable input, a malformed preamble, an
/// unknown node type, or a node line referring to an undefined node.
pub fn parse_nnf(reader: &mut dyn BufRead) -> Result<Graph> {
    let mut lines = reader.lines();
    let preamble = match lines.next() {
        Some(preamble) => preamble.context("could not read NNF preamble")?,
        None => bail!("NNF input is empty"),
    };
    let headers: Vec<_> = preamble.split_whitespace().collect();
    if headers.len() != 4 || headers[0] != "nnf" {
        bail!("invalid NNF header: expected 'nnf <nodes> <edges> <vars>'");
    }
    let nb_nodes: usize = headers[1]
        .parse()
        .with_context(|| format!("invalid node count {:?}", headers[1]))?;
    let nb_vars: u32 = headers[3]
        .parse()
        .with_context(|| format!("invalid variable count {:?}", headers[3]))?;
    tracing::debug!(nb_vars, nb_nodes, "parsing NNF circuit");

    // Shared within the parse so the circuit holds single canonical
    // constants, the way exported circuits reserve lines 0 and 1.
    let canonical_true = NodeRef::new_true();
    let canonical_false = NodeRef::new_false();

    let mut nodes: Vec<NodeRef> = Vec::with_capacity(nb_nodes);
    for line in lines {
        let line = line.context("could not read NNF node line")?;
        let fields: Vec<_> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let node = match fields[0] {
            "L" => parse_literal(&fields)?,
            "A" => parse_and(&nodes, &fields, &canonical_true)?,
            "O" => parse_or(&nodes, &fields, &canonical_false)?,
            other => bail!("invalid node type {other:?}"),
        };
        nodes.push(node);
    }

    let root = nodes.last().cloned().context("NNF defines no nodes")?;
    Ok(Graph::new(nb_vars, root))
}

fn parse_literal(fields: &[&str]) -> Result<NodeRef> {
    if fields.len() != 2 {
        bail!("literal line must be 'L <literal>'");
    }
    let lit: i32 = fields[1]
        .parse()
        .with_context(|| format!("invalid literal {:?}", fields[1]))?;
    if lit == 0 {
        bail!("literal 0 is not allowed in a node line");
    }
    Ok(NodeRef::new_literal(Literal::from_dimacs(lit)))
}

fn parse_and(nodes: &[NodeRef], fields: &[&str], canonical_true: &NodeRef) -> Result<NodeRef> {
    let size: usize = fields
        .get(1)
        .context("conjunction line is missing its size")?
        .parse()
        .with_context(|| format!("invalid conjunction size {:?}", fields[1]))?;
    if size == 0 {
        return Ok(canonical_true.clone());
    }
    if fields.len() != size + 2 {
        bail!("conjunction announces {size} children but lists {}", fields.len() - 2);
    }

    let mut unit_lits = Vec::new();
    let mut children = Vec::new();
    for field in &fields[2..] {
        let child = child_at(nodes, field)?;
        let is_literal = matches!(&*child.borrow(), Node::Literal(_));
        if is_literal {
            let lit = match &*child.borrow() {
                Node::Literal(lit) => *lit,
                _ => unreachable!(),
            };
            unit_lits.push(lit);
        } else {
            children.push(child.clone());
        }
    }
    Ok(NodeRef::new_and(unit_lits, children))
}

fn parse_or(nodes: &[NodeRef], fields: &[&str], canonical_false: &NodeRef) -> Result<NodeRef> {
    let variable: u32 = fields
        .get(1)
        .context("decision line is missing its variable")?
        .parse()
        .with_context(|| format!("invalid decision variable {:?}", fields[1]))?;
    if variable == 0 {
        return Ok(canonical_false.clone());
    }
    if fields.len() != 5 || fields[2] != "2" {
        bail!("decision on variable {variable} must have exactly two children");
    }

    let fst = child_at(nodes, fields[3])?;
    let snd = child_at(nodes, fields[4])?;
    Ok(NodeRef::new_or(
        Variable(variable),
        [fst, snd].map(|child| OrBranch {
            unit_lits: Vec::new(),
            child,
        }),
    ))
}

fn child_at(nodes: &[NodeRef], field: &str) -> Result<NodeRef> {
    let idx: usize = field
        .parse()
        .with_context(|| format!("invalid child index {field:?}"))?;
    nodes
        .get(idx)
        .cloned()
        .with_context(|| format!("child index {idx} refers to an undefined node"))
}

/// Parse a weight file: lines of `<literal> <weight>`, blank lines
/// skipped. Weights are decimal and stored exactly.
///
/// # Errors
///
/// Returns an error on unreadable input, a malformed line, or a literal
/// outside `[1, nb_vars]`.
pub fn parse_weights(reader: &mut dyn BufRead, nb_vars: u32) -> Result<WeightVector> {
    let mut weights = WeightVector::new(nb_vars);
    for line in reader.lines() {
        let line = line.context("could not read weights line")?;
        let fields: Vec<_> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 2 {
            bail!("weights line {line:?} must be '<literal> <weight>'");
        }
        let lit: i32 = fields[0]
            .parse()
            .with_context(|| format!("invalid literal {:?}", fields[0]))?;
        if lit == 0 || lit.unsigned_abs() > nb_vars {
            bail!("literal {lit} is out of range for {nb_vars} variables");
        }
        weights.set_weight_for(Literal::from_dimacs(lit), parse_decimal(fields[1])?);
    }
    Ok(weights)
}

#[cfg(test)]
mod test {
    use super::{parse_nnf, parse_weights};
    use crate::literal::Literal;
    use crate::model::Model;
    use crate::node::Node;
    use num_rational::BigRational;
    use pretty_assertions::assert_eq;
    use std::io::BufReader;

    fn rational(numer: i64, denom: i64) -> BigRational {
        BigRational::new(numer.into(), denom.into())
    }

    #[test]
    fn parses_a_literal_circuit() {
        let graph = parse_nnf(&mut BufReader::new("nnf 1 0 1\nL 1".as_bytes())).unwrap();
        assert_eq!(graph.nb_vars(), 1);
        assert!(matches!(&*graph.root().borrow(), Node::Literal(..)));
    }

    #[test]
    fn coalesces_literal_children_of_conjunctions() {
        let contents = "nnf 3 2 2
L 1
L -2
A 2 0 1";
        let graph = parse_nnf(&mut BufReader::new(contents.as_bytes())).unwrap();
        match &*graph.root().borrow() {
            Node::And {
                unit_lits,
                children,
                ..
            } => {
                assert_eq!(
                    unit_lits,
                    &vec![Literal::from_dimacs(1), Literal::from_dimacs(-2)]
                );
                assert!(children.is_empty());
            }
            _ => unreachable!("root should be a conjunction"),
        };
    }

    #[test]
    fn parses_decisions_with_implicit_conjunctions() {
        let contents = "nnf 5 4 1
L 1
A 1 0
L -1
A 1 2
O 1 2 1 3";
        let graph = parse_nnf(&mut BufReader::new(contents.as_bytes())).unwrap();
        assert_eq!(graph.model_count(&Model::new(1)), rational(2, 1));
    }

    #[test]
    fn canonical_constants_are_shared() {
        let contents = "nnf 4 2 2
A 0
A 0
O 0 0
A 2 0 1";
        let graph = parse_nnf(&mut BufReader::new(contents.as_bytes())).unwrap();
        match &*graph.root().borrow() {
            Node::And { children, .. } => {
                assert_eq!(children.len(), 2);
                assert_eq!(children[0], children[1]);
            }
            _ => unreachable!("root should be a conjunction"),
        };
    }

    #[test]
    fn rejects_bad_preambles() {
        assert!(parse_nnf(&mut BufReader::new("".as_bytes())).is_err());
        assert!(parse_nnf(&mut BufReader::new("cnf 1 0 1\nL 1".as_bytes())).is_err());
        assert!(parse_nnf(&mut BufReader::new("nnf 1 0\nL 1".as_bytes())).is_err());
        assert!(parse_nnf(&mut BufReader::new("nnf one 0 1\nL 1".as_bytes())).is_err());
    }

    #[test]
    fn rejects_malformed_nodes() {
        assert!(parse_nnf(&mut BufReader::new("nnf 1 0 1\nX 1".as_bytes())).is_err());
        assert!(parse_nnf(&mut BufReader::new("nnf 1 0 1\nL 0".as_bytes())).is_err());
        assert!(parse_nnf(&mut BufReader::new("nnf 1 0 1\nA 1 4".as_bytes())).is_err());
        assert!(parse_nnf(&mut BufReader::new("nnf 2 1 2\nL 1\nO 2 1 0".as_bytes())).is_err());
        assert!(parse_nnf(&mut BufReader::new("nnf 0 0 1".as_bytes())).is_err());
    }

    #[test]
    fn skips_blank_lines() {
        let contents = "nnf 1 0 1

L 1
";
        assert!(parse_nnf(&mut BufReader::new(contents.as_bytes())).is_ok());
    }

    #[test]
    fn parses_weight_files() {
        let contents = "1 0.3\n\n-1 0.7\n2 2\n";
        let weights = parse_weights(&mut BufReader::new(contents.as_bytes()), 2).unwrap();
        assert_eq!(*weights.weight_for(Literal::from_dimacs(1)), rational(3, 10));
        assert_eq!(*weights.weight_for(Literal::from_dimacs(-1)), rational(7, 10));
        assert_eq!(*weights.weight_for(Literal::from_dimacs(2)), rational(2, 1));
        assert_eq!(*weights.weight_for(Literal::from_dimacs(-2)), rational(1, 1));
    }

    #[test]
    fn rejects_out_of_range_weight_literals() {
        assert!(parse_weights(&mut BufReader::new("3 0.5".as_bytes()), 2).is_err());
        assert!(parse_weights(&mut BufReader::new("0 0.5".as_bytes()), 2).is_err());
        assert!(parse_weights(&mut BufReader::new("1".as_bytes()), 2).is_err());
    }
}
