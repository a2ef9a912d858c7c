use std::path::Path;

use pcg_core::PcgError;
use serde::{Deserialize, Serialize};

/// A resolved left/right transition: either another node by index, or a
/// terminal leaf carrying the raw (possibly non-canonical) class index as
/// written in the text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Child {
    Node(usize),
    Leaf(i64),
}

/// One decision node: `name\tsplit_value\tup\tleft\tright`.
///
/// `up` is carried for textual round-trip fidelity only; nothing in this
/// crate's evaluator reads it back (the reference format stores it, but
/// forward evaluation never needs a parent pointer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalNode {
    pub marker: String,
    pub split_value: f64,
    pub up: i64,
    pub left: Child,
    pub right: Child,
}

/// A loaded decision tree: `nodes[0]` is always the evaluation entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<InternalNode>,
    pub n_classes: usize,
}

fn resolve_child(raw: i64, node_count: usize, path: &Path, line: usize) -> Result<Child, PcgError> {
    if raw <= 0 {
        return Ok(Child::Leaf(raw));
    }
    let idx = raw as usize;
    if idx >= node_count {
        return Err(PcgError::MalformedTree {
            path: path.to_path_buf(),
            line,
            reason: format!("child index {idx} is out of range for {node_count} nodes"),
        });
    }
    Ok(Child::Node(idx))
}

/// Parse the tree text format: header `n_nodes\tn_classes`, then one line
/// per node.
pub fn parse_text(text: &str, path: &Path) -> Result<Tree, PcgError> {
    let mut lines = text.lines();
    let header = lines.next().ok_or_else(|| PcgError::MalformedTree {
        path: path.to_path_buf(),
        line: 0,
        reason: "missing header line".to_string(),
    })?;

    let mut header_fields = header.split_whitespace();
    let malformed_header = || PcgError::MalformedTree {
        path: path.to_path_buf(),
        line: 0,
        reason: "header must be `n_nodes n_classes`".to_string(),
    };
    let n_nodes: usize = header_fields
        .next()
        .ok_or_else(malformed_header)?
        .parse()
        .map_err(|_| malformed_header())?;
    let n_classes: usize = header_fields
        .next()
        .ok_or_else(malformed_header)?
        .parse()
        .map_err(|_| malformed_header())?;

    let mut raw_nodes = Vec::with_capacity(n_nodes);
    for (i, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = i + 1;
        let malformed = |reason: &str| PcgError::MalformedTree {
            path: path.to_path_buf(),
            line: line_no,
            reason: reason.to_string(),
        };
        let fields: Vec<&str> = line.split('\t').collect();
        let [name, split_value, up, left, right] = fields.as_slice() else {
            return Err(malformed("expected 5 tab-separated fields"));
        };
        let split_value: f64 = split_value.parse().map_err(|_| malformed("split_value is not a real number"))?;
        let up: i64 = up.parse().map_err(|_| malformed("up is not an integer"))?;
        let left: i64 = left.parse().map_err(|_| malformed("left is not an integer"))?;
        let right: i64 = right.parse().map_err(|_| malformed("right is not an integer"))?;
        raw_nodes.push((name.to_string(), split_value, up, left, right, line_no));
    }

    if raw_nodes.len() != n_nodes {
        return Err(PcgError::MalformedTree {
            path: path.to_path_buf(),
            line: 0,
            reason: format!("header declared {n_nodes} nodes but found {}", raw_nodes.len()),
        });
    }

    let nodes = raw_nodes
        .into_iter()
        .map(|(marker, split_value, up, left, right, line_no)| {
            Ok(InternalNode {
                marker,
                split_value,
                up,
                left: resolve_child(left, n_nodes, path, line_no)?,
                right: resolve_child(right, n_nodes, path, line_no)?,
            })
        })
        .collect::<Result<Vec<_>, PcgError>>()?;

    Ok(Tree { nodes, n_classes })
}

fn child_to_raw(child: &Child) -> i64 {
    match child {
        Child::Leaf(v) => *v,
        Child::Node(idx) => *idx as i64,
    }
}

/// Serialize back to the text format; round-trips `parse_text` exactly.
pub fn to_text(tree: &Tree) -> String {
    let mut out = format!("{}\t{}\n", tree.nodes.len(), tree.n_classes);
    for node in &tree.nodes {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            node.marker,
            node.split_value,
            node.up,
            child_to_raw(&node.left),
            child_to_raw(&node.right),
        ));
    }
    out
}
