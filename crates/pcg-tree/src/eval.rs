use pcg_core::Verdict;
use pcg_markers::EvalContext;

use crate::format::{Child, Tree};

/// Walk `tree` from its root, evaluating one marker per internal node.
///
/// A marker-computation failure (a region with no qualifying events, a
/// malformed marker name on a hand-edited tree, ...) short-circuits
/// straight to [`Verdict::Unknown`]. This is deliberate: decoding the
/// failure through `Verdict::from_class_index(-n_classes)` would collide
/// with the `Normal` leaf encoding whenever `n_classes == 3`, since both
/// map to the raw value `-3`.
pub fn evaluate(tree: &Tree, ctx: &EvalContext<'_>) -> Verdict {
    let Some(mut node) = tree.nodes.first() else {
        return Verdict::Unknown;
    };
    loop {
        let value = match pcg_markers::evaluate(&node.marker, ctx) {
            Ok(v) => v,
            Err(err) => {
                tracing::debug!(marker = %node.marker, %err, "marker evaluation failed, tree defaults to unknown");
                return Verdict::Unknown;
            }
        };

        let next = if node.split_value >= value { &node.left } else { &node.right };
        match next {
            Child::Leaf(class) => return Verdict::from_class_index(*class as i32),
            Child::Node(idx) => node = &tree.nodes[*idx],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::InternalNode;
    use pcg_core::RetrigEvent;
    use pcg_markers::Clusters;

    fn event(offset: usize) -> RetrigEvent {
        RetrigEvent {
            offset,
            p: 0.9,
            nominal_energy: 1.0,
        }
    }

    #[test]
    fn single_leaf_tree_returns_its_class_without_evaluating_any_marker() {
        let tree = Tree {
            nodes: vec![InternalNode {
                marker: "ignored".to_string(),
                split_value: 0.0,
                up: 0,
                left: Child::Leaf(-3),
                right: Child::Leaf(-3),
            }],
            n_classes: 3,
        };
        let raw = vec![0.0f32; 10];
        let clusters = Clusters { ev: &[], s1: None, s2: None };
        let ctx = EvalContext { raw: &raw, clusters, sample_rate_hz: 2000.0 };

        // split_value >= value (0.0 >= <whatever>) picks a path, but both
        // leaves are identical so the outcome is deterministic regardless
        // of whether the marker itself evaluates successfully.
        assert_eq!(evaluate(&tree, &ctx), Verdict::Normal);
    }

    #[test]
    fn marker_failure_falls_back_to_unknown_not_the_colliding_leaf() {
        let tree = Tree {
            nodes: vec![InternalNode {
                marker: "abs_s1_-_all_0_0".to_string(),
                split_value: 0.0,
                up: 0,
                left: Child::Leaf(-3),
                right: Child::Leaf(-1),
            }],
            n_classes: 3,
        };
        // No events at all: the marker's region reduction is empty, so
        // evaluation fails and must report Unknown, not decode -3 into
        // Normal just because n_classes happens to be 3.
        let raw = vec![0.0f32; 10];
        let clusters = Clusters { ev: &[], s1: None, s2: None };
        let ctx = EvalContext { raw: &raw, clusters, sample_rate_hz: 2000.0 };

        assert_eq!(evaluate(&tree, &ctx), Verdict::Unknown);
    }

    #[test]
    fn walks_through_an_internal_node_to_the_correct_leaf() {
        let tree = Tree {
            nodes: vec![
                InternalNode {
                    marker: "abs_s1_-_all_0_0".to_string(),
                    split_value: -1.0,
                    up: 0,
                    left: Child::Leaf(-2),
                    right: Child::Node(1),
                },
                InternalNode {
                    marker: "ignored".to_string(),
                    split_value: 1000.0,
                    up: 0,
                    left: Child::Leaf(-1),
                    right: Child::Leaf(-3),
                },
            ],
            n_classes: 3,
        };

        let centers: Vec<usize> = (0..5).map(|i| 500 + i * 2000).collect();
        let ev: Vec<RetrigEvent> = centers.iter().map(|&c| event(c)).collect();
        let mut raw = vec![0.0f32; 11000];
        for &c in &centers {
            for o in 0..20 {
                raw[c + o] = 1.0;
            }
        }
        let clusters = Clusters { ev: &ev, s1: None, s2: None };
        let ctx = EvalContext { raw: &raw, clusters, sample_rate_hz: 2000.0 };

        // primary value at node 0 is non-negative, split_value -1.0 is not
        // >= it, so evaluation goes right to node 1, then left (split
        // 1000.0 >= small positive value) to the Abnormal leaf.
        assert_eq!(evaluate(&tree, &ctx), Verdict::Abnormal);
    }
}
