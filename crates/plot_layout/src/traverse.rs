//! Traversal utilities over resolved [`NodeInstance`] trees.
//!
//! Renderers, analytics and bulk import all need the same walks (id lookup,
//! label maps, per-unit areas). They share the pre-order iterator defined here
//! instead of recursing ad hoc.
use std::collections::HashMap;

use crate::node::NodeInstance;
use crate::shape::Bounds;

/// Depth-first, pre-order iterator yielding `(node, depth)`; the root has depth 0.
pub struct PreOrder<'a> {
    stack: Vec<(&'a NodeInstance, usize)>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (&'a NodeInstance, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((node, depth))
    }
}

/// Pre-order walk of the tree rooted at `root`.
pub fn pre_order(root: &NodeInstance) -> PreOrder<'_> {
    PreOrder {
        stack: vec![(root, 0)],
    }
}

/// Calls `visit` for every node in pre-order with its depth.
pub fn walk<'a>(root: &'a NodeInstance, mut visit: impl FnMut(&'a NodeInstance, usize)) {
    for (node, depth) in pre_order(root) {
        visit(node, depth);
    }
}

pub fn find_by_id<'a>(root: &'a NodeInstance, id: &str) -> Option<&'a NodeInstance> {
    pre_order(root).map(|(n, _)| n).find(|n| n.id == id)
}

/// First node in pre-order carrying `label`.
pub fn find_by_label<'a>(root: &'a NodeInstance, label: &str) -> Option<&'a NodeInstance> {
    pre_order(root).map(|(n, _)| n).find(|n| n.label == label)
}

/// All sampling units in pre-order.
pub fn sampling_units(root: &NodeInstance) -> Vec<&NodeInstance> {
    pre_order(root)
        .map(|(n, _)| n)
        .filter(|n| n.is_sampling_unit())
        .collect()
}

/// Maps sampling-unit labels (e.g. `"Q1"`) to unit ids, for importers that
/// receive external labels. When labels repeat, the first unit in pre-order wins.
pub fn label_map(root: &NodeInstance) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for unit in sampling_units(root) {
        out.entry(unit.label.clone())
            .or_insert_with(|| unit.id.clone());
    }
    out
}

/// Area in square meters of the node with `id`.
pub fn area_by_id(root: &NodeInstance, id: &str) -> Option<f32> {
    find_by_id(root, id).map(|n| n.shape.area())
}

/// Absolute bounding box, in plot meters, of the node with `id`; used for hit-testing.
pub fn absolute_bounds(root: &NodeInstance, id: &str) -> Option<Bounds> {
    find_by_id(root, id).map(NodeInstance::bounds)
}

/// Summed area of all sampling units.
pub fn total_sampling_area(root: &NodeInstance) -> f32 {
    sampling_units(root).iter().map(|n| n.shape.area()).sum()
}

pub fn node_count(root: &NodeInstance) -> usize {
    pre_order(root).count()
}

pub fn sampling_unit_count(root: &NodeInstance) -> usize {
    pre_order(root).filter(|(n, _)| n.is_sampling_unit()).count()
}

/// Maximum depth of the tree; a lone root has depth 0.
pub fn depth(root: &NodeInstance) -> usize {
    pre_order(root).map(|(_, d)| d).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeType;
    use crate::shape::ShapeDefinition;

    fn node(id: &str, label: &str, node_type: NodeType, children: Vec<NodeInstance>) -> NodeInstance {
        NodeInstance {
            id: id.into(),
            blueprint_id: "bp".into(),
            blueprint_version: 1,
            plot_id: None,
            node_type,
            label: label.into(),
            code: None,
            path: format!("root/{id}"),
            shape: ShapeDefinition::rectangle(2.0, 5.0),
            x: 0.0,
            y: 0.0,
            rotation: None,
            role: None,
            tags: Vec::new(),
            children,
        }
    }

    fn tree() -> NodeInstance {
        node(
            "root",
            "Plot",
            NodeType::Container,
            vec![
                node(
                    "a",
                    "Q1",
                    NodeType::SamplingUnit,
                    vec![node("a1", "Herb", NodeType::SamplingUnit, Vec::new())],
                ),
                node("b", "Q2", NodeType::SamplingUnit, Vec::new()),
                node("c", "Q2", NodeType::SamplingUnit, Vec::new()),
            ],
        )
    }

    #[test]
    fn pre_order_visits_parents_before_children_in_order() {
        let t = tree();
        let order: Vec<_> = pre_order(&t).map(|(n, d)| (n.id.as_str(), d)).collect();
        assert_eq!(
            order,
            vec![("root", 0), ("a", 1), ("a1", 2), ("b", 1), ("c", 1)]
        );
        assert_eq!(depth(&t), 2);
        assert_eq!(node_count(&t), 5);
        assert_eq!(sampling_unit_count(&t), 4);
    }

    #[test]
    fn lookups_by_id_and_label() {
        let t = tree();
        assert_eq!(find_by_id(&t, "a1").map(|n| n.label.as_str()), Some("Herb"));
        assert!(find_by_id(&t, "zzz").is_none());
        assert_eq!(find_by_label(&t, "Q2").map(|n| n.id.as_str()), Some("b"));
    }

    #[test]
    fn label_map_keeps_first_duplicate() {
        let t = tree();
        let map = label_map(&t);
        assert_eq!(map.get("Q2").map(String::as_str), Some("b"));
        assert_eq!(map.get("Q1").map(String::as_str), Some("a"));
        assert!(!map.contains_key("Plot"));
    }

    #[test]
    fn areas_come_from_shapes() {
        let t = tree();
        assert_eq!(area_by_id(&t, "b"), Some(10.0));
        assert_eq!(area_by_id(&t, "missing"), None);
        let b = absolute_bounds(&t, "b").unwrap();
        assert_eq!(b.size(), glam::Vec2::new(2.0, 5.0));
        assert_eq!(total_sampling_area(&t), 40.0);
    }

    #[test]
    fn walk_reports_every_node() {
        let t = tree();
        let mut seen = 0;
        walk(&t, |_, _| seen += 1);
        assert_eq!(seen, 5);
    }
}
