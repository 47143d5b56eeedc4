//! Immutable rooted trees built from flat rows.
//!
//! Nodes live in an arena built in pre-order, so a parent's index is always
//! smaller than its children's and parent links are plain indices.

mod build;

use std::cmp::Ordering;

pub use build::{HierarchyBuilder, KeyFn, ValueFn, field, numeric_field};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: Self = Self(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct HierarchyNode {
    pub name: String,
    pub value: f64,
    pub depth: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl HierarchyNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Order in which a layout visits a node's children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildOrder {
    /// Insertion order of the builder (first-seen key order).
    Stored,
    /// Largest aggregate value first; ties keep stored order.
    #[default]
    ValueDescending,
}

#[derive(Clone, Debug)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
}

impl Hierarchy {
    /// A childless root with value 0.
    pub fn empty(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![HierarchyNode {
                name: root_name.into(),
                value: 0.0,
                depth: 0,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, name: String, value: f64) -> NodeId {
        let id = NodeId(self.nodes.len());
        let depth = self.nodes[parent.0].depth + 1;
        self.nodes.push(HierarchyNode {
            name,
            value,
            depth,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Sums leaf values into every ancestor. Internal values are overwritten.
    pub(crate) fn aggregate(&mut self) {
        for index in (0..self.nodes.len()).rev() {
            if !self.nodes[index].children.is_empty() {
                let sum = self.nodes[index]
                    .children
                    .iter()
                    .map(|child| self.nodes[child.0].value)
                    .sum();
                self.nodes[index].value = sum;
            }
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no children (empty input).
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&HierarchyNode> {
        self.nodes.get(id.0)
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn value(&self, id: NodeId) -> f64 {
        self.nodes[id.0].value
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// `id` followed by its parent chain up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.nodes[current.0].parent)
    }

    /// Pre-order traversal of the subtree rooted at `id`, including `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids().filter(|id| self.nodes[id.0].children.is_empty())
    }

    /// Longest root-to-leaf edge count.
    pub fn height(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// True when `ancestor` is `node` or lies on its parent chain.
    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|id| id == ancestor)
    }

    /// Names from the root down to `id`.
    pub fn path_names(&self, id: NodeId) -> Vec<&str> {
        let mut names = self
            .ancestors(id)
            .map(|ancestor| self.nodes[ancestor.0].name.as_str())
            .collect::<Vec<_>>();
        names.reverse();
        names
    }

    pub fn breadcrumb(&self, id: NodeId, separator: &str) -> String {
        self.path_names(id).join(separator)
    }

    /// Ancestor of `id` at `depth`, if `id` is at least that deep.
    pub fn ancestor_at_depth(&self, id: NodeId, depth: usize) -> Option<NodeId> {
        self.ancestors(id)
            .find(|ancestor| self.nodes[ancestor.0].depth == depth)
    }

    /// Children of `id` in the requested visiting order.
    pub fn ordered_children(&self, id: NodeId, order: ChildOrder) -> Vec<NodeId> {
        let mut children = self.nodes[id.0].children.clone();
        if order == ChildOrder::ValueDescending {
            children.sort_by(|a, b| self.compare_value_desc(*a, *b));
        }
        children
    }

    /// Stable re-ordering of every node's children.
    pub fn sort_children<F>(&mut self, mut compare: F)
    where
        F: FnMut(&HierarchyNode, &HierarchyNode) -> Ordering,
    {
        for index in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[index].children);
            children.sort_by(|a, b| compare(&self.nodes[a.0], &self.nodes[b.0]));
            self.nodes[index].children = children;
        }
    }

    pub fn sort_by_value_desc(&mut self) {
        self.sort_children(|a, b| b.value.total_cmp(&a.value));
    }

    fn compare_value_desc(&self, a: NodeId, b: NodeId) -> Ordering {
        self.nodes[b.0].value.total_cmp(&self.nodes[a.0].value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Hierarchy {
        let mut tree = Hierarchy::empty("World");
        let x = tree.push_child(NodeId::ROOT, "X".into(), 0.0);
        tree.push_child(x, "A".into(), 10.0);
        tree.push_child(x, "B".into(), 30.0);
        let y = tree.push_child(NodeId::ROOT, "Y".into(), 0.0);
        tree.push_child(y, "C".into(), 5.0);
        tree.aggregate();
        tree
    }

    #[test]
    fn aggregation_sums_bottom_up() {
        let tree = sample();
        assert_eq!(tree.value(tree.root()), 45.0);
        assert_eq!(tree.value(NodeId(1)), 40.0);
        assert_eq!(tree.value(NodeId(4)), 5.0);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn ancestry_queries() {
        let tree = sample();
        let b = NodeId(3);
        assert_eq!(tree.breadcrumb(b, " > "), "World > X > B");
        assert!(tree.is_ancestor_of(NodeId(1), b));
        assert!(tree.is_ancestor_of(b, b));
        assert!(!tree.is_ancestor_of(NodeId(4), b));
        assert_eq!(tree.ancestor_at_depth(b, 1), Some(NodeId(1)));
        assert_eq!(tree.ancestor_at_depth(NodeId(1), 2), None);
    }

    #[test]
    fn descendants_are_pre_order() {
        let tree = sample();
        assert_eq!(
            tree.descendants(tree.root()),
            (0..6).map(NodeId).collect::<Vec<_>>()
        );
        assert_eq!(tree.leaves().count(), 3);
    }

    #[test]
    fn ordering_is_stable_and_descending() {
        let mut tree = sample();
        assert_eq!(
            tree.ordered_children(NodeId(1), ChildOrder::ValueDescending),
            vec![NodeId(3), NodeId(2)]
        );
        assert_eq!(
            tree.ordered_children(NodeId(1), ChildOrder::Stored),
            vec![NodeId(2), NodeId(3)]
        );

        tree.sort_by_value_desc();
        assert_eq!(tree.children(NodeId(1)), &[NodeId(3), NodeId(2)]);
    }
}
