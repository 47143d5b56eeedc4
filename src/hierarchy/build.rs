use indexmap::IndexMap;
use tracing::debug;

use crate::data::Record;

use super::{Hierarchy, NodeId};

pub type KeyFn = Box<dyn Fn(&Record) -> String + Send + Sync>;
pub type ValueFn = Box<dyn Fn(&Record) -> f64 + Send + Sync>;

/// Key extractor reading `name` as text.
pub fn field(name: &str) -> KeyFn {
    let name = name.to_owned();
    Box::new(move |record| record.text(&name))
}

/// Value extractor reading `name` with numeric coercion.
pub fn numeric_field(name: &str) -> ValueFn {
    let name = name.to_owned();
    Box::new(move |record| record.number(&name))
}

/// Groups flat records into a tree by an ordered list of keys.
///
/// Without a leaf-name extractor the deepest groups become the leaves and carry
/// the summed value of their records; with one, every record becomes its own
/// leaf under the deepest group.
pub struct HierarchyBuilder {
    root_name: String,
    keys: Vec<KeyFn>,
    leaf_name: Option<KeyFn>,
    value: ValueFn,
}

impl HierarchyBuilder {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            keys: Vec::new(),
            leaf_name: None,
            value: Box::new(|_| 0.0),
        }
    }

    pub fn group_by(mut self, key: KeyFn) -> Self {
        self.keys.push(key);
        self
    }

    pub fn leaf_name(mut self, key: KeyFn) -> Self {
        self.leaf_name = Some(key);
        self
    }

    pub fn value(mut self, value: ValueFn) -> Self {
        self.value = value;
        self
    }

    pub fn build(&self, records: &[Record]) -> Hierarchy {
        let mut tree = Hierarchy::empty(self.root_name.clone());
        let all = records.iter().collect::<Vec<_>>();

        if self.keys.is_empty() && self.leaf_name.is_none() {
            tree.nodes[0].value = self.sum(&all);
        } else {
            self.insert_groups(&mut tree, NodeId::ROOT, &all, 0);
            tree.aggregate();
        }

        debug!(
            root = %self.root_name,
            nodes = tree.len(),
            leaves = tree.leaves().count(),
            total = tree.value(tree.root()),
            "built hierarchy"
        );
        tree
    }

    fn insert_groups(&self, tree: &mut Hierarchy, parent: NodeId, rows: &[&Record], level: usize) {
        let Some(key) = self.keys.get(level) else {
            if let Some(leaf_name) = &self.leaf_name {
                for row in rows {
                    tree.push_child(parent, leaf_name(row), (self.value)(row));
                }
            }
            return;
        };

        let mut groups: IndexMap<String, Vec<&Record>> = IndexMap::new();
        for row in rows {
            groups.entry(key(row)).or_default().push(row);
        }

        let terminal = level + 1 == self.keys.len() && self.leaf_name.is_none();
        for (name, members) in groups {
            if terminal {
                tree.push_child(parent, name, self.sum(&members));
            } else {
                let group = tree.push_child(parent, name, 0.0);
                self.insert_groups(tree, group, &members, level + 1);
            }
        }
    }

    fn sum(&self, rows: &[&Record]) -> f64 {
        rows.iter().map(|row| (self.value)(row)).sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::data::FieldValue;

    use super::*;

    fn row(continent: &str, country: &str, value: FieldValue) -> Record {
        Record::from_iter([
            ("Continent", FieldValue::from(continent)),
            ("Country", FieldValue::from(country)),
            ("value", value),
        ])
    }

    #[test]
    fn groups_preserve_first_seen_order() {
        let rows = vec![
            row("Europe", "France", 1.0.into()),
            row("Asia", "Japan", 2.0.into()),
            row("Europe", "Spain", 3.0.into()),
        ];
        let tree = HierarchyBuilder::new("World")
            .group_by(field("Continent"))
            .group_by(field("Country"))
            .value(numeric_field("value"))
            .build(&rows);

        let continents = tree
            .children(tree.root())
            .iter()
            .map(|id| tree.node(*id).name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(continents, ["Europe", "Asia"]);
        assert_eq!(tree.value(tree.children(tree.root())[0]), 4.0);
    }

    #[test]
    fn terminal_groups_sum_duplicate_keys() {
        let rows = vec![
            row("X", "A", 4.0.into()),
            row("X", "A", 6.0.into()),
            row("X", "B", "oops".into()),
        ];
        let tree = HierarchyBuilder::new("World")
            .group_by(field("Continent"))
            .group_by(field("Country"))
            .value(numeric_field("value"))
            .build(&rows);

        let x = tree.children(tree.root())[0];
        let values = tree
            .children(x)
            .iter()
            .map(|id| tree.value(*id))
            .collect::<Vec<_>>();
        assert_eq!(values, [10.0, 0.0]);
    }

    #[test]
    fn leaf_names_make_one_leaf_per_record() {
        let rows = vec![row("X", "A", 4.0.into()), row("X", "B", 6.0.into())];
        let tree = HierarchyBuilder::new("World")
            .group_by(field("Continent"))
            .leaf_name(field("Country"))
            .value(numeric_field("value"))
            .build(&rows);

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.value(tree.root()), 10.0);
    }

    #[test]
    fn empty_input_yields_zero_root() {
        let tree = HierarchyBuilder::new("World")
            .group_by(field("Continent"))
            .value(numeric_field("value"))
            .build(&[]);
        assert!(tree.is_empty());
        assert_eq!(tree.value(tree.root()), 0.0);
    }

    #[test]
    fn no_keys_sums_into_root() {
        let rows = vec![row("X", "A", 4.0.into()), row("Y", "B", 6.0.into())];
        let tree = HierarchyBuilder::new("All")
            .value(numeric_field("value"))
            .build(&rows);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.value(tree.root()), 10.0);
    }
}
