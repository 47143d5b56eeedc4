use serde::Deserialize;

use super::records::FieldValue;

/// `{nodes: [{id, group}], links: [{source, target}]}` graph document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeSpec {
    pub id: FieldValue,
    #[serde(default)]
    pub group: FieldValue,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LinkSpec {
    pub source: FieldValue,
    pub target: FieldValue,
}

impl NodeSpec {
    pub fn key(&self) -> String {
        self.id.as_key()
    }

    /// Display label: explicit name, falling back to the id.
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_id_types() {
        let document: GraphDocument = serde_json::from_str(
            r#"{
                "nodes": [{"id": "a", "group": 1}, {"id": 2, "name": "Two"}],
                "links": [{"source": "a", "target": 2}]
            }"#,
        )
        .unwrap();

        assert_eq!(document.nodes[0].key(), "a");
        assert_eq!(document.nodes[0].group.as_key(), "1");
        assert_eq!(document.nodes[1].label(), "Two");
        assert_eq!(document.links[0].target.as_key(), "2");
    }
}
