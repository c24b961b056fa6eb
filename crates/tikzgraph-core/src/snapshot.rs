//! Plain, serializable copy of a graph

use serde::{Deserialize, Serialize};

use crate::data::ElementData;
use crate::error::Result;
use crate::model::{Edge, Node, Rect};

/// Everything needed to rebuild a [`Graph`](crate::Graph).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub data: ElementData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<Rect>,
}

impl GraphSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bend, Point};

    #[test]
    fn test_parses_minimal_json() {
        let json = r#"{
            "nodes": [
                { "id": 1, "name": "a", "point": { "x": 0.0, "y": 0.0 } },
                { "id": 2, "point": { "x": 1.0, "y": 0.5 }, "data": [{ "key": "style", "value": "red" }] }
            ],
            "edges": [
                { "id": 7, "source": 1, "target": 2, "bend": { "mode": "basic", "bend": 30 } }
            ]
        }"#;
        let snapshot = GraphSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[0].name, "a");
        assert_eq!(snapshot.nodes[1].point, Point::new(1.0, 0.5));
        assert_eq!(snapshot.nodes[1].data.get("style"), Some("red"));
        assert_eq!(snapshot.edges[0].bend, Bend::Basic { bend: 30 });
        assert_eq!(snapshot.bounding_box, None);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(GraphSnapshot::from_json("{ \"nodes\": 3 }").is_err());
    }
}
