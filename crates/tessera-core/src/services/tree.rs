use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kernel::constants::COMPONENTS_TREE_KEY;
use crate::services::error::ServiceError;

/// One node of the component tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentNode {
    pub component_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default)]
    pub children: Vec<ComponentNode>,
}

/// Component tree described by a schema's `componentsTree` entry, which may
/// be a single node or a list of root nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentTree {
    roots: Vec<ComponentNode>,
}

impl ComponentTree {
    pub fn new(roots: Vec<ComponentNode>) -> Self {
        Self { roots }
    }

    /// Build the tree from a schema. A schema without `componentsTree` gives
    /// an empty tree.
    pub fn from_schema(schema: &Value) -> Result<Self, ServiceError> {
        let Some(tree) = schema.get(COMPONENTS_TREE_KEY) else {
            return Ok(Self::default());
        };
        let parsed = match tree {
            Value::Object(_) => serde_json::from_value(tree.clone()).map(|node| vec![node]),
            _ => serde_json::from_value(tree.clone()),
        };
        let roots = parsed.map_err(|e| ServiceError::InvalidSchema {
            reason: format!("{}: {}", COMPONENTS_TREE_KEY, e),
        })?;
        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[ComponentNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _| count += 1);
        count
    }

    /// Depth-first, pre-order visit of every node with its depth.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&ComponentNode, usize),
    {
        fn go<F: FnMut(&ComponentNode, usize)>(node: &ComponentNode, depth: usize, visit: &mut F) {
            visit(node, depth);
            for child in &node.children {
                go(child, depth + 1, visit);
            }
        }
        for root in &self.roots {
            go(root, 0, &mut visit);
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&ComponentNode> {
        fn find<'a>(nodes: &'a [ComponentNode], id: &str) -> Option<&'a ComponentNode> {
            nodes.iter().find_map(|node| {
                if node.id.as_deref() == Some(id) {
                    Some(node)
                } else {
                    find(&node.children, id)
                }
            })
        }
        find(&self.roots, id)
    }
}
