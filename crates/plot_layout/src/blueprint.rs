//! Versioned plot blueprints and the registry collaborators use to resolve them.
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::node::NodeDefinition;

/// Reusable, versioned plot layout template.
///
/// A published `(id, version)` pair never changes; layout edits ship as a new
/// version so historical plots regenerate exactly as recorded.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Blueprint {
    pub id: String,
    pub version: u32,
    pub name: String,
    pub root: NodeDefinition,
}

impl Blueprint {
    pub fn new(
        id: impl Into<String>,
        version: u32,
        name: impl Into<String>,
        root: NodeDefinition,
    ) -> Self {
        Self {
            id: id.into(),
            version,
            name: name.into(),
            root,
        }
    }
}

/// Source of blueprints. A miss is `None`, never an error.
pub trait BlueprintRegistry: Send + Sync {
    /// Latest published version of `id`.
    fn get(&self, id: &str) -> Option<&Blueprint>;

    /// A specific published version of `id`.
    fn get_version(&self, id: &str, version: u32) -> Option<&Blueprint>;
}

/// Registry keeping every published version in memory.
#[derive(Default)]
#[non_exhaustive]
pub struct InMemoryBlueprintRegistry {
    blueprints: HashMap<String, Vec<Blueprint>>,
}

impl InMemoryBlueprintRegistry {
    pub fn new() -> Self {
        Self {
            blueprints: HashMap::new(),
        }
    }

    /// Publishes a blueprint.
    ///
    /// Returns `false` and leaves the registry untouched when the same
    /// `(id, version)` is already published with different content.
    pub fn publish(&mut self, blueprint: Blueprint) -> bool {
        let versions = self.blueprints.entry(blueprint.id.clone()).or_default();
        if let Some(existing) = versions.iter().find(|b| b.version == blueprint.version) {
            if *existing != blueprint {
                warn!(
                    "Blueprint '{}' version {} is already published; ignoring changed content.",
                    blueprint.id, blueprint.version
                );
                return false;
            }
            return true;
        }
        versions.push(blueprint);
        versions.sort_by_key(|b| b.version);
        true
    }

    pub fn len(&self) -> usize {
        self.blueprints.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }
}

impl BlueprintRegistry for InMemoryBlueprintRegistry {
    fn get(&self, id: &str) -> Option<&Blueprint> {
        self.blueprints.get(id).and_then(|v| v.last())
    }

    fn get_version(&self, id: &str, version: u32) -> Option<&Blueprint> {
        self.blueprints
            .get(id)
            .and_then(|v| v.iter().find(|b| b.version == version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeDefinition;

    fn blueprint(version: u32, width: f32) -> Blueprint {
        Blueprint::new(
            "square",
            version,
            "Square plot",
            NodeDefinition::container(ShapeDefinition::rectangle(width, width)),
        )
    }

    #[test]
    fn get_returns_latest_version() {
        let mut registry = InMemoryBlueprintRegistry::new();
        assert!(registry.publish(blueprint(2, 30.0)));
        assert!(registry.publish(blueprint(1, 20.0)));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("square").map(|b| b.version), Some(2));
        assert_eq!(
            registry.get_version("square", 1).map(|b| b.root.shape),
            Some(ShapeDefinition::rectangle(20.0, 20.0))
        );
    }

    #[test]
    fn published_versions_are_immutable() {
        let mut registry = InMemoryBlueprintRegistry::new();
        assert!(registry.publish(blueprint(1, 20.0)));
        assert!(registry.publish(blueprint(1, 20.0)));
        assert!(!registry.publish(blueprint(1, 25.0)));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get_version("square", 1).map(|b| b.root.shape),
            Some(ShapeDefinition::rectangle(20.0, 20.0))
        );
    }

    #[test]
    fn misses_are_none() {
        let registry = InMemoryBlueprintRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("nope").is_none());
        assert!(registry.get_version("nope", 1).is_none());
    }
}
