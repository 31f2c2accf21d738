//! Layout generation: turning a blueprint or a parametric configuration into a
//! resolved [`NodeInstance`] tree.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::blueprint::BlueprintRegistry;
use crate::error::{Error, Result};
use crate::events::EventSink;
use crate::node::NodeInstance;
use crate::traverse;

pub mod config;
pub mod dynamic_gen;
pub mod static_gen;

use config::PlotConfiguration;
use dynamic_gen::EphemeralLayout;
use static_gen::StaticOptions;

/// The layout inputs persisted on a plot record.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum PlotSource {
    Blueprint { id: String, version: u32 },
    Configuration(PlotConfiguration),
}

/// Minimal record a caller persists per sampling unit right after plot creation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitProgressSeed {
    pub unit_id: String,
    pub label: String,
    pub path: String,
}

impl UnitProgressSeed {
    /// One seed per sampling unit under `root`, in pre-order.
    pub fn collect(root: &NodeInstance) -> Vec<UnitProgressSeed> {
        traverse::sampling_units(root)
            .into_iter()
            .map(|n| UnitProgressSeed {
                unit_id: n.id.clone(),
                label: n.label.clone(),
                path: n.path.clone(),
            })
            .collect()
    }
}

/// A generated layout, tagged with whether its ids survive regeneration.
#[derive(Debug, Clone)]
pub enum ResolvedLayout {
    /// Ids derived from the blueprint identity; identical on every regeneration.
    Stable(NodeInstance),
    /// Ids minted for this generation only.
    Ephemeral(EphemeralLayout),
}

impl ResolvedLayout {
    pub fn root(&self) -> &NodeInstance {
        match self {
            ResolvedLayout::Stable(root) => root,
            ResolvedLayout::Ephemeral(layout) => layout.root(),
        }
    }

    pub fn has_stable_ids(&self) -> bool {
        matches!(self, ResolvedLayout::Stable(_))
    }

    pub fn unit_progress_seeds(&self) -> Vec<UnitProgressSeed> {
        UnitProgressSeed::collect(self.root())
    }
}

/// Generates the layout of plot `plot_id` from its persisted source.
///
/// Dimensions are validated before generation. A blueprint reference that the
/// registry cannot resolve is an [`Error::UnknownBlueprint`].
pub fn resolve_layout(
    plot_id: &str,
    source: &PlotSource,
    registry: &dyn BlueprintRegistry,
    sink: &mut dyn EventSink,
) -> Result<ResolvedLayout> {
    match source {
        PlotSource::Blueprint { id, version } => {
            let Some(blueprint) = registry.get_version(id, *version) else {
                warn!(
                    "Plot '{}' references unknown blueprint '{}' v{}.",
                    plot_id, id, version
                );
                return Err(Error::UnknownBlueprint {
                    id: id.clone(),
                    version: *version,
                });
            };
            let options = StaticOptions::new().with_plot_id(plot_id);
            static_gen::generate_static_validated(blueprint, &options, sink)
                .map(ResolvedLayout::Stable)
        }
        PlotSource::Configuration(config) => {
            dynamic_gen::generate_dynamic_validated(config, plot_id, sink)
                .map(ResolvedLayout::Ephemeral)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{Blueprint, InMemoryBlueprintRegistry};
    use crate::layout::config::GridLabelStyle;
    use crate::node::{GridSpec, NodeDefinition};
    use crate::shape::ShapeDefinition;

    fn registry() -> InMemoryBlueprintRegistry {
        let mut registry = InMemoryBlueprintRegistry::new();
        registry.publish(Blueprint::new(
            "quad",
            1,
            "Quadrants",
            NodeDefinition::container(ShapeDefinition::rectangle(20.0, 20.0))
                .with_grid(GridSpec::new(2, 2)),
        ));
        registry
    }

    #[test]
    fn blueprint_source_yields_stable_layout() {
        let source = PlotSource::Blueprint {
            id: "quad".into(),
            version: 1,
        };
        let a = resolve_layout("plot-7", &source, &registry(), &mut ()).unwrap();
        let b = resolve_layout("plot-7", &source, &registry(), &mut ()).unwrap();
        assert!(a.has_stable_ids());
        assert_eq!(a.root(), b.root());
        let seeds = a.unit_progress_seeds();
        assert_eq!(seeds.len(), 4);
        assert_eq!(seeds[0].label, "Q1");
        assert_eq!(seeds[0].path, "root/r0c0");
    }

    #[test]
    fn configuration_source_yields_ephemeral_layout() {
        let source = PlotSource::Configuration(
            PlotConfiguration::rectangle(20.0, 20.0).with_grid(2, 2, GridLabelStyle::Quadrants),
        );
        let layout = resolve_layout("plot-7", &source, &registry(), &mut ()).unwrap();
        assert!(!layout.has_stable_ids());
        assert_eq!(layout.unit_progress_seeds().len(), 4);
    }

    #[test]
    fn unknown_blueprint_is_an_error() {
        let source = PlotSource::Blueprint {
            id: "quad".into(),
            version: 9,
        };
        let err = resolve_layout("plot-7", &source, &registry(), &mut ()).unwrap_err();
        assert!(matches!(err, Error::UnknownBlueprint { version: 9, .. }));
    }

    #[test]
    fn invalid_configuration_is_rejected_before_generation() {
        let source = PlotSource::Configuration(PlotConfiguration::rectangle(-1.0, 20.0));
        let err = resolve_layout("plot-7", &source, &registry(), &mut ()).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { .. }));
    }
}
