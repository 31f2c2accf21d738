#![forbid(unsafe_code)]
//! plot_layout: field plot geometry from versioned blueprints or parametric
//! configurations, plus constrained placement of point observations.
//!
//! Modules:
//! - shape, node: shape and node model (definitions and resolved instances)
//! - id: structural paths, stable and ephemeral node ids
//! - blueprint: versioned blueprints and the registry seam
//! - layout: static and dynamic generators, plot sources
//! - placement: explicit and rejection-sampled observation placement
//! - traverse: shared tree walks (lookup, label maps, areas)
//! - events: structured diagnostics channel
//! - validate: boundary checks for dimensions
//!
//! For examples and docs, see README and docs.rs.
pub mod blueprint;
pub mod error;
pub mod events;
pub mod id;
pub mod layout;
pub mod node;
pub mod placement;
pub mod shape;
pub mod traverse;
pub mod validate;

/// Convenient re-exports for common types. Import with `use plot_layout::prelude::*;`.
pub mod prelude {
    pub use crate::blueprint::{Blueprint, BlueprintRegistry, InMemoryBlueprintRegistry};
    pub use crate::error::{Error, Result};
    pub use crate::events::{
        EventSink, FilterSink, FnSink, LayoutEvent, LayoutEventKind, MultiSink, VecSink,
    };
    pub use crate::id::{ephemeral_id, stable_id, StructuralPath};
    pub use crate::layout::config::{
        GridConfig, GridLabelStyle, PlacementRules, PlotConfiguration, PlotDimensions, PlotShape,
        SubplotPosition, SubplotRule, SubplotRuleType, SubplotsConfig,
    };
    pub use crate::layout::dynamic_gen::{generate_dynamic, EphemeralLayout, SubplotOutcome};
    pub use crate::layout::static_gen::{generate_static, StaticOptions};
    pub use crate::layout::{resolve_layout, PlotSource, ResolvedLayout, UnitProgressSeed};
    pub use crate::node::{
        ChildPosition, ChildrenGenerator, ColOrder, FixedChild, GridSpec, NodeDefinition,
        NodeInstance, NodeRole, NodeType, RowOrder,
    };
    pub use crate::placement::{
        place_observations, DisplayTransform, FixedRadius, LinearClampedRadius, Observation,
        PlacedObservation, PlacementOptions, PlacementResult, PlacementSource, RadiusModel,
        StepTableRadius, TreeObservation,
    };
    pub use crate::shape::{Anchor, Bounds, Dimensions, ShapeDefinition};
    pub use crate::traverse;
}
