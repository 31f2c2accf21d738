//! Dynamic layout generator: builds a node tree straight from a parametric
//! [`PlotConfiguration`], without a registered blueprint.
//!
//! A configuration has no published `(id, version)` to hash, so every call
//! mints fresh random ids. Ids in an [`EphemeralLayout`] are only meaningful
//! within that one generation; callers that need persistent per-unit identity
//! capture them immediately (see [`EphemeralLayout::unit_progress_seeds`]).
use glam::Vec2;
use tracing::{debug, warn};

use crate::error::Result;
use crate::events::{EventSink, LayoutEvent, LayoutEventKind};
use crate::id::{ephemeral_id, StructuralPath};
use crate::layout::config::{
    GridLabelStyle, PlotConfiguration, SubplotPosition, SubplotRule, SubplotRuleType,
};
use crate::layout::UnitProgressSeed;
use crate::node::{NodeInstance, NodeRole, NodeType, EXCLUDES_CANOPY_TAG};
use crate::shape::ShapeDefinition;
use crate::traverse;

/// Blueprint id recorded on dynamically generated nodes.
pub const DYNAMIC_BLUEPRINT_ID: &str = "dynamic";

/// Blueprint version recorded on dynamically generated nodes.
pub const DYNAMIC_BLUEPRINT_VERSION: u32 = 0;

/// What became of one subplot rule.
#[derive(Debug, Clone, PartialEq)]
pub enum SubplotOutcome {
    Generated {
        rule_index: usize,
        unit_id: String,
    },
    /// The rule type is accepted by the schema but has no placement implementation.
    NotImplemented {
        rule_index: usize,
        rule_type: SubplotRuleType,
    },
}

/// Output of the dynamic generator.
///
/// Deliberately not comparable: two generations of the same configuration
/// carry different ids, so comparing trees across calls is meaningless.
#[derive(Debug, Clone)]
pub struct EphemeralLayout {
    root: NodeInstance,
    subplot_outcomes: Vec<SubplotOutcome>,
}

impl EphemeralLayout {
    pub fn root(&self) -> &NodeInstance {
        &self.root
    }

    pub fn subplot_outcomes(&self) -> &[SubplotOutcome] {
        &self.subplot_outcomes
    }

    /// Rules that were accepted but not generated.
    pub fn unimplemented_rules(&self) -> impl Iterator<Item = (usize, SubplotRuleType)> + '_ {
        self.subplot_outcomes.iter().filter_map(|o| match o {
            SubplotOutcome::NotImplemented {
                rule_index,
                rule_type,
            } => Some((*rule_index, *rule_type)),
            SubplotOutcome::Generated { .. } => None,
        })
    }

    /// Ids of every sampling unit, in pre-order.
    pub fn unit_ids(&self) -> Vec<String> {
        traverse::sampling_units(&self.root)
            .into_iter()
            .map(|n| n.id.clone())
            .collect()
    }

    /// One seed per sampling unit, to be persisted as progress records right
    /// after the plot is created.
    pub fn unit_progress_seeds(&self) -> Vec<UnitProgressSeed> {
        UnitProgressSeed::collect(&self.root)
    }

    /// Takes ownership of the tree once its ids have been persisted.
    pub fn capture(self) -> NodeInstance {
        self.root
    }
}

/// Builds the layout for `config` on plot `plot_id`.
pub fn generate_dynamic(
    config: &PlotConfiguration,
    plot_id: &str,
    sink: &mut dyn EventSink,
) -> EphemeralLayout {
    if sink.wants(LayoutEventKind::GenerationStarted) {
        sink.send(LayoutEvent::GenerationStarted {
            source: "configuration".into(),
            plot_id: Some(plot_id.to_owned()),
        });
    }

    let plot_shape = round_shape(config.plot_shape());
    let root_path = StructuralPath::root();
    let mut root = new_node(
        plot_id,
        NodeType::Container,
        "Main Plot".into(),
        &root_path,
        plot_shape,
        Vec2::ZERO,
    );
    root.role = Some(NodeRole::MainPlot);

    if config.grid.enabled {
        root.children
            .extend(grid_cells(config, plot_id, plot_shape, &root_path, sink));
    }

    let mut subplot_outcomes = Vec::new();
    if config.subplots.enabled {
        for (i, rule) in config.subplots.rules.iter().enumerate() {
            match rule.rule_type {
                SubplotRuleType::Fixed => {
                    let unit = fixed_subplot(rule, i, plot_id, plot_shape, &root_path);
                    subplot_outcomes.push(SubplotOutcome::Generated {
                        rule_index: i,
                        unit_id: unit.id.clone(),
                    });
                    root.children.push(unit);
                }
                SubplotRuleType::Random => {
                    warn!("Subplot rule {} uses random placement, which is not implemented.", i);
                    if sink.wants(LayoutEventKind::SubplotNotImplemented) {
                        sink.send(LayoutEvent::SubplotNotImplemented {
                            rule_index: i,
                            rule_type: rule.rule_type,
                        });
                    }
                    subplot_outcomes.push(SubplotOutcome::NotImplemented {
                        rule_index: i,
                        rule_type: rule.rule_type,
                    });
                }
            }
        }
    }

    let node_count = traverse::node_count(&root);
    let sampling_unit_count = traverse::sampling_unit_count(&root);
    debug!(
        "Configuration for plot '{}' resolved: {} nodes, {} sampling units.",
        plot_id, node_count, sampling_unit_count
    );
    if sink.wants(LayoutEventKind::GenerationFinished) {
        sink.send(LayoutEvent::GenerationFinished {
            node_count,
            sampling_unit_count,
        });
    }

    EphemeralLayout {
        root,
        subplot_outcomes,
    }
}

/// Validates dimensions at the boundary, then generates.
pub fn generate_dynamic_validated(
    config: &PlotConfiguration,
    plot_id: &str,
    sink: &mut dyn EventSink,
) -> Result<EphemeralLayout> {
    config.validate()?;
    Ok(generate_dynamic(config, plot_id, sink))
}

/// Label of grid cell (`r`, `c`), with `r` counted from the bottom row.
///
/// A row outside `0..rows` is numbered as if it were the top row.
pub fn grid_label(style: GridLabelStyle, rows: u32, cols: u32, r: u32, c: u32) -> String {
    match style {
        GridLabelStyle::Quadrants => {
            let from_top = rows.saturating_sub(r.saturating_add(1));
            format!("Q{}", from_top * cols + c + 1)
        }
        GridLabelStyle::Matrix => format!("{},{}", r + 1, c + 1),
        GridLabelStyle::Cell => format!("Cell {r}-{c}"),
    }
}

fn grid_cells(
    config: &PlotConfiguration,
    plot_id: &str,
    plot_shape: ShapeDefinition,
    root_path: &StructuralPath,
    sink: &mut dyn EventSink,
) -> Vec<NodeInstance> {
    let ShapeDefinition::Rectangle { width, length } = plot_shape else {
        warn!(
            "Grid requested on a {} plot '{}'; no cells generated.",
            plot_shape.kind_name(),
            plot_id
        );
        if sink.wants(LayoutEventKind::GeneratorShapeMismatch) {
            sink.send(LayoutEvent::GeneratorShapeMismatch {
                path: root_path.to_string(),
                generator: "GRID",
                shape: plot_shape.kind_name(),
            });
        }
        return Vec::new();
    };
    let (rows, cols) = (config.grid.rows, config.grid.cols);
    if rows == 0 || cols == 0 {
        warn!("Grid {}x{} on plot '{}' produces no cells.", rows, cols, plot_id);
        if sink.wants(LayoutEventKind::Warning) {
            sink.send(LayoutEvent::Warning {
                context: root_path.to_string(),
                message: format!("grid {rows}x{cols} produces no cells"),
            });
        }
        return Vec::new();
    }

    let cell_shape = ShapeDefinition::rectangle(
        round2(width / cols as f32),
        round2(length / rows as f32),
    );
    let mut out = Vec::with_capacity((rows * cols) as usize);
    for r in 0..rows {
        for c in 0..cols {
            let origin = Vec2::new(
                round2(width * c as f32 / cols as f32),
                round2(length * r as f32 / rows as f32),
            );
            let mut cell = new_node(
                plot_id,
                NodeType::SamplingUnit,
                grid_label(config.grid.label_style, rows, cols, r, c),
                &root_path.grid_cell(r, c),
                cell_shape,
                origin,
            );
            cell.role = Some(NodeRole::Quadrant);
            out.push(cell);
        }
    }
    out
}

fn fixed_subplot(
    rule: &SubplotRule,
    index: usize,
    plot_id: &str,
    plot_shape: ShapeDefinition,
    root_path: &StructuralPath,
) -> NodeInstance {
    let shape = round_shape(rule.dimensions.to_shape(rule.shape));
    let plot = plot_shape.dimensions().as_vec2();
    let sub = shape.dimensions().as_vec2();
    let free = plot - sub;
    let offset = match rule.position {
        SubplotPosition::BottomLeft => Vec2::ZERO,
        SubplotPosition::BottomRight => Vec2::new(free.x, 0.0),
        SubplotPosition::TopLeft => Vec2::new(0.0, free.y),
        SubplotPosition::TopRight => free,
        SubplotPosition::Center => free * 0.5,
    };

    let label = rule
        .label
        .clone()
        .unwrap_or_else(|| format!("Subplot {}", index + 1));
    let mut unit = new_node(
        plot_id,
        NodeType::SamplingUnit,
        label,
        &root_path.subplot(index),
        shape,
        Vec2::new(round2(offset.x), round2(offset.y)),
    );
    unit.role = Some(NodeRole::Subplot);
    unit.tags = rule.strata.clone();
    if rule.excludes_canopy {
        unit.tags.push(EXCLUDES_CANOPY_TAG.to_owned());
    }
    unit
}

fn new_node(
    plot_id: &str,
    node_type: NodeType,
    label: String,
    path: &StructuralPath,
    shape: ShapeDefinition,
    origin: Vec2,
) -> NodeInstance {
    NodeInstance {
        id: ephemeral_id(),
        blueprint_id: DYNAMIC_BLUEPRINT_ID.to_owned(),
        blueprint_version: DYNAMIC_BLUEPRINT_VERSION,
        plot_id: Some(plot_id.to_owned()),
        node_type,
        label,
        code: None,
        path: path.to_string(),
        shape,
        x: origin.x,
        y: origin.y,
        rotation: None,
        role: None,
        tags: Vec::new(),
        children: Vec::new(),
    }
}

/// Rounds to centimeters to bound drift across repeated generation.
fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

fn round_shape(shape: ShapeDefinition) -> ShapeDefinition {
    match shape {
        ShapeDefinition::Rectangle { width, length } => {
            ShapeDefinition::rectangle(round2(width), round2(length))
        }
        ShapeDefinition::Circle { radius } => ShapeDefinition::circle(round2(radius)),
        other => other,
    }
}
