//! Static layout generator: resolves a published [`Blueprint`] into a node tree
//! with stable ids and absolute offsets.
//!
//! Generation is a recursive descent. Each node receives its shape and origin
//! from its parent, gets a stable id from its structural path, then runs its
//! children generator:
//!
//! - `GRID` splits a rectangle into `rows x cols` equal cells.
//! - `NESTED` centers a single child.
//! - `FIXED_LIST` positions children by anchor pairs plus a metric offset.
//!
//! Mismatches (e.g. a grid on a circle) leave the node childless and are
//! reported through the [`EventSink`]; generation itself never fails.
use glam::Vec2;
use tracing::{debug, warn};

use crate::blueprint::Blueprint;
use crate::error::Result;
use crate::events::{EventSink, LayoutEvent, LayoutEventKind};
use crate::id::{stable_id, StructuralPath};
use crate::node::{
    ChildrenGenerator, ColOrder, FixedChild, GridSpec, NodeDefinition, NodeInstance, NodeRole,
    RowOrder,
};
use crate::shape::{Anchor, ShapeDefinition};
use crate::traverse;

/// Slack allowed before a child counts as outside its parent, in meters.
const BOUNDS_TOLERANCE: f32 = 1e-3;

/// Inputs to static generation besides the blueprint itself.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct StaticOptions {
    /// Replaces the blueprint's root shape, e.g. a plot measured larger in the field.
    pub root_shape_override: Option<ShapeDefinition>,
    /// Plot the layout belongs to; seeds the stable ids.
    pub plot_id: Option<String>,
}

impl StaticOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plot_id(mut self, plot_id: impl Into<String>) -> Self {
        self.plot_id = Some(plot_id.into());
        self
    }

    pub fn with_root_shape(mut self, shape: ShapeDefinition) -> Self {
        self.root_shape_override = Some(shape);
        self
    }
}

/// Resolves `blueprint` into its instance tree.
pub fn generate_static(
    blueprint: &Blueprint,
    options: &StaticOptions,
    sink: &mut dyn EventSink,
) -> NodeInstance {
    if sink.wants(LayoutEventKind::GenerationStarted) {
        sink.send(LayoutEvent::GenerationStarted {
            source: blueprint.id.clone(),
            plot_id: options.plot_id.clone(),
        });
    }

    let ctx = StaticContext {
        blueprint_id: &blueprint.id,
        blueprint_version: blueprint.version,
        plot_id: options.plot_id.as_deref(),
    };
    let root_shape = options.root_shape_override.unwrap_or(blueprint.root.shape);
    let mut root = resolve_node(
        &ctx,
        &blueprint.root,
        root_shape,
        Vec2::ZERO,
        StructuralPath::root(),
        blueprint
            .root
            .label
            .clone()
            .unwrap_or_else(|| blueprint.name.clone()),
        sink,
    );
    if root.role.is_none() {
        root.role = Some(NodeRole::MainPlot);
    }

    let node_count = traverse::node_count(&root);
    let sampling_unit_count = traverse::sampling_unit_count(&root);
    debug!(
        "Blueprint '{}' v{} resolved: {} nodes, {} sampling units.",
        blueprint.id, blueprint.version, node_count, sampling_unit_count
    );
    if sink.wants(LayoutEventKind::GenerationFinished) {
        sink.send(LayoutEvent::GenerationFinished {
            node_count,
            sampling_unit_count,
        });
    }
    root
}

/// Validates dimensions at the boundary, then generates.
pub fn generate_static_validated(
    blueprint: &Blueprint,
    options: &StaticOptions,
    sink: &mut dyn EventSink,
) -> Result<NodeInstance> {
    crate::validate::validate_blueprint(blueprint)?;
    if let Some(shape) = &options.root_shape_override {
        crate::validate::validate_shape(shape, "root")?;
    }
    Ok(generate_static(blueprint, options, sink))
}

struct StaticContext<'a> {
    blueprint_id: &'a str,
    blueprint_version: u32,
    plot_id: Option<&'a str>,
}

fn resolve_node(
    ctx: &StaticContext<'_>,
    def: &NodeDefinition,
    shape: ShapeDefinition,
    origin: Vec2,
    path: StructuralPath,
    label: String,
    sink: &mut dyn EventSink,
) -> NodeInstance {
    let children = match &def.children {
        None => Vec::new(),
        Some(ChildrenGenerator::Grid(grid)) => grid_children(ctx, grid, shape, origin, &path, sink),
        Some(ChildrenGenerator::Nested { child }) => {
            vec![nested_child(ctx, child, shape, origin, &path, sink)]
        }
        Some(ChildrenGenerator::FixedList { children }) => {
            fixed_children(ctx, children, shape, origin, &path, sink)
        }
    };

    NodeInstance {
        id: stable_id(ctx.plot_id, ctx.blueprint_id, ctx.blueprint_version, &path),
        blueprint_id: ctx.blueprint_id.to_owned(),
        blueprint_version: ctx.blueprint_version,
        plot_id: ctx.plot_id.map(str::to_owned),
        node_type: def.node_type,
        label,
        code: def.code.clone(),
        path: path.to_string(),
        shape,
        x: origin.x,
        y: origin.y,
        rotation: None,
        role: def.role.clone(),
        tags: def.tags.clone(),
        children,
    }
}

/// Label of a node without a generator-assigned one.
fn default_label(def: &NodeDefinition, path: &StructuralPath) -> String {
    def.label
        .clone()
        .or_else(|| def.code.clone())
        .unwrap_or_else(|| path.last_segment().to_owned())
}

fn grid_children(
    ctx: &StaticContext<'_>,
    grid: &GridSpec,
    parent_shape: ShapeDefinition,
    parent_origin: Vec2,
    parent_path: &StructuralPath,
    sink: &mut dyn EventSink,
) -> Vec<NodeInstance> {
    let ShapeDefinition::Rectangle { width, length } = parent_shape else {
        report_mismatch("GRID", &parent_shape, parent_path, sink);
        return Vec::new();
    };
    if grid.rows == 0 || grid.cols == 0 {
        warn!("Grid at '{}' has zero rows or columns.", parent_path);
        if sink.wants(LayoutEventKind::Warning) {
            sink.send(LayoutEvent::Warning {
                context: parent_path.to_string(),
                message: format!("grid {}x{} produces no cells", grid.rows, grid.cols),
            });
        }
        return Vec::new();
    }

    let rows = grid.rows as f32;
    let cols = grid.cols as f32;
    let cell_shape = ShapeDefinition::rectangle(width / cols, length / rows);
    let default_cell = NodeDefinition::sampling_unit(cell_shape).with_role(NodeRole::Quadrant);
    let template = grid.cell.as_deref().unwrap_or(&default_cell);

    let mut out = Vec::with_capacity((grid.rows * grid.cols) as usize);
    for r in 0..grid.rows {
        let row_slot = match grid.row_order {
            RowOrder::TopToBottom => grid.rows - 1 - r,
            RowOrder::BottomToTop => r,
        };
        for c in 0..grid.cols {
            let col_slot = match grid.col_order {
                ColOrder::LeftToRight => c,
                ColOrder::RightToLeft => grid.cols - 1 - c,
            };
            let origin = parent_origin
                + Vec2::new(
                    width * col_slot as f32 / cols,
                    length * row_slot as f32 / rows,
                );
            let mut cell = resolve_node(
                ctx,
                template,
                cell_shape,
                origin,
                parent_path.grid_cell(r, c),
                grid.label_for(r, c),
                sink,
            );
            if cell.role.is_none() {
                cell.role = Some(NodeRole::Quadrant);
            }
            out.push(cell);
        }
    }
    out
}

fn nested_child(
    ctx: &StaticContext<'_>,
    child: &NodeDefinition,
    parent_shape: ShapeDefinition,
    parent_origin: Vec2,
    parent_path: &StructuralPath,
    sink: &mut dyn EventSink,
) -> NodeInstance {
    // Centering the bounding boxes gives ((W-w)/2, (L-l)/2) for rectangles and
    // (R-r, R-r) for circles.
    let offset =
        (parent_shape.dimensions().as_vec2() - child.shape.dimensions().as_vec2()) * 0.5;
    let path = parent_path.nested();
    let label = default_label(child, &path);
    let node = resolve_node(
        ctx,
        child,
        child.shape,
        parent_origin + offset,
        path,
        label,
        sink,
    );
    check_within_parent(&node, parent_shape, parent_origin, sink);
    node
}

fn fixed_children(
    ctx: &StaticContext<'_>,
    children: &[FixedChild],
    parent_shape: ShapeDefinition,
    parent_origin: Vec2,
    parent_path: &StructuralPath,
    sink: &mut dyn EventSink,
) -> Vec<NodeInstance> {
    children
        .iter()
        .enumerate()
        .map(|(i, fixed)| {
            let pivot = parent_shape.anchor_point(fixed.position.parent_anchor);
            let child_anchor = fixed.position.child_anchor.unwrap_or(Anchor::Center);
            let local = pivot - fixed.definition.shape.anchor_point(child_anchor)
                + fixed.position.offset();
            let path = parent_path.fixed_child(i);
            let label = default_label(&fixed.definition, &path);
            let node = resolve_node(
                ctx,
                &fixed.definition,
                fixed.definition.shape,
                parent_origin + local,
                path,
                label,
                sink,
            );
            check_within_parent(&node, parent_shape, parent_origin, sink);
            node
        })
        .collect()
}

fn report_mismatch(
    generator: &'static str,
    shape: &ShapeDefinition,
    path: &StructuralPath,
    sink: &mut dyn EventSink,
) {
    warn!(
        "{} generator needs a RECTANGLE parent, got {} at '{}'; leaving node childless.",
        generator,
        shape.kind_name(),
        path
    );
    if sink.wants(LayoutEventKind::GeneratorShapeMismatch) {
        sink.send(LayoutEvent::GeneratorShapeMismatch {
            path: path.to_string(),
            generator,
            shape: shape.kind_name(),
        });
    }
}

/// Out-of-bounds children are kept as authored and reported.
fn check_within_parent(
    child: &NodeInstance,
    parent_shape: ShapeDefinition,
    parent_origin: Vec2,
    sink: &mut dyn EventSink,
) {
    let parent_bounds = crate::shape::Bounds::from_origin_size(
        parent_origin,
        parent_shape.dimensions().as_vec2(),
    );
    if parent_bounds.contains_bounds(&child.bounds(), BOUNDS_TOLERANCE) {
        return;
    }
    debug!("Child '{}' ({}) extends beyond its parent.", child.label, child.path);
    if sink.wants(LayoutEventKind::ChildOutOfBounds) {
        sink.send(LayoutEvent::ChildOutOfBounds {
            path: child.path.clone(),
            label: child.label.clone(),
        });
    }
}
