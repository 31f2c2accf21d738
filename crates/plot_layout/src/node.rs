//! Node definitions (templates owned by blueprints) and resolved node instances.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::shape::{Anchor, Bounds, ShapeDefinition};

/// Tag carried by sampling units that must not receive canopy-scale observations.
pub const EXCLUDES_CANOPY_TAG: &str = "excludes-canopy";

/// Default label pattern for grid cells.
pub const DEFAULT_GRID_LABEL_PATTERN: &str = "Q{idx}";

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Container,
    SamplingUnit,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    MainPlot,
    Quadrant,
    Subplot,
    Other(String),
}

/// Vertical ordering of grid rows.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowOrder {
    /// Row 0 is the row with the highest `y`.
    #[default]
    TopToBottom,
    BottomToTop,
}

/// Horizontal ordering of grid columns.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColOrder {
    /// Column 0 starts at `x = 0`.
    #[default]
    LeftToRight,
    RightToLeft,
}

/// Uniform grid partition of a rectangular parent.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
    pub row_order: RowOrder,
    pub col_order: ColOrder,
    /// Label template with `{idx}`, `{r}` and `{c}` tokens.
    pub label_pattern: Option<String>,
    /// Value of `{idx}` for the first generated cell.
    pub start_index: u32,
    /// Template applied to every cell. Cells are plain sampling units when absent.
    pub cell: Option<Box<NodeDefinition>>,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            rows: 1,
            cols: 1,
            row_order: RowOrder::default(),
            col_order: ColOrder::default(),
            label_pattern: None,
            start_index: 1,
            cell: None,
        }
    }
}

impl GridSpec {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            ..Default::default()
        }
    }

    pub fn with_label_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.label_pattern = Some(pattern.into());
        self
    }

    pub fn with_orders(mut self, row_order: RowOrder, col_order: ColOrder) -> Self {
        self.row_order = row_order;
        self.col_order = col_order;
        self
    }

    pub fn with_start_index(mut self, start_index: u32) -> Self {
        self.start_index = start_index;
        self
    }

    pub fn with_cell(mut self, cell: NodeDefinition) -> Self {
        self.cell = Some(Box::new(cell));
        self
    }

    /// Resolves the label of cell (`r`, `c`), both zero-based in generation order.
    pub fn label_for(&self, r: u32, c: u32) -> String {
        let idx = r * self.cols + c + self.start_index;
        self.label_pattern
            .as_deref()
            .unwrap_or(DEFAULT_GRID_LABEL_PATTERN)
            .replace("{idx}", &idx.to_string())
            .replace("{r}", &(r + 1).to_string())
            .replace("{c}", &(c + 1).to_string())
    }
}

/// Where a fixed-list child sits relative to its parent.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChildPosition {
    pub parent_anchor: Anchor,
    #[cfg_attr(feature = "serde", serde(default))]
    pub child_anchor: Option<Anchor>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub offset_x: Option<f32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub offset_y: Option<f32>,
}

impl ChildPosition {
    pub fn anchored(parent_anchor: Anchor, child_anchor: Anchor) -> Self {
        Self {
            parent_anchor,
            child_anchor: Some(child_anchor),
            offset_x: None,
            offset_y: None,
        }
    }

    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.offset_x = Some(x);
        self.offset_y = Some(y);
        self
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.offset_x.unwrap_or(0.0), self.offset_y.unwrap_or(0.0))
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FixedChild {
    pub definition: NodeDefinition,
    pub position: ChildPosition,
}

/// Strategy a definition uses to produce its children.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Clone, Debug, PartialEq)]
pub enum ChildrenGenerator {
    Grid(GridSpec),
    Nested { child: Box<NodeDefinition> },
    FixedList { children: Vec<FixedChild> },
}

impl ChildrenGenerator {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ChildrenGenerator::Grid(_) => "GRID",
            ChildrenGenerator::Nested { .. } => "NESTED",
            ChildrenGenerator::FixedList { .. } => "FIXED_LIST",
        }
    }
}

/// Reusable node template, owned by a blueprint and immutable once published.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDefinition {
    pub node_type: NodeType,
    pub shape: ShapeDefinition,
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub code: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Option<ChildrenGenerator>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub role: Option<NodeRole>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
}

impl NodeDefinition {
    pub fn new(node_type: NodeType, shape: ShapeDefinition) -> Self {
        Self {
            node_type,
            shape,
            label: None,
            code: None,
            children: None,
            role: None,
            tags: Vec::new(),
        }
    }

    pub fn container(shape: ShapeDefinition) -> Self {
        Self::new(NodeType::Container, shape)
    }

    pub fn sampling_unit(shape: ShapeDefinition) -> Self {
        Self::new(NodeType::SamplingUnit, shape)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_grid(mut self, grid: GridSpec) -> Self {
        self.children = Some(ChildrenGenerator::Grid(grid));
        self
    }

    pub fn with_nested(mut self, child: NodeDefinition) -> Self {
        self.children = Some(ChildrenGenerator::Nested {
            child: Box::new(child),
        });
        self
    }

    pub fn with_fixed_children(mut self, children: Vec<FixedChild>) -> Self {
        self.children = Some(ChildrenGenerator::FixedList { children });
        self
    }
}

/// Resolved node with an identifier and an absolute position in plot meters.
///
/// `x`/`y` locate the bottom-left corner of the node's bounding box in the
/// plot's Cartesian frame (y grows upward), with the plot's own corner at the origin.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct NodeInstance {
    pub id: String,
    pub blueprint_id: String,
    pub blueprint_version: u32,
    pub plot_id: Option<String>,
    pub node_type: NodeType,
    pub label: String,
    pub code: Option<String>,
    pub path: String,
    pub shape: ShapeDefinition,
    pub x: f32,
    pub y: f32,
    pub rotation: Option<f32>,
    pub role: Option<NodeRole>,
    pub tags: Vec<String>,
    pub children: Vec<NodeInstance>,
}

impl NodeInstance {
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Absolute bounding box in plot meters.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_origin_size(self.origin(), self.shape.dimensions().as_vec2())
    }

    pub fn is_sampling_unit(&self) -> bool {
        self.node_type == NodeType::SamplingUnit
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn excludes_canopy(&self) -> bool {
        self.has_tag(EXCLUDES_CANOPY_TAG)
    }

    /// Whether an absolute point lies inside the node's actual shape.
    ///
    /// Circles test against their radius; every other shape uses its bounding box.
    pub fn contains_point(&self, p: Vec2) -> bool {
        match self.shape {
            ShapeDefinition::Circle { radius } => {
                let center = self.bounds().center();
                p.distance_squared(center) <= radius * radius
            }
            _ => self.bounds().contains(p),
        }
    }
}
