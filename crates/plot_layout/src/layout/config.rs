//! Parametric plot configuration: a one-off, unversioned layout for a single plot.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::shape::ShapeDefinition;

/// Default minimum gap between two trees, in meters.
pub const DEFAULT_MIN_INTER_TREE_DISTANCE: f32 = 0.5;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlotShape {
    #[default]
    Rectangle,
    Circle,
}

/// Plot or subplot size in meters. `radius` is only read for circles.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlotDimensions {
    pub width: f32,
    pub length: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub radius: Option<f32>,
}

impl PlotDimensions {
    pub fn rectangle(width: f32, length: f32) -> Self {
        Self {
            width,
            length,
            radius: None,
        }
    }

    pub fn circle(radius: f32) -> Self {
        Self {
            width: radius * 2.0,
            length: radius * 2.0,
            radius: Some(radius),
        }
    }

    /// Shape definition for these dimensions.
    ///
    /// A circle without an explicit radius inscribes itself in the width/length box.
    pub fn to_shape(&self, shape: PlotShape) -> ShapeDefinition {
        match shape {
            PlotShape::Rectangle => ShapeDefinition::rectangle(self.width, self.length),
            PlotShape::Circle => ShapeDefinition::circle(
                self.radius
                    .unwrap_or_else(|| self.width.min(self.length) * 0.5),
            ),
        }
    }
}

/// Labelling scheme for parametric grid cells.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GridLabelStyle {
    /// `Q1`, `Q2`, ... numbered row by row from the top-left cell.
    #[cfg_attr(feature = "serde", serde(rename = "Q1-Q4"))]
    Quadrants,
    /// `"{row},{col}"`, 1-based, rows counted from the bottom.
    Matrix,
    /// `"Cell {row}-{col}"`, 0-based, rows counted from the bottom.
    #[default]
    Cell,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridConfig {
    pub enabled: bool,
    pub rows: u32,
    pub cols: u32,
    pub label_style: GridLabelStyle,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubplotRuleType {
    #[default]
    Fixed,
    /// Accepted by the schema; placement is not implemented.
    Random,
}

/// Where a fixed subplot sits inside the plot. Corners are flush with the plot edges.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubplotPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    #[default]
    Center,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SubplotRule {
    #[cfg_attr(feature = "serde", serde(rename = "type", default))]
    pub rule_type: SubplotRuleType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shape: PlotShape,
    pub dimensions: PlotDimensions,
    #[cfg_attr(feature = "serde", serde(default))]
    pub position: SubplotPosition,
    /// Strata tags copied onto the generated unit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub strata: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub excludes_canopy: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
}

impl SubplotRule {
    pub fn fixed(shape: PlotShape, dimensions: PlotDimensions, position: SubplotPosition) -> Self {
        Self {
            rule_type: SubplotRuleType::Fixed,
            shape,
            dimensions,
            position,
            strata: Vec::new(),
            excludes_canopy: false,
            label: None,
        }
    }

    pub fn random(shape: PlotShape, dimensions: PlotDimensions) -> Self {
        Self {
            rule_type: SubplotRuleType::Random,
            ..Self::fixed(shape, dimensions, SubplotPosition::Center)
        }
    }

    pub fn excluding_canopy(mut self) -> Self {
        self.excludes_canopy = true;
        self
    }

    pub fn with_stratum(mut self, stratum: impl Into<String>) -> Self {
        self.strata.push(stratum.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubplotsConfig {
    pub enabled: bool,
    pub rules: Vec<SubplotRule>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementRules {
    pub min_inter_tree_distance: f32,
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self {
            min_inter_tree_distance: DEFAULT_MIN_INTER_TREE_DISTANCE,
        }
    }
}

/// Parametric layout owned by exactly one plot.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlotConfiguration {
    pub shape: PlotShape,
    pub dimensions: PlotDimensions,
    #[cfg_attr(feature = "serde", serde(default))]
    pub grid: GridConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub subplots: SubplotsConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rules: PlacementRules,
}

impl PlotConfiguration {
    pub fn rectangle(width: f32, length: f32) -> Self {
        Self {
            shape: PlotShape::Rectangle,
            dimensions: PlotDimensions::rectangle(width, length),
            ..Default::default()
        }
    }

    pub fn circle(radius: f32) -> Self {
        Self {
            shape: PlotShape::Circle,
            dimensions: PlotDimensions::circle(radius),
            ..Default::default()
        }
    }

    /// Enables the grid.
    pub fn with_grid(mut self, rows: u32, cols: u32, label_style: GridLabelStyle) -> Self {
        self.grid = GridConfig {
            enabled: true,
            rows,
            cols,
            label_style,
        };
        self
    }

    /// Adds a subplot rule and enables subplots.
    pub fn with_subplot(mut self, rule: SubplotRule) -> Self {
        self.subplots.enabled = true;
        self.subplots.rules.push(rule);
        self
    }

    pub fn with_min_inter_tree_distance(mut self, distance: f32) -> Self {
        self.rules.min_inter_tree_distance = distance;
        self
    }

    /// Shape of the plot boundary.
    pub fn plot_shape(&self) -> ShapeDefinition {
        self.dimensions.to_shape(self.shape)
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        crate::validate::validate_configuration(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_field_protocol() {
        let config = PlotConfiguration::rectangle(20.0, 20.0);
        assert!(!config.grid.enabled);
        assert!(!config.subplots.enabled);
        assert_eq!(
            config.rules.min_inter_tree_distance,
            DEFAULT_MIN_INTER_TREE_DISTANCE
        );
    }

    #[test]
    fn circle_without_radius_inscribes_in_box() {
        let dims = PlotDimensions::rectangle(10.0, 8.0);
        assert_eq!(
            dims.to_shape(PlotShape::Circle),
            ShapeDefinition::circle(4.0)
        );
        assert_eq!(
            PlotConfiguration::circle(5.64).plot_shape(),
            ShapeDefinition::circle(5.64)
        );
    }

    #[test]
    fn builders_enable_sections() {
        let config = PlotConfiguration::rectangle(20.0, 20.0)
            .with_grid(2, 2, GridLabelStyle::Quadrants)
            .with_subplot(
                SubplotRule::fixed(
                    PlotShape::Rectangle,
                    PlotDimensions::rectangle(2.0, 2.0),
                    SubplotPosition::BottomLeft,
                )
                .excluding_canopy(),
            );
        assert!(config.grid.enabled);
        assert!(config.subplots.enabled);
        assert!(config.subplots.rules[0].excludes_canopy);
    }
}
