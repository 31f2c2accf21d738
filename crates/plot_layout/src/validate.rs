//! Boundary validation of layout inputs.
//!
//! Generators assume every dimension is finite and non-negative. Inputs coming
//! from storage or user forms are checked here first, so non-finite geometry
//! never reaches rendering or area computations.
use crate::blueprint::Blueprint;
use crate::error::{Error, Result};
use crate::layout::config::{PlotConfiguration, PlotShape};
use crate::node::{ChildrenGenerator, NodeDefinition};
use crate::shape::ShapeDefinition;

/// Checks that every measurement of `shape` is finite and `>= 0`.
pub fn validate_shape(shape: &ShapeDefinition, path: &str) -> Result<()> {
    for (field, value) in shape.measurements() {
        check_dimension(path, field, value)?;
    }
    Ok(())
}

/// Validates every definition reachable from the blueprint root.
pub fn validate_blueprint(blueprint: &Blueprint) -> Result<()> {
    if blueprint.id.trim().is_empty() {
        return Err(Error::InvalidConfig("blueprint id must not be empty".into()));
    }
    validate_definition(&blueprint.root, "root")
}

fn validate_definition(def: &NodeDefinition, path: &str) -> Result<()> {
    validate_shape(&def.shape, path)?;
    match &def.children {
        None => Ok(()),
        Some(ChildrenGenerator::Grid(grid)) => match &grid.cell {
            // The grid sizes each cell itself; only the template's descendants matter.
            Some(cell) => validate_children_of(cell, &format!("{path}/cell")),
            None => Ok(()),
        },
        Some(ChildrenGenerator::Nested { child }) => {
            validate_definition(child, &format!("{path}/nested"))
        }
        Some(ChildrenGenerator::FixedList { children }) => {
            for (i, fixed) in children.iter().enumerate() {
                let child_path = format!("{path}/child{i}");
                let offset = fixed.position.offset();
                if !offset.is_finite() {
                    return Err(Error::InvalidConfig(format!(
                        "non-finite offset at '{child_path}'"
                    )));
                }
                validate_definition(&fixed.definition, &child_path)?;
            }
            Ok(())
        }
    }
}

fn validate_children_of(def: &NodeDefinition, path: &str) -> Result<()> {
    let mut probe = def.clone();
    probe.shape = ShapeDefinition::Point { radius: None };
    validate_definition(&probe, path)
}

/// Validates plot, subplot and spacing values of a configuration.
pub fn validate_configuration(config: &PlotConfiguration) -> Result<()> {
    validate_dimensions(config.shape, &config.dimensions, "root")?;
    for (i, rule) in config.subplots.rules.iter().enumerate() {
        validate_dimensions(rule.shape, &rule.dimensions, &format!("root/subplot{i}"))?;
    }
    check_dimension(
        "rules",
        "min_inter_tree_distance",
        config.rules.min_inter_tree_distance,
    )
}

fn validate_dimensions(
    shape: PlotShape,
    dims: &crate::layout::config::PlotDimensions,
    path: &str,
) -> Result<()> {
    match shape {
        PlotShape::Rectangle => {
            check_dimension(path, "width", dims.width)?;
            check_dimension(path, "length", dims.length)
        }
        PlotShape::Circle => match dims.radius {
            Some(r) => check_dimension(path, "radius", r),
            None => {
                check_dimension(path, "width", dims.width)?;
                check_dimension(path, "length", dims.length)
            }
        },
    }
}

fn check_dimension(path: &str, field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidDimension {
            path: path.to_owned(),
            field,
            value,
        })
    }
}
