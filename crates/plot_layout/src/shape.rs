//! Primitive plot shapes, their extents, areas and anchor points.
//!
//! All measurements are meters. Positions produced here are relative to the
//! origin corner of a shape's bounding box.
use std::f32::consts::{FRAC_1_SQRT_2, PI};

use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Width used to draw a line that has no explicit width.
pub const DEFAULT_LINE_RENDER_WIDTH: f32 = 0.1;

/// Geometric definition of a node, in meters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeDefinition {
    Rectangle { width: f32, length: f32 },
    Circle { radius: f32 },
    Line { length: f32, width: Option<f32> },
    Point { radius: Option<f32> },
}

/// Axis-aligned extent of a shape in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Reference point on a shape used to position children.
///
/// Vertical names follow the blueprint authoring frame, in which `Top*` is the
/// edge at `y = 0` and `Bottom*` is the edge at `y = height`. Published
/// blueprints were authored against this frame, so it must not change.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Anchor {
    /// Unit direction of the anchor from the shape center, in the authoring frame.
    fn direction(self) -> Vec2 {
        match self {
            Anchor::Center => Vec2::ZERO,
            Anchor::TopLeft => Vec2::new(-1.0, -1.0),
            Anchor::TopRight => Vec2::new(1.0, -1.0),
            Anchor::BottomLeft => Vec2::new(-1.0, 1.0),
            Anchor::BottomRight => Vec2::new(1.0, 1.0),
        }
    }
}

impl ShapeDefinition {
    pub fn rectangle(width: f32, length: f32) -> Self {
        ShapeDefinition::Rectangle { width, length }
    }

    pub fn circle(radius: f32) -> Self {
        ShapeDefinition::Circle { radius }
    }

    /// Short name of the shape kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ShapeDefinition::Rectangle { .. } => "RECTANGLE",
            ShapeDefinition::Circle { .. } => "CIRCLE",
            ShapeDefinition::Line { .. } => "LINE",
            ShapeDefinition::Point { .. } => "POINT",
        }
    }

    /// Bounding extent used for layout and rendering.
    ///
    /// Circles and points use their bounding square. A line without a width is
    /// given [`DEFAULT_LINE_RENDER_WIDTH`] so it stays visible.
    pub fn dimensions(&self) -> Dimensions {
        match *self {
            ShapeDefinition::Rectangle { width, length } => Dimensions {
                width,
                height: length,
            },
            ShapeDefinition::Circle { radius } => Dimensions {
                width: radius * 2.0,
                height: radius * 2.0,
            },
            ShapeDefinition::Line { length, width } => Dimensions {
                width: length,
                height: width.unwrap_or(DEFAULT_LINE_RENDER_WIDTH),
            },
            ShapeDefinition::Point { radius } => {
                let d = radius.unwrap_or(0.0) * 2.0;
                Dimensions {
                    width: d,
                    height: d,
                }
            }
        }
    }

    /// Surface area in square meters.
    ///
    /// Lines without an explicit width and points have no area; the rendering
    /// fallback width never leaks into this figure.
    pub fn area(&self) -> f32 {
        match *self {
            ShapeDefinition::Rectangle { width, length } => width * length,
            ShapeDefinition::Circle { radius } => PI * radius * radius,
            ShapeDefinition::Line { length, width } => length * width.unwrap_or(0.0),
            ShapeDefinition::Point { .. } => 0.0,
        }
    }

    /// Position of `anchor` relative to the bounding-box origin, in the
    /// authoring frame described on [`Anchor`].
    ///
    /// Rectangles and lines use their box corners. Round shapes place corner
    /// anchors on the circumference along the diagonals, so a child anchored to
    /// a circle's corner touches the circle rather than its bounding square.
    pub fn anchor_point(&self, anchor: Anchor) -> Vec2 {
        let dims = self.dimensions();
        let half = dims.as_vec2() * 0.5;
        let dir = anchor.direction();
        let center_to_anchor = match *self {
            ShapeDefinition::Rectangle { .. } | ShapeDefinition::Line { .. } => dir * half,
            ShapeDefinition::Circle { radius } => dir * radius * FRAC_1_SQRT_2,
            ShapeDefinition::Point { radius } => dir * radius.unwrap_or(0.0) * FRAC_1_SQRT_2,
        };
        half + center_to_anchor
    }

    /// Radius for round shapes, `None` otherwise.
    pub fn radius(&self) -> Option<f32> {
        match *self {
            ShapeDefinition::Circle { radius } => Some(radius),
            ShapeDefinition::Point { radius } => Some(radius.unwrap_or(0.0)),
            _ => None,
        }
    }

    /// Named dimension values, used by boundary validation.
    pub fn measurements(&self) -> Vec<(&'static str, f32)> {
        match *self {
            ShapeDefinition::Rectangle { width, length } => {
                vec![("width", width), ("length", length)]
            }
            ShapeDefinition::Circle { radius } => vec![("radius", radius)],
            ShapeDefinition::Line { length, width } => {
                let mut out = vec![("length", length)];
                if let Some(w) = width {
                    out.push(("width", w));
                }
                out
            }
            ShapeDefinition::Point { radius } => {
                radius.map(|r| vec![("radius", r)]).unwrap_or_default()
            }
        }
    }
}

/// Axis-aligned rectangle in plot meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Whether the interiors of both rectangles overlap.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Whether `other` lies within `self`, allowing `tolerance` meters of slack.
    pub fn contains_bounds(&self, other: &Bounds, tolerance: f32) -> bool {
        other.min.x >= self.min.x - tolerance
            && other.min.y >= self.min.y - tolerance
            && other.max.x <= self.max.x + tolerance
            && other.max.y <= self.max.y + tolerance
    }

    /// Shrinks the rectangle by `amount` on every side.
    ///
    /// An axis that would invert collapses onto its center line.
    pub fn inset(&self, amount: f32) -> Bounds {
        let c = self.center();
        let mut min = self.min + Vec2::splat(amount);
        let mut max = self.max - Vec2::splat(amount);
        if min.x > max.x {
            min.x = c.x;
            max.x = c.x;
        }
        if min.y > max.y {
            min.y = c.y;
            max.y = c.y;
        }
        Bounds { min, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_per_shape_kind() {
        assert_eq!(
            ShapeDefinition::rectangle(20.0, 10.0).dimensions(),
            Dimensions {
                width: 20.0,
                height: 10.0
            }
        );
        assert_eq!(
            ShapeDefinition::circle(3.0).dimensions().as_vec2(),
            Vec2::new(6.0, 6.0)
        );
        let line = ShapeDefinition::Line {
            length: 30.0,
            width: None,
        };
        assert_eq!(line.dimensions().as_vec2(), Vec2::new(30.0, 0.1));
        let point = ShapeDefinition::Point { radius: None };
        assert_eq!(point.dimensions().as_vec2(), Vec2::ZERO);
    }

    #[test]
    fn area_branches_per_kind_without_render_fallbacks() {
        assert_eq!(ShapeDefinition::rectangle(20.0, 10.0).area(), 200.0);
        assert!((ShapeDefinition::circle(1.0).area() - PI).abs() < 1e-6);
        let line = ShapeDefinition::Line {
            length: 30.0,
            width: None,
        };
        assert_eq!(line.area(), 0.0);
        let belt = ShapeDefinition::Line {
            length: 30.0,
            width: Some(2.0),
        };
        assert_eq!(belt.area(), 60.0);
        assert_eq!(ShapeDefinition::Point { radius: Some(1.0) }.area(), 0.0);
    }

    #[test]
    fn rectangle_anchor_points() {
        let r = ShapeDefinition::rectangle(10.0, 4.0);
        assert_eq!(r.anchor_point(Anchor::Center), Vec2::new(5.0, 2.0));
        assert_eq!(r.anchor_point(Anchor::TopLeft), Vec2::new(0.0, 0.0));
        assert_eq!(r.anchor_point(Anchor::TopRight), Vec2::new(10.0, 0.0));
        assert_eq!(r.anchor_point(Anchor::BottomLeft), Vec2::new(0.0, 4.0));
        assert_eq!(r.anchor_point(Anchor::BottomRight), Vec2::new(10.0, 4.0));
    }

    #[test]
    fn circle_corner_anchor_lies_on_circumference() {
        let c = ShapeDefinition::circle(2.0);
        let center = c.anchor_point(Anchor::Center);
        assert_eq!(center, Vec2::new(2.0, 2.0));
        for anchor in [
            Anchor::TopLeft,
            Anchor::TopRight,
            Anchor::BottomLeft,
            Anchor::BottomRight,
        ] {
            let p = c.anchor_point(anchor);
            assert!(((p - center).length() - 2.0).abs() < 1e-5, "{anchor:?}");
        }
    }

    #[test]
    fn bounds_inset_collapses_when_too_large() {
        let b = Bounds::from_origin_size(Vec2::ZERO, Vec2::new(2.0, 10.0));
        let inset = b.inset(1.5);
        assert_eq!(inset.min.x, 1.0);
        assert_eq!(inset.max.x, 1.0);
        assert_eq!(inset.min.y, 1.5);
        assert_eq!(inset.max.y, 8.5);
    }

    #[test]
    fn bounds_intersection_excludes_touching_edges() {
        let a = Bounds::from_origin_size(Vec2::ZERO, Vec2::new(5.0, 5.0));
        let b = Bounds::from_origin_size(Vec2::new(5.0, 0.0), Vec2::new(5.0, 5.0));
        let c = Bounds::from_origin_size(Vec2::new(4.0, 4.0), Vec2::new(5.0, 5.0));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(a.contains_bounds(&Bounds::from_origin_size(Vec2::ONE, Vec2::ONE), 0.0));
    }
}
