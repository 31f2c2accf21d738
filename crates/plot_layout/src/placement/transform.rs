//! Conversion between plot meters and a caller's display space.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Affine map from plot meters (y up) to display units.
///
/// With `y_down` set, the plot's top edge (`y = plot_height`) maps to
/// `origin.y`, matching raster images and screen coordinates.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    pub pixels_per_meter: f32,
    /// Display position of the plot's bottom-left corner (top-left when `y_down`).
    pub origin: Vec2,
    pub plot_height: f32,
    pub y_down: bool,
}

impl Default for DisplayTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl DisplayTransform {
    /// Display space equals plot meters.
    pub fn identity() -> Self {
        Self {
            pixels_per_meter: 1.0,
            origin: Vec2::ZERO,
            plot_height: 0.0,
            y_down: false,
        }
    }

    pub fn new(pixels_per_meter: f32, origin: Vec2, plot_height: f32, y_down: bool) -> Self {
        Self {
            pixels_per_meter,
            origin,
            plot_height,
            y_down,
        }
    }

    /// Largest uniform scale that fits a plot of `plot_size` meters into
    /// `viewport` with `padding` on every side, centered, y pointing down.
    pub fn fit(plot_size: Vec2, viewport: Vec2, padding: f32) -> Self {
        let avail = (viewport - Vec2::splat(2.0 * padding)).max(Vec2::ZERO);
        let sx = if plot_size.x > 0.0 { avail.x / plot_size.x } else { f32::INFINITY };
        let sy = if plot_size.y > 0.0 { avail.y / plot_size.y } else { f32::INFINITY };
        let mut scale = sx.min(sy);
        if !scale.is_finite() || scale <= 0.0 {
            scale = 1.0;
        }
        let origin = (viewport - plot_size * scale) * 0.5;
        Self {
            pixels_per_meter: scale,
            origin,
            plot_height: plot_size.y,
            y_down: true,
        }
    }

    pub fn to_display(&self, p: Vec2) -> Vec2 {
        let y = if self.y_down {
            self.plot_height - p.y
        } else {
            p.y
        };
        self.origin + Vec2::new(p.x, y) * self.pixels_per_meter
    }

    pub fn to_plot(&self, d: Vec2) -> Vec2 {
        let local = (d - self.origin) / self.pixels_per_meter;
        if self.y_down {
            Vec2::new(local.x, self.plot_height - local.y)
        } else {
            local
        }
    }

    /// `to_display` for callers working in `mint` vectors.
    pub fn to_display_mint(&self, p: mint::Vector2<f32>) -> mint::Vector2<f32> {
        self.to_display(Vec2::from(p)).into()
    }

    pub fn scale_length(&self, meters: f32) -> f32 {
        meters * self.pixels_per_meter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_a_no_op() {
        let t = DisplayTransform::default();
        let p = Vec2::new(3.5, 7.25);
        assert_eq!(t.to_display(p), p);
        assert_eq!(t.to_plot(p), p);
        assert_eq!(t.scale_length(2.0), 2.0);
    }

    #[test]
    fn y_down_flips_about_plot_height() {
        let t = DisplayTransform::new(10.0, Vec2::new(5.0, 5.0), 20.0, true);
        assert_eq!(t.to_display(Vec2::new(0.0, 20.0)), Vec2::new(5.0, 5.0));
        assert_eq!(t.to_display(Vec2::new(0.0, 0.0)), Vec2::new(5.0, 205.0));
        let back = t.to_plot(t.to_display(Vec2::new(4.0, 6.0)));
        assert!((back - Vec2::new(4.0, 6.0)).length() < 1e-4);
    }

    #[test]
    fn fit_centers_and_keeps_aspect() {
        let t = DisplayTransform::fit(Vec2::new(20.0, 10.0), Vec2::new(440.0, 440.0), 20.0);
        assert_eq!(t.pixels_per_meter, 20.0);
        assert_eq!(t.origin, Vec2::new(20.0, 120.0));
        assert!(t.y_down);
    }

    #[test]
    fn fit_survives_degenerate_plot() {
        let t = DisplayTransform::fit(Vec2::ZERO, Vec2::new(100.0, 100.0), 0.0);
        assert_eq!(t.pixels_per_meter, 1.0);
    }

    #[test]
    fn mint_round_trip_matches_glam() {
        let t = DisplayTransform::new(2.0, Vec2::ZERO, 10.0, true);
        let m = t.to_display_mint(mint::Vector2 { x: 1.0, y: 1.0 });
        assert_eq!((m.x, m.y), (2.0, 18.0));
    }
}
