use std::path::Path;

use glam::Vec2;
use image::{Rgb, RgbImage};
use plot_layout::node::NodeInstance;
use plot_layout::placement::{DisplayTransform, PlacedObservation};
use plot_layout::shape::ShapeDefinition;
use plot_layout::traverse;
use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[derive(Clone, Copy, Debug)]
pub struct UnitStyle {
    pub fill: [u8; 3],
    pub outline: [u8; 3],
}

/// Colors and image geometry for [`render_layout_to_png`].
#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    /// Margin around the plot, in pixels.
    pub padding: f32,
    pub background: [u8; 3],
    pub container_outline: [u8; 3],
    pub unit: UnitStyle,
    /// Style of units tagged `excludes-canopy`.
    pub canopy_free: UnitStyle,
    pub marker: [u8; 3],
    pub exhausted_marker: [u8; 3],
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32)) -> Self {
        Self {
            image_size,
            padding: 24.0,
            background: [245, 245, 240],
            container_outline: [40, 40, 40],
            unit: UnitStyle {
                fill: [214, 232, 204],
                outline: [90, 120, 80],
            },
            canopy_free: UnitStyle {
                fill: [236, 214, 190],
                outline: [150, 100, 60],
            },
            marker: [34, 90, 40],
            exhausted_marker: [200, 40, 40],
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    /// Transform that fits the plot rooted at `root` into the image.
    ///
    /// Pass the same transform to placement so markers line up with units.
    pub fn transform_for(&self, root: &NodeInstance) -> DisplayTransform {
        let viewport = Vec2::new(self.image_size.0 as f32, self.image_size.1 as f32);
        DisplayTransform::fit(root.shape.dimensions().as_vec2(), viewport, self.padding)
    }
}

/// Draws every node of the layout and the placed observations, then saves a PNG.
pub fn render_layout_to_png(
    root: &NodeInstance,
    placements: &[PlacedObservation],
    rc: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (w, h) = rc.image_size;
    let mut img = RgbImage::from_pixel(w, h, Rgb(rc.background));
    let transform = rc.transform_for(root);

    traverse::walk(root, |node, _depth| {
        let (min, max) = display_box(node, &transform);
        let style = if node.excludes_canopy() {
            Some(rc.canopy_free)
        } else if node.is_sampling_unit() {
            Some(rc.unit)
        } else {
            None
        };
        let outline = style.map_or(rc.container_outline, |s| s.outline);

        match node.shape {
            ShapeDefinition::Circle { radius } => {
                let center = (min + max) * 0.5;
                let r = transform.scale_length(radius);
                if let Some(s) = style {
                    fill_disc(&mut img, center, r, s.fill);
                }
                stroke_circle(&mut img, center, r, outline);
            }
            _ => {
                if let Some(s) = style {
                    fill_rect(&mut img, min, max, s.fill);
                }
                stroke_rect(&mut img, min, max, outline);
            }
        }
    });

    for p in placements {
        let color = if p.is_exhausted() {
            rc.exhausted_marker
        } else {
            rc.marker
        };
        fill_disc(&mut img, p.position, p.radius.max(1.0), color);
    }

    img.save(path.as_ref())?;
    tracing::info!("Wrote {}.", path.as_ref().display());
    Ok(())
}

fn display_box(node: &NodeInstance, transform: &DisplayTransform) -> (Vec2, Vec2) {
    let b = node.bounds();
    let a = transform.to_display(b.min);
    let c = transform.to_display(b.max);
    (a.min(c), a.max(c))
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}

fn fill_rect(img: &mut RgbImage, min: Vec2, max: Vec2, color: [u8; 3]) {
    for y in min.y.round() as i64..max.y.round() as i64 {
        for x in min.x.round() as i64..max.x.round() as i64 {
            put(img, x, y, color);
        }
    }
}

fn stroke_rect(img: &mut RgbImage, min: Vec2, max: Vec2, color: [u8; 3]) {
    let (x0, y0) = (min.x.round() as i64, min.y.round() as i64);
    let (x1, y1) = (max.x.round() as i64, max.y.round() as i64);
    for x in x0..=x1 {
        put(img, x, y0, color);
        put(img, x, y1, color);
    }
    for y in y0..=y1 {
        put(img, x0, y, color);
        put(img, x1, y, color);
    }
}

fn fill_disc(img: &mut RgbImage, center: Vec2, radius: f32, color: [u8; 3]) {
    let r = radius.ceil() as i64;
    let (cx, cy) = (center.x.round() as i64, center.y.round() as i64);
    let r2 = radius * radius;
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f32 <= r2 {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn stroke_circle(img: &mut RgbImage, center: Vec2, radius: f32, color: [u8; 3]) {
    let steps = ((radius * std::f32::consts::TAU).ceil() as usize).max(16);
    for i in 0..steps {
        let a = i as f32 / steps as f32 * std::f32::consts::TAU;
        let p = center + Vec2::new(a.cos(), a.sin()) * radius;
        put(img, p.x.round() as i64, p.y.round() as i64, color);
    }
}
