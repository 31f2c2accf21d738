#![forbid(unsafe_code)]

mod assets;
mod rendering;

pub use assets::{asset_path, load_ron};
pub use rendering::{init_tracing, render_layout_to_png, RenderConfig, UnitStyle};
