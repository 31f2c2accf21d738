use plot_layout::prelude::*;
use plot_layout_examples::{asset_path, init_tracing, load_ron, render_layout_to_png, RenderConfig};
use tracing::{info, warn};

const CONFIGS: [&str; 2] = ["quadrants-regeneration", "circular-plot"];

fn main() -> anyhow::Result<()> {
    init_tracing();

    for name in CONFIGS {
        let config: PlotConfiguration = load_ron(asset_path(&format!("configs/{name}.ron")))?;
        config.validate()?;
        let plot_id = format!("plot-{name}");

        let mut sink = VecSink::new();
        let layout = generate_dynamic(&config, &plot_id, &mut sink);

        for (index, rule_type) in layout.unimplemented_rules() {
            warn!("{}: subplot rule {} ({:?}) was skipped.", name, index, rule_type);
        }

        // Ids from a parametric layout change on every generation. Capture them
        // once, right after the plot is created, and persist them.
        let seeds = layout.unit_progress_seeds();
        for seed in &seeds {
            info!("{:<14} {:<16} {}", seed.label, seed.path, seed.unit_id);
        }
        let regenerated = generate_dynamic(&config, &plot_id, &mut ());
        let reused = regenerated
            .unit_ids()
            .iter()
            .filter(|id| seeds.iter().any(|s| &s.unit_id == *id))
            .count();
        info!("{}: ids reused by a second generation: {}", name, reused);

        let root = layout.capture();
        info!(
            "{}: sampled area {:.2} m^2 of {:.2} m^2.",
            name,
            traverse::total_sampling_area(&root),
            root.shape.area()
        );

        let rc = RenderConfig::new((800, 800));
        render_layout_to_png(&root, &[], &rc, format!("layout-dynamic-{name}.png"))?;
    }

    Ok(())
}
