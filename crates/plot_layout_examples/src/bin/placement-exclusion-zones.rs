use plot_layout::prelude::*;
use plot_layout_examples::{asset_path, init_tracing, load_ron, render_layout_to_png, RenderConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config: PlotConfiguration = load_ron(asset_path("configs/quadrants-regeneration.ron"))?;
    let root = generate_dynamic(&config, "plot-0108", &mut ()).capture();

    // 25 unmapped trees per quadrant plus a few with GPS-derived local coordinates.
    let quadrants = ["1,1", "1,2", "2,1", "2,2"];
    let mut trees = Vec::new();
    for label in quadrants {
        let unit = traverse::find_by_label(&root, label)
            .ok_or_else(|| anyhow::anyhow!("no unit labelled {label}"))?;
        for i in 0..25 {
            let gbh_cm = 20.0 + ((i * 37) % 140) as f32;
            trees.push(
                TreeObservation::new(format!("{label}/tree-{i:02}"), unit.id.clone())
                    .with_measurement(gbh_cm),
            );
        }
        trees.push(
            TreeObservation::new(format!("{label}/mapped"), unit.id.clone())
                .with_local(1.0, 1.0)
                .with_measurement(180.0),
        );
    }

    let rc = RenderConfig::new((900, 900));
    let options = PlacementOptions::from_configuration(&config).with_transform(rc.transform_for(&root));
    options.validate()?;

    // Marker radius grows with girth: 0.15 m plus 2.5 mm per cm, capped at 0.6 m.
    let radius = LinearClampedRadius::new(0.0025, 0.15, 0.6);

    let mut sink = VecSink::new();
    let result = place_observations(&root, &trees, &options, &radius, &mut sink);
    info!(
        "Placed {} trees | exhausted: {} | diagnostics: {}.",
        result.len(),
        result.exhausted_count(),
        sink.diagnostics().count()
    );

    render_layout_to_png(&root, &result.placements, &rc, "placement-exclusion-zones.png")?;

    Ok(())
}
