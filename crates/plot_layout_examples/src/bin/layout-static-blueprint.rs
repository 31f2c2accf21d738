use plot_layout::node::EXCLUDES_CANOPY_TAG;
use plot_layout::prelude::*;
use plot_layout_examples::{init_tracing, render_layout_to_png, RenderConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Blueprint "iufro-quadrants" v2:
    // - 30 x 30 m main plot split into a 3 x 3 grid, cells labelled "P{r}-{c}"
    // - every cell nests a 4 x 4 m herb layer square at its center
    // - a fixed 2 x 2 m seed trap anchored BOTTOM_RIGHT to BOTTOM_RIGHT, 0.5 m inset
    let herb = NodeDefinition::sampling_unit(ShapeDefinition::rectangle(4.0, 4.0))
        .with_label("Herb layer")
        .with_tag(EXCLUDES_CANOPY_TAG);
    let cell = NodeDefinition::sampling_unit(ShapeDefinition::rectangle(1.0, 1.0)).with_nested(herb);
    let trap = FixedChild {
        definition: NodeDefinition::sampling_unit(ShapeDefinition::rectangle(2.0, 2.0))
            .with_label("Seed trap")
            .with_code("ST"),
        position: ChildPosition::anchored(Anchor::BottomRight, Anchor::BottomRight)
            .with_offset(-0.5, -0.5),
    };
    let grid = FixedChild {
        definition: NodeDefinition::container(ShapeDefinition::rectangle(30.0, 30.0))
            .with_label("Grid")
            .with_grid(
                GridSpec::new(3, 3)
                    .with_label_pattern("P{r}-{c}")
                    .with_cell(cell),
            ),
        position: ChildPosition::anchored(Anchor::Center, Anchor::Center),
    };
    let plot = NodeDefinition::container(ShapeDefinition::rectangle(30.0, 30.0))
        .with_label("Main plot")
        .with_fixed_children(vec![grid, trap]);

    let mut registry = InMemoryBlueprintRegistry::new();
    registry.publish(Blueprint::new("iufro-quadrants", 2, "IUFRO quadrants", plot));

    let blueprint = registry
        .get_version("iufro-quadrants", 2)
        .ok_or_else(|| anyhow::anyhow!("blueprint not published"))?;
    info!(
        "Blueprint as stored:\n{}",
        ron::ser::to_string_pretty(blueprint, ron::ser::PrettyConfig::default())?
    );

    let source = PlotSource::Blueprint {
        id: "iufro-quadrants".into(),
        version: 2,
    };
    let mut sink = VecSink::new();
    let layout = resolve_layout("plot-0042", &source, &registry, &mut sink)?;
    for event in sink.diagnostics() {
        info!("Diagnostic: {:?}", event);
    }

    // Regenerating the same plot yields the same ids.
    let again = resolve_layout("plot-0042", &source, &registry, &mut ())?;
    info!("Stable ids across regeneration: {}", layout.root() == again.root());

    for seed in layout.unit_progress_seeds() {
        info!("{:<12} {:<28} {}", seed.label, seed.path, seed.unit_id);
    }

    let rc = RenderConfig::new((900, 900));
    render_layout_to_png(layout.root(), &[], &rc, "layout-static-blueprint.png")?;

    Ok(())
}
