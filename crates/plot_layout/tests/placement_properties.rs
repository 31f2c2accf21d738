use glam::Vec2;
use plot_layout::prelude::*;

fn surveyed_plot() -> NodeInstance {
    let config = PlotConfiguration::rectangle(20.0, 20.0)
        .with_grid(2, 2, GridLabelStyle::Quadrants)
        .with_subplot(
            SubplotRule::fixed(
                PlotShape::Rectangle,
                PlotDimensions::rectangle(6.0, 6.0),
                SubplotPosition::Center,
            )
            .excluding_canopy(),
        )
        .with_subplot(
            SubplotRule::fixed(
                PlotShape::Circle,
                PlotDimensions::circle(1.5),
                SubplotPosition::BottomLeft,
            )
            .excluding_canopy(),
        );
    generate_dynamic(&config, "plot-17", &mut ()).capture()
}

fn unit(root: &NodeInstance, label: &str) -> String {
    traverse::find_by_label(root, label)
        .map(|n| n.id.clone())
        .unwrap_or_else(|| panic!("no unit labelled {label}"))
}

fn scattered(root: &NodeInstance, per_unit: usize) -> Vec<TreeObservation> {
    ["Q1", "Q2", "Q3", "Q4"]
        .iter()
        .flat_map(|label| {
            let id = unit(root, label);
            (0..per_unit).map(move |i| {
                TreeObservation::new(format!("{label}-tree-{i}"), id.clone())
                    .with_measurement((i * 7 % 45) as f32)
            })
        })
        .collect()
}

#[test]
fn implicit_points_keep_their_distance() {
    let root = surveyed_plot();
    let observations = scattered(&root, 12);
    let radius = LinearClampedRadius::new(0.01, 0.15, 0.5);
    let options = PlacementOptions::default();
    let result = place_observations(&root, &observations, &options, &radius, &mut ());
    assert_eq!(result.len(), observations.len());

    let ok: Vec<_> = result
        .placements
        .iter()
        .filter(|p| !p.is_exhausted())
        .collect();
    for (i, a) in ok.iter().enumerate() {
        for b in &ok[i + 1..] {
            let unit_a = traverse::find_by_id(&root, &a.unit_id).unwrap().origin();
            let unit_b = traverse::find_by_id(&root, &b.unit_id).unwrap().origin();
            let gap = (unit_a + a.local).distance(unit_b + b.local);
            let required = a.radius_m + b.radius_m + options.min_inter_tree_distance;
            assert!(
                gap >= required - 1e-4,
                "{} and {} are {gap} apart, need {required}",
                a.observation_id,
                b.observation_id
            );
        }
    }
}

#[test]
fn implicit_points_avoid_canopy_free_units() {
    let root = surveyed_plot();
    let observations = scattered(&root, 15);
    let result = place_observations(
        &root,
        &observations,
        &PlacementOptions::default(),
        &FixedRadius(0.2),
        &mut (),
    );
    let zones: Vec<&NodeInstance> = traverse::sampling_units(&root)
        .into_iter()
        .filter(|u| u.excludes_canopy())
        .collect();
    assert_eq!(zones.len(), 2);

    for p in result.placements.iter().filter(|p| !p.is_exhausted()) {
        // Identity transform: display position equals plot meters.
        assert!(
            zones.iter().all(|z| !z.contains_point(p.position)),
            "{} landed in a canopy-free unit at {:?}",
            p.observation_id,
            p.position
        );
    }
}

#[test]
fn explicit_position_ignores_siblings() {
    let root = surveyed_plot();
    let q1 = unit(&root, "Q1");
    let anchor = TreeObservation::new("fixed-tree", q1.clone()).with_local(3.0, 4.0);
    let options = PlacementOptions::default()
        .with_transform(DisplayTransform::fit(Vec2::new(20.0, 20.0), Vec2::new(800.0, 600.0), 20.0));

    let alone = place_observations(&root, &[anchor.clone()], &options, &FixedRadius(0.3), &mut ());
    let mut crowd = scattered(&root, 10);
    crowd.insert(7, anchor);
    let together = place_observations(&root, &crowd, &options, &FixedRadius(0.3), &mut ());

    let in_crowd = together
        .placements
        .iter()
        .find(|p| p.observation_id == "fixed-tree")
        .unwrap();
    assert_eq!(alone.placements[0].position, in_crowd.position);
    assert_eq!(in_crowd.source, PlacementSource::Explicit);
    // Q1 is the top-left quadrant: origin (0, 10), so the tree sits at plot (3, 14).
    let back = options.transform.to_plot(in_crowd.position);
    assert!((back - Vec2::new(3.0, 14.0)).length() < 1e-3);
}

#[test]
fn empty_unit_gives_empty_result() {
    let root = surveyed_plot();
    let mut sink = VecSink::new();
    let none: Vec<TreeObservation> = Vec::new();
    let result = place_observations(&root, &none, &PlacementOptions::default(), &FixedRadius(0.3), &mut sink);
    assert!(result.is_empty());
    assert_eq!(result.exhausted_count(), 0);
    assert_eq!(sink.diagnostics().count(), 0);
}

#[test]
fn exhausted_placements_are_countable() {
    let root = surveyed_plot();
    let q4 = unit(&root, "Q4");
    // Far more 1 m markers than a 10 x 10 quadrant can hold at 0.5 m spacing.
    let crowd: Vec<_> = (0..120)
        .map(|i| TreeObservation::new(format!("dense-{i}"), q4.clone()))
        .collect();
    let mut sink = VecSink::new();
    let result = place_observations(&root, &crowd, &PlacementOptions::default(), &FixedRadius(0.5), &mut sink);
    assert_eq!(result.len(), 120);
    assert!(result.exhausted_count() > 0);
    assert_eq!(
        sink.count(LayoutEventKind::PlacementExhausted),
        result.exhausted_count()
    );
    assert_eq!(sink.count(LayoutEventKind::ObservationPlaced), 120);
}

#[test]
fn repeated_passes_reproduce_the_scatter() {
    let root = surveyed_plot();
    let observations = scattered(&root, 6);
    let options = PlacementOptions::default();
    let radius = StepTableRadius::new(vec![(10.0, 0.25), (30.0, 0.4)], 0.15);
    let first = place_observations(&root, &observations, &options, &radius, &mut ());
    let second = place_observations(&root, &observations, &options, &radius, &mut ());
    assert_eq!(first.placements, second.placements);
}

#[test]
fn main_plot_trees_stay_out_of_canopy_free_centre() {
    let config = PlotConfiguration::circle(5.64).with_subplot(
        SubplotRule::fixed(
            PlotShape::Circle,
            PlotDimensions::circle(2.0),
            SubplotPosition::Center,
        )
        .excluding_canopy(),
    );
    let root = generate_dynamic(&config, "plot-round", &mut ()).capture();
    let regeneration = traverse::sampling_units(&root)
        .into_iter()
        .find(|u| u.excludes_canopy())
        .cloned()
        .unwrap();
    let trees: Vec<_> = (0..20)
        .map(|i| {
            TreeObservation::new(format!("main-{i}"), root.id.clone())
                .with_measurement(10.0 + i as f32)
        })
        .collect();

    let mut sink = VecSink::new();
    let result = place_observations(
        &root,
        &trees,
        &PlacementOptions::from_configuration(&config),
        &LinearClampedRadius::new(0.005, 0.1, 0.3),
        &mut sink,
    );
    assert_eq!(result.len(), 20);
    assert_eq!(sink.count(LayoutEventKind::UnknownUnit), 0);

    let centre = root.bounds().center();
    for p in result.placements.iter().filter(|p| !p.is_exhausted()) {
        assert!(
            !regeneration.contains_point(p.position),
            "{} landed in the regeneration subplot at {:?}",
            p.observation_id,
            p.position
        );
        assert!(p.position.distance(centre) <= 5.64 - p.radius_m + 1e-3);
    }
}
