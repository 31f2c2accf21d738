//! Positions point observations inside their sampling units.
//!
//! Observations with stored local coordinates are converted directly. All
//! others are scattered by rejection sampling, seeded from the observation id
//! so every pass over the same data reproduces the same picture. Accepted
//! points keep a minimum distance to every point already placed in the plot
//! and stay out of overlapping `excludes-canopy` units. When the attempt
//! budget runs out the last candidate is used and the placement is flagged.
use std::collections::HashMap;

use glam::Vec2;
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::events::{EventSink, LayoutEvent, LayoutEventKind};
use crate::layout::config::{PlotConfiguration, DEFAULT_MIN_INTER_TREE_DISTANCE};
use crate::node::NodeInstance;
use crate::shape::ShapeDefinition;
use crate::traverse;

pub mod radius;
pub mod seed;
pub mod transform;

pub use radius::{FixedRadius, LinearClampedRadius, RadiusModel, StepTableRadius};
pub use seed::{observation_seed, SineRng};
pub use transform::DisplayTransform;

/// Default number of candidates drawn per implicit observation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// A point observation referencing a sampling unit by id.
pub trait Observation {
    fn id(&self) -> &str;

    fn sampling_unit_id(&self) -> &str;

    /// Stored position in meters relative to the unit's bottom-left corner.
    fn local_position(&self) -> Option<Vec2>;

    /// Size measurement fed to the [`RadiusModel`].
    fn size_measurement(&self) -> Option<f32> {
        None
    }
}

/// Plain observation record, e.g. a tree with an optional diameter.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TreeObservation {
    pub id: String,
    pub sampling_unit_id: String,
    pub local_x: Option<f32>,
    pub local_y: Option<f32>,
    pub measurement: Option<f32>,
}

impl TreeObservation {
    pub fn new(id: impl Into<String>, sampling_unit_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sampling_unit_id: sampling_unit_id.into(),
            local_x: None,
            local_y: None,
            measurement: None,
        }
    }

    pub fn with_local(mut self, x: f32, y: f32) -> Self {
        self.local_x = Some(x);
        self.local_y = Some(y);
        self
    }

    pub fn with_measurement(mut self, measurement: f32) -> Self {
        self.measurement = Some(measurement);
        self
    }
}

impl Observation for TreeObservation {
    fn id(&self) -> &str {
        &self.id
    }

    fn sampling_unit_id(&self) -> &str {
        &self.sampling_unit_id
    }

    /// Both coordinates must be present and finite.
    fn local_position(&self) -> Option<Vec2> {
        match (self.local_x, self.local_y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(Vec2::new(x, y)),
            _ => None,
        }
    }

    fn size_measurement(&self) -> Option<f32> {
        self.measurement
    }
}

/// Options for [`place_observations`].
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct PlacementOptions {
    /// Gap in meters required between the edges of two implicit markers.
    pub min_inter_tree_distance: f32,
    /// Candidates drawn per implicit observation before giving up.
    pub max_attempts: u32,
    /// Map from plot meters to the caller's display space.
    pub transform: DisplayTransform,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            min_inter_tree_distance: DEFAULT_MIN_INTER_TREE_DISTANCE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            transform: DisplayTransform::identity(),
        }
    }
}

impl PlacementOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the spacing rule from a plot configuration.
    pub fn from_configuration(config: &PlotConfiguration) -> Self {
        Self::default().with_min_distance(config.rules.min_inter_tree_distance)
    }

    pub fn with_min_distance(mut self, meters: f32) -> Self {
        self.min_inter_tree_distance = meters;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_transform(mut self, transform: DisplayTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_inter_tree_distance.is_finite() || self.min_inter_tree_distance < 0.0 {
            return Err(Error::InvalidConfig(
                "min_inter_tree_distance must be finite and >= 0".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidConfig("max_attempts must be > 0".into()));
        }
        let t = &self.transform;
        if !t.pixels_per_meter.is_finite() || t.pixels_per_meter <= 0.0 {
            return Err(Error::InvalidConfig("pixels_per_meter must be > 0".into()));
        }
        if !t.origin.is_finite() || !t.plot_height.is_finite() {
            return Err(Error::InvalidConfig("display transform must be finite".into()));
        }
        Ok(())
    }
}

/// How a placement's position was obtained.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementSource {
    /// Stored local coordinates.
    Explicit,
    /// Rejection sampling; `exhausted` when no candidate met the constraints.
    Implicit { attempts: u32, exhausted: bool },
}

/// Final position and marker size of one observation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedObservation {
    pub observation_id: String,
    pub unit_id: String,
    /// Position in meters relative to the unit's bottom-left corner.
    pub local: Vec2,
    /// Position in display space.
    pub position: Vec2,
    /// Radius in display units.
    pub radius: f32,
    /// Radius in meters.
    pub radius_m: f32,
    pub source: PlacementSource,
}

impl PlacedObservation {
    pub fn is_exhausted(&self) -> bool {
        matches!(self.source, PlacementSource::Implicit { exhausted: true, .. })
    }

    pub fn is_explicit(&self) -> bool {
        self.source == PlacementSource::Explicit
    }
}

/// Result of [`place_observations`], in input order minus skipped observations.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct PlacementResult {
    pub placements: Vec<PlacedObservation>,
}

impl PlacementResult {
    /// Number of placements that violate spacing or exclusion.
    pub fn exhausted_count(&self) -> usize {
        self.placements.iter().filter(|p| p.is_exhausted()).count()
    }

    pub fn for_unit<'a>(&'a self, unit_id: &'a str) -> impl Iterator<Item = &'a PlacedObservation> {
        self.placements.iter().filter(move |p| p.unit_id == unit_id)
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Draws a value in `[0, 1]`.
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// A point already placed in the plot, in absolute meters.
#[derive(Clone, Copy)]
struct Occupied {
    center: Vec2,
    radius_m: f32,
}

/// Places `observations` inside the nodes of the layout rooted at `root`.
///
/// An observation may reference any node by id: a sampling unit, or the main
/// plot itself for trees recorded outside every subplot. Explicit observations
/// are placed first and repel implicit ones. An observation whose node is not
/// part of the layout is skipped and reported as [`LayoutEvent::UnknownUnit`].
pub fn place_observations<O: Observation>(
    root: &NodeInstance,
    observations: &[O],
    options: &PlacementOptions,
    radius_model: &dyn RadiusModel,
    sink: &mut dyn EventSink,
) -> PlacementResult {
    let units: HashMap<&str, &NodeInstance> = traverse::pre_order(root)
        .map(|(n, _)| (n.id.as_str(), n))
        .collect();
    let canopy_free: Vec<&NodeInstance> = traverse::sampling_units(root)
        .into_iter()
        .filter(|u| u.excludes_canopy())
        .collect();

    let mut slots: Vec<Option<PlacedObservation>> = vec![None; observations.len()];
    let mut occupied: Vec<Occupied> = Vec::with_capacity(observations.len());
    let mut implicit: Vec<(usize, &NodeInstance)> = Vec::new();

    for (idx, obs) in observations.iter().enumerate() {
        let Some(unit) = units.get(obs.sampling_unit_id()).copied() else {
            warn!(
                "Observation '{}' references unknown unit '{}'; skipping.",
                obs.id(),
                obs.sampling_unit_id()
            );
            if sink.wants(LayoutEventKind::UnknownUnit) {
                sink.send(LayoutEvent::UnknownUnit {
                    observation_id: obs.id().to_owned(),
                    unit_id: obs.sampling_unit_id().to_owned(),
                });
            }
            continue;
        };

        let Some(local) = obs.local_position() else {
            implicit.push((idx, unit));
            continue;
        };
        let radius_m = radius_model.radius_m(obs.size_measurement());
        let center = unit.origin() + local;
        occupied.push(Occupied { center, radius_m });
        slots[idx] = Some(finish(obs, unit, center, radius_m, PlacementSource::Explicit, options));
    }

    let max_attempts = options.max_attempts.max(1);
    for (idx, unit) in implicit {
        let obs = &observations[idx];
        let radius_m = radius_model.radius_m(obs.size_measurement());
        let unit_bounds = unit.bounds();
        let zones: Vec<&NodeInstance> = canopy_free
            .iter()
            .copied()
            .filter(|z| z.id != unit.id && z.bounds().intersects(&unit_bounds))
            .collect();
        let area = unit_bounds.inset(radius_m);
        let mut rng = SineRng::for_observation(obs.id());

        let mut center = area.center();
        let mut accepted = false;
        let mut attempts = 0;
        while attempts < max_attempts {
            attempts += 1;
            let t = Vec2::new(rand01(&mut rng), rand01(&mut rng));
            center = area.min + area.size() * t;
            if fits_unit(unit, center, radius_m)
                && !zones.iter().any(|z| z.contains_point(center))
                && keeps_spacing(&occupied, center, radius_m, options.min_inter_tree_distance)
            {
                accepted = true;
                break;
            }
        }

        if !accepted {
            warn!(
                "No free spot for observation '{}' in unit '{}' after {} attempts; using last candidate.",
                obs.id(),
                unit.id,
                attempts
            );
            if sink.wants(LayoutEventKind::PlacementExhausted) {
                sink.send(LayoutEvent::PlacementExhausted {
                    observation_id: obs.id().to_owned(),
                    unit_id: unit.id.clone(),
                    attempts,
                });
            }
        }

        occupied.push(Occupied { center, radius_m });
        let source = PlacementSource::Implicit {
            attempts,
            exhausted: !accepted,
        };
        slots[idx] = Some(finish(obs, unit, center, radius_m, source, options));
    }

    let placements: Vec<PlacedObservation> = slots.into_iter().flatten().collect();
    if sink.wants(LayoutEventKind::ObservationPlaced) {
        for p in &placements {
            sink.send(LayoutEvent::ObservationPlaced {
                placement: p.clone(),
            });
        }
    }

    let result = PlacementResult { placements };
    info!(
        "Placed {} of {} observations | exhausted: {}.",
        result.len(),
        observations.len(),
        result.exhausted_count()
    );
    result
}

fn finish<O: Observation>(
    obs: &O,
    unit: &NodeInstance,
    center: Vec2,
    radius_m: f32,
    source: PlacementSource,
    options: &PlacementOptions,
) -> PlacedObservation {
    PlacedObservation {
        observation_id: obs.id().to_owned(),
        unit_id: unit.id.clone(),
        local: center - unit.origin(),
        position: options.transform.to_display(center),
        radius: options.transform.scale_length(radius_m),
        radius_m,
        source,
    }
}

/// Circular units must hold the whole marker; the inset box covers every other shape.
fn fits_unit(unit: &NodeInstance, center: Vec2, radius_m: f32) -> bool {
    match unit.shape {
        ShapeDefinition::Circle { radius } => {
            let reach = (radius - radius_m).max(0.0);
            center.distance_squared(unit.bounds().center()) <= reach * reach + 1e-6
        }
        _ => true,
    }
}

fn keeps_spacing(occupied: &[Occupied], center: Vec2, radius_m: f32, min_gap: f32) -> bool {
    occupied.iter().all(|o| {
        let required = o.radius_m + radius_m + min_gap;
        o.center.distance_squared(center) >= required * required
    })
}
