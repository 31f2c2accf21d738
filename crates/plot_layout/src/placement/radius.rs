//! Mapping from a size measurement to a marker radius in meters.
//!
//! The mapping is a presentation choice, so the placement engine only sees the
//! [`RadiusModel`] trait. Callers pick one of the models below or pass a closure.

/// Maps an optional size measurement (e.g. diameter at breast height) to a
/// radius in plot meters.
pub trait RadiusModel: Send + Sync {
    fn radius_m(&self, measurement: Option<f32>) -> f32;
}

impl<F> RadiusModel for F
where
    F: Fn(Option<f32>) -> f32 + Send + Sync,
{
    fn radius_m(&self, measurement: Option<f32>) -> f32 {
        self(measurement)
    }
}

/// Same radius for every observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRadius(pub f32);

impl RadiusModel for FixedRadius {
    fn radius_m(&self, _measurement: Option<f32>) -> f32 {
        self.0.max(0.0)
    }
}

/// `min_radius + measurement * scale`, clamped to `[min_radius, max_radius]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearClampedRadius {
    pub scale: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Radius used when the observation carries no measurement.
    pub fallback: f32,
}

impl LinearClampedRadius {
    pub fn new(scale: f32, min_radius: f32, max_radius: f32) -> Self {
        Self {
            scale,
            min_radius,
            max_radius,
            fallback: min_radius,
        }
    }

    pub fn with_fallback(mut self, fallback: f32) -> Self {
        self.fallback = fallback;
        self
    }
}

impl RadiusModel for LinearClampedRadius {
    fn radius_m(&self, measurement: Option<f32>) -> f32 {
        let lo = self.min_radius.max(0.0);
        let hi = self.max_radius.max(lo);
        match measurement.filter(|m| m.is_finite()) {
            Some(m) => (self.min_radius + m * self.scale).clamp(lo, hi),
            None => self.fallback.clamp(lo, hi),
        }
    }
}

/// Step lookup: the radius of the last threshold not greater than the measurement.
///
/// Measurements below the first threshold (or missing) use `below`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepTableRadius {
    steps: Vec<(f32, f32)>,
    below: f32,
}

impl StepTableRadius {
    /// Builds a table from `(threshold, radius)` pairs in any order.
    pub fn new(mut steps: Vec<(f32, f32)>, below: f32) -> Self {
        steps.retain(|(t, r)| t.is_finite() && r.is_finite());
        steps.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { steps, below }
    }
}

impl RadiusModel for StepTableRadius {
    fn radius_m(&self, measurement: Option<f32>) -> f32 {
        let Some(m) = measurement.filter(|m| m.is_finite()) else {
            return self.below.max(0.0);
        };
        self.steps
            .iter()
            .take_while(|(threshold, _)| *threshold <= m)
            .last()
            .map_or(self.below, |(_, r)| *r)
            .max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_model_clamps_both_ends() {
        let model = LinearClampedRadius::new(0.01, 0.2, 1.0);
        assert_eq!(model.radius_m(Some(0.0)), 0.2);
        assert!((model.radius_m(Some(30.0)) - 0.5).abs() < 1e-6);
        assert_eq!(model.radius_m(Some(500.0)), 1.0);
        assert_eq!(model.radius_m(Some(-50.0)), 0.2);
        assert_eq!(model.radius_m(None), 0.2);
        assert_eq!(model.with_fallback(0.4).radius_m(None), 0.4);
    }

    #[test]
    fn step_table_picks_last_threshold_reached() {
        let model = StepTableRadius::new(vec![(30.0, 0.6), (10.0, 0.3)], 0.15);
        assert_eq!(model.radius_m(Some(5.0)), 0.15);
        assert_eq!(model.radius_m(Some(10.0)), 0.3);
        assert_eq!(model.radius_m(Some(29.9)), 0.3);
        assert_eq!(model.radius_m(Some(31.0)), 0.6);
        assert_eq!(model.radius_m(None), 0.15);
    }

    #[test]
    fn closures_are_models() {
        let model = |m: Option<f32>| m.unwrap_or(1.0) / 100.0;
        assert!((model.radius_m(Some(25.0)) - 0.25).abs() < 1e-6);
        assert_eq!(FixedRadius(-1.0).radius_m(Some(3.0)), 0.0);
    }
}
