use std::time::Duration;

use criterion::{Criterion, Throughput};
use plot_layout::layout::config::{
    GridLabelStyle, PlotConfiguration, PlotDimensions, PlotShape, SubplotPosition, SubplotRule,
};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Square plot split into `n`×`n` cells with a canopy-free center subplot.
#[allow(dead_code)]
pub fn gridded_configuration(side: f32, n: u32) -> PlotConfiguration {
    PlotConfiguration::rectangle(side, side)
        .with_grid(n, n, GridLabelStyle::Matrix)
        .with_subplot(
            SubplotRule::fixed(
                PlotShape::Rectangle,
                PlotDimensions::rectangle(side / 5.0, side / 5.0),
                SubplotPosition::Center,
            )
            .excluding_canopy(),
        )
}
