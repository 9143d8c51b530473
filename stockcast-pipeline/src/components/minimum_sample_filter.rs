use stockcast_stats::thresholds::DEFAULT_MIN_SAMPLES;

use crate::filter::{Filter, FilterResult};
use crate::trend::EntitySeries;

/// Removes entities with too few rows to fit a trend line.
///
/// Removed entities get no trend result and no trend suggestion. This is
/// not treated as a failure.
pub struct MinimumSampleFilter {
    pub min_samples: usize,
}

impl MinimumSampleFilter {
    pub fn new(min_samples: usize) -> Self {
        Self { min_samples }
    }
}

impl Default for MinimumSampleFilter {
    fn default() -> Self {
        Self {
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

impl Filter<EntitySeries> for MinimumSampleFilter {
    fn filter(&self, candidates: Vec<EntitySeries>) -> FilterResult<EntitySeries> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|s| s.observations() >= self.min_samples);

        for series in &removed {
            log::debug!(
                "skipping {}: {} rows, need {}",
                series.entity,
                series.observations(),
                self.min_samples
            );
        }

        FilterResult { kept, removed }
    }
}
