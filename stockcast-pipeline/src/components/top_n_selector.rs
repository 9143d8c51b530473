use crate::selector::Selector;
use crate::types::GroupAggregate;

/// Selects the `n` aggregate rows with the largest totals.
pub struct TopNSelector {
    pub n: usize,
}

impl TopNSelector {
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

impl Default for TopNSelector {
    fn default() -> Self {
        Self {
            n: stockcast_stats::thresholds::DEFAULT_TOP_PRODUCTS,
        }
    }
}

impl Selector<GroupAggregate> for TopNSelector {
    fn score(&self, candidate: &GroupAggregate) -> f64 {
        candidate.total
    }

    fn size(&self) -> Option<usize> {
        Some(self.n)
    }
}
