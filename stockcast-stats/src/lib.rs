pub mod math;
pub mod regression;
pub mod thresholds;

pub use math::{mean, sum};
pub use regression::{fit_least_squares, LinearFit};
