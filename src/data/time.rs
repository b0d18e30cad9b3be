//! Sample time axes
//!
//! The model accepts any ordered sequence of times; these helpers build the
//! axes the reports and the panel use.

use ndarray::Array1;

/// Length of the observation window, in hours
pub const DAY_HOURS: f64 = 24.0;

/// Number of samples in the daily grid (five-minute resolution)
pub const DAILY_SAMPLES: usize = 289;

/// `n` evenly spaced points over `[start, stop]`, both ends included
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    Array1::linspace(start, stop, n).to_vec()
}

/// The default 24 hour sampling grid
pub fn daily_grid() -> Vec<f64> {
    linspace(0.0, DAY_HOURS, DAILY_SAMPLES)
}

/// Every sample time moved by `delta` hours
pub fn shifted(times: &[f64], delta: f64) -> Vec<f64> {
    times.iter().map(|t| t + delta).collect()
}
