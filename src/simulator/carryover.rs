//! Residual concentration from the previous day's doses
//!
//! Curves only account for doses taken inside the sampled window. When the same
//! regimen is taken every day, the previous day's doses are still being
//! eliminated at the start of the window. [with_carryover] estimates that
//! residual by evaluating the same curve one [CARRYOVER_PERIOD] later and
//! adding it to the same-day curve.
//!
//! Only one previous cycle is included; anything taken more than 48 hours
//! before a sample is ignored.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::data::time::{shifted, DAY_HOURS};
use crate::error::DoseCurveError;
use crate::simulator::model::ensure_finite_series;

/// Period after which the regimen repeats (h)
pub const CARRYOVER_PERIOD: f64 = DAY_HOURS;

/// Whether a simulation includes the previous day's residual
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Carryover {
    /// Only doses inside the window contribute
    SameDayOnly,
    /// Add the residual of an identical regimen taken the day before
    #[default]
    PreviousDay,
}

/// `curve_fn(times, dose, onset) + curve_fn(times + 24, dose, onset)`
///
/// # Example
///
/// ```rust
/// use dosecurve::prelude::*;
///
/// let model = ConcentrationModel::default();
/// let times = daily_grid();
/// let curve = with_carryover(
///     |t, dose, onset| model.long_acting(t, dose, onset),
///     &times,
///     60.0,
///     8.0,
/// )
/// .unwrap();
/// assert_eq!(curve.len(), times.len());
/// ```
pub fn with_carryover<F>(
    curve_fn: F,
    times: &[f64],
    dose: f64,
    onset_time: f64,
) -> Result<Array1<f64>, DoseCurveError>
where
    F: Fn(&[f64], f64, f64) -> Result<Array1<f64>, DoseCurveError>,
{
    let same_day = curve_fn(times, dose, onset_time)?;
    let previous_day = curve_fn(&shifted(times, CARRYOVER_PERIOD), dose, onset_time)?;
    ensure_finite_series("dose", dose, same_day + previous_day)
}
