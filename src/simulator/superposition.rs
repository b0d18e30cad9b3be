//! Regimen concentration by superposition
//!
//! The total concentration of a regimen is the pointwise sum of the curves of
//! its dose events, each optionally corrected for the previous day's residual.
//!
//! ```rust
//! use dosecurve::prelude::*;
//!
//! let model = ConcentrationModel::default();
//! let prediction = model
//!     .simulate(&Regimen::la_plus_ir(), &daily_grid(), Carryover::PreviousDay)
//!     .unwrap();
//! let summary = prediction.summary();
//! assert!(summary.cmax > summary.cmin);
//! ```

use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::event::{DoseEvent, Formulation};
use crate::data::regimen::Regimen;
use crate::error::DoseCurveError;
use crate::simulator::carryover::{with_carryover, Carryover};
use crate::simulator::model::{ensure_finite_series, ConcentrationModel};

/// Curve contributed by a single dose event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCurve {
    pub event: DoseEvent,
    pub concentrations: Array1<f64>,
}

/// Result of simulating a [Regimen] over a set of sample times
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimenPrediction {
    times: Vec<f64>,
    curves: Vec<EventCurve>,
    total: Array1<f64>,
    carryover: Carryover,
}

/// Exposure metrics over the sampled window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureSummary {
    /// Highest concentration
    pub cmax: f64,
    /// Time of the highest concentration (first occurrence)
    pub tmax: f64,
    /// Lowest concentration
    pub cmin: f64,
    /// Linear trapezoidal area under the curve
    pub auc: f64,
    /// `auc` divided by the window length
    pub cavg: f64,
}

impl ConcentrationModel {
    /// Evaluate every dose of `regimen` at `times` and sum the curves.
    ///
    /// Curves are computed in parallel but summed in regimen order, so the
    /// result does not depend on scheduling.
    pub fn simulate(
        &self,
        regimen: &Regimen,
        times: &[f64],
        carryover: Carryover,
    ) -> Result<RegimenPrediction, DoseCurveError> {
        tracing::debug!(
            regimen = regimen.id(),
            events = regimen.len(),
            samples = times.len(),
            ?carryover,
            "simulating regimen"
        );

        let curves = regimen
            .events()
            .par_iter()
            .map(|event| -> Result<EventCurve, DoseCurveError> {
                let concentrations = match carryover {
                    Carryover::SameDayOnly => self.concentration(times, event)?,
                    Carryover::PreviousDay => with_carryover(
                        |t, dose, onset| {
                            self.concentration(t, &DoseEvent::new(onset, dose, event.formulation()))
                        },
                        times,
                        event.amount(),
                        event.time(),
                    )?,
                };
                Ok(EventCurve {
                    event: *event,
                    concentrations,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total = ensure_finite_series(
            "dose",
            regimen.total_amount(),
            sum_curves(times.len(), curves.iter().map(|c| &c.concentrations)),
        )?;

        Ok(RegimenPrediction {
            times: times.to_vec(),
            curves,
            total,
            carryover,
        })
    }
}

fn sum_curves<'a>(len: usize, curves: impl Iterator<Item = &'a Array1<f64>>) -> Array1<f64> {
    curves.fold(Array1::zeros(len), |acc, c| acc + c)
}

impl RegimenPrediction {
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Per-event curves, in regimen order
    pub fn curves(&self) -> &[EventCurve] {
        &self.curves
    }

    /// Sum of all event curves
    pub fn total(&self) -> &Array1<f64> {
        &self.total
    }

    pub fn carryover(&self) -> Carryover {
        self.carryover
    }

    /// Sum of the curves of one formulation only
    pub fn total_for(&self, formulation: Formulation) -> Array1<f64> {
        sum_curves(
            self.times.len(),
            self.curves
                .iter()
                .filter(|c| c.event.formulation() == formulation)
                .map(|c| &c.concentrations),
        )
    }

    /// Dosing times, in regimen order
    pub fn dose_times(&self) -> Vec<f64> {
        self.curves.iter().map(|c| c.event.time()).collect()
    }

    /// Exposure metrics of the total curve
    pub fn summary(&self) -> ExposureSummary {
        summarize(&self.times, self.total.as_slice().unwrap_or(&[]))
    }
}

/// Exposure metrics of an arbitrary series sampled at `times`
pub fn summarize(times: &[f64], concentrations: &[f64]) -> ExposureSummary {
    if concentrations.is_empty() {
        return ExposureSummary {
            cmax: 0.0,
            tmax: 0.0,
            cmin: 0.0,
            auc: 0.0,
            cavg: 0.0,
        };
    }

    let (tmax, cmax) = times
        .iter()
        .zip(concentrations)
        .fold((f64::NAN, f64::NEG_INFINITY), |(tm, cm), (&t, &c)| {
            if c > cm {
                (t, c)
            } else {
                (tm, cm)
            }
        });
    let cmin = concentrations.iter().copied().fold(f64::INFINITY, f64::min);
    let auc = trapezoidal_auc(times, concentrations);
    let window = match (times.first(), times.last()) {
        (Some(first), Some(last)) if last > first => last - first,
        _ => 0.0,
    };
    let cavg = if window > 0.0 { auc / window } else { 0.0 };

    ExposureSummary {
        cmax,
        tmax,
        cmin,
        auc,
        cavg,
    }
}

fn trapezoidal_auc(times: &[f64], concentrations: &[f64]) -> f64 {
    times
        .windows(2)
        .zip(concentrations.windows(2))
        .map(|(t, c)| (c[0] + c[1]) / 2.0 * (t[1] - t[0]))
        .sum()
}
