use ndarray::Array1;

use crate::data::event::{DoseEvent, Formulation};
use crate::error::{ensure_finite, DoseCurveError};

/// First-order absorption rate constant (1/h)
pub const ABSORPTION_RATE: f64 = 2.0;
/// Fraction of the dose reaching the systemic circulation
pub const BIOAVAILABILITY: f64 = 1.0;
/// Normalized volume of distribution
pub const VOLUME: f64 = 1.0;
/// Delay of the second half of a long-acting dose (h)
pub const LA_RELEASE_DELAY: f64 = 4.0;
/// Half-life used by [ConcentrationModel::default] (h)
pub const DEFAULT_HALF_LIFE: f64 = 2.5;

/// Rate constants closer than this are treated as equal
const DEGENERACY_TOLERANCE: f64 = 1e-12;

/// One-compartment model with first-order absorption and elimination.
///
/// Concentrations are relative and unnormalized: with `F = 1` and `V = 1` the
/// curve for a single dose taken at `t0` is the Bateman function
///
/// ```text
/// c(t) = dose * ka / (ka - ke) * (exp(-ke * (t - t0)) - exp(-ka * (t - t0)))   t >= t0
///      = 0                                                                     t <  t0
/// ```
///
/// The only state is the half-life; the elimination rate is always derived
/// from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConcentrationModel {
    half_life: f64,
    elimination_rate: f64,
}

impl Default for ConcentrationModel {
    fn default() -> Self {
        ConcentrationModel {
            half_life: DEFAULT_HALF_LIFE,
            elimination_rate: std::f64::consts::LN_2 / DEFAULT_HALF_LIFE,
        }
    }
}

impl ConcentrationModel {
    /// Create a model for a drug with the given half-life (h)
    ///
    /// # Errors
    ///
    /// * [DoseCurveError::InvalidParameter] if `half_life` is not a positive finite number
    /// * [DoseCurveError::DegenerateParameters] if the derived elimination rate equals
    ///   [ABSORPTION_RATE]
    pub fn new(half_life: f64) -> Result<Self, DoseCurveError> {
        let elimination_rate = elimination_rate(half_life)?;
        tracing::debug!(half_life, elimination_rate, "concentration model created");
        Ok(ConcentrationModel {
            half_life,
            elimination_rate,
        })
    }

    pub fn half_life(&self) -> f64 {
        self.half_life
    }

    /// `ln(2) / half_life`, in 1/h
    pub fn elimination_rate(&self) -> f64 {
        self.elimination_rate
    }

    /// Change the half-life and re-derive the elimination rate.
    /// On error the model is left unchanged.
    pub fn set_half_life(&mut self, half_life: f64) -> Result<(), DoseCurveError> {
        self.elimination_rate = elimination_rate(half_life)?;
        self.half_life = half_life;
        Ok(())
    }

    /// Concentration of a single immediate-release dose taken at `onset_time`,
    /// sampled at every entry of `times`.
    pub fn immediate_release(
        &self,
        times: &[f64],
        dose: f64,
        onset_time: f64,
    ) -> Result<Array1<f64>, DoseCurveError> {
        check_dose(dose, onset_time)?;
        times
            .iter()
            .map(|&t| -> Result<f64, DoseCurveError> {
                ensure_finite("time", t)?;
                let c = self.bateman(t - onset_time, dose);
                if !c.is_finite() {
                    return Err(DoseCurveError::invalid("dose", dose));
                }
                Ok(c)
            })
            .collect()
    }

    /// Concentration of a long-acting dose: half of `dose` released at
    /// `onset_time`, the other half [LA_RELEASE_DELAY] hours later.
    pub fn long_acting(
        &self,
        times: &[f64],
        dose: f64,
        onset_time: f64,
    ) -> Result<Array1<f64>, DoseCurveError> {
        let half = dose / 2.0;
        let first = self.immediate_release(times, half, onset_time)?;
        let second = self.immediate_release(times, half, onset_time + LA_RELEASE_DELAY)?;
        ensure_finite_series("dose", dose, first + second)
    }

    /// Curve for a single dose event, dispatching on its formulation
    pub fn concentration(
        &self,
        times: &[f64],
        event: &DoseEvent,
    ) -> Result<Array1<f64>, DoseCurveError> {
        match event.formulation() {
            Formulation::ImmediateRelease => {
                self.immediate_release(times, event.amount(), event.time())
            }
            Formulation::LongActing => self.long_acting(times, event.amount(), event.time()),
        }
    }

    /// Concentration of a single dose event at one point in time
    pub fn concentration_at(&self, time: f64, event: &DoseEvent) -> Result<f64, DoseCurveError> {
        Ok(self.concentration(&[time], event)?[0])
    }

    fn bateman(&self, elapsed: f64, dose: f64) -> f64 {
        if elapsed < 0.0 {
            return 0.0;
        }
        let ka = ABSORPTION_RATE;
        let ke = self.elimination_rate;
        // the fraction of the dose is at most one, so scale by the dose last
        let fraction = (ka / (ka - ke)) * ((-ke * elapsed).exp() - (-ka * elapsed).exp());
        let c = (BIOAVAILABILITY * dose / VOLUME) * fraction;
        // rounding can leave a negative residue right at onset; NaN passes through
        if c < 0.0 {
            0.0
        } else {
            c
        }
    }
}

fn elimination_rate(half_life: f64) -> Result<f64, DoseCurveError> {
    if !half_life.is_finite() || half_life <= 0.0 {
        return Err(DoseCurveError::invalid("half_life", half_life));
    }
    let ke = std::f64::consts::LN_2 / half_life;
    if !ke.is_finite() {
        return Err(DoseCurveError::invalid("half_life", half_life));
    }
    if (ABSORPTION_RATE - ke).abs() < DEGENERACY_TOLERANCE {
        return Err(DoseCurveError::DegenerateParameters {
            ka: ABSORPTION_RATE,
            ke,
        });
    }
    Ok(ke)
}

/// Fail with [DoseCurveError::InvalidParameter] naming `param` if any value overflowed
pub(crate) fn ensure_finite_series(
    param: &str,
    value: f64,
    series: Array1<f64>,
) -> Result<Array1<f64>, DoseCurveError> {
    if series.iter().all(|c| c.is_finite()) {
        Ok(series)
    } else {
        Err(DoseCurveError::invalid(param, value))
    }
}

fn check_dose(dose: f64, onset_time: f64) -> Result<(), DoseCurveError> {
    ensure_finite("dose", dose)?;
    ensure_finite("onset_time", onset_time)?;
    if dose < 0.0 {
        return Err(DoseCurveError::invalid("dose", dose));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference(t: f64, dose: f64, t0: f64, half_life: f64) -> f64 {
        if t < t0 {
            return 0.0;
        }
        let ke = std::f64::consts::LN_2 / half_life;
        dose * 2.0 / (2.0 - ke) * ((-ke * (t - t0)).exp() - (-2.0 * (t - t0)).exp())
    }

    #[test]
    fn test_default_model() {
        let model = ConcentrationModel::default();
        assert_eq!(model.half_life(), 2.5);
        assert_relative_eq!(model.elimination_rate(), 0.277258872, epsilon = 1e-9);
        assert_eq!(model, ConcentrationModel::new(2.5).unwrap());
    }

    #[test]
    fn test_invalid_half_life() {
        for half_life in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ConcentrationModel::new(half_life),
                Err(DoseCurveError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_subnormal_half_life_rejected() {
        // ln(2) / 5e-324 overflows to an infinite elimination rate
        assert!(matches!(
            ConcentrationModel::new(5e-324),
            Err(DoseCurveError::InvalidParameter { .. })
        ));
        let mut model = ConcentrationModel::default();
        assert!(model.set_half_life(5e-324).is_err());
        assert_eq!(model.half_life(), DEFAULT_HALF_LIFE);
    }

    #[test]
    fn test_huge_dose_stays_finite() {
        let model = ConcentrationModel::default();
        let dose = 1.7e308;
        let c = model.immediate_release(&[8.0, 9.0, 20.0], dose, 8.0).unwrap();
        assert_eq!(c[0], 0.0);
        assert!(c.iter().all(|v| v.is_finite() && *v <= dose));
        assert_relative_eq!(c[1], reference(9.0, 1.0, 8.0, 2.5) * dose, max_relative = 1e-12);

        let la = model.long_acting(&[9.0, 13.0], dose, 8.0).unwrap();
        assert!(la.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_overflowing_series_reported() {
        let series = Array1::from(vec![1.0, f64::INFINITY]);
        assert!(matches!(
            ensure_finite_series("dose", 1.0, series),
            Err(DoseCurveError::InvalidParameter { .. })
        ));
        let series = Array1::from(vec![1.0, f64::NAN]);
        assert!(ensure_finite_series("dose", 1.0, series).is_err());
    }

    #[test]
    fn test_degenerate_half_life() {
        let half_life = std::f64::consts::LN_2 / ABSORPTION_RATE;
        assert!(matches!(
            ConcentrationModel::new(half_life),
            Err(DoseCurveError::DegenerateParameters { .. })
        ));
    }

    #[test]
    fn test_set_half_life_keeps_rate_in_sync() {
        let mut model = ConcentrationModel::default();
        model.set_half_life(5.0).unwrap();
        assert_relative_eq!(model.elimination_rate(), std::f64::consts::LN_2 / 5.0);

        assert!(model.set_half_life(0.0).is_err());
        assert_eq!(model.half_life(), 5.0);
        assert_relative_eq!(model.elimination_rate(), std::f64::consts::LN_2 / 5.0);
    }

    #[test]
    fn test_immediate_release_matches_closed_form() {
        let model = ConcentrationModel::default();
        let times = [0.0, 7.9, 8.0, 8.5, 9.0, 12.0, 24.0, 40.0];
        let c = model.immediate_release(&times, 20.0, 8.0).unwrap();
        for (&t, &v) in times.iter().zip(c.iter()) {
            assert_relative_eq!(v, reference(t, 20.0, 8.0, 2.5), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_onset_boundary() {
        let model = ConcentrationModel::default();
        let c = model.immediate_release(&[8.0, 9.0], 20.0, 8.0).unwrap();
        assert_eq!(c[0], 0.0);
        assert!(c[1] > 0.0);
    }

    #[test]
    fn test_negative_dose_rejected() {
        let model = ConcentrationModel::default();
        assert!(matches!(
            model.immediate_release(&[1.0], -1.0, 0.0),
            Err(DoseCurveError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_non_finite_time_rejected() {
        let model = ConcentrationModel::default();
        assert!(model.immediate_release(&[1.0, f64::NAN], 1.0, 0.0).is_err());
        assert!(model.immediate_release(&[1.0], 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_fast_elimination_stays_non_negative() {
        // ke > ka flips the sign of both factors
        let model = ConcentrationModel::new(0.1).unwrap();
        let c = model.immediate_release(&[0.5, 1.0, 3.0], 10.0, 0.0).unwrap();
        assert!(c.iter().all(|&v| v > 0.0));
        assert_relative_eq!(c[1], reference(1.0, 10.0, 0.0, 0.1), epsilon = 1e-12);
    }

    #[test]
    fn test_concentration_dispatch() {
        let model = ConcentrationModel::default();
        let times = [9.0, 13.0];
        let la = DoseEvent::long_acting(8.0, 60.0);
        assert_eq!(
            model.concentration(&times, &la).unwrap(),
            model.long_acting(&times, 60.0, 8.0).unwrap()
        );
        let ir = DoseEvent::immediate_release(8.0, 20.0);
        assert_eq!(
            model.concentration_at(9.0, &ir).unwrap(),
            model.immediate_release(&[9.0], 20.0, 8.0).unwrap()[0]
        );
    }
}
