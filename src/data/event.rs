use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, DoseCurveError};

/// The release profile of an oral dose
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formulation {
    /// Absorbed through a single first-order absorption phase
    ImmediateRelease,
    /// Released as two immediate-release halves, the second one delayed
    LongActing,
}

impl fmt::Display for Formulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formulation::ImmediateRelease => write!(f, "IR"),
            Formulation::LongActing => write!(f, "LA"),
        }
    }
}

/// A single oral dose
///
/// A [DoseEvent] is an amount of drug taken at a specific time (in hours) with a
/// given [Formulation].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DoseEvent {
    time: f64,
    amount: f64,
    formulation: Formulation,
}

impl DoseEvent {
    /// Create a new dose event
    ///
    /// # Arguments
    ///
    /// * `time` - Onset time of the dose, in hours
    /// * `amount` - Amount of drug administered
    /// * `formulation` - Immediate-release or long-acting
    pub fn new(time: f64, amount: f64, formulation: Formulation) -> Self {
        DoseEvent {
            time,
            amount,
            formulation,
        }
    }

    pub fn immediate_release(time: f64, amount: f64) -> Self {
        Self::new(time, amount, Formulation::ImmediateRelease)
    }

    pub fn long_acting(time: f64, amount: f64) -> Self {
        Self::new(time, amount, Formulation::LongActing)
    }

    /// Get the onset time of the dose
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Get the amount of drug in the dose
    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn formulation(&self) -> Formulation {
        self.formulation
    }

    /// Set the onset time of the dose
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Set the amount of drug in the dose
    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount;
    }

    /// Check that the amount is non-negative and both fields are finite
    pub fn validate(&self) -> Result<(), DoseCurveError> {
        ensure_finite("onset_time", self.time)?;
        ensure_finite("dose", self.amount)?;
        if self.amount < 0.0 {
            return Err(DoseCurveError::invalid("dose", self.amount));
        }
        Ok(())
    }

    /// Short label used in reports, e.g. `LA 60 @ 8h`
    pub fn label(&self) -> String {
        format!("{} {} @ {}h", self.formulation, self.amount, self.time)
    }
}

impl fmt::Display for DoseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dose {{ time: {:.2}, amount: {:.2}, formulation: {} }}",
            self.time, self.amount, self.formulation
        )
    }
}
