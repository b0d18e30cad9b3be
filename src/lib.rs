//! Plasma concentration curves for oral dosing regimens.
//!
//! A [ConcentrationModel] evaluates the one-compartment Bateman curve of an
//! immediate-release dose, and a long-acting dose as two delayed halves. Curves
//! of several doses are summed into a [RegimenPrediction], optionally including
//! the residual of the previous day's doses.
//!
//! ```rust
//! use dosecurve::prelude::*;
//!
//! let model = ConcentrationModel::new(2.5)?;
//! let times = daily_grid();
//! let regimen = Regimen::builder("morning")
//!     .long_acting(8.0, 60.0)
//!     .immediate_release(16.0, 20.0)
//!     .build();
//! let prediction = model.simulate(&regimen, &times, Carryover::PreviousDay)?;
//! assert_eq!(prediction.total().len(), times.len());
//! # Ok::<(), DoseCurveError>(())
//! ```

pub mod data;
pub mod error;
pub mod report;
pub mod settings;
pub mod simulator;

pub use crate::data::*;
pub use crate::simulator::*;
pub use error::DoseCurveError;

pub mod prelude {
    pub use crate::data::{daily_grid, linspace, DoseEvent, Formulation, Regimen};
    pub use crate::error::DoseCurveError;
    pub use crate::report::Report;
    pub use crate::settings::PanelSettings;
    pub use crate::simulator::{
        with_carryover, Carryover, ConcentrationModel, ExposureSummary, RegimenPrediction,
    };
}
