pub mod carryover;
pub mod model;
pub mod superposition;

pub use carryover::{with_carryover, Carryover, CARRYOVER_PERIOD};
pub use model::{
    ConcentrationModel, ABSORPTION_RATE, BIOAVAILABILITY, DEFAULT_HALF_LIFE, LA_RELEASE_DELAY,
    VOLUME,
};
pub use superposition::{summarize, EventCurve, ExposureSummary, RegimenPrediction};
