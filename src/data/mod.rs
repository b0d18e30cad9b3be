pub mod event;
pub mod regimen;
pub mod time;
pub use event::*;
pub use regimen::{Regimen, RegimenBuilder};
pub use time::{daily_grid, linspace, shifted, DAILY_SAMPLES, DAY_HOURS};
