use thiserror::Error;

/// Errors produced by the concentration model and its collaborators
#[derive(Error, Debug)]
pub enum DoseCurveError {
    /// A parameter was out of range or not finite
    #[error("Invalid parameter: {param} = {value}")]
    InvalidParameter { param: String, value: String },

    /// The absorption and elimination rate constants coincide
    #[error("Degenerate parameters: absorption rate {ka} equals elimination rate {ke}")]
    DegenerateParameters { ka: f64, ke: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Settings could not be parsed: {0}")]
    Json(#[from] serde_json::Error),
}

impl DoseCurveError {
    pub(crate) fn invalid(param: impl Into<String>, value: impl ToString) -> Self {
        DoseCurveError::InvalidParameter {
            param: param.into(),
            value: value.to_string(),
        }
    }
}

/// Reject non-finite values for the named parameter
pub(crate) fn ensure_finite(param: &str, value: f64) -> Result<(), DoseCurveError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DoseCurveError::invalid(param, value))
    }
}
