//! Persisted settings of the interactive dosing panel
//!
//! Settings are stored as a flat JSON object mapping a setting name to its
//! value as text. Every field is defaulted on its own: a missing, malformed or
//! out-of-range entry falls back to that field's default and leaves the other
//! fields untouched.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::regimen::Regimen;
use crate::error::DoseCurveError;
use crate::simulator::model::{ConcentrationModel, DEFAULT_HALF_LIFE};

/// Number of dose slots on the immediate-release only tab
pub const IR_ONLY_SLOTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Dose,
    Time,
    HalfLife,
}

impl FieldKind {
    fn accepts(&self, value: f64) -> bool {
        match self {
            FieldKind::Dose => value.is_finite() && value >= 0.0,
            FieldKind::Time => value.is_finite(),
            FieldKind::HalfLife => ConcentrationModel::new(value).is_ok(),
        }
    }
}

/// Values of every editable field on the panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSettings {
    pub half_life: f64,
    pub la_dose: f64,
    pub la_time: f64,
    pub ir_afternoon_dose: f64,
    pub ir_afternoon_time: f64,
    pub ir_evening_dose: f64,
    pub ir_evening_time: f64,
    pub ir_doses: [f64; IR_ONLY_SLOTS],
    pub ir_times: [f64; IR_ONLY_SLOTS],
}

impl Default for PanelSettings {
    fn default() -> Self {
        PanelSettings {
            half_life: DEFAULT_HALF_LIFE,
            la_dose: 60.0,
            la_time: 8.0,
            ir_afternoon_dose: 20.0,
            ir_afternoon_time: 16.0,
            ir_evening_dose: 20.0,
            ir_evening_time: 20.0,
            ir_doses: [20.0; IR_ONLY_SLOTS],
            ir_times: [8.0, 12.0, 16.0, 20.0],
        }
    }
}

impl PanelSettings {
    fn fields_mut(&mut self) -> Vec<(String, &mut f64, FieldKind)> {
        let mut fields = vec![
            ("half_life".to_string(), &mut self.half_life, FieldKind::HalfLife),
            ("la_dose".to_string(), &mut self.la_dose, FieldKind::Dose),
            ("la_time".to_string(), &mut self.la_time, FieldKind::Time),
            (
                "ir_afternoon_dose".to_string(),
                &mut self.ir_afternoon_dose,
                FieldKind::Dose,
            ),
            (
                "ir_afternoon_time".to_string(),
                &mut self.ir_afternoon_time,
                FieldKind::Time,
            ),
            (
                "ir_evening_dose".to_string(),
                &mut self.ir_evening_dose,
                FieldKind::Dose,
            ),
            (
                "ir_evening_time".to_string(),
                &mut self.ir_evening_time,
                FieldKind::Time,
            ),
        ];
        for (i, dose) in self.ir_doses.iter_mut().enumerate() {
            fields.push((format!("ir_dose_{}", i), dose, FieldKind::Dose));
        }
        for (i, time) in self.ir_times.iter_mut().enumerate() {
            fields.push((format!("ir_time_{}", i), time, FieldKind::Time));
        }
        fields
    }

    /// Build settings from a flat key/value map, defaulting each bad or missing entry
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let mut settings = PanelSettings::default();
        for (key, slot, kind) in settings.fields_mut() {
            let Some(text) = map.get(&key) else {
                tracing::debug!(key = %key, "setting missing, using default");
                continue;
            };
            match text.trim().parse::<f64>() {
                Ok(value) if kind.accepts(value) => *slot = value,
                _ => tracing::warn!(
                    key = %key,
                    value = %text,
                    default = *slot,
                    "invalid setting, using default"
                ),
            }
        }
        settings
    }

    /// Flat key/value form, as persisted
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut copy = self.clone();
        let map = copy
            .fields_mut()
            .into_iter()
            .map(|(key, value, _)| (key, value.to_string()))
            .collect();
        map
    }

    /// Load settings from `path`.
    ///
    /// A missing file yields the defaults. A file that is not a JSON object is
    /// treated as corrupt and also yields the defaults. Other I/O failures are
    /// returned.
    pub fn load(path: &Path) -> Result<Self, DoseCurveError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(PanelSettings::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self::from_json(&contents))
    }

    /// Parse the persisted JSON form. Non-string scalar values are accepted
    /// as their textual representation.
    pub fn from_json(contents: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(contents) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "corrupt settings, using defaults");
                return PanelSettings::default();
            }
        };
        let Some(object) = value.as_object() else {
            tracing::warn!("settings are not a key/value object, using defaults");
            return PanelSettings::default();
        };
        let map = object
            .iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    _ => return None,
                };
                Some((key.clone(), text))
            })
            .collect();
        Self::from_map(&map)
    }

    pub fn to_json(&self) -> Result<String, DoseCurveError> {
        Ok(serde_json::to_string_pretty(&self.to_map())?)
    }

    pub fn save(&self, path: &Path) -> Result<(), DoseCurveError> {
        fs::write(path, self.to_json()?)?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    pub fn model(&self) -> Result<ConcentrationModel, DoseCurveError> {
        ConcentrationModel::new(self.half_life)
    }

    /// The long-acting plus immediate-release schedule
    pub fn la_plus_ir(&self) -> Regimen {
        Regimen::builder("la_plus_ir")
            .long_acting(self.la_time, self.la_dose)
            .immediate_release(self.ir_afternoon_time, self.ir_afternoon_dose)
            .immediate_release(self.ir_evening_time, self.ir_evening_dose)
            .build()
    }

    /// The immediate-release only schedule
    pub fn ir_only(&self) -> Regimen {
        self.ir_times
            .iter()
            .zip(self.ir_doses.iter())
            .fold(Regimen::builder("ir_only"), |builder, (&time, &dose)| {
                builder.immediate_release(time, dose)
            })
            .build()
    }
}

/// Parse a value typed into a panel field.
///
/// Returns [DoseCurveError::InvalidParameter] for text that is not a finite
/// number, so the panel can show an "invalid input" notice instead of a curve.
pub fn parse_field(name: &str, text: &str) -> Result<f64, DoseCurveError> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(DoseCurveError::invalid(name, text)),
    }
}
