use serde::{Deserialize, Serialize};

use crate::data::event::{DoseEvent, Formulation};
use crate::error::DoseCurveError;

/// An ordered sequence of dose events taken over one day
///
/// The same regimen is assumed to repeat every day when carryover is requested.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "RawRegimen")]
pub struct Regimen {
    id: String,
    events: Vec<DoseEvent>,
}

/// Serialized form, sorted on the way in by [Regimen::new]
#[derive(Deserialize)]
struct RawRegimen {
    id: String,
    events: Vec<DoseEvent>,
}

impl From<RawRegimen> for Regimen {
    fn from(raw: RawRegimen) -> Self {
        Regimen::new(raw.id, raw.events)
    }
}

impl Regimen {
    pub fn new(id: impl Into<String>, mut events: Vec<DoseEvent>) -> Self {
        events.sort_by(|a, b| a.time().total_cmp(&b.time()));
        Regimen {
            id: id.into(),
            events,
        }
    }

    pub fn builder(id: impl Into<String>) -> RegimenBuilder {
        RegimenBuilder {
            id: id.into(),
            events: Vec::new(),
        }
    }

    /// LA 60 at 8 AM, followed by IR 20 at 4 PM and IR 20 at 8 PM
    pub fn la_plus_ir() -> Self {
        Regimen::builder("la_plus_ir")
            .long_acting(8.0, 60.0)
            .immediate_release(16.0, 20.0)
            .immediate_release(20.0, 20.0)
            .build()
    }

    /// IR 20 every four hours from 8 AM to 8 PM
    pub fn ir_only() -> Self {
        Regimen::builder("ir_only")
            .immediate_release(8.0, 20.0)
            .repeat(3, 4.0)
            .build()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn events(&self) -> &[DoseEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events of a single formulation, in time order
    pub fn events_of(&self, formulation: Formulation) -> impl Iterator<Item = &DoseEvent> {
        self.events
            .iter()
            .filter(move |e| e.formulation() == formulation)
    }

    /// Total amount administered over the regimen
    pub fn total_amount(&self) -> f64 {
        self.events.iter().map(|e| e.amount()).sum()
    }

    /// Validate every event, failing on the first invalid one
    pub fn validate(&self) -> Result<(), DoseCurveError> {
        self.events.iter().try_for_each(|e| e.validate())
    }
}

pub struct RegimenBuilder {
    id: String,
    events: Vec<DoseEvent>,
}

impl RegimenBuilder {
    pub fn event(mut self, event: DoseEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn immediate_release(self, time: f64, amount: f64) -> Self {
        self.event(DoseEvent::immediate_release(time, amount))
    }

    pub fn long_acting(self, time: f64, amount: f64) -> Self {
        self.event(DoseEvent::long_acting(time, amount))
    }

    /// Repeat the last added event `n` times, every `delta` hours.
    /// Does nothing if no event has been added yet.
    pub fn repeat(mut self, n: usize, delta: f64) -> Self {
        let Some(last) = self.events.last().copied() else {
            return self;
        };
        for i in 1..=n {
            let mut next = last;
            next.set_time(last.time() + delta * i as f64);
            self = self.event(next);
        }
        self
    }

    pub fn build(self) -> Regimen {
        Regimen::new(self.id, self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sorts_by_time() {
        let regimen = Regimen::builder("test")
            .immediate_release(20.0, 20.0)
            .long_acting(8.0, 60.0)
            .immediate_release(16.0, 20.0)
            .build();
        let times: Vec<f64> = regimen.events().iter().map(|e| e.time()).collect();
        assert_eq!(times, vec![8.0, 16.0, 20.0]);
        assert_eq!(regimen.id(), "test");
    }

    #[test]
    fn test_deserialized_events_are_sorted() {
        let json = r#"{
            "id": "evening_first",
            "events": [
                { "time": 20.0, "amount": 20.0, "formulation": "ImmediateRelease" },
                { "time": 8.0, "amount": 60.0, "formulation": "LongActing" }
            ]
        }"#;
        let regimen: Regimen = serde_json::from_str(json).unwrap();
        let times: Vec<f64> = regimen.events().iter().map(|e| e.time()).collect();
        assert_eq!(times, vec![8.0, 20.0]);
        let expected = Regimen::builder("evening_first")
            .long_acting(8.0, 60.0)
            .immediate_release(20.0, 20.0)
            .build();
        assert_eq!(regimen, expected);
    }

    #[test]
    fn test_repeat() {
        let regimen = Regimen::ir_only();
        let times: Vec<f64> = regimen.events().iter().map(|e| e.time()).collect();
        assert_eq!(times, vec![8.0, 12.0, 16.0, 20.0]);
        assert!(regimen.events().iter().all(|e| e.amount() == 20.0));
        assert_eq!(regimen.total_amount(), 80.0);
    }

    #[test]
    fn test_repeat_without_events_is_noop() {
        let regimen = Regimen::builder("empty").repeat(3, 4.0).build();
        assert!(regimen.is_empty());
    }

    #[test]
    fn test_la_plus_ir_preset() {
        let regimen = Regimen::la_plus_ir();
        assert_eq!(regimen.len(), 3);
        assert_eq!(regimen.events_of(Formulation::LongActing).count(), 1);
        assert_eq!(regimen.events_of(Formulation::ImmediateRelease).count(), 2);
        assert!(regimen.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_bad_event() {
        let regimen = Regimen::builder("bad")
            .immediate_release(8.0, 20.0)
            .immediate_release(12.0, -5.0)
            .build();
        assert!(regimen.validate().is_err());
    }
}
