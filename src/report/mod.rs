//! Static concentration reports
//!
//! A [Report] is a set of labelled concentration series sharing one time axis,
//! together with the dosing times to mark on a chart. Reports are written as
//! CSV tables that a plotting tool can render directly.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use serde::{Deserialize, Serialize};

use crate::data::event::Formulation;
use crate::error::DoseCurveError;
use crate::simulator::superposition::RegimenPrediction;

pub const TOTAL_LABEL: &str = "Total Concentration";

/// One labelled line on a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

/// A vertical marker at a dosing time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosingMarker {
    pub time: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    title: String,
    times: Vec<f64>,
    series: Vec<Series>,
    markers: Vec<DosingMarker>,
}

impl Report {
    pub fn new(title: impl Into<String>, times: Vec<f64>) -> Self {
        Report {
            title: title.into(),
            times,
            series: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Add a series. Fails if its length differs from the time axis.
    pub fn with_series(
        mut self,
        label: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, DoseCurveError> {
        let label = label.into();
        if values.len() != self.times.len() {
            return Err(DoseCurveError::invalid(
                format!("series '{}'", label),
                format!("{} values for {} times", values.len(), self.times.len()),
            ));
        }
        self.series.push(Series { label, values });
        Ok(self)
    }

    pub fn with_marker(mut self, time: f64, label: impl Into<String>) -> Self {
        self.markers.push(DosingMarker {
            time,
            label: label.into(),
        });
        self
    }

    /// Total concentration of a prediction, with a marker per dose
    pub fn from_prediction(
        title: impl Into<String>,
        prediction: &RegimenPrediction,
    ) -> Result<Self, DoseCurveError> {
        Ok(Report::new(title, prediction.times().to_vec())
            .with_series(TOTAL_LABEL, prediction.total().to_vec())?
            .with_dose_markers(prediction))
    }

    /// Long-acting, total immediate-release and total curves on one chart
    pub fn la_plus_ir(
        title: impl Into<String>,
        prediction: &RegimenPrediction,
    ) -> Result<Self, DoseCurveError> {
        let la_label = prediction
            .curves()
            .iter()
            .filter(|c| c.event.formulation() == Formulation::LongActing)
            .map(|c| format!("LA {}", c.event.amount()))
            .collect::<Vec<_>>()
            .join(" + ");
        let la_label = if la_label.is_empty() {
            "LA".to_string()
        } else {
            la_label
        };
        Ok(Report::new(title, prediction.times().to_vec())
            .with_series(
                la_label,
                prediction.total_for(Formulation::LongActing).to_vec(),
            )?
            .with_series(
                "Total IR",
                prediction.total_for(Formulation::ImmediateRelease).to_vec(),
            )?
            .with_series(TOTAL_LABEL, prediction.total().to_vec())?
            .with_dose_markers(prediction))
    }

    fn with_dose_markers(self, prediction: &RegimenPrediction) -> Self {
        prediction.curves().iter().fold(self, |report, curve| {
            let label = format!(
                "Dosing Time ({}) {}",
                clock_label(curve.event.time()),
                curve.event.label()
            );
            report.with_marker(curve.event.time(), label)
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn markers(&self) -> &[DosingMarker] {
        &self.markers
    }

    /// Write the series as a table: a `time` column followed by one column per series
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), DoseCurveError> {
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

        let mut header = vec!["time".to_string()];
        header.extend(self.series.iter().map(|s| s.label.clone()));
        writer.write_record(&header)?;

        for (i, t) in self.times.iter().enumerate() {
            let mut row = vec![t.to_string()];
            for series in &self.series {
                let value = series.values.get(i).ok_or_else(|| {
                    DoseCurveError::invalid(
                        format!("series '{}'", series.label),
                        format!("{} values for {} times", series.values.len(), self.times.len()),
                    )
                })?;
                row.push(value.to_string());
            }
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the dosing markers as a `time,label` table
    pub fn write_markers_csv<W: Write>(&self, writer: W) -> Result<(), DoseCurveError> {
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
        writer.write_record(["time", "label"])?;
        for marker in &self.markers {
            writer.write_record([marker.time.to_string(), marker.label.clone()])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write `<stem>.csv` and `<stem>_doses.csv` into `dir`, returning both paths
    pub fn save(&self, dir: &Path, stem: &str) -> Result<(PathBuf, PathBuf), DoseCurveError> {
        let series_path = dir.join(format!("{}.csv", stem));
        let markers_path = dir.join(format!("{}_doses.csv", stem));
        self.write_csv(File::create(&series_path)?)?;
        self.write_markers_csv(File::create(&markers_path)?)?;
        tracing::info!(
            title = %self.title,
            path = %series_path.display(),
            series = self.series.len(),
            "report written"
        );
        Ok((series_path, markers_path))
    }
}

/// 12-hour clock label for an hour of the day, e.g. `8 AM`, `4:30 PM`
pub fn clock_label(hours: f64) -> String {
    let total_minutes = (hours.rem_euclid(24.0) * 60.0).round() as u32 % (24 * 60);
    let (hour, minute) = (total_minutes / 60, total_minutes % 60);
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    if minute == 0 {
        format!("{} {}", display_hour, suffix)
    } else {
        format!("{}:{:02} {}", display_hour, minute, suffix)
    }
}
