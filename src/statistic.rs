//! Statistics over a parsed dataset
//!
//! A [`Statistic`] splits a [`Dataset`] into one series per core field and
//! computes minimum, maximum and average over the real values of each
//! series. Placeholders stay in the series as `None` (so charts can show
//! gaps) but never take part in the summaries.

use crate::models::{Dataset, Field, Measurement, Slot};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Minimum, maximum and truncated average of one series
///
/// All three are `None` when the series holds no real value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    pub min: Option<i32>,
    pub max: Option<i32>,
    pub avg: Option<i32>,
}

impl FieldSummary {
    fn from_series(series: &[Option<i32>]) -> Self {
        let values: Vec<i32> = series.iter().flatten().copied().collect();
        if values.is_empty() {
            return Self::default();
        }

        let sum: i64 = values.iter().map(|v| i64::from(*v)).sum();
        let avg = sum / values.len() as i64;
        Self {
            min: values.iter().min().copied(),
            max: values.iter().max().copied(),
            avg: i32::try_from(avg).ok(),
        }
    }
}

/// Per-field series and summaries of a dataset
#[derive(Debug, Clone)]
pub struct Statistic {
    data: Dataset,
    series: [Vec<Option<i32>>; 3],
    summaries: [FieldSummary; 3],
}

impl Statistic {
    pub fn new(data: Dataset) -> Self {
        let series = Field::ALL.map(|field| {
            data.iter()
                .map(|slot| slot.as_ref().map(|m| m.get(field)))
                .collect::<Vec<_>>()
        });
        let summaries = [
            FieldSummary::from_series(&series[0]),
            FieldSummary::from_series(&series[1]),
            FieldSummary::from_series(&series[2]),
        ];

        debug!(
            "Statistic over {} slot(s), {} placeholder(s)",
            data.len(),
            series[0].iter().filter(|v| v.is_none()).count()
        );
        Self {
            data,
            series,
            summaries,
        }
    }

    /// The dataset as handed over by the parser
    pub fn data(&self) -> &Dataset {
        &self.data
    }

    /// Every slot in order, placeholders included
    pub fn values(&self) -> Vec<&Slot> {
        self.data.iter().collect()
    }

    /// Only the real measurements
    pub fn measurements(&self) -> Vec<&Measurement> {
        self.data.iter().flatten().collect()
    }

    /// Number of placeholders
    pub fn skipped_count(&self) -> usize {
        self.data.iter().filter(|slot| slot.is_none()).count()
    }

    /// True when the dataset has no slots at all
    ///
    /// A dataset made only of placeholders is not empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Values of one field, `None` at every placeholder position
    pub fn series(&self, field: Field) -> &[Option<i32>] {
        &self.series[field.index()]
    }

    pub fn summary(&self, field: Field) -> FieldSummary {
        self.summaries[field.index()]
    }

    /// Serializable snapshot with measurements rendered as objects
    pub fn export(&self) -> StatisticExport {
        let [sys, dia, pulse] = self.series.clone();
        let [sys_summary, dia_summary, pulse_summary] = self.summaries;

        StatisticExport {
            data: self
                .data
                .to_json_with(|m| Value::Object(m.as_dict())),
            sys,
            dia,
            pulse,
            sys_min: sys_summary.min,
            sys_max: sys_summary.max,
            sys_avg: sys_summary.avg,
            dia_min: dia_summary.min,
            dia_max: dia_summary.max,
            dia_avg: dia_summary.avg,
            pulse_min: pulse_summary.min,
            pulse_max: pulse_summary.max,
            pulse_avg: pulse_summary.avg,
            skipped: self.skipped_count(),
        }
    }
}

/// Flat, ordered view of a [`Statistic`] for JSON export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticExport {
    pub data: Value,
    pub sys: Vec<Option<i32>>,
    pub dia: Vec<Option<i32>>,
    pub pulse: Vec<Option<i32>>,
    pub sys_min: Option<i32>,
    pub sys_max: Option<i32>,
    pub sys_avg: Option<i32>,
    pub dia_min: Option<i32>,
    pub dia_max: Option<i32>,
    pub dia_avg: Option<i32>,
    pub pulse_min: Option<i32>,
    pub pulse_max: Option<i32>,
    pub pulse_avg: Option<i32>,
    pub skipped: usize,
}
