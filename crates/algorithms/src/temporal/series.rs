//! Date-ordered collection of scene classifications

use chrono::NaiveDate;
use greentrend_core::{Error, Result};
use serde::Serialize;

use super::trend::{TrendMetric, TrendSample};
use crate::imagery::SceneClassification;

/// Scene classifications in strictly increasing date order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimeSeries {
    records: Vec<SceneClassification>,
}

impl TimeSeries {
    /// Build from records already sorted by date.
    ///
    /// # Errors
    /// `NonMonotonicDate` on the first duplicate or decreasing date
    pub fn new(records: Vec<SceneClassification>) -> Result<Self> {
        for (i, pair) in records.windows(2).enumerate() {
            check_order(i + 1, pair[0].date(), pair[1].date())?;
        }
        Ok(Self { records })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a record dated after the current last one
    pub fn push(&mut self, record: SceneClassification) -> Result<()> {
        if let Some(last) = self.last_date() {
            check_order(self.records.len(), last, record.date())?;
        }
        self.records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SceneClassification] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneClassification> {
        self.records.iter()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(SceneClassification::date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(SceneClassification::date)
    }

    /// Days from the first to the last record; 0 when shorter than two
    pub fn span_days(&self) -> i64 {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => (last - first).num_days(),
            _ => 0,
        }
    }

    /// `(date, value)` pairs of one metric. Records without a value for
    /// the metric are skipped.
    pub fn samples(&self, metric: TrendMetric) -> Vec<TrendSample> {
        self.records
            .iter()
            .filter_map(|record| {
                metric.value(record).map(|value| TrendSample {
                    date: record.date(),
                    value,
                })
            })
            .collect()
    }
}

fn check_order(index: usize, previous: NaiveDate, current: NaiveDate) -> Result<()> {
    if current <= previous {
        return Err(Error::NonMonotonicDate {
            index,
            previous,
            current,
        });
    }
    Ok(())
}
