//! Health metric tracking: blood pressure, heart rate, blood sugar,
//! weight and temperature readings entered by the user.

use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::MetricKind;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A reading as submitted by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMetric {
    pub kind: MetricKind,
    pub value: f64,
    /// Diastolic pressure; only for blood pressure.
    #[serde(default)]
    pub secondary_value: Option<f64>,
    /// Defaults to now.
    #[serde(default)]
    pub recorded_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMetric {
    pub id: String,
    pub kind: MetricKind,
    pub value: f64,
    pub secondary_value: Option<f64>,
    pub unit: String,
    pub recorded_at: String,
    pub notes: Option<String>,
}

/// Plausible range for the primary value of each kind.
fn plausible_range(kind: MetricKind) -> (f64, f64) {
    match kind {
        MetricKind::BloodPressure => (50.0, 260.0),
        MetricKind::HeartRate => (20.0, 250.0),
        MetricKind::BloodSugar => (20.0, 600.0),
        MetricKind::Weight => (1.0, 500.0),
        MetricKind::Temperature => (30.0, 45.0),
    }
}

/// Rejects readings outside plausible ranges and malformed blood pressure.
pub fn validate(metric: &NewMetric) -> Result<(), String> {
    if !metric.value.is_finite() {
        return Err("Value must be a number".into());
    }
    let (min, max) = plausible_range(metric.kind);
    if metric.value < min || metric.value > max {
        return Err(format!(
            "{} must be between {min} and {max} {}",
            metric.kind,
            metric.kind.unit()
        ));
    }

    match (metric.kind, metric.secondary_value) {
        (MetricKind::BloodPressure, None) => {
            return Err("Blood pressure requires a diastolic value".into());
        }
        (MetricKind::BloodPressure, Some(diastolic)) => {
            if !diastolic.is_finite() || !(30.0..=180.0).contains(&diastolic) {
                return Err("Diastolic pressure must be between 30 and 180 mmHg".into());
            }
            if diastolic >= metric.value {
                return Err("Diastolic pressure must be lower than systolic".into());
            }
        }
        (_, Some(_)) => {
            return Err(format!("{} does not take a secondary value", metric.kind));
        }
        (_, None) => {}
    }

    if let Some(ref notes) = metric.notes {
        if notes.chars().count() > 500 {
            return Err("Notes must be 500 characters or fewer".into());
        }
    }
    Ok(())
}

fn row_to_metric(row: &Row<'_>) -> rusqlite::Result<HealthMetric> {
    let kind_str: String = row.get(1)?;
    let kind = MetricKind::from_str(&kind_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(HealthMetric {
        id: row.get(0)?,
        kind,
        value: row.get(2)?,
        secondary_value: row.get(3)?,
        unit: row.get(4)?,
        recorded_at: row.get(5)?,
        notes: row.get(6)?,
    })
}

/// Records a reading. Callers validate first. Returns the generated UUID.
pub fn record_metric(conn: &Connection, metric: &NewMetric) -> Result<Uuid, DatabaseError> {
    let id = Uuid::new_v4();
    let recorded_at = metric
        .recorded_at
        .unwrap_or_else(|| Local::now().naive_local())
        .format(TIMESTAMP_FORMAT)
        .to_string();

    conn.execute(
        "INSERT INTO health_metrics (id, kind, value, secondary_value, unit, recorded_at, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id.to_string(),
            metric.kind.as_str(),
            metric.value,
            metric.secondary_value,
            metric.kind.unit(),
            recorded_at,
            metric.notes,
        ],
    )?;
    Ok(id)
}

/// Readings newest first, optionally of one kind.
pub fn fetch_metrics(
    conn: &Connection,
    kind: Option<MetricKind>,
    limit: u32,
) -> Result<Vec<HealthMetric>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, value, secondary_value, unit, recorded_at, notes
         FROM health_metrics
         WHERE (?1 IS NULL OR kind = ?1)
         ORDER BY recorded_at DESC, rowid DESC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(
        params![kind.map(|k| k.as_str()), i64::from(limit)],
        row_to_metric,
    )?;

    let mut metrics = Vec::new();
    for row in rows {
        metrics.push(row?);
    }
    Ok(metrics)
}

/// Most recent reading of every kind that has one, in `MetricKind::ALL` order.
pub fn latest_per_kind(conn: &Connection) -> Result<Vec<HealthMetric>, DatabaseError> {
    let mut latest = Vec::new();
    for kind in MetricKind::ALL {
        if let Some(metric) = fetch_metrics(conn, Some(kind), 1)?.into_iter().next() {
            latest.push(metric);
        }
    }
    Ok(latest)
}

pub fn delete_metric(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM health_metrics WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "HealthMetric".into(),
            id: id.into(),
        });
    }
    Ok(())
}
