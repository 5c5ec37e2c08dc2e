//! Medicine reminders: daily dose times per medicine and the
//! "what is due soon" query.

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;

const TIME_FORMAT: &str = "%H:%M";
const MAX_TIMES_PER_DAY: usize = 12;

#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("{0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReminder {
    pub medicine_name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    /// `HH:MM` dose times.
    pub times: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineReminder {
    pub id: String,
    pub medicine_name: String,
    pub dosage: Option<String>,
    pub times: Vec<String>,
    pub active: bool,
    pub notes: Option<String>,
    pub created_at: String,
}

/// A reminder with one upcoming dose time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueReminder {
    pub reminder: MedicineReminder,
    pub due_at: String,
}

/// Parse `HH:MM` times from separate entries or a comma-separated list.
/// Output is sorted and de-duplicated.
pub fn parse_times<S: AsRef<str>>(raw: &[S]) -> Result<Vec<NaiveTime>, String> {
    let mut times = Vec::new();
    for entry in raw {
        for part in entry.as_ref().split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let time = NaiveTime::parse_from_str(part, TIME_FORMAT)
                .map_err(|_| format!("Invalid time: {part} (expected HH:MM)"))?;
            times.push(time);
        }
    }
    times.sort();
    times.dedup();
    Ok(times)
}

fn format_times(times: &[NaiveTime]) -> Vec<String> {
    times.iter().map(|t| t.format(TIME_FORMAT).to_string()).collect()
}

pub fn validate(reminder: &NewReminder) -> Result<Vec<NaiveTime>, String> {
    let name = reminder.medicine_name.trim();
    if name.is_empty() {
        return Err("Medicine name is required".into());
    }
    if name.chars().count() > 100 {
        return Err("Medicine name too long".into());
    }
    if let Some(ref dosage) = reminder.dosage {
        if dosage.chars().count() > 100 {
            return Err("Dosage too long".into());
        }
    }
    if let Some(ref notes) = reminder.notes {
        if notes.chars().count() > 500 {
            return Err("Notes must be 500 characters or fewer".into());
        }
    }

    let times = parse_times(&reminder.times)?;
    if times.is_empty() {
        return Err("At least one reminder time is required".into());
    }
    if times.len() > MAX_TIMES_PER_DAY {
        return Err(format!("At most {MAX_TIMES_PER_DAY} reminder times per day"));
    }
    Ok(times)
}

/// Earliest dose time at or after `now`; wraps to tomorrow's first time.
pub fn next_due(times: &[NaiveTime], now: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = now.date();
    let mut sorted = times.to_vec();
    sorted.sort();

    if let Some(t) = sorted.iter().find(|t| **t >= now.time()) {
        return Some(today.and_time(*t));
    }
    let first = sorted.first()?;
    today.succ_opt().map(|tomorrow| tomorrow.and_time(*first))
}

fn row_to_reminder(row: &Row<'_>) -> rusqlite::Result<MedicineReminder> {
    let times: String = row.get(3)?;
    Ok(MedicineReminder {
        id: row.get(0)?,
        medicine_name: row.get(1)?,
        dosage: row.get(2)?,
        times: times.split(',').map(str::to_string).collect(),
        active: row.get::<_, i32>(4)? != 0,
        notes: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Stores a reminder after validation. Returns the generated UUID.
pub fn create_reminder(conn: &Connection, reminder: &NewReminder) -> Result<Uuid, ReminderError> {
    let times = validate(reminder).map_err(ReminderError::Invalid)?;
    let id = Uuid::new_v4();
    let now = Local::now().naive_local().format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO medicine_reminders (id, medicine_name, dosage, times, active, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)",
        params![
            id.to_string(),
            reminder.medicine_name.trim(),
            reminder.dosage,
            format_times(&times).join(","),
            reminder.notes,
            now,
        ],
    )
    .map_err(DatabaseError::from)?;

    tracing::info!(reminder_id = %id, doses_per_day = times.len(), "Reminder created");
    Ok(id)
}

pub fn get_reminder(conn: &Connection, id: &str) -> Result<MedicineReminder, DatabaseError> {
    conn.query_row(
        "SELECT id, medicine_name, dosage, times, active, notes, created_at
         FROM medicine_reminders WHERE id = ?1",
        params![id],
        row_to_reminder,
    )
    .optional()?
    .ok_or_else(|| DatabaseError::NotFound {
        entity_type: "MedicineReminder".into(),
        id: id.into(),
    })
}

pub fn list_reminders(
    conn: &Connection,
    active_only: bool,
) -> Result<Vec<MedicineReminder>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, medicine_name, dosage, times, active, notes, created_at
         FROM medicine_reminders
         WHERE (?1 = 0 OR active = 1)
         ORDER BY medicine_name COLLATE NOCASE, created_at",
    )?;
    let rows = stmt.query_map(params![active_only as i32], row_to_reminder)?;

    let mut reminders = Vec::new();
    for row in rows {
        reminders.push(row?);
    }
    Ok(reminders)
}

pub fn set_active(conn: &Connection, id: &str, active: bool) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE medicine_reminders SET active = ?1 WHERE id = ?2",
        params![active as i32, id],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "MedicineReminder".into(),
            id: id.into(),
        });
    }
    Ok(())
}

pub fn delete_reminder(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM medicine_reminders WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "MedicineReminder".into(),
            id: id.into(),
        });
    }
    Ok(())
}

/// Active reminders with a dose time in `[now, now + window)`, soonest first.
/// A reminder with several times in the window appears once per time, and
/// once per day when the window spans several days.
pub fn due_within(
    conn: &Connection,
    now: NaiveDateTime,
    window_minutes: u32,
) -> Result<Vec<DueReminder>, DatabaseError> {
    let window_end = now + Duration::minutes(i64::from(window_minutes));
    let mut days = Vec::new();
    let mut day = Some(now.date());
    while let Some(d) = day.filter(|d| *d <= window_end.date()) {
        days.push(d);
        day = d.succ_opt();
    }

    let mut due: Vec<(NaiveDateTime, MedicineReminder)> = Vec::new();
    for reminder in list_reminders(conn, true)? {
        // Stored times were validated on insert; skip anything unparseable.
        let times = parse_times(&reminder.times).unwrap_or_default();
        for day in &days {
            for time in &times {
                let at = day.and_time(*time);
                if at >= now && at < window_end {
                    due.push((at, reminder.clone()));
                }
            }
        }
    }

    due.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(due
        .into_iter()
        .map(|(at, reminder)| DueReminder {
            reminder,
            due_at: at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect())
}
