//! Symptom journal: symptom chip catalog and the store for completed
//! symptom checks.
//!
//! A symptom check is persisted once, after classification and explanation;
//! records are never edited, only listed or deleted.

use std::str::FromStr;

use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{DurationFlag, SeverityLevel};

// ═══════════════════════════════════════════
// Catalog: predefined symptom chips
// ═══════════════════════════════════════════

pub const CATEGORIES: &[&str] = &[
    "General",
    "Pain",
    "Respiratory",
    "Digestive",
    "Neurological",
    "Skin",
];

pub fn symptoms_for(category: &str) -> Vec<&'static str> {
    match category {
        "General" => vec!["Fever", "Chills", "Fatigue", "Night sweats", "Loss of appetite"],
        "Pain" => vec![
            "Headache", "Chest pain", "Back pain", "Joint pain", "Abdominal pain",
            "Muscle aches", "Sore throat",
        ],
        "Respiratory" => vec![
            "Cough", "Shortness of breath", "Breathing difficulty", "Wheezing",
            "Congestion", "Runny nose",
        ],
        "Digestive" => vec!["Nausea", "Vomiting", "Diarrhea", "Constipation", "Bloating"],
        "Neurological" => vec![
            "Dizziness", "Severe dizziness", "Numbness", "Confusion", "Blurred vision",
        ],
        "Skin" => vec!["Rash", "Itching", "Swelling", "Bruising"],
        _ => vec![],
    }
}

/// Category info with its symptom chips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    pub symptoms: Vec<String>,
}

/// Returns all categories with their symptom chips.
pub fn symptom_catalog() -> Vec<CategoryInfo> {
    CATEGORIES
        .iter()
        .map(|&cat| CategoryInfo {
            name: cat.to_string(),
            symptoms: symptoms_for(cat).iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}

/// Case-insensitive lookup against the chip catalog.
pub fn is_known_symptom(label: &str) -> bool {
    let needle = label.trim();
    CATEGORIES
        .iter()
        .flat_map(|cat| symptoms_for(cat))
        .any(|s| s.eq_ignore_ascii_case(needle))
}

// ═══════════════════════════════════════════
// Records
// ═══════════════════════════════════════════

/// Input for persisting a completed symptom check.
#[derive(Debug, Clone)]
pub struct NewSymptomCheck {
    pub selected_symptoms: Vec<String>,
    pub free_text: Option<String>,
    pub duration: Option<DurationFlag>,
    pub symptom_count: usize,
    pub level: SeverityLevel,
    pub red_flag: Option<String>,
    pub explanation: String,
    pub explanation_available: bool,
}

/// Stored symptom check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomCheck {
    pub id: String,
    pub selected_symptoms: Vec<String>,
    pub free_text: Option<String>,
    pub duration: Option<DurationFlag>,
    pub symptom_count: u32,
    pub level: SeverityLevel,
    pub red_flag: Option<String>,
    pub explanation: String,
    pub explanation_available: bool,
    pub created_at: String,
}

/// History filter. Dates are `YYYY-MM-DD`, both bounds inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckFilter {
    pub level: Option<SeverityLevel>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: Option<u32>,
}

/// Number of stored checks per severity level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub low: u32,
    pub moderate: u32,
    pub high: u32,
    pub total: u32,
}

const CHECK_COLUMNS: &str = "id, selected_symptoms, free_text, duration, symptom_count, level,
     red_flag, explanation, explanation_available, created_at";

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn row_to_check(row: &Row<'_>) -> rusqlite::Result<SymptomCheck> {
    let selected_json: String = row.get(1)?;
    let selected_symptoms: Vec<String> =
        serde_json::from_str(&selected_json).map_err(|e| conversion_error(1, e))?;
    let duration = row
        .get::<_, Option<String>>(3)?
        .map(|d| DurationFlag::from_str(&d).map_err(|e| conversion_error(3, e)))
        .transpose()?;
    let level_str: String = row.get(5)?;
    let level = SeverityLevel::from_str(&level_str).map_err(|e| conversion_error(5, e))?;

    Ok(SymptomCheck {
        id: row.get(0)?,
        selected_symptoms,
        free_text: row.get(2)?,
        duration,
        symptom_count: row.get(4)?,
        level,
        red_flag: row.get(6)?,
        explanation: row.get(7)?,
        explanation_available: row.get::<_, i32>(8)? != 0,
        created_at: row.get(9)?,
    })
}

/// Persists a symptom check. Returns the generated UUID.
pub fn save_check(conn: &Connection, check: &NewSymptomCheck) -> Result<Uuid, DatabaseError> {
    let id = Uuid::new_v4();
    let now = Local::now().naive_local().format("%Y-%m-%d %H:%M:%S").to_string();
    let selected_json = serde_json::to_string(&check.selected_symptoms)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;

    conn.execute(
        "INSERT INTO symptom_checks (id, selected_symptoms, free_text, duration,
         symptom_count, level, red_flag, explanation, explanation_available, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            id.to_string(),
            selected_json,
            check.free_text,
            check.duration.map(|d| d.as_str()),
            check.symptom_count as i64,
            check.level.as_str(),
            check.red_flag,
            check.explanation,
            check.explanation_available as i32,
            now,
        ],
    )?;

    Ok(id)
}

/// Fetches one stored check.
pub fn get_check(conn: &Connection, id: &str) -> Result<SymptomCheck, DatabaseError> {
    let sql = format!("SELECT {CHECK_COLUMNS} FROM symptom_checks WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_check)
        .optional()?
        .ok_or_else(|| DatabaseError::NotFound {
            entity_type: "SymptomCheck".into(),
            id: id.into(),
        })
}

/// Fetches stored checks, newest first.
pub fn fetch_checks(
    conn: &Connection,
    filter: &CheckFilter,
) -> Result<Vec<SymptomCheck>, DatabaseError> {
    let mut sql = format!("SELECT {CHECK_COLUMNS} FROM symptom_checks WHERE 1=1");
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(level) = filter.level {
        params_vec.push(Box::new(level.as_str()));
        sql.push_str(&format!(" AND level = ?{}", params_vec.len()));
    }
    if let Some(ref from) = filter.date_from {
        params_vec.push(Box::new(from.clone()));
        sql.push_str(&format!(" AND DATE(created_at) >= ?{}", params_vec.len()));
    }
    if let Some(ref to) = filter.date_to {
        params_vec.push(Box::new(to.clone()));
        sql.push_str(&format!(" AND DATE(created_at) <= ?{}", params_vec.len()));
    }

    // rowid breaks ties between checks saved within the same second.
    sql.push_str(" ORDER BY created_at DESC, rowid DESC");

    if let Some(limit) = filter.limit {
        params_vec.push(Box::new(i64::from(limit)));
        sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));
    }

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), row_to_check)?;

    let mut checks = Vec::new();
    for row in rows {
        checks.push(row?);
    }
    Ok(checks)
}

/// Hard-deletes a stored check.
pub fn delete_check(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM symptom_checks WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "SymptomCheck".into(),
            id: id.into(),
        });
    }
    Ok(())
}

/// Counts stored checks per level.
pub fn level_summary(conn: &Connection) -> Result<LevelSummary, DatabaseError> {
    let mut stmt = conn.prepare("SELECT level, COUNT(*) FROM symptom_checks GROUP BY level")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
    })?;

    let mut summary = LevelSummary::default();
    for row in rows {
        let (level, count) = row?;
        match SeverityLevel::from_str(&level)? {
            SeverityLevel::Low => summary.low = count,
            SeverityLevel::Moderate => summary.moderate = count,
            SeverityLevel::High => summary.high = count,
        }
        summary.total += count;
    }
    Ok(summary)
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        open_memory_database().expect("in-memory DB")
    }

    fn make_check(symptoms: &[&str], level: SeverityLevel) -> NewSymptomCheck {
        NewSymptomCheck {
            selected_symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            free_text: None,
            duration: None,
            symptom_count: symptoms.len(),
            level,
            red_flag: None,
            explanation: "General information.".into(),
            explanation_available: true,
        }
    }

    // ───────────────────────────────────────
    // catalog
    // ───────────────────────────────────────

    #[test]
    fn catalog_returns_all_categories() {
        let catalog = symptom_catalog();
        assert_eq!(catalog.len(), CATEGORIES.len());
        assert_eq!(catalog[0].name, "General");
        assert!(catalog.iter().all(|c| !c.symptoms.is_empty()));
    }

    #[test]
    fn unknown_category_is_empty() {
        assert!(symptoms_for("Unknown").is_empty());
    }

    #[test]
    fn known_symptom_lookup_ignores_case() {
        assert!(is_known_symptom("fever"));
        assert!(is_known_symptom(" Chest Pain "));
        assert!(!is_known_symptom("Glowing skin"));
    }

    // ───────────────────────────────────────
    // save / get
    // ───────────────────────────────────────

    #[test]
    fn save_and_get_round_trip() {
        let conn = test_db();
        let mut new = make_check(&["Fever", "Cough"], SeverityLevel::High);
        new.free_text = Some("night sweats".into());
        new.duration = Some(DurationFlag::OneWeekOrMore);
        new.symptom_count = 3;

        let id = save_check(&conn, &new).unwrap();
        let stored = get_check(&conn, &id.to_string()).unwrap();

        assert_eq!(stored.selected_symptoms, vec!["Fever", "Cough"]);
        assert_eq!(stored.free_text.as_deref(), Some("night sweats"));
        assert_eq!(stored.duration, Some(DurationFlag::OneWeekOrMore));
        assert_eq!(stored.symptom_count, 3);
        assert_eq!(stored.level, SeverityLevel::High);
        assert!(stored.explanation_available);
    }

    #[test]
    fn get_missing_returns_not_found() {
        let conn = test_db();
        let result = get_check(&conn, "nonexistent-id");
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    // ───────────────────────────────────────
    // fetch
    // ───────────────────────────────────────

    #[test]
    fn fetch_newest_first() {
        let conn = test_db();
        save_check(&conn, &make_check(&["Fever"], SeverityLevel::Low)).unwrap();
        save_check(&conn, &make_check(&["Cough", "Fever"], SeverityLevel::Moderate)).unwrap();

        let checks = fetch_checks(&conn, &CheckFilter::default()).unwrap();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].level, SeverityLevel::Moderate);
    }

    #[test]
    fn fetch_filter_by_level() {
        let conn = test_db();
        save_check(&conn, &make_check(&["Fever"], SeverityLevel::Low)).unwrap();
        save_check(&conn, &make_check(&["Chest pain"], SeverityLevel::High)).unwrap();
        save_check(&conn, &make_check(&["Rash"], SeverityLevel::Low)).unwrap();

        let filter = CheckFilter {
            level: Some(SeverityLevel::Low),
            ..Default::default()
        };
        let checks = fetch_checks(&conn, &filter).unwrap();
        assert_eq!(checks.len(), 2);
        assert!(checks.iter().all(|c| c.level == SeverityLevel::Low));
    }

    #[test]
    fn fetch_respects_limit() {
        let conn = test_db();
        for _ in 0..5 {
            save_check(&conn, &make_check(&["Fever"], SeverityLevel::Low)).unwrap();
        }
        let filter = CheckFilter {
            limit: Some(3),
            ..Default::default()
        };
        assert_eq!(fetch_checks(&conn, &filter).unwrap().len(), 3);
    }

    #[test]
    fn fetch_filter_by_date_range() {
        let conn = test_db();
        save_check(&conn, &make_check(&["Fever"], SeverityLevel::Low)).unwrap();
        conn.execute(
            "UPDATE symptom_checks SET created_at = '2024-03-01 10:00:00'",
            [],
        )
        .unwrap();
        save_check(&conn, &make_check(&["Cough"], SeverityLevel::Low)).unwrap();

        let filter = CheckFilter {
            date_from: Some("2024-02-01".into()),
            date_to: Some("2024-03-01".into()),
            ..Default::default()
        };
        let checks = fetch_checks(&conn, &filter).unwrap();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].selected_symptoms, vec!["Fever"]);
    }

    #[test]
    fn fetch_empty_database() {
        let conn = test_db();
        assert!(fetch_checks(&conn, &CheckFilter::default()).unwrap().is_empty());
    }

    // ───────────────────────────────────────
    // delete / summary
    // ───────────────────────────────────────

    #[test]
    fn delete_removes_from_db() {
        let conn = test_db();
        let id = save_check(&conn, &make_check(&["Fever"], SeverityLevel::Low)).unwrap();
        delete_check(&conn, &id.to_string()).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM symptom_checks", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn delete_nonexistent_returns_not_found() {
        let conn = test_db();
        assert!(delete_check(&conn, "nonexistent-id").is_err());
    }

    #[test]
    fn summary_counts_per_level() {
        let conn = test_db();
        save_check(&conn, &make_check(&["Fever"], SeverityLevel::Low)).unwrap();
        save_check(&conn, &make_check(&["Rash"], SeverityLevel::Low)).unwrap();
        save_check(&conn, &make_check(&["Chest pain"], SeverityLevel::High)).unwrap();

        let summary = level_summary(&conn).unwrap();
        assert_eq!(
            summary,
            LevelSummary {
                low: 2,
                moderate: 0,
                high: 1,
                total: 3
            }
        );
    }
}
