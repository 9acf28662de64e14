use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const PATIENT_COLUMNS: &str =
    "id, full_name, phone, email, password, height_cm, weight_kg, working_days, diseases, created_at";

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        full_name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        password: row.get(4)?,
        height_cm: row.get(5)?,
        weight_kg: row.get(6)?,
        working_days: row.get(7)?,
        diseases: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Insert a validated registration with an already-hashed credential.
pub fn insert_patient(
    conn: &Connection,
    reg: &Registration,
    credential: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (full_name, phone, email, password, height_cm, weight_kg,
         working_days, diseases)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            reg.full_name.trim(),
            reg.phone,
            reg.email,
            credential,
            reg.height_cm,
            reg.weight_kg,
            reg.working_days,
            reg.diseases.trim(),
        ],
    )
    .map_err(DatabaseError::classify)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"),
            params![id],
            patient_from_row,
        )
        .optional()?;
    Ok(patient)
}

/// Find a patient by login identifier: email or phone.
pub fn find_patient_by_login(
    conn: &Connection,
    identifier: &str,
) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            &format!(
                "SELECT {PATIENT_COLUMNS} FROM patients WHERE email = ?1 OR phone = ?1 LIMIT 1"
            ),
            params![identifier],
            patient_from_row,
        )
        .optional()?;
    Ok(patient)
}

/// All patients in insertion order, with their plan status.
pub fn list_patient_summaries(conn: &Connection) -> Result<Vec<PatientSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.full_name, p.phone, p.email, p.working_days, d.source
         FROM patients p
         LEFT JOIN diet_plans d ON d.patient_id = p.id
         ORDER BY p.id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            PatientSummary {
                id: row.get(0)?,
                full_name: row.get(1)?,
                phone: row.get(2)?,
                email: row.get(3)?,
                working_days: row.get(4)?,
                plan_status: None,
            },
            row.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut summaries = Vec::new();
    for row in rows {
        let (mut summary, source) = row?;
        summary.plan_status = source.as_deref().map(PlanSource::from_str).transpose()?;
        summaries.push(summary);
    }
    Ok(summaries)
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}
