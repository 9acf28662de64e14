use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::Doctor;

const DOCTOR_COLUMNS: &str = "id, name, email, password, created_at";

fn doctor_from_row(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn insert_doctor(
    conn: &Connection,
    name: &str,
    email: &str,
    credential: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (name, email, password) VALUES (?1, ?2, ?3)",
        params![name, email, credential],
    )
    .map_err(DatabaseError::classify)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_doctor(conn: &Connection, id: i64) -> Result<Option<Doctor>, DatabaseError> {
    let doctor = conn
        .query_row(
            &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1"),
            params![id],
            doctor_from_row,
        )
        .optional()?;
    Ok(doctor)
}

pub fn get_doctor_by_email(conn: &Connection, email: &str) -> Result<Option<Doctor>, DatabaseError> {
    let doctor = conn
        .query_row(
            &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE email = ?1"),
            params![email],
            doctor_from_row,
        )
        .optional()?;
    Ok(doctor)
}

pub fn count_doctors(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM doctors", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    #[test]
    fn insert_and_lookup_by_email() {
        let conn = open_memory_database().unwrap();
        let id = insert_doctor(&conn, "Dr. Smith", "smith@clinic", "cred").unwrap();

        let doctor = get_doctor_by_email(&conn, "smith@clinic").unwrap().unwrap();
        assert_eq!(doctor.id, id);
        assert_eq!(doctor.name, "Dr. Smith");
        assert_eq!(doctor.password, "cred");

        assert!(get_doctor(&conn, id).unwrap().is_some());
        assert!(get_doctor_by_email(&conn, "nobody@clinic").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_rejected() {
        let conn = open_memory_database().unwrap();
        insert_doctor(&conn, "Dr. Smith", "smith@clinic", "cred").unwrap();
        let err = insert_doctor(&conn, "Dr. Other", "smith@clinic", "cred").unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation { .. }));
        assert_eq!(count_doctors(&conn).unwrap(), 1);
    }
}
