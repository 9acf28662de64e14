use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

/// Replace the patient's plan in one statement inside one transaction.
///
/// `diet_plans.patient_id` is UNIQUE, so the upsert keeps exactly one row
/// per patient and there is no window where the patient has no plan.
pub fn upsert_plan(
    conn: &Connection,
    patient_id: i64,
    plan: &MealPlan,
    source: PlanSource,
    assigned_by: Option<i64>,
) -> Result<i64, DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    let exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM patients WHERE id = ?1)",
        params![patient_id],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: patient_id.to_string(),
        });
    }

    let id: i64 = tx.query_row(
        "INSERT INTO diet_plans (patient_id, breakfast, breakfast_kcal, lunch, lunch_kcal,
         dinner, dinner_kcal, source, assigned_by, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now'))
         ON CONFLICT(patient_id) DO UPDATE SET
            breakfast = excluded.breakfast,
            breakfast_kcal = excluded.breakfast_kcal,
            lunch = excluded.lunch,
            lunch_kcal = excluded.lunch_kcal,
            dinner = excluded.dinner,
            dinner_kcal = excluded.dinner_kcal,
            source = excluded.source,
            assigned_by = excluded.assigned_by,
            updated_at = excluded.updated_at
         RETURNING id",
        params![
            patient_id,
            plan.breakfast.description,
            plan.breakfast.calories,
            plan.lunch.description,
            plan.lunch.calories,
            plan.dinner.description,
            plan.dinner.calories,
            source.as_str(),
            assigned_by,
        ],
        |row| row.get(0),
    )?;

    tx.commit()?;
    Ok(id)
}

pub fn get_plan(conn: &Connection, patient_id: i64) -> Result<Option<DietPlan>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_id, breakfast, breakfast_kcal, lunch, lunch_kcal,
             dinner, dinner_kcal, source, assigned_by, updated_at
             FROM diet_plans WHERE patient_id = ?1",
            params![patient_id],
            |row| {
                Ok((
                    DietPlan {
                        id: row.get(0)?,
                        patient_id: row.get(1)?,
                        meals: MealPlan {
                            breakfast: Meal::new(row.get::<_, String>(2)?, row.get(3)?),
                            lunch: Meal::new(row.get::<_, String>(4)?, row.get(5)?),
                            dinner: Meal::new(row.get::<_, String>(6)?, row.get(7)?),
                        },
                        source: PlanSource::Assigned,
                        assigned_by: row.get(9)?,
                        updated_at: row.get(10)?,
                    },
                    row.get::<_, String>(8)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((mut plan, source)) => {
            plan.source = PlanSource::from_str(&source)?;
            Ok(Some(plan))
        }
        None => Ok(None),
    }
}

/// Number of stored plans per source.
pub fn count_plans_by_source(conn: &Connection, source: PlanSource) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM diet_plans WHERE source = ?1",
        params![source.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_patient, list_patient_summaries, open_memory_database};

    fn seed_patient(conn: &Connection) -> i64 {
        let reg = Registration {
            full_name: "Amit Patel".into(),
            phone: "9000000003".into(),
            email: "amit@x.in".into(),
            password: "pw".into(),
            height_cm: 175.0,
            weight_kg: 80.0,
            working_days: 5,
            diseases: String::new(),
        };
        insert_patient(conn, &reg, "cred").unwrap()
    }

    #[test]
    fn missing_plan_is_none() {
        let conn = open_memory_database().unwrap();
        let id = seed_patient(&conn);
        assert!(get_plan(&conn, id).unwrap().is_none());
    }

    #[test]
    fn upsert_replaces_single_row() {
        let conn = open_memory_database().unwrap();
        let id = seed_patient(&conn);

        let first = MealPlan::from_descriptions("Oats", "Dal", "Soup");
        let row1 = upsert_plan(&conn, id, &first, PlanSource::Generated, None).unwrap();

        let second = MealPlan::from_descriptions("Poha", "Rice", "Khichdi");
        let row2 = upsert_plan(&conn, id, &second, PlanSource::Assigned, None).unwrap();
        assert_eq!(row1, row2);

        let stored = get_plan(&conn, id).unwrap().unwrap();
        assert_eq!(stored.meals, second);
        assert_eq!(stored.source, PlanSource::Assigned);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM diet_plans", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn calories_survive_round_trip() {
        let conn = open_memory_database().unwrap();
        let id = seed_patient(&conn);
        let mut plan = MealPlan::from_descriptions("Oats", "Dal", "Soup");
        plan.set_meal(MealSlot::Lunch, Meal::new("Dal", Some(450)));

        upsert_plan(&conn, id, &plan, PlanSource::Generated, None).unwrap();
        let stored = get_plan(&conn, id).unwrap().unwrap();
        assert_eq!(stored.meals.lunch.calories, Some(450));
        assert_eq!(stored.meals.breakfast.calories, None);
    }

    #[test]
    fn unknown_patient_rejected() {
        let conn = open_memory_database().unwrap();
        let plan = MealPlan::from_descriptions("Oats", "Dal", "Soup");
        let err = upsert_plan(&conn, 404, &plan, PlanSource::Assigned, None).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn plan_status_shows_in_summaries() {
        let conn = open_memory_database().unwrap();
        let id = seed_patient(&conn);
        let plan = MealPlan::from_descriptions("Oats", "Dal", "Soup");
        upsert_plan(&conn, id, &plan, PlanSource::Generated, None).unwrap();

        let list = list_patient_summaries(&conn).unwrap();
        assert_eq!(list[0].plan_status, Some(PlanSource::Generated));
        assert_eq!(count_plans_by_source(&conn, PlanSource::Generated).unwrap(), 1);
        assert_eq!(count_plans_by_source(&conn, PlanSource::Assigned).unwrap(), 0);
    }
}
