use anyhow::Result;

use greenlands_types::models::Department;

use crate::models::{DepartmentRow, ts};
use crate::{Database, OptionalExt};

const DEPARTMENT_COLUMNS: &str =
    "id, name, description, head_id, budget, active, created_at, updated_at";

impl Database {
    pub fn insert_department(&self, dept: &Department) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO departments (id, name, description, head_id, budget, active, \
                 created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    dept.id.to_string(),
                    dept.name,
                    dept.description,
                    dept.head.map(|h| h.to_string()),
                    dept.budget,
                    dept.active,
                    ts(dept.created_at),
                    ts(dept.updated_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_department(&self, id: &str) -> Result<Option<DepartmentRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM departments WHERE id = ?1", DEPARTMENT_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_row([id], department_from_row).optional()
        })
    }

    pub fn list_active_departments(&self) -> Result<Vec<DepartmentRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM departments WHERE active = 1 ORDER BY name",
                DEPARTMENT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], department_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_department(&self, dept: &Department) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE departments SET name = ?2, description = ?3, head_id = ?4, \
                 budget = ?5, updated_at = ?6 \
                 WHERE id = ?1",
                rusqlite::params![
                    dept.id.to_string(),
                    dept.name,
                    dept.description,
                    dept.head.map(|h| h.to_string()),
                    dept.budget,
                    ts(dept.updated_at),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Soft delete: the row stays, `active` flips off.
    pub fn deactivate_department(&self, id: &str, now: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE departments SET active = 0, updated_at = ?2 WHERE id = ?1",
                rusqlite::params![id, now],
            )?;
            Ok(changed > 0)
        })
    }
}

fn department_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DepartmentRow> {
    Ok(DepartmentRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        head_id: row.get(3)?,
        budget: row.get(4)?,
        active: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
