use anyhow::Result;

use greenlands_types::models::{Subsidy, SubsidyStatus};

use crate::models::{SubsidyRow, ts};
use crate::{Database, OptionalExt};

const SUBSIDY_COLUMNS: &str = "id, farmer_id, name, description, amount, status, \
     application_date, approval_date, government_notes, created_at, updated_at";

impl Database {
    pub fn insert_subsidy(&self, subsidy: &Subsidy) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO subsidies (id, farmer_id, name, description, amount, status, \
                 application_date, approval_date, government_notes, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                rusqlite::params![
                    subsidy.id.to_string(),
                    subsidy.farmer.map(|f| f.to_string()),
                    subsidy.name,
                    subsidy.description,
                    subsidy.amount,
                    subsidy.status.as_str(),
                    ts(subsidy.application_date),
                    subsidy.approval_date.map(ts),
                    subsidy.government_notes,
                    ts(subsidy.created_at),
                    ts(subsidy.updated_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_subsidy(&self, id: &str) -> Result<Option<SubsidyRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM subsidies WHERE id = ?1", SUBSIDY_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_row([id], subsidy_from_row).optional()
        })
    }

    pub fn list_subsidies_by_farmer(&self, farmer_id: &str) -> Result<Vec<SubsidyRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM subsidies WHERE farmer_id = ?1 ORDER BY created_at DESC",
                SUBSIDY_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([farmer_id], subsidy_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_all_subsidies(&self) -> Result<Vec<SubsidyRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM subsidies ORDER BY created_at DESC",
                SUBSIDY_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], subsidy_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_subsidy(&self, subsidy: &Subsidy) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE subsidies SET name = ?2, description = ?3, amount = ?4, status = ?5, \
                 approval_date = ?6, government_notes = ?7, updated_at = ?8 \
                 WHERE id = ?1",
                rusqlite::params![
                    subsidy.id.to_string(),
                    subsidy.name,
                    subsidy.description,
                    subsidy.amount,
                    subsidy.status.as_str(),
                    subsidy.approval_date.map(ts),
                    subsidy.government_notes,
                    ts(subsidy.updated_at),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Status transition as one conditional UPDATE: two concurrent approvals
    /// cannot interleave, and the approval date is stamped exactly once.
    pub fn set_subsidy_status(
        &self,
        id: &str,
        status: SubsidyStatus,
        government_notes: Option<&str>,
        now: &str,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE subsidies SET status = ?2, government_notes = ?3, \
                 approval_date = CASE \
                     WHEN ?2 = 'approved' AND approval_date IS NULL THEN ?4 \
                     ELSE approval_date \
                 END, \
                 updated_at = ?4 \
                 WHERE id = ?1",
                rusqlite::params![id, status.as_str(), government_notes, now],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_subsidy(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM subsidies WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn subsidy_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubsidyRow> {
    Ok(SubsidyRow {
        id: row.get(0)?,
        farmer_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        status: row.get(5)?,
        application_date: row.get(6)?,
        approval_date: row.get(7)?,
        government_notes: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
