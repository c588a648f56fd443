use anyhow::Result;

use greenlands_types::models::Policy;

use crate::models::{PolicyRow, ts};
use crate::{Database, OptionalExt};

const POLICY_COLUMNS: &str = "id, title, description, department, status, effective_date, \
     expiry_date, budget, beneficiaries, created_by, created_at, updated_at";

impl Database {
    pub fn insert_policy(&self, policy: &Policy) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO policies (id, title, description, department, status, \
                 effective_date, expiry_date, budget, beneficiaries, created_by, created_at, \
                 updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                rusqlite::params![
                    policy.id.to_string(),
                    policy.title,
                    policy.description,
                    policy.department,
                    policy.status.as_str(),
                    ts(policy.effective_date),
                    policy.expiry_date.map(ts),
                    policy.budget,
                    policy.beneficiaries,
                    policy.created_by.to_string(),
                    ts(policy.created_at),
                    ts(policy.updated_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_policy(&self, id: &str) -> Result<Option<PolicyRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM policies WHERE id = ?1", POLICY_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_row([id], policy_from_row).optional()
        })
    }

    pub fn list_policies(&self) -> Result<Vec<PolicyRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM policies ORDER BY created_at DESC",
                POLICY_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], policy_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_policy(&self, policy: &Policy) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE policies SET title = ?2, description = ?3, department = ?4, \
                 status = ?5, effective_date = ?6, expiry_date = ?7, budget = ?8, \
                 beneficiaries = ?9, updated_at = ?10 \
                 WHERE id = ?1",
                rusqlite::params![
                    policy.id.to_string(),
                    policy.title,
                    policy.description,
                    policy.department,
                    policy.status.as_str(),
                    ts(policy.effective_date),
                    policy.expiry_date.map(ts),
                    policy.budget,
                    policy.beneficiaries,
                    ts(policy.updated_at),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_policy(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM policies WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn policy_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PolicyRow> {
    Ok(PolicyRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        department: row.get(3)?,
        status: row.get(4)?,
        effective_date: row.get(5)?,
        expiry_date: row.get(6)?,
        budget: row.get(7)?,
        beneficiaries: row.get(8)?,
        created_by: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
