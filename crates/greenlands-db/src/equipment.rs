use anyhow::{Context, Result};

use greenlands_types::models::Equipment;

use crate::models::{EquipmentRow, ts};
use crate::{Database, OptionalExt};

const EQUIPMENT_COLUMNS: &str = "id, farmer_id, name, kind, manufacturer, model, purchase_date, \
     purchase_price, status, maintenance_schedule, usage_hours, last_maintenance_date, \
     created_at, updated_at";

impl Database {
    pub fn insert_equipment(&self, eq: &Equipment) -> Result<()> {
        let schedule =
            serde_json::to_string(&eq.maintenance_schedule).context("encode maintenance")?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO equipment (id, farmer_id, name, kind, manufacturer, model, \
                 purchase_date, purchase_price, status, maintenance_schedule, usage_hours, \
                 last_maintenance_date, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                rusqlite::params![
                    eq.id.to_string(),
                    eq.farmer.to_string(),
                    eq.name,
                    eq.kind,
                    eq.manufacturer,
                    eq.model,
                    eq.purchase_date.map(ts),
                    eq.purchase_price,
                    eq.status.as_str(),
                    schedule,
                    eq.usage_hours,
                    eq.last_maintenance_date.map(ts),
                    ts(eq.created_at),
                    ts(eq.updated_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_equipment(&self, id: &str) -> Result<Option<EquipmentRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM equipment WHERE id = ?1", EQUIPMENT_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_row([id], equipment_from_row).optional()
        })
    }

    pub fn list_equipment_by_farmer(&self, farmer_id: &str) -> Result<Vec<EquipmentRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM equipment WHERE farmer_id = ?1 ORDER BY created_at DESC",
                EQUIPMENT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([farmer_id], equipment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_equipment(&self, eq: &Equipment) -> Result<bool> {
        let schedule =
            serde_json::to_string(&eq.maintenance_schedule).context("encode maintenance")?;
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE equipment SET name = ?2, kind = ?3, manufacturer = ?4, model = ?5, \
                 purchase_date = ?6, purchase_price = ?7, status = ?8, \
                 maintenance_schedule = ?9, usage_hours = ?10, last_maintenance_date = ?11, \
                 updated_at = ?12 \
                 WHERE id = ?1",
                rusqlite::params![
                    eq.id.to_string(),
                    eq.name,
                    eq.kind,
                    eq.manufacturer,
                    eq.model,
                    eq.purchase_date.map(ts),
                    eq.purchase_price,
                    eq.status.as_str(),
                    schedule,
                    eq.usage_hours,
                    eq.last_maintenance_date.map(ts),
                    ts(eq.updated_at),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Single-field atomic update; avoids a read-modify-write race between
    /// concurrent usage submissions.
    pub fn set_equipment_usage_hours(&self, id: &str, hours: f64, now: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE equipment SET usage_hours = ?2, updated_at = ?3 WHERE id = ?1",
                rusqlite::params![id, hours, now],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_equipment(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM equipment WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn equipment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EquipmentRow> {
    Ok(EquipmentRow {
        id: row.get(0)?,
        farmer_id: row.get(1)?,
        name: row.get(2)?,
        kind: row.get(3)?,
        manufacturer: row.get(4)?,
        model: row.get(5)?,
        purchase_date: row.get(6)?,
        purchase_price: row.get(7)?,
        status: row.get(8)?,
        maintenance_schedule: row.get(9)?,
        usage_hours: row.get(10)?,
        last_maintenance_date: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}
