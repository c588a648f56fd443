use anyhow::{Context, Result};

use greenlands_types::models::Land;

use crate::models::{LandRow, ts};
use crate::{Database, OptionalExt};

const LAND_COLUMNS: &str = "id, farmer_id, name, size, address, longitude, latitude, soil_type, \
     crops, water_usage, fertilizer_usage, pesticide_usage, sustainability_score, \
     certifications, created_at, updated_at";

impl Database {
    pub fn insert_land(&self, land: &Land) -> Result<()> {
        let (crops, water, fertilizer, pesticide, certs) = encode_arrays(land)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO lands (id, farmer_id, name, size, address, longitude, latitude, \
                 soil_type, crops, water_usage, fertilizer_usage, pesticide_usage, \
                 sustainability_score, certifications, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                rusqlite::params![
                    land.id.to_string(),
                    land.farmer.to_string(),
                    land.name,
                    land.size,
                    land.location.address,
                    land.location.longitude,
                    land.location.latitude,
                    land.soil_type.as_str(),
                    crops,
                    water,
                    fertilizer,
                    pesticide,
                    land.sustainability_score,
                    certs,
                    ts(land.created_at),
                    ts(land.updated_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_land(&self, id: &str) -> Result<Option<LandRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM lands WHERE id = ?1", LAND_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_row([id], land_from_row).optional()
        })
    }

    pub fn list_lands_by_farmer(&self, farmer_id: &str) -> Result<Vec<LandRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM lands WHERE farmer_id = ?1 ORDER BY created_at DESC",
                LAND_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([farmer_id], land_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_all_lands(&self) -> Result<Vec<LandRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM lands ORDER BY created_at DESC", LAND_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], land_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Full-row rewrite; the controller owns field merging.
    pub fn update_land(&self, land: &Land) -> Result<bool> {
        let (crops, water, fertilizer, pesticide, certs) = encode_arrays(land)?;
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE lands SET name = ?2, size = ?3, address = ?4, longitude = ?5, \
                 latitude = ?6, soil_type = ?7, crops = ?8, water_usage = ?9, \
                 fertilizer_usage = ?10, pesticide_usage = ?11, sustainability_score = ?12, \
                 certifications = ?13, updated_at = ?14 \
                 WHERE id = ?1",
                rusqlite::params![
                    land.id.to_string(),
                    land.name,
                    land.size,
                    land.location.address,
                    land.location.longitude,
                    land.location.latitude,
                    land.soil_type.as_str(),
                    crops,
                    water,
                    fertilizer,
                    pesticide,
                    land.sustainability_score,
                    certs,
                    ts(land.updated_at),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_land(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM lands WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Analytics --

    pub fn count_lands(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: u64 = conn.query_row("SELECT COUNT(*) FROM lands", [], |row| row.get(0))?;
            Ok(count)
        })
    }

    pub fn total_land_area(&self) -> Result<f64> {
        self.with_conn(|conn| {
            let total: f64 = conn.query_row(
                "SELECT COALESCE(SUM(size), 0) FROM lands",
                [],
                |row| row.get(0),
            )?;
            Ok(total)
        })
    }

    pub fn soil_distribution(&self) -> Result<Vec<(String, u64)>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT soil_type, COUNT(*) FROM lands GROUP BY soil_type")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Scores bucketed Low (< 30), Medium (< 70), High (<= 100).
    pub fn sustainability_distribution(&self) -> Result<Vec<(String, u64)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT CASE \
                     WHEN sustainability_score < 30 THEN 'Low' \
                     WHEN sustainability_score < 70 THEN 'Medium' \
                     ELSE 'High' \
                 END AS bucket, COUNT(*) \
                 FROM lands GROUP BY bucket",
            )?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn encode_arrays(land: &Land) -> Result<(String, String, String, String, String)> {
    Ok((
        serde_json::to_string(&land.crops).context("encode crops")?,
        serde_json::to_string(&land.water_usage).context("encode water_usage")?,
        serde_json::to_string(&land.fertilizer_usage).context("encode fertilizer_usage")?,
        serde_json::to_string(&land.pesticide_usage).context("encode pesticide_usage")?,
        serde_json::to_string(&land.certifications).context("encode certifications")?,
    ))
}

fn land_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LandRow> {
    Ok(LandRow {
        id: row.get(0)?,
        farmer_id: row.get(1)?,
        name: row.get(2)?,
        size: row.get(3)?,
        address: row.get(4)?,
        longitude: row.get(5)?,
        latitude: row.get(6)?,
        soil_type: row.get(7)?,
        crops: row.get(8)?,
        water_usage: row.get(9)?,
        fertilizer_usage: row.get(10)?,
        pesticide_usage: row.get(11)?,
        sustainability_score: row.get(12)?,
        certifications: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}
