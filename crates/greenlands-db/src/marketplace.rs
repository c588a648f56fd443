use anyhow::{Context, Result};

use greenlands_types::models::{ListingStatus, MarketplaceItem};

use crate::models::{ListingRow, ts};
use crate::{Database, OptionalExt};

const LISTING_COLUMNS: &str =
    "id, title, description, kind, price, unit, images, posted_by, status, created_at";

impl Database {
    pub fn insert_listing(&self, item: &MarketplaceItem) -> Result<()> {
        let images = serde_json::to_string(&item.images).context("encode images")?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO marketplace_items (id, title, description, kind, price, unit, \
                 images, posted_by, status, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    item.id.to_string(),
                    item.title,
                    item.description,
                    item.kind.as_str(),
                    item.price,
                    item.unit,
                    images,
                    item.posted_by.to_string(),
                    item.status.as_str(),
                    ts(item.created_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_listing(&self, id: &str) -> Result<Option<ListingRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM marketplace_items WHERE id = ?1",
                LISTING_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_row([id], listing_from_row).optional()
        })
    }

    pub fn list_listings(&self) -> Result<Vec<ListingRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM marketplace_items ORDER BY created_at DESC",
                LISTING_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], listing_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Single-field atomic update (sold/leased flips race under concurrent
    /// buyers otherwise).
    pub fn set_listing_status(&self, id: &str, status: ListingStatus) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE marketplace_items SET status = ?2 WHERE id = ?1",
                rusqlite::params![id, status.as_str()],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_listing(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM marketplace_items WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn listing_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ListingRow> {
    Ok(ListingRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        kind: row.get(3)?,
        price: row.get(4)?,
        unit: row.get(5)?,
        images: row.get(6)?,
        posted_by: row.get(7)?,
        status: row.get(8)?,
        created_at: row.get(9)?,
    })
}
