use anyhow::Result;

use greenlands_types::models::{Role, User};

use crate::models::{UserRow, ts};
use crate::{Database, OptionalExt};

const USER_COLUMNS: &str = "id, name, email, password, role, location, farm_size, department, \
                            phone, active, created_at, updated_at";

impl Database {
    pub fn create_user(&self, user: &User, password_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, password, role, location, farm_size, \
                 department, phone, active, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                rusqlite::params![
                    user.id.to_string(),
                    user.name,
                    user.email,
                    password_hash,
                    user.role.as_str(),
                    user.location,
                    user.farm_size,
                    user.department,
                    user.phone,
                    user.active,
                    ts(user.created_at),
                    ts(user.updated_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_row([email], user_from_row).optional()
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_row([id], user_from_row).optional()
        })
    }

    /// Active users holding any of the given roles, name order. Used for the
    /// messaging candidate list.
    pub fn list_active_users_by_roles(&self, roles: &[Role]) -> Result<Vec<UserRow>> {
        if roles.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=roles.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT {} FROM users WHERE active = 1 AND role IN ({}) ORDER BY name",
                USER_COLUMNS,
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    rusqlite::params_from_iter(roles.iter().map(|r| r.as_str())),
                    user_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_farmers(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM users WHERE role = 'farmer' AND active = 1 ORDER BY name",
                USER_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_users_with_role(&self, role: Role) -> Result<u64> {
        self.with_conn(|conn| {
            let count: u64 = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE role = ?1 AND active = 1",
                [role.as_str()],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        role: row.get(4)?,
        location: row.get(5)?,
        farm_size: row.get(6)?,
        department: row.get(7)?,
        phone: row.get(8)?,
        active: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
