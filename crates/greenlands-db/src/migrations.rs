use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY,
            name            TEXT NOT NULL,
            email           TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            role            TEXT NOT NULL,
            location        TEXT,
            farm_size       REAL,
            department      TEXT,
            phone           TEXT,
            active          INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS lands (
            id                      TEXT PRIMARY KEY,
            farmer_id               TEXT NOT NULL REFERENCES users(id),
            name                    TEXT NOT NULL,
            size                    REAL NOT NULL,
            address                 TEXT,
            longitude               REAL,
            latitude                REAL,
            soil_type               TEXT NOT NULL,
            crops                   TEXT NOT NULL DEFAULT '[]',
            water_usage             TEXT NOT NULL DEFAULT '[]',
            fertilizer_usage        TEXT NOT NULL DEFAULT '[]',
            pesticide_usage         TEXT NOT NULL DEFAULT '[]',
            sustainability_score    REAL NOT NULL DEFAULT 0,
            certifications          TEXT NOT NULL DEFAULT '[]',
            created_at              TEXT NOT NULL,
            updated_at              TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_lands_farmer ON lands(farmer_id);

        CREATE TABLE IF NOT EXISTS equipment (
            id                      TEXT PRIMARY KEY,
            farmer_id               TEXT NOT NULL REFERENCES users(id),
            name                    TEXT NOT NULL,
            kind                    TEXT NOT NULL,
            manufacturer            TEXT,
            model                   TEXT,
            purchase_date           TEXT,
            purchase_price          REAL,
            status                  TEXT NOT NULL DEFAULT 'active',
            maintenance_schedule    TEXT NOT NULL DEFAULT '[]',
            usage_hours             REAL NOT NULL DEFAULT 0,
            last_maintenance_date   TEXT,
            created_at              TEXT NOT NULL,
            updated_at              TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_equipment_farmer ON equipment(farmer_id);

        CREATE TABLE IF NOT EXISTS subsidies (
            id                  TEXT PRIMARY KEY,
            farmer_id           TEXT REFERENCES users(id),
            name                TEXT NOT NULL,
            description         TEXT NOT NULL,
            amount              REAL NOT NULL,
            status              TEXT NOT NULL DEFAULT 'pending',
            application_date    TEXT NOT NULL,
            approval_date       TEXT,
            government_notes    TEXT,
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_subsidies_farmer ON subsidies(farmer_id);

        CREATE TABLE IF NOT EXISTS policies (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            department      TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'draft',
            effective_date  TEXT NOT NULL,
            expiry_date     TEXT,
            budget          REAL NOT NULL DEFAULT 0,
            beneficiaries   INTEGER NOT NULL DEFAULT 0,
            created_by      TEXT NOT NULL REFERENCES users(id),
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS departments (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL,
            head_id     TEXT REFERENCES users(id),
            budget      REAL NOT NULL DEFAULT 0,
            active      INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS marketplace_items (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            description TEXT NOT NULL,
            kind        TEXT NOT NULL,
            price       REAL NOT NULL,
            unit        TEXT,
            images      TEXT NOT NULL DEFAULT '[]',
            posted_by   TEXT NOT NULL REFERENCES users(id),
            status      TEXT NOT NULL DEFAULT 'available',
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS messages (
            id              TEXT PRIMARY KEY,
            sender_id       TEXT NOT NULL REFERENCES users(id),
            recipient_id    TEXT NOT NULL REFERENCES users(id),
            subject         TEXT NOT NULL,
            content         TEXT NOT NULL,
            thread_id       TEXT NOT NULL,
            channel_type    TEXT NOT NULL,
            read            INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_thread
            ON messages(thread_id, created_at);

        CREATE INDEX IF NOT EXISTS idx_messages_recipient_unread
            ON messages(recipient_id, read);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
