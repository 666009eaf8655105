use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS students (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            roll_no     TEXT NOT NULL UNIQUE,
            mobile      TEXT NOT NULL,
            password    TEXT NOT NULL,
            mess        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Both staff tiers live in one table; mess is the MR's scope and
        -- stays NULL for the higher tier.
        CREATE TABLE IF NOT EXISTS authorities (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            role        TEXT NOT NULL CHECK (role IN ('mr', 'higher')),
            mess        TEXT,
            mobile      TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS complaints (
            id                TEXT PRIMARY KEY,
            sender_id         TEXT NOT NULL REFERENCES students(id),
            mess_number       TEXT NOT NULL,
            related           TEXT NOT NULL,
            other             TEXT,
            complaint_title   TEXT NOT NULL,
            complaint_message TEXT NOT NULL,
            image             TEXT,
            status            TEXT,
            sent_authority    INTEGER NOT NULL DEFAULT 0,
            created_at        TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at        TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_complaints_mess
            ON complaints(mess_number, created_at);

        CREATE TABLE IF NOT EXISTS issues (
            id            TEXT PRIMARY KEY,
            sender_id     TEXT NOT NULL REFERENCES students(id),
            issue_title   TEXT NOT NULL,
            issue_message TEXT NOT NULL,
            image         TEXT,
            resolved      INTEGER NOT NULL DEFAULT 0,
            upvotes       INTEGER NOT NULL DEFAULT 0,
            downvotes     INTEGER NOT NULL DEFAULT 0,
            created_at    TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_issues_upvotes
            ON issues(upvotes);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
