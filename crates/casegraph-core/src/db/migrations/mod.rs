//! `SQLite` schema migrations for the case store.

use super::schema;
use rusqlite::{Connection, types::Type};

/// Latest schema version understood by this binary.
pub const LATEST_SCHEMA_VERSION: u32 = 2;

const MIGRATIONS: &[(u32, &str)] = &[(1, schema::MIGRATION_V1_SQL), (2, schema::MIGRATION_V2_SQL)];

/// Read `PRAGMA user_version` and convert it to a Rust `u32`.
///
/// # Errors
///
/// Returns an error if querying `SQLite` fails or the version value cannot be
/// represented as `u32`.
pub fn current_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    u32::try_from(version).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(error))
    })
}

/// Apply all pending migrations in ascending order, each in its own
/// transaction.
///
/// A database written before versioning existed reports `user_version = 0`;
/// v1 is `IF NOT EXISTS`, so it leaves such a table untouched and v2 then
/// rebuilds it.
///
/// # Errors
///
/// Returns an error if any migration fails.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<u32> {
    let mut current = current_schema_version(conn)?;

    for (version, sql) in MIGRATIONS {
        if *version <= current {
            continue;
        }

        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", i64::from(*version))?;
        tx.commit()?;
        tracing::debug!(version = *version, "applied case store migration");
        current = *version;
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::{LATEST_SCHEMA_VERSION, current_schema_version, migrate};
    use crate::db::schema;
    use rusqlite::{Connection, params};

    #[test]
    fn migrate_empty_db_to_latest() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;

        let applied = migrate(&mut conn)?;
        assert_eq!(applied, LATEST_SCHEMA_VERSION);
        assert_eq!(current_schema_version(&conn)?, LATEST_SCHEMA_VERSION);

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'cases')",
            [],
            |row| row.get(0),
        )?;
        assert!(exists);
        Ok(())
    }

    #[test]
    fn migrate_is_idempotent() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;

        assert_eq!(migrate(&mut conn)?, LATEST_SCHEMA_VERSION);
        conn.execute("INSERT INTO cases (username) VALUES ('kept')", [])?;
        assert_eq!(migrate(&mut conn)?, LATEST_SCHEMA_VERSION);

        let rows: i64 = conn.query_row("SELECT COUNT(*) FROM cases", [], |row| row.get(0))?;
        assert_eq!(rows, 1);
        Ok(())
    }

    #[test]
    fn migrate_upgrades_unversioned_legacy_table() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;

        // Shape and contents of a file written before schema versioning.
        conn.execute_batch(schema::MIGRATION_V1_SQL)?;
        conn.execute(
            "INSERT INTO cases (id, username, hostname, staff_id, email)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![4, "alice", "ws-01", 1042, "alice@corp.test"],
        )?;
        conn.execute(
            "INSERT INTO cases (id, username, hostname, staff_id, email)
             VALUES (9, NULL, 'ws-02', NULL, NULL)",
            [],
        )?;
        assert_eq!(current_schema_version(&conn)?, 0);

        assert_eq!(migrate(&mut conn)?, LATEST_SCHEMA_VERSION);

        let mut stmt =
            conn.prepare("SELECT id, username, hostname, staff_id, email FROM cases ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        assert_eq!(
            rows,
            vec![
                (
                    4,
                    "alice".to_string(),
                    "ws-01".to_string(),
                    "1042".to_string(),
                    "alice@corp.test".to_string()
                ),
                (
                    9,
                    String::new(),
                    "ws-02".to_string(),
                    String::new(),
                    String::new()
                ),
            ]
        );

        // New rows continue after the highest legacy id.
        conn.execute("INSERT INTO cases (username) VALUES ('new')", [])?;
        let next_id: i64 = conn.query_row(
            "SELECT id FROM cases WHERE username = 'new'",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(next_id, 10);
        Ok(())
    }
}
