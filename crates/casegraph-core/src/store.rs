//! Durable CRUD over the `cases` table.
//!
//! [`CaseStore`] owns its connection. Front ends open it once at startup and
//! hand it to [`crate::manager::CaseManager`]; nothing else holds the handle.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::db;
use crate::error::CaseError;
use crate::model::{Case, CaseFields, CaseId};

const SELECT_CASE_COLUMNS: &str = "SELECT id, username, hostname, staff_id, email FROM cases";

/// Persistent table of case records.
#[derive(Debug)]
pub struct CaseStore {
    conn: Connection,
}

impl CaseStore {
    /// Open (or create) the store at `path` and bring its schema up to date.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::StorageUnavailable`] when the file cannot be opened
    /// or migrated.
    pub fn open(path: &Path) -> Result<Self, CaseError> {
        db::open_store_db(path).map(Self::from_connection)
    }

    /// In-memory store for tests and dry runs.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::StorageUnavailable`] if `SQLite` cannot allocate the
    /// database.
    pub fn open_in_memory() -> Result<Self, CaseError> {
        let unavailable = |source| CaseError::StorageUnavailable {
            path: ":memory:".into(),
            source,
        };
        let mut conn = Connection::open_in_memory().map_err(unavailable)?;
        db::migrations::migrate(&mut conn).map_err(unavailable)?;
        Ok(Self { conn })
    }

    /// Wrap an already-configured connection. The schema is assumed current.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Insert a new case and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::IntegrityFailure`] if `SQLite` rejects the insert.
    pub fn create(&self, fields: &CaseFields) -> Result<CaseId, CaseError> {
        self.conn
            .execute(
                "INSERT INTO cases (username, hostname, staff_id, email) VALUES (?1, ?2, ?3, ?4)",
                params![
                    fields.username,
                    fields.hostname,
                    fields.staff_id,
                    fields.email
                ],
            )
            .map_err(|e| CaseError::integrity("insert case", e))?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, "case created");
        Ok(id)
    }

    /// Every case, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::IntegrityFailure`] if the query fails.
    pub fn read_all(&self) -> Result<Vec<Case>, CaseError> {
        let read_err = |e| CaseError::integrity("read cases", e);
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{SELECT_CASE_COLUMNS} ORDER BY id"))
            .map_err(read_err)?;
        let cases = stmt
            .query_map([], case_from_row)
            .map_err(read_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;
        Ok(cases)
    }

    /// A single case by id.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::IntegrityFailure`] if the query fails.
    pub fn get(&self, id: CaseId) -> Result<Option<Case>, CaseError> {
        self.conn
            .query_row(
                &format!("{SELECT_CASE_COLUMNS} WHERE id = ?1"),
                [id],
                case_from_row,
            )
            .optional()
            .map_err(|e| CaseError::integrity("read case", e))
    }

    /// Rewrite all four fields of case `id`.
    ///
    /// Updating an id that does not exist is not an error; the return value
    /// reports whether a row was touched.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::IntegrityFailure`] if `SQLite` rejects the update.
    pub fn update(&self, id: CaseId, fields: &CaseFields) -> Result<bool, CaseError> {
        let changed = self
            .conn
            .execute(
                "UPDATE cases SET username = ?1, hostname = ?2, staff_id = ?3, email = ?4
                 WHERE id = ?5",
                params![
                    fields.username,
                    fields.hostname,
                    fields.staff_id,
                    fields.email,
                    id
                ],
            )
            .map_err(|e| CaseError::integrity("update case", e))?;
        tracing::debug!(id, changed, "case update");
        Ok(changed > 0)
    }

    /// Delete case `id`. Deleting a missing id is a no-op returning `false`.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::IntegrityFailure`] if `SQLite` rejects the delete.
    pub fn delete(&self, id: CaseId) -> Result<bool, CaseError> {
        let changed = self
            .conn
            .execute("DELETE FROM cases WHERE id = ?1", [id])
            .map_err(|e| CaseError::integrity("delete case", e))?;
        tracing::debug!(id, changed, "case delete");
        Ok(changed > 0)
    }
}

fn case_from_row(row: &Row<'_>) -> rusqlite::Result<Case> {
    Ok(Case {
        id: row.get(0)?,
        fields: CaseFields {
            username: row.get(1)?,
            hostname: row.get(2)?,
            staff_id: row.get(3)?,
            email: row.get(4)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::OpenFlags;

    fn store() -> CaseStore {
        CaseStore::open_in_memory().expect("open in-memory store")
    }

    #[test]
    fn create_then_read_round_trips_every_field() {
        let store = store();
        let fields = CaseFields::new("alice", "ws-01", "007", "alice@corp.test");

        let id = store.create(&fields).expect("create");
        let cases = store.read_all().expect("read_all");

        assert_eq!(cases, vec![Case { id, fields }]);
    }

    #[test]
    fn empty_fields_are_allowed() {
        let store = store();
        let id = store.create(&CaseFields::default()).expect("create");
        let case = store.get(id).expect("get").expect("case exists");
        assert_eq!(case.fields, CaseFields::default());
    }

    #[test]
    fn read_all_is_in_insertion_order() {
        let store = store();
        let a = store.create(&CaseFields::new("a", "", "", "")).expect("create a");
        let b = store.create(&CaseFields::new("b", "", "", "")).expect("create b");
        let c = store.create(&CaseFields::new("c", "", "", "")).expect("create c");
        assert!(a < b && b < c);

        let names: Vec<String> = store
            .read_all()
            .expect("read_all")
            .into_iter()
            .map(|case| case.fields.username)
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn update_rewrites_all_fields() {
        let store = store();
        let id = store
            .create(&CaseFields::new("alice", "ws-01", "1", "alice@corp.test"))
            .expect("create");

        let replacement = CaseFields::new("", "ws-02", "2", "");
        assert!(store.update(id, &replacement).expect("update"));

        let case = store.get(id).expect("get").expect("case exists");
        assert_eq!(case.fields, replacement);
    }

    #[test]
    fn update_missing_id_is_a_silent_no_op() {
        let store = store();
        let id = store.create(&CaseFields::new("a", "", "", "")).expect("create");

        let touched = store
            .update(id + 100, &CaseFields::new("z", "z", "z", "z"))
            .expect("update missing");
        assert!(!touched);
        assert_eq!(store.read_all().expect("read_all").len(), 1);
        assert_eq!(
            store.get(id).expect("get").expect("exists").fields.username,
            "a"
        );
    }

    #[test]
    fn delete_twice_is_safe_and_leaves_others() {
        let store = store();
        let keep = store.create(&CaseFields::new("keep", "", "", "")).expect("create");
        let gone = store.create(&CaseFields::new("gone", "", "", "")).expect("create");

        assert!(store.delete(gone).expect("first delete"));
        assert!(!store.delete(gone).expect("second delete"));

        let cases = store.read_all().expect("read_all");
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].id, keep);
    }

    #[test]
    fn ids_are_not_reused_after_deleting_the_newest() {
        let store = store();
        let first = store.create(&CaseFields::default()).expect("create");
        let second = store.create(&CaseFields::default()).expect("create");
        store.delete(second).expect("delete");

        let third = store.create(&CaseFields::default()).expect("create");
        assert!(third > second, "{third} should be after {second} (first {first})");
    }

    #[test]
    fn get_missing_is_none() {
        assert_eq!(store().get(42).expect("get"), None);
    }

    #[test]
    fn writes_on_read_only_connection_are_integrity_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cases.db");
        let writable = CaseStore::open(&path).expect("open writable");
        let id = writable
            .create(&CaseFields::new("a", "", "", ""))
            .expect("create");

        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .expect("open read-only");
        let read_only = CaseStore::from_connection(conn);

        assert_eq!(read_only.read_all().expect("reads still work").len(), 1);
        for result in [
            read_only.create(&CaseFields::default()).map(|_| ()),
            read_only.update(id, &CaseFields::default()).map(|_| ()),
            read_only.delete(id).map(|_| ()),
        ] {
            let err = result.expect_err("write must fail");
            assert!(
                matches!(err, CaseError::IntegrityFailure { .. }),
                "unexpected error: {err}"
            );
        }
    }
}
