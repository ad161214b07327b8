//! `SQLite` schema for the case store.
//!
//! - v1 is the table shape older `cases.db` files already have on disk, so
//!   opening one of them is a no-op for this step
//! - v2 rebuilds `cases` so ids are never reused and `staff_id` keeps text
//!   values such as `007` intact

/// Migration v1: the `cases` table as first shipped.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS cases (
    id INTEGER PRIMARY KEY,
    username TEXT,
    hostname TEXT,
    staff_id INTEGER,
    email TEXT
);
";

/// Migration v2: monotonic ids and text-affinity staff ids.
///
/// Existing rows keep their ids; legacy integer staff ids become their decimal
/// text and `NULL`s become empty strings.
pub const MIGRATION_V2_SQL: &str = r"
CREATE TABLE cases_v2 (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL DEFAULT '',
    hostname TEXT NOT NULL DEFAULT '',
    staff_id TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL DEFAULT ''
);

INSERT INTO cases_v2 (id, username, hostname, staff_id, email)
SELECT
    id,
    COALESCE(username, ''),
    COALESCE(hostname, ''),
    COALESCE(CAST(staff_id AS TEXT), ''),
    COALESCE(email, '')
FROM cases
ORDER BY id;

DROP TABLE cases;

ALTER TABLE cases_v2 RENAME TO cases;
";
