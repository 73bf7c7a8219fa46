//! SQLite schema for the genome store.

/// Bumped whenever the table layout changes
pub const SCHEMA_VERSION: i64 = 1;

pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sequences (
    id         INTEGER PRIMARY KEY,
    name       TEXT NOT NULL UNIQUE,
    md5        TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS shingles (
    id        INTEGER PRIMARY KEY,
    source_id INTEGER NOT NULL REFERENCES sequences(id),
    value     TEXT NOT NULL,
    length    INTEGER NOT NULL,
    UNIQUE (source_id, length, value)
);

-- Lookups by (source_id, length) use the UNIQUE index. Stores created by
-- earlier builds carried a redundant index on the same prefix.
DROP INDEX IF EXISTS idx_shingles_source_length;

CREATE TABLE IF NOT EXISTS id_sequences (
    entity  TEXT PRIMARY KEY,
    next_id INTEGER NOT NULL
);
";

/// Seed each counter from `max(id) + 1`, so databases written before the
/// counters existed keep their numbering. Existing counters are untouched.
pub const SEED_ID_SEQUENCES_SQL: &str = "
INSERT OR IGNORE INTO id_sequences (entity, next_id)
    SELECT 'sequences', COALESCE(MAX(id), 0) + 1 FROM sequences;
INSERT OR IGNORE INTO id_sequences (entity, next_id)
    SELECT 'shingles', COALESCE(MAX(id), 0) + 1 FROM shingles;
";

/// Number of tables `SCHEMA_SQL` creates
pub const TABLE_COUNT: i64 = 4;

/// Tables present and legacy indexes left over, read without a write lock
pub const SELECT_SCHEMA_OBJECTS: &str = "
SELECT
    (SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
        AND name IN ('meta', 'sequences', 'shingles', 'id_sequences')),
    (SELECT COUNT(*) FROM sqlite_master WHERE type = 'index'
        AND name = 'idx_shingles_source_length')
";

/// Seeded counters and recorded schema version, once all tables exist
pub const SELECT_SEEDED_STATE: &str = "
SELECT
    (SELECT COUNT(*) FROM id_sequences),
    (SELECT value FROM meta WHERE key = 'schema_version')
";

pub const INSERT_SEQUENCE: &str =
    "INSERT INTO sequences (id, name, md5, created_at) VALUES (?1, ?2, ?3, ?4)";

pub const SELECT_SEQUENCE_BY_NAME: &str =
    "SELECT id, name, md5, created_at FROM sequences WHERE name = ?1";

pub const SELECT_SEQUENCE_BY_ID: &str =
    "SELECT id, name, md5, created_at FROM sequences WHERE id = ?1";

pub const SELECT_ALL_SEQUENCES: &str =
    "SELECT id, name, md5, created_at FROM sequences ORDER BY id";

pub const INSERT_SHINGLE: &str =
    "INSERT INTO shingles (id, source_id, value, length) VALUES (?1, ?2, ?3, ?4)";

pub const COUNT_SHINGLES: &str =
    "SELECT COUNT(*) FROM shingles WHERE source_id = ?1 AND length = ?2";

pub const SELECT_SHINGLE_VALUES: &str =
    "SELECT value FROM shingles WHERE source_id = ?1 AND length = ?2";

pub const SELECT_SHINGLE_ROWS: &str =
    "SELECT id, source_id, value, length FROM shingles
     WHERE source_id = ?1 AND length = ?2 ORDER BY id";

pub const SELECT_SHINGLED_LENGTHS: &str =
    "SELECT length, COUNT(*) FROM shingles WHERE source_id = ?1
     GROUP BY length ORDER BY length";

/// Intersection and union sizes of two `(source, length)` selections
pub const SELECT_OVERLAP: &str = "
SELECT
    (SELECT COUNT(*) FROM (
        SELECT value FROM shingles WHERE source_id = ?1 AND length = ?3
        INTERSECT
        SELECT value FROM shingles WHERE source_id = ?2 AND length = ?3
    )),
    (SELECT COUNT(*) FROM (
        SELECT value FROM shingles WHERE source_id = ?1 AND length = ?3
        UNION
        SELECT value FROM shingles WHERE source_id = ?2 AND length = ?3
    ))
";
