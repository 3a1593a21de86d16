//! Fixed layout of the `positions` table.
//!
//! Archive files are only accepted when their table matches this descriptor
//! column for column, so the query path never has to guess at types.

use crate::error::{Result, TrackError};
use crate::index::CELL_COLUMN;
use rusqlite::Connection;
use std::path::Path;

/// One column of the expected layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
}

/// Ordered `(name, type)` list describing a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub table: &'static str,
    pub columns: &'static [Column],
}

/// `positions(timestamp INTEGER, lat REAL, lon REAL, s2cell INTEGER)`
pub const POSITIONS: SchemaDescriptor = SchemaDescriptor {
    table: "positions",
    columns: &[
        Column {
            name: "timestamp",
            sql_type: "INTEGER",
        },
        Column {
            name: "lat",
            sql_type: "REAL",
        },
        Column {
            name: "lon",
            sql_type: "REAL",
        },
        Column {
            name: CELL_COLUMN,
            sql_type: "INTEGER",
        },
    ],
};

impl SchemaDescriptor {
    /// Table creation, idempotent.
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.sql_type))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE IF NOT EXISTS {} ({});", self.table, columns)
    }

    /// Cell id index creation, idempotent.
    pub fn create_index_sql(&self) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{cell} ON {table}({cell});",
            table = self.table,
            cell = CELL_COLUMN,
        )
    }

    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn insert_sql(&self) -> String {
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.column_list(),
            placeholders
        )
    }

    /// Columns of the table as declared in the file, in declaration order.
    /// A missing table yields an empty list.
    pub fn read_columns(&self, conn: &Connection) -> Result<Vec<(String, String)>> {
        let sql = format!(
            "SELECT name, type FROM pragma_table_info('{}') ORDER BY cid",
            self.table
        );
        let mut stmt = conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
        Ok(columns)
    }

    pub fn matches(&self, found: &[(String, String)]) -> bool {
        found.len() == self.columns.len()
            && self
                .columns
                .iter()
                .zip(found)
                .all(|(expected, (name, sql_type))| {
                    expected.name == name && expected.sql_type == sql_type
                })
    }

    /// Fail with `SchemaMismatch` unless the table in `conn` matches exactly.
    pub fn check(&self, conn: &Connection, path: &Path) -> Result<()> {
        let found = self.read_columns(conn)?;
        if self.matches(&found) {
            return Ok(());
        }

        Err(TrackError::SchemaMismatch {
            path: path.to_path_buf(),
            found: found
                .iter()
                .map(|(name, sql_type)| format!("{} {}", name, sql_type))
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}
