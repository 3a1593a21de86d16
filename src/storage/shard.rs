//! One SQLite file holding position rows.

use super::PositionSource;
use super::schema::POSITIONS;
use crate::error::{Result, TrackError};
use crate::index::{CellKey, RangePredicate};
use rusqlite::{Connection, OpenFlags, Row, params, params_from_iter};
use std::path::{Path, PathBuf};
use tracklog_types::point::PositionSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardMode {
    /// The single writable shard
    Live,
    /// Read-only historical shard
    Archive,
}

#[derive(Debug)]
pub struct Shard {
    conn: Connection,
    path: PathBuf,
    mode: ShardMode,
}

impl Shard {
    /// Open or create the writable shard. The table and index are created if
    /// missing. An existing table with a different layout is an error.
    pub fn open_live<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        conn.execute_batch(&POSITIONS.create_table_sql())?;
        POSITIONS.check(&conn, &path)?;
        conn.execute_batch(&POSITIONS.create_index_sql())?;

        Ok(Self {
            conn,
            path,
            mode: ShardMode::Live,
        })
    }

    /// Open an existing shard read-only and validate its layout.
    pub fn open_archive<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        POSITIONS.check(&conn, &path)?;

        Ok(Self {
            conn,
            path,
            mode: ShardMode::Archive,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> ShardMode {
        self.mode
    }

    /// Append one row. Only the live shard accepts writes.
    pub fn append(&self, sample: &PositionSample) -> Result<()> {
        if self.mode != ShardMode::Live {
            return Err(TrackError::InvalidInput(format!(
                "Shard {} is read-only",
                self.path.display()
            )));
        }

        let mut stmt = self.conn.prepare_cached(&POSITIONS.insert_sql())?;
        stmt.execute(params![
            sample.timestamp,
            sample.lat,
            sample.lon,
            CellKey(sample.cell_id)
        ])?;
        Ok(())
    }

    /// Rows with a timestamp strictly after `cutoff_ms`, oldest first.
    pub fn since(&self, cutoff_ms: i64) -> Result<Vec<PositionSample>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE timestamp > ?1 ORDER BY timestamp, rowid",
            POSITIONS.column_list(),
            POSITIONS.table
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map([cutoff_ms], read_sample)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn row_count(&self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", POSITIONS.table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| TrackError::Storage(e))
    }
}

impl PositionSource for Shard {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn query_range(&self, predicate: &RangePredicate) -> Result<Vec<PositionSample>> {
        if predicate.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY timestamp, rowid",
            POSITIONS.column_list(),
            POSITIONS.table,
            predicate.where_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(predicate.params()), read_sample)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn read_sample(row: &Row<'_>) -> rusqlite::Result<PositionSample> {
    let cell: CellKey = row.get(3)?;
    Ok(PositionSample {
        timestamp: row.get(0)?,
        lat: row.get(1)?,
        lon: row.get(2)?,
        cell_id: cell.0,
    })
}
