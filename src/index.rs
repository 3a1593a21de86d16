//! S2 cell index powering track range queries.
//!
//! Every stored position carries the id of the leaf S2 cell containing it. A
//! bounding box query is turned into a small covering of coarser cells, and
//! each covering cell into a numeric id range, so the store only has to run
//! `BETWEEN` scans over an ordinary integer index.
//!
//! Cell ids are `u64` everywhere. SQLite integers are signed, so ids travel
//! through the database as their two's-complement bit pattern (`CellKey`).
//! A single range never changes the top bit of a valid id, which keeps signed
//! comparisons in SQL consistent with unsigned comparisons here.

use crate::config::Config;
use crate::error::{Result, TrackError};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use s2::cellid::CellID;
use s2::latlng::LatLng as S2LatLng;
use s2::rect::Rect as S2Rect;
use s2::region::RegionCoverer;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use tracklog_types::bounds::GeoBounds;
use tracklog_types::point::LatLng;

mod cache;

pub use cache::{CacheStats, CellCache};

/// Finest S2 subdivision level, used for stored positions.
pub const LEAF_LEVEL: u8 = 30;

/// Column holding the cell id in the `positions` table.
pub const CELL_COLUMN: &str = "s2cell";

/// Leaf-level S2 cell id of a position.
pub fn encode(lat: f64, lon: f64) -> u64 {
    let ll = S2LatLng::from_degrees(lat, lon);
    CellID::from(&ll).0
}

/// Cells (at most `max_cells`, no finer than `max_level`) whose union covers
/// `bounds`. Coarser cells are preferred by the coverer.
pub fn cover(bounds: &GeoBounds, max_level: u8, max_cells: usize) -> Vec<u64> {
    let rect = S2Rect::from_degrees(bounds.south(), bounds.west(), bounds.north(), bounds.east());
    let coverer = RegionCoverer {
        min_level: 0,
        max_level,
        level_mod: 1,
        max_cells,
    };
    coverer.covering(&rect).0.into_iter().map(|c| c.0).collect()
}

/// Inclusive id range holding a cell and all of its descendants.
///
/// With `p` the position of the lowest set bit, `low` clears that bit and
/// `high` sets bit `p + 1` and every bit below `p`. Id 0 maps to `(0, 2)`.
///
/// # Examples
///
/// ```
/// use tracklog::index::range_of;
///
/// let range = range_of(0b1011_0000).unwrap();
/// assert_eq!(range.low, 0b1010_0000);
/// assert_eq!(range.high, 0b1011_1111);
/// ```
pub fn range_of(cell_id: u64) -> Result<CellRange> {
    if cell_id == 0 {
        return Ok(CellRange { low: 0, high: 2 });
    }

    let p = cell_id.trailing_zeros();
    if p >= 63 {
        return Err(TrackError::InvalidCellId(format!(
            "{} has no representable upper bound",
            cell_id
        )));
    }

    let low = cell_id & (cell_id - 1);
    let high = cell_id | (1u64 << (p + 1)) | ((1u64 << p) - 1);
    Ok(CellRange { low, high })
}

/// Inclusive range of cell ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub low: u64,
    pub high: u64,
}

impl CellRange {
    pub fn contains(&self, cell_id: u64) -> bool {
        self.low <= cell_id && cell_id <= self.high
    }
}

/// A cell id as stored in SQLite.
///
/// Converts losslessly between `u64` and the signed INTEGER column, and
/// parses the decimal text form used in query strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey(pub u64);

impl CellKey {
    /// S2 level encoded by the id, `None` if it is not a valid cell id.
    pub fn level(self) -> Option<u8> {
        if self.0 == 0 {
            return None;
        }
        let p = self.0.trailing_zeros();
        if p % 2 == 1 || p > 60 {
            return None;
        }
        Some(LEAF_LEVEL - (p / 2) as u8)
    }
}

impl From<u64> for CellKey {
    fn from(id: u64) -> Self {
        CellKey(id)
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CellKey {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(TrackError::InvalidCellId(format!("negative id {}", s)));
        }
        s.parse::<u64>()
            .map(CellKey)
            .map_err(|e| TrackError::InvalidCellId(format!("{}: {}", s, e)))
    }
}

impl ToSql for CellKey {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0 as i64))
    }
}

impl FromSql for CellKey {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(|v| CellKey(v as u64))
    }
}

/// OR'd `BETWEEN` predicate over the cell id column.
#[derive(Debug, Clone, Default)]
pub struct RangePredicate {
    ranges: SmallVec<[CellRange; 8]>,
}

impl RangePredicate {
    pub fn from_cells(cells: &[u64]) -> Result<Self> {
        let ranges = cells
            .iter()
            .map(|&id| range_of(id))
            .collect::<Result<SmallVec<[CellRange; 8]>>>()?;
        Ok(Self { ranges })
    }

    pub fn ranges(&self) -> &[CellRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// SQL text with numbered placeholders, two per range. An empty predicate
    /// matches nothing.
    pub fn where_clause(&self) -> String {
        if self.ranges.is_empty() {
            return "0".to_string();
        }
        self.ranges
            .iter()
            .enumerate()
            .map(|(i, _)| {
                format!(
                    "({} BETWEEN ?{} AND ?{})",
                    CELL_COLUMN,
                    2 * i + 1,
                    2 * i + 2
                )
            })
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    /// Bound parameters matching `where_clause`.
    pub fn params(&self) -> Vec<CellKey> {
        self.ranges
            .iter()
            .flat_map(|r| [CellKey(r.low), CellKey(r.high)])
            .collect()
    }

    pub fn matches(&self, cell_id: u64) -> bool {
        self.ranges.iter().any(|r| r.contains(cell_id))
    }
}

/// Cell id encoder and covering builder configured from `Config`.
#[derive(Debug)]
pub struct SpatialIndex {
    max_level: u8,
    max_cells: usize,
    cache: CellCache,
}

impl SpatialIndex {
    pub fn new(config: &Config) -> Self {
        Self {
            max_level: config.cover_max_level,
            max_cells: config.cover_max_cells,
            cache: CellCache::new(config.cell_cache_capacity),
        }
    }

    /// Leaf cell id of `pos`, memoized in the cell cache.
    pub fn encode(&mut self, pos: &LatLng) -> u64 {
        self.cache
            .get_or_insert_with(pos, || encode(pos.lat, pos.lon))
    }

    pub fn cover(&self, bounds: &GeoBounds) -> Vec<u64> {
        cover(bounds, self.max_level, self.max_cells)
    }

    /// Covering of `bounds` translated into a range predicate.
    pub fn range_predicate(&self, bounds: &GeoBounds) -> Result<RangePredicate> {
        let cells = self.cover(bounds);
        log::debug!(
            "Covering of {:?}: {}",
            bounds,
            cells
                .iter()
                .map(|&c| CellKey(c).to_string())
                .collect::<Vec<_>>()
                .join(",")
        );
        RangePredicate::from_cells(&cells)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn reset_cache(&mut self) {
        self.cache.reset();
    }
}
