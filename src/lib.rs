//! Vessel track store on S2-indexed SQLite shards.
//!
//! Positions of the own vessel are appended to a live SQLite shard together
//! with their S2 leaf cell id. Track queries cover the query rectangle with
//! S2 cells, scan every shard (the live one and read-only archives) by cell
//! id range, split the rows into tracks at long silences and simplify each
//! track.
//!
//! ```rust
//! use tracklog::prelude::*;
//!
//! let dir = tempfile::tempdir()?;
//! let mut db = TrackDb::open("urn:mrn:imo:mmsi:230099999", dir.path())?;
//!
//! db.insert_position("vessels.self", LatLng::new(60.15, 24.95), Some(1_000))?;
//! db.insert_position("vessels.self", LatLng::new(60.16, 24.97), Some(61_000))?;
//!
//! // one kilometer around the current position
//! let tracks = db.query_tracks(&TrackQuery::default(), Some(LatLng::new(60.155, 24.96)))?;
//! assert_eq!(tracks.get(db.self_context()).map(|t| t.len()), Some(1));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod storage;
pub mod types;

pub use builder::TrackDbBuilder;
pub use db::TrackDb;
pub use error::{Result, TrackError};

pub use config::{Config, ShardOrdering};

pub use compute::bbox::{QueryBounds, bounds_around, parse_bbox};
pub use compute::simplify::simplify;

pub use index::{CellKey, CellRange, RangePredicate, SpatialIndex, cover, encode, range_of};

pub use storage::{MemorySource, PositionSource, RejectedShard, ShardSet};

pub use types::{
    GeoBounds, LatLng, PositionSample, Track, TrackCollection, TrackPoint, TrackQuery,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Result, TrackDb, TrackDbBuilder, TrackError};

    pub use crate::{Config, ShardOrdering};

    pub use crate::types::{GeoBounds, LatLng, Track, TrackCollection, TrackPoint, TrackQuery};

    pub use crate::{bounds_around, parse_bbox, simplify};

    pub use crate::{MemorySource, PositionSource};
}
