//! Data types shared with consumers of the track store.
//!
//! The definitions live in the `tracklog-types` crate so that clients can
//! deserialize query results without pulling in SQLite.

pub use tracklog_types::bounds::GeoBounds;
pub use tracklog_types::point::{LatLng, PositionSample, TrackPoint};
pub use tracklog_types::track::{Track, TrackCollection, TrackQuery};

pub use crate::config::{Config, ShardOrdering};
