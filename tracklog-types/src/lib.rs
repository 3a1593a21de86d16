//! # tracklog-types
//!
//! Core position and track types for the tracklog store.
//!
//! - **Point types**: `LatLng`, `PositionSample`, `TrackPoint`
//! - **Bounds**: `GeoBounds`
//! - **Track types**: `Track`, `TrackCollection`, `TrackQuery`
//!
//! All types are serializable with Serde. The JSON shapes match what the
//! history API hands to map clients: positions are `[lat, lon]` pairs and
//! track points are `[lat, lon, null, timestamp]` tuples.
//!
//! ## Examples
//!
//! ```rust
//! use tracklog_types::bounds::GeoBounds;
//! use tracklog_types::point::LatLng;
//!
//! let bounds = GeoBounds::new(LatLng::new(59.97, 21.22), LatLng::new(60.32, 23.05));
//! assert!(bounds.contains(&LatLng::new(60.2578, 21.9531)));
//! ```

pub mod bounds;
pub mod point;
pub mod track;
