//! Compute layer for track queries.
//!
//! This module holds the pure algorithms the track store is built from:
//! - Query rectangle derivation (`bbox`)
//! - Polyline simplification (`simplify`)
//! - Coordinate validation (`validation`)
//!
//! Nothing here touches storage.

pub mod bbox;
pub mod simplify;
pub mod validation;
