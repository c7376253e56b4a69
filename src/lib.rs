//! Establishment search over OpenStreetMap: geocode a location with
//! Nominatim, find matching places around it with Overpass, normalize them
//! into [`_model::ResultRecord`]s and export the set as text, JSON or CSV.

pub mod config;
pub mod error;
pub mod export;
pub mod job;
pub mod progress;
pub mod search;
pub mod session;
pub mod utils;

pub use _model::{Coordinates, OsmId, ResultRecord, ResultSet, SearchParams, UNAVAILABLE};
