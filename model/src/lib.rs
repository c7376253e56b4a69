use serde::{Deserialize, Serialize};

mod osm;
mod record;

pub use osm::OsmId;
pub use record::{sentinel, Coordinates, ResultRecord};

/// Marks a field the data source had no value for.
pub const UNAVAILABLE: &str = "unavailable";

/// Upper bound on results per search, also the server-side cap.
pub const MAX_RESULTS: u32 = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub establishment_type: String,
    pub location: String,
    pub max_results: u32,
}

/// A completed search: the parameters it ran with and the records it kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub params: SearchParams,
    pub results: Vec<ResultRecord>,
}
