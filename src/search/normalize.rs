use _model::{Coordinates, ResultRecord, UNAVAILABLE};

use super::{address::format_address, tag, OsmFeature, Tags};

/// Tags consulted for the displayed category, most specific first.
const TYPE_KEYS: [&str; 4] = ["amenity", "shop", "tourism", "leisure"];

/// Maps one feature onto the fixed record shape. Absent tags become the
/// sentinel; this never fails, so a feature without a `name` still yields a
/// record and it is up to the caller to drop it.
pub fn normalize(feature: &OsmFeature, establishment_type: &str) -> ResultRecord {
    let tags = &feature.tags;

    let coordinates = if feature.id.is_point() {
        feature.position
    } else {
        feature.center
    };

    ResultRecord {
        id: feature.id.id(),
        name: first_or_unavailable(tags, &["name"]),
        kind: first(tags, &TYPE_KEYS)
            .unwrap_or(establishment_type)
            .to_string(),
        address: format_address(tags),
        phone: first_or_unavailable(tags, &["phone"]),
        website: first_or_unavailable(tags, &["website", "contact:website"]),
        opening_hours: first_or_unavailable(tags, &["opening_hours"]),
        coordinates: coordinates.map(Coordinates::from),
        map_url: feature.id.link(),
        average_rating: None,
        review_count: None,
        introduction: first_or_unavailable(tags, &["description"]),
        store_shopping: tag(tags, "shop").is_some(),
        in_store_pickup: false,
        delivery: tag(tags, "delivery") == Some("yes"),
        is_synthetic: false,
    }
}

fn first<'a>(tags: &'a Tags, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| tag(tags, k))
}

fn first_or_unavailable(tags: &Tags, keys: &[&str]) -> String {
    first(tags, keys).unwrap_or(UNAVAILABLE).to_string()
}
