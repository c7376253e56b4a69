use _model::UNAVAILABLE;
use itertools::Itertools;

use super::{tag, Tags};

/// Parts after the street, in display order.
const REGION_KEYS: [&str; 4] = ["addr:city", "addr:postcode", "addr:state", "addr:country"];

/// Builds "street, number, city, postcode, state, country" from whichever
/// `addr:*` tags are present, or the sentinel when none are.
pub fn format_address(tags: &Tags) -> String {
    // a house number on its own is meaningless, so it only rides along with the street
    let street = tag(tags, "addr:street").map(|street| match tag(tags, "addr:housenumber") {
        Some(number) => format!("{street}, {number}"),
        None => street.to_string(),
    });

    let parts = street
        .into_iter()
        .chain(
            REGION_KEYS
                .iter()
                .filter_map(|k| tag(tags, k))
                .map(str::to_string),
        )
        .collect_vec();

    if parts.is_empty() {
        UNAVAILABLE.to_string()
    } else {
        parts.join(", ")
    }
}
