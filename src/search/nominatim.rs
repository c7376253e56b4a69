use geo::Point;
use serde::Deserialize;
use tracing::debug;
use ureq::Agent;

use crate::error::SearchError;

use super::Geocoder;

const SERVICE: &str = "Nominatim";

pub struct Nominatim {
    agent: Agent,
    base_url: String,
}

impl Nominatim {
    pub fn new(agent: Agent, base_url: &str) -> Self {
        Nominatim {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Geocoder for Nominatim {
    fn locate(&self, location: &str) -> Result<Option<Point>, SearchError> {
        let url = format!("{}/search", self.base_url);
        debug!(%url, location, "geocoding");

        let body = self
            .agent
            .get(&url)
            .query("format", "json")
            .query("q", location)
            .query("limit", "1")
            .call()
            .map_err(|e| SearchError::upstream(SERVICE, e))?
            .into_string()
            .map_err(|e| SearchError::body(SERVICE, e))?;

        parse_places(&body)
    }
}

/// Best match of a `/search` response, or `None` when nothing matched.
pub fn parse_places(body: &str) -> Result<Option<Point>, SearchError> {
    let places: Vec<Place> =
        serde_json::from_str(body).map_err(|e| SearchError::malformed(SERVICE, e))?;

    match places.into_iter().next() {
        Some(place) => {
            let lat = place.lat.degrees()?;
            let lon = place.lon.degrees()?;
            Ok(Some(Point::new(lon, lat)))
        }
        None => Ok(None),
    }
}

#[derive(Deserialize)]
struct Place {
    lat: Degrees,
    lon: Degrees,
}

// nominatim sends decimal strings, but accept bare numbers too
#[derive(Deserialize)]
#[serde(untagged)]
enum Degrees {
    Number(f64),
    Text(String),
}

impl Degrees {
    fn degrees(self) -> Result<f64, SearchError> {
        match self {
            Self::Number(x) => Ok(x),
            Self::Text(x) => x
                .trim()
                .parse()
                .map_err(|_| SearchError::malformed(SERVICE, format!("invalid coordinate {x:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_match() {
        let body = r#"[{
            "place_id": 1,
            "lat": "-22.9110137",
            "lon": "-43.2093727",
            "display_name": "Rio de Janeiro, Brasil"
        }]"#;
        assert_eq!(
            parse_places(body).unwrap(),
            Some(Point::new(-43.2093727, -22.9110137))
        );
    }

    #[test]
    fn numeric_coordinates() {
        let body = r#"[{"lat": 38.7, "lon": -9.1}]"#;
        assert_eq!(parse_places(body).unwrap(), Some(Point::new(-9.1, 38.7)));
    }

    #[test]
    fn no_match() {
        assert_eq!(parse_places("[]").unwrap(), None);
    }

    #[test]
    fn malformed() {
        for body in ["", "{}", r#"[{"lat": "north", "lon": "1"}]"#, r#"[{"lat": "1"}]"#] {
            assert!(
                matches!(
                    parse_places(body),
                    Err(SearchError::MalformedUpstreamResponse { service: "Nominatim", .. })
                ),
                "{body}"
            );
        }
    }
}
