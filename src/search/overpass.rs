use std::collections::BTreeMap;

use _model::{OsmId, MAX_RESULTS};
use geo::Point;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};
use ureq::Agent;

use crate::error::SearchError;

use super::{FeatureQuery, FeatureSource, OsmFeature, Tags};

const SERVICE: &str = "Overpass";

pub struct Overpass {
    agent: Agent,
    url: String,
}

impl Overpass {
    pub fn new(agent: Agent, url: &str) -> Self {
        Overpass {
            agent,
            url: url.to_string(),
        }
    }
}

impl FeatureSource for Overpass {
    fn features(&self, query: &FeatureQuery) -> Result<Vec<OsmFeature>, SearchError> {
        let payload = build_query(query);
        debug!(%payload, "querying overpass");

        let body = self
            .agent
            .post(&self.url)
            .send_form(&[("data", &payload)])
            .map_err(|e| SearchError::upstream(SERVICE, e))?
            .into_string()
            .map_err(|e| SearchError::body(SERVICE, e))?;

        parse_response(&body)
    }
}

/// Every node, way and relation within the radius whose name contains
/// `query.name`, ignoring case. Areas come back with a computed center.
pub fn build_query(query: &FeatureQuery) -> String {
    let name = ql_string(&regex_literal(query.name.trim()));
    let (lon, lat) = query.center.x_y();
    let radius = query.radius_m;
    let limit = query.limit.min(MAX_RESULTS);

    format!(
        r#"[out:json][timeout:25];
(
  node["name"~"{name}",i](around:{radius},{lat},{lon});
  way["name"~"{name}",i](around:{radius},{lat},{lon});
  relation["name"~"{name}",i](around:{radius},{lat},{lon});
);
out center {limit};"#
    )
}

/// Escapes regex metacharacters so the name is matched as plain text.
fn regex_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if r"\.+*?()|[]{}^$".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes for a double-quoted Overpass QL string literal.
fn ql_string(raw: &str) -> String {
    raw.replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\n', r"\n")
}

pub fn parse_response(body: &str) -> Result<Vec<OsmFeature>, SearchError> {
    let response: OverpassResponse =
        serde_json::from_str(body).map_err(|e| SearchError::malformed(SERVICE, e))?;

    if let Some(remark) = &response.remark {
        warn!(%remark, "overpass returned a remark");
    }

    Ok(response
        .elements
        .into_iter()
        .filter_map(|x| match x {
            Element::Known(x) => Some(x.simplify()),
            Element::Unknown(x) => {
                warn!(kind = ?x.get("type"), id = ?x.get("id"), "skipping unrecognised element");
                None
            }
        })
        .collect())
}

#[derive(Deserialize)]
struct OverpassResponse {
    elements: Vec<Element>,
    remark: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Element {
    Known(RawElement),
    Unknown(Value),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum RawElement {
    Node {
        id: u64,
        lat: Option<f64>,
        lon: Option<f64>,
        #[serde(default, deserialize_with = "lenient_tags")]
        tags: Tags,
    },
    Way {
        id: u64,
        center: Option<RawPosition>,
        #[serde(default, deserialize_with = "lenient_tags")]
        tags: Tags,
    },
    Relation {
        id: u64,
        center: Option<RawPosition>,
        #[serde(default, deserialize_with = "lenient_tags")]
        tags: Tags,
    },
}

impl RawElement {
    fn simplify(self) -> OsmFeature {
        match self {
            Self::Node { id, lat, lon, tags } => OsmFeature {
                id: OsmId::Node(id),
                position: lat.zip(lon).map(|(lat, lon)| Point::new(lon, lat)),
                center: None,
                tags,
            },
            Self::Way { id, center, tags } => OsmFeature {
                id: OsmId::Way(id),
                position: None,
                center: center.map(RawPosition::simplify),
                tags,
            },
            Self::Relation { id, center, tags } => OsmFeature {
                id: OsmId::Relation(id),
                position: None,
                center: center.map(RawPosition::simplify),
                tags,
            },
        }
    }
}

#[derive(Deserialize)]
struct RawPosition {
    lat: f64,
    lon: f64,
}

impl RawPosition {
    fn simplify(self) -> Point {
        Point::new(self.lon, self.lat)
    }
}

/// Keeps the string-valued entries of a tag object; anything else reads as no tags.
fn lenient_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Tags, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(v) => Some((k, v)),
                _ => None,
            })
            .collect::<BTreeMap<_, _>>(),
        _ => Tags::new(),
    })
}
