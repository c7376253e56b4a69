use geo::Point;
use serde::{Deserialize, Serialize};

use crate::UNAVAILABLE;

/// One normalized place, as rendered to the user and written by the exporters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub opening_hours: String,
    pub coordinates: Option<Coordinates>,
    /// Where the element can be viewed on openstreetmap.org.
    pub map_url: String,
    /// One-decimal rating, kept as text the way it is displayed.
    #[serde(with = "sentinel")]
    pub average_rating: Option<String>,
    #[serde(with = "sentinel")]
    pub review_count: Option<u32>,
    pub introduction: String,
    pub store_shopping: bool,
    pub in_store_pickup: bool,
    pub delivery: bool,
    /// Set when the rating and review count are placeholders rather than sourced data.
    #[serde(default)]
    pub is_synthetic: bool,
}

impl ResultRecord {
    pub fn has_name(&self) -> bool {
        self.name != UNAVAILABLE
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl From<Point> for Coordinates {
    fn from(point: Point) -> Self {
        Coordinates {
            lat: point.y(),
            lon: point.x(),
        }
    }
}

/// Writes `None` as the "unavailable" sentinel and reads it back as `None`.
pub mod sentinel {
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use crate::UNAVAILABLE;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(x) => x.serialize(serializer),
            None => serializer.serialize_str(UNAVAILABLE),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<T> {
            Missing(Missing),
            Present(T),
        }

        Ok(match Raw::<T>::deserialize(deserializer)? {
            Raw::Missing(_) => None,
            Raw::Present(x) => Some(x),
        })
    }

    struct Missing;

    impl<'de> Deserialize<'de> for Missing {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = String::deserialize(deserializer)?;
            if raw == UNAVAILABLE {
                Ok(Missing)
            } else {
                Err(de::Error::custom(format!("expected {UNAVAILABLE:?}, got {raw:?}")))
            }
        }
    }
}
