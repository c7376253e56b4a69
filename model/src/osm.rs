use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum OsmId {
    Node(u64),
    Way(u64),
    Relation(u64),
}

impl OsmId {
    pub fn id(&self) -> u64 {
        match self {
            Self::Node(x) | Self::Way(x) | Self::Relation(x) => *x,
        }
    }

    /// Nodes carry their own position, ways and relations only a computed center.
    pub fn is_point(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    pub fn link(&self) -> String {
        format!("https://www.openstreetmap.org/{self}")
    }
}

impl fmt::Display for OsmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(x) => write!(f, "node/{x}"),
            Self::Way(x) => write!(f, "way/{x}"),
            Self::Relation(x) => write!(f, "relation/{x}"),
        }
    }
}
