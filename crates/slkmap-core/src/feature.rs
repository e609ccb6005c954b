//! Road segment features as supplied by the host.

use serde::{Deserialize, Serialize};

use crate::network::{Carriageway, NetworkType};
use crate::types::{AnnotateError, ChainageRange};
use crate::vector::Vector;

/// A road segment ready for annotation: vertices already projected into
/// screen pixels, chainage at both ends, and its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadFeature {
    /// Vertices in screen-pixel coordinates, first to last.
    pub vertices: Vec<Vector>,
    /// Chainage at the first and last vertex.
    pub chainage: ChainageRange,
    /// Network classification.
    pub network_type: NetworkType,
    /// Carriageway side.
    pub carriageway: Carriageway,
    /// Road number, e.g. `"H005"`.
    pub road: Option<String>,
    /// Road name, e.g. `"Great Eastern Hwy"`.
    pub road_name: Option<String>,
}

impl RoadFeature {
    /// Create a single-carriageway feature with no road name attributes.
    #[must_use]
    pub const fn new(
        vertices: Vec<Vector>,
        chainage: ChainageRange,
        network_type: NetworkType,
    ) -> Self {
        Self {
            vertices,
            chainage,
            network_type,
            carriageway: Carriageway::Single,
            road: None,
            road_name: None,
        }
    }
}

/// A feature exactly as the host's data binding hands it over.
///
/// Classification and carriageway are free-form strings here; converting
/// to [`RoadFeature`] validates them one feature at a time so a single
/// bad record never rejects the whole frame. Field names accept both
/// the snake-case form and the host's upper-case attribute names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Vertices in screen-pixel coordinates.
    pub vertices: Vec<Vector>,
    /// Chainage at the first vertex, in kilometres.
    #[serde(alias = "START_SLK")]
    pub slk_from: f64,
    /// Chainage at the last vertex, in kilometres.
    #[serde(alias = "END_SLK")]
    pub slk_to: f64,
    /// Network classification string.
    #[serde(alias = "NETWORK_TYPE")]
    pub network_type: String,
    /// Carriageway side string (`"Left"`, `"Right"` or `"Single"`).
    #[serde(alias = "CWY", default)]
    pub carriageway: Option<String>,
    /// Road number.
    #[serde(alias = "ROAD", default)]
    pub road: Option<String>,
    /// Road name.
    #[serde(alias = "ROAD_NAME", default)]
    pub road_name: Option<String>,
}

impl TryFrom<&FeatureRecord> for RoadFeature {
    type Error = AnnotateError;

    fn try_from(record: &FeatureRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            vertices: record.vertices.clone(),
            chainage: ChainageRange::new(record.slk_from, record.slk_to),
            network_type: record.network_type.parse()?,
            carriageway: parse_carriageway(record.carriageway.as_deref()),
            road: record.road.clone(),
            road_name: record.road_name.clone(),
        })
    }
}

/// Missing or unrecognised values mean an undivided road.
fn parse_carriageway(value: Option<&str>) -> Carriageway {
    match value.map(str::trim) {
        Some(side) if side.eq_ignore_ascii_case("left") => Carriageway::Left,
        Some(side) if side.eq_ignore_ascii_case("right") => Carriageway::Right,
        _ => Carriageway::Single,
    }
}
