//! Road network classifications and carriageway sides.
//!
//! The host supplies both as free-form attribute strings (`NETWORK_TYPE`
//! and `CWY`). They are parsed once at the boundary into closed enums so
//! every styling and policy decision downstream is an exhaustive `match`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::AnnotateError;

/// Network classification of a road segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    /// Controlled-access principal shared paths.
    #[serde(rename = "Main Roads Controlled Path")]
    MainRoadsControlledPath,
    /// State-managed road.
    #[serde(rename = "State Road")]
    StateRoad,
    /// Planned road not yet built.
    #[serde(rename = "Proposed Road")]
    ProposedRoad,
    /// Locally managed road.
    #[serde(rename = "Local Road")]
    LocalRoad,
    /// Miscellaneous road (access roads, car parks).
    #[serde(rename = "Miscellaneous Road")]
    MiscellaneousRoad,
    /// Median crossover between carriageways.
    #[serde(rename = "Crossover")]
    Crossover,
}

impl NetworkType {
    /// Every classification, in display order.
    pub const ALL: [Self; 6] = [
        Self::MainRoadsControlledPath,
        Self::StateRoad,
        Self::ProposedRoad,
        Self::LocalRoad,
        Self::MiscellaneousRoad,
        Self::Crossover,
    ];

    /// The attribute string the host uses for this classification.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MainRoadsControlledPath => "Main Roads Controlled Path",
            Self::StateRoad => "State Road",
            Self::ProposedRoad => "Proposed Road",
            Self::LocalRoad => "Local Road",
            Self::MiscellaneousRoad => "Miscellaneous Road",
            Self::Crossover => "Crossover",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = AnnotateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|network| network.as_str() == s.trim())
            .ok_or_else(|| AnnotateError::UnknownNetworkType(s.to_owned()))
    }
}

/// Side of a divided road a segment belongs to (`CWY` attribute).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Carriageway {
    /// Left carriageway of a divided road.
    Left,
    /// Right carriageway of a divided road.
    Right,
    /// Undivided road.
    #[default]
    Single,
}

impl Carriageway {
    /// Whether chainage labels are drawn for this carriageway.
    ///
    /// Both carriageways of a divided road carry the same chainage, so
    /// the right-hand duplicate draws tick marks but no labels.
    #[must_use]
    pub const fn shows_tick_labels(self) -> bool {
        !matches!(self, Self::Right)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_strings() {
        for network in NetworkType::ALL {
            assert_eq!(network.as_str().parse::<NetworkType>().unwrap(), network);
        }
    }

    #[test]
    fn unknown_string_is_an_error() {
        let err = "Bridle Path".parse::<NetworkType>().unwrap_err();
        assert_eq!(err, AnnotateError::UnknownNetworkType("Bridle Path".into()));
    }

    #[test]
    fn serde_uses_host_strings() {
        let json = serde_json::to_string(&NetworkType::MainRoadsControlledPath).unwrap();
        assert_eq!(json, "\"Main Roads Controlled Path\"");
        let back: NetworkType = serde_json::from_str("\"Local Road\"").unwrap();
        assert_eq!(back, NetworkType::LocalRoad);
    }

    #[test]
    fn right_carriageway_hides_labels() {
        assert!(Carriageway::Left.shows_tick_labels());
        assert!(Carriageway::Single.shows_tick_labels());
        assert!(!Carriageway::Right.shows_tick_labels());
    }
}
