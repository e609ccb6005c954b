//! User-facing display settings.
//!
//! The host serializes these from its property pane; this crate only
//! consumes them. Missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

/// Road layer display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadSettings {
    /// Master switch for every road layer.
    pub show: bool,
    /// Show roads that are not state-managed.
    pub show_local_roads: bool,
    /// Show state roads, proposed roads and controlled paths.
    pub show_state_roads: bool,
    /// Show chainage tick marks on the state road layer.
    pub show_slk_ticks: bool,
    /// Colour for state and proposed roads.
    pub state_road_color: String,
    /// Colour for controlled paths.
    pub psp_road_color: String,
    /// Colour for local and other roads.
    pub local_road_color: String,
}

impl RoadSettings {
    /// Default colour for state and proposed roads.
    pub const DEFAULT_STATE_ROAD_COLOR: &'static str = "#326464";
    /// Default colour for controlled paths.
    pub const DEFAULT_PSP_ROAD_COLOR: &'static str = "#642864";
    /// Default colour for local and other roads.
    pub const DEFAULT_LOCAL_ROAD_COLOR: &'static str = "#32326e";
}

impl Default for RoadSettings {
    fn default() -> Self {
        Self {
            show: true,
            show_local_roads: true,
            show_state_roads: true,
            show_slk_ticks: true,
            state_road_color: Self::DEFAULT_STATE_ROAD_COLOR.to_owned(),
            psp_road_color: Self::DEFAULT_PSP_ROAD_COLOR.to_owned(),
            local_road_color: Self::DEFAULT_LOCAL_ROAD_COLOR.to_owned(),
        }
    }
}
