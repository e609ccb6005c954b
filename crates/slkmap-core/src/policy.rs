//! Resolution-adaptive rendering policy.
//!
//! Map resolution is real-world units (metres) per pixel: small values
//! are zoomed in. Every decision here is a step function of resolution,
//! recomputed on each redraw.

use serde::{Deserialize, Serialize};

use crate::network::NetworkType;
use crate::settings::RoadSettings;

/// Resolution above which controlled paths get no tick marks at all.
pub const CONTROLLED_PATH_TICK_CUTOFF: f64 = 4.0;

/// Web-mercator resolution (metres per pixel) at zoom level 0 for
/// 256 px tiles.
const ZOOM_0_RESOLUTION: f64 = 156_543.033_928_040_97;

/// Tick spacing and labelling parameters for one zoom band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickIntervals {
    /// Real-world distance between consecutive ticks, in kilometres.
    pub minor_interval_km: f64,
    /// Every `major_interval_count`-th chainage multiple is a labelled
    /// major tick.
    pub major_interval_count: u32,
    /// Decimal places in major tick labels.
    pub decimal_figures: usize,
}

impl TickIntervals {
    /// Real-world distance between major ticks, in kilometres.
    #[must_use]
    pub fn major_interval_km(&self) -> f64 {
        self.minor_interval_km * f64::from(self.major_interval_count)
    }
}

/// Tick parameters for the current map resolution.
///
/// | resolution   | minor (km) | major every | decimals |
/// |--------------|-----------:|------------:|---------:|
/// | < 0.3        | 0.001      | 10          | 2        |
/// | [0.3, 1.4)   | 0.01       | 10          | 1        |
/// | [1.4, 4)     | 0.1        | 10          | 0        |
/// | >= 4         | 1          | 1           | 0        |
///
/// Never selects a zero interval.
#[must_use]
pub fn tick_intervals_for_resolution(resolution: f64) -> TickIntervals {
    let (minor_interval_km, major_interval_count, decimal_figures) = if resolution < 0.3 {
        (0.001, 10, 2)
    } else if resolution < 1.4 {
        (0.01, 10, 1)
    } else if resolution < 4.0 {
        (0.1, 10, 0)
    } else {
        (1.0, 1, 0)
    };
    TickIntervals {
        minor_interval_km,
        major_interval_count,
        decimal_figures,
    }
}

/// Tick parameters for a feature, or `None` when its ticks are suppressed
/// at this resolution.
///
/// Only controlled paths are decluttered: above
/// [`CONTROLLED_PATH_TICK_CUTOFF`] they get no ticks, while every other
/// classification is annotated at any resolution.
#[must_use]
pub fn annotation_intervals(network: NetworkType, resolution: f64) -> Option<TickIntervals> {
    match network {
        NetworkType::MainRoadsControlledPath if resolution > CONTROLLED_PATH_TICK_CUTOFF => None,
        NetworkType::MainRoadsControlledPath
        | NetworkType::StateRoad
        | NetworkType::ProposedRoad
        | NetworkType::LocalRoad
        | NetworkType::MiscellaneousRoad
        | NetworkType::Crossover => Some(tick_intervals_for_resolution(resolution)),
    }
}

/// Map layers drawn by the plugin, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Chainage tick marks over state roads.
    SlkTicks,
    /// State roads, proposed roads and controlled paths.
    StateRoads,
    /// Every other classification.
    OtherRoads,
}

impl Layer {
    /// The road layer a classification is drawn on.
    #[must_use]
    pub const fn for_network(network: NetworkType) -> Self {
        match network {
            NetworkType::MainRoadsControlledPath
            | NetworkType::StateRoad
            | NetworkType::ProposedRoad => Self::StateRoads,
            NetworkType::LocalRoad | NetworkType::MiscellaneousRoad | NetworkType::Crossover => {
                Self::OtherRoads
            }
        }
    }

    /// Web-mercator zoom level the view must be above for the layer to
    /// be drawn.
    #[must_use]
    pub const fn min_zoom(self) -> f64 {
        match self {
            Self::StateRoads => 8.0,
            Self::SlkTicks => 12.0,
            Self::OtherRoads => 15.0,
        }
    }

    /// Whether the settings enable this layer.
    #[must_use]
    pub const fn is_enabled(self, settings: &RoadSettings) -> bool {
        settings.show
            && match self {
                Self::SlkTicks => settings.show_slk_ticks,
                Self::StateRoads => settings.show_state_roads,
                Self::OtherRoads => settings.show_local_roads,
            }
    }

    /// Whether the layer is drawn at `resolution` with `settings`. The
    /// minimum zoom itself is exclusive.
    #[must_use]
    pub fn is_visible(self, settings: &RoadSettings, resolution: f64) -> bool {
        self.is_enabled(settings) && zoom_for_resolution(resolution) > self.min_zoom()
    }
}

/// Web-mercator zoom level for a resolution in metres per pixel.
#[must_use]
pub fn zoom_for_resolution(resolution: f64) -> f64 {
    (ZOOM_0_RESOLUTION / resolution).log2()
}

/// Road name label drawn along a road line, if any, at this resolution.
///
/// State-layer roads show `"ROAD - ROAD_NAME"` when zoomed in below 0.8
/// and the bare road number below 3. Other roads show only their name,
/// below 0.8.
#[must_use]
pub fn road_label_text(
    layer: Layer,
    resolution: f64,
    road: Option<&str>,
    road_name: Option<&str>,
) -> Option<String> {
    match layer {
        Layer::StateRoads if resolution < 0.8 => match (road, road_name) {
            (Some(road), Some(name)) => Some(format!("{road} - {name}")),
            (Some(only), None) | (None, Some(only)) => Some(only.to_owned()),
            (None, None) => None,
        },
        Layer::StateRoads if resolution < 3.0 => road.map(str::to_owned),
        Layer::OtherRoads if resolution < 0.8 => road_name.map(str::to_owned),
        Layer::StateRoads | Layer::OtherRoads | Layer::SlkTicks => None,
    }
}
