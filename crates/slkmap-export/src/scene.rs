//! A drawable frame: road lines with resolved styles, their ticks and
//! their labels.

use serde::{Deserialize, Serialize};

use slkmap_core::{
    AnnotateError, FeatureAnnotation, FeatureOutcome, FeatureRecord, FrameContext, Layer,
    RoadFeature, RoadSettings, RoadStyle, SkippedFeature, Viewport, annotate_feature,
    direction_at, measure, resolve_style, road_label_text,
};

use crate::label::{LabelPlacement, place_label, place_road_label};

/// A frame as stored on disk for offline rendering and benchmarking.
///
/// Every field except `features` is optional; [`SceneFile::context`]
/// fills gaps with defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    /// Map resolution in metres per pixel.
    #[serde(default)]
    pub resolution: Option<f64>,
    /// Visible pixel window.
    #[serde(default)]
    pub viewport: Option<Viewport>,
    /// Display settings.
    #[serde(default)]
    pub settings: Option<RoadSettings>,
    /// Road features, already projected into pixels.
    pub features: Vec<FeatureRecord>,
}

impl SceneFile {
    /// Resolution used when the file does not give one: the 0.1 km tick band.
    pub const DEFAULT_RESOLUTION: f64 = 2.0;

    /// The frame context this file describes.
    #[must_use]
    pub fn context(&self) -> FrameContext {
        FrameContext {
            resolution: self.resolution.unwrap_or(Self::DEFAULT_RESOLUTION),
            viewport: self.viewport.unwrap_or_default(),
            settings: self.settings.clone().unwrap_or_default(),
        }
    }
}

/// One road as drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFeature {
    /// The validated feature.
    pub feature: RoadFeature,
    /// Stroke style for the line and its ticks.
    pub style: RoadStyle,
    /// Whether the road line itself is drawn. Ticks follow the tick
    /// layer, so a hidden road can still carry them.
    pub road_visible: bool,
    /// Ticks, when the feature is annotated this frame.
    pub annotation: Option<FeatureAnnotation>,
    /// Road number or name drawn along the line.
    pub road_label: Option<LabelPlacement>,
}

impl SceneFeature {
    /// Placements for every labelled tick.
    pub fn tick_labels(&self) -> impl Iterator<Item = LabelPlacement> + '_ {
        self.annotation
            .iter()
            .flat_map(|a| a.ticks.iter())
            .filter_map(place_label)
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Visible pixel window; the drawing surface size.
    pub viewport: Viewport,
    /// Roads in input order that have a visible line or ticks.
    pub features: Vec<SceneFeature>,
    /// Records that could not be drawn or annotated.
    pub skipped: Vec<SkippedFeature>,
}

impl Scene {
    /// Resolve styles, road labels and ticks for every record.
    ///
    /// Ticks follow the tick layer alone: a record on a hidden road layer
    /// keeps its ticks but loses its line and road label, and is left out
    /// only when it has no ticks either. A record whose classification or
    /// style cannot be resolved is skipped entirely; a record whose ticks
    /// fail is still drawn, without ticks. Either way the failure is
    /// listed in [`Scene::skipped`].
    #[must_use]
    pub fn build(records: &[FeatureRecord], ctx: &FrameContext) -> Self {
        let mut features = Vec::new();
        let mut skipped = Vec::new();

        for (index, record) in records.iter().enumerate() {
            match scene_feature(record, ctx) {
                Ok(Some((feature, tick_error))) => {
                    if let Some(error) = tick_error {
                        skipped.push(SkippedFeature { index, error });
                    }
                    features.push(feature);
                }
                Ok(None) => {}
                Err(error) => skipped.push(SkippedFeature { index, error }),
            }
        }

        Self {
            viewport: ctx.viewport,
            features,
            skipped,
        }
    }

    /// Total ticks across every feature.
    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.features
            .iter()
            .filter_map(|f| f.annotation.as_ref())
            .map(|a| a.ticks.len())
            .sum()
    }
}

type BuiltFeature = (SceneFeature, Option<AnnotateError>);

fn scene_feature(
    record: &FeatureRecord,
    ctx: &FrameContext,
) -> Result<Option<BuiltFeature>, AnnotateError> {
    let feature = RoadFeature::try_from(record)?;
    let layer = Layer::for_network(feature.network_type);
    let road_visible = layer.is_visible(&ctx.settings, ctx.resolution);

    let (annotation, tick_error) = match annotate_feature(&feature, ctx) {
        Ok(FeatureOutcome::Annotated(annotation)) => (Some(annotation), None),
        Ok(FeatureOutcome::Suppressed(_)) => (None, None),
        Err(error) => (None, Some(error)),
    };
    if !road_visible && annotation.is_none() {
        // Nothing left to draw.
        return tick_error.map_or(Ok(None), Err);
    }
    let style = resolve_style(feature.network_type, &ctx.settings)?;

    let road_label = if road_visible {
        road_label_placement(&feature, layer, ctx.resolution)
    } else {
        None
    };

    Ok(Some((
        SceneFeature {
            feature,
            style,
            road_visible,
            annotation,
            road_label,
        },
        tick_error,
    )))
}

/// Road number or name centred on the line's midpoint.
fn road_label_placement(
    feature: &RoadFeature,
    layer: Layer,
    resolution: f64,
) -> Option<LabelPlacement> {
    let text = road_label_text(
        layer,
        resolution,
        feature.road.as_deref(),
        feature.road_name.as_deref(),
    )?;
    let measured = measure(&feature.vertices).ok()?;
    let direction = direction_at(&measured, 0.5)?;
    let anchor = measured.point_at(measured.total_length() / 2.0);
    Some(place_road_label(text, anchor, direction))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use slkmap_core::{NetworkType, Vector};

    use super::*;

    fn records() -> Vec<FeatureRecord> {
        serde_json::from_str(
            r#"[
                {"vertices": [[0, 100], [1000, 100]], "START_SLK": 0, "END_SLK": 2,
                 "NETWORK_TYPE": "State Road", "ROAD": "H005",
                 "ROAD_NAME": "Great Eastern Hwy"},
                {"vertices": [[0, 150], [1000, 150]], "START_SLK": 0, "END_SLK": 1,
                 "NETWORK_TYPE": "Local Road", "ROAD_NAME": "Smith St"},
                {"vertices": [[0, 20], [1000, 20]], "START_SLK": 0, "END_SLK": 1,
                 "NETWORK_TYPE": "Bridle Path"}
            ]"#,
        )
        .unwrap()
    }

    fn ctx(resolution: f64) -> FrameContext {
        FrameContext {
            resolution,
            viewport: Viewport::new(1000.0, 200.0),
            settings: RoadSettings::default(),
        }
    }

    #[test]
    fn scene_file_defaults() {
        let file: SceneFile = serde_json::from_str(r#"{"features": []}"#).unwrap();
        let ctx = file.context();
        assert!((ctx.resolution - SceneFile::DEFAULT_RESOLUTION).abs() < f64::EPSILON);
        assert_eq!(ctx.viewport, Viewport::default());
        assert_eq!(ctx.settings, RoadSettings::default());
    }

    #[test]
    fn builds_styles_ticks_and_labels() {
        // Resolution 0.5: other roads are visible (zoom > 15).
        let scene = Scene::build(&records(), &ctx(0.5));
        assert_eq!(scene.features.len(), 2);
        assert_eq!(scene.skipped.len(), 1);
        assert_eq!(scene.skipped[0].index, 2);

        let state = &scene.features[0];
        assert_eq!(state.feature.network_type, NetworkType::StateRoad);
        assert!(state.annotation.is_some());
        let label = state.road_label.as_ref().unwrap();
        assert_eq!(label.text, "H005 - Great Eastern Hwy");
        assert!(label.anchor.distance_to(Vector::new(500.0, 100.0)) < 1e-9);

        let local = &scene.features[1];
        assert!(local.annotation.is_none());
        assert_eq!(local.road_label.as_ref().unwrap().text, "Smith St");
    }

    #[test]
    fn hidden_road_layers_are_left_out() {
        // Resolution 2: zoom ~16.3, still above the other-roads minimum.
        let mut context = ctx(2.0);
        context.settings.show_local_roads = false;
        let scene = Scene::build(&records(), &context);
        assert_eq!(scene.features.len(), 1);
        assert_eq!(scene.tick_count(), 20);
        assert_eq!(scene.features[0].tick_labels().count(), 2);
    }

    #[test]
    fn ticks_survive_a_hidden_road_layer() {
        let mut context = ctx(2.0);
        context.settings.show_state_roads = false;
        let scene = Scene::build(&records(), &context);
        assert_eq!(scene.features.len(), 2);

        let state = &scene.features[0];
        assert_eq!(state.feature.network_type, NetworkType::StateRoad);
        assert!(!state.road_visible);
        assert!(state.road_label.is_none());
        assert_eq!(state.annotation.as_ref().unwrap().ticks.len(), 20);
        assert!(scene.features[1].road_visible);

        // With the tick layer off as well there is nothing left to draw.
        context.settings.show_slk_ticks = false;
        let scene = Scene::build(&records(), &context);
        assert_eq!(scene.features.len(), 1);
        assert_eq!(scene.features[0].feature.network_type, NetworkType::LocalRoad);
    }

    #[test]
    fn long_roads_keep_their_visible_ticks() {
        // 150 km at 0.2 m/px with 1 m ticks; 0..0.2 km is on screen.
        let records: Vec<FeatureRecord> = serde_json::from_str(
            r#"[{"vertices": [[0, 100], [750000, 100]], "START_SLK": 0, "END_SLK": 150,
                 "NETWORK_TYPE": "State Road"}]"#,
        )
        .unwrap();
        let scene = Scene::build(&records, &ctx(0.2));
        assert!(scene.skipped.is_empty());
        assert_eq!(scene.tick_count(), 201);
        assert_eq!(scene.features[0].tick_labels().count(), 21);
    }

    #[test]
    fn tick_failures_still_draw_the_road() {
        // Far more tick positions than a walk can step through exactly.
        let records: Vec<FeatureRecord> = serde_json::from_str(
            r#"[{"vertices": [[0, 100], [1, 100]], "START_SLK": 0, "END_SLK": 1e15,
                 "NETWORK_TYPE": "State Road"}]"#,
        )
        .unwrap();
        let scene = Scene::build(&records, &ctx(0.1));
        assert_eq!(scene.features.len(), 1);
        assert!(scene.features[0].road_visible);
        assert!(scene.features[0].annotation.is_none());
        assert!(matches!(
            scene.skipped[0].error,
            AnnotateError::TooManyTicks { .. }
        ));
    }
}
