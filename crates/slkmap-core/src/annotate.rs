//! Per-feature and per-frame annotation.
//!
//! One frame is one redraw: the host supplies the current resolution,
//! viewport and settings plus every visible road segment, and gets back
//! the tick marks to draw. Each feature is computed from scratch; a
//! failure on one feature is recorded and the rest of the frame goes on.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::feature::{FeatureRecord, RoadFeature};
use crate::log;
use crate::measure::measure;
use crate::policy::{Layer, TickIntervals, annotation_intervals};
use crate::settings::RoadSettings;
use crate::ticks::{Tick, TickKind, TickRequest, generate_ticks};
use crate::types::{AnnotateError, Viewport};

/// Per-redraw inputs shared by every feature in the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameContext {
    /// Map resolution in metres per pixel.
    pub resolution: f64,
    /// Visible pixel window.
    pub viewport: Viewport,
    /// Display settings.
    #[serde(default)]
    pub settings: RoadSettings,
}

/// Why a feature received no ticks without being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suppression {
    /// The tick layer is switched off or the map is zoomed out past it.
    LayerHidden,
    /// The classification is not drawn on the tick layer.
    NotOnTickLayer,
    /// The classification is decluttered at this resolution.
    Decluttered,
}

/// Ticks computed for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAnnotation {
    /// Interval parameters chosen for the current resolution.
    pub intervals: TickIntervals,
    /// Visible ticks, ordered along the feature.
    pub ticks: Vec<Tick>,
}

impl FeatureAnnotation {
    /// Number of major ticks.
    #[must_use]
    pub fn major_count(&self) -> usize {
        self.ticks
            .iter()
            .filter(|tick| tick.kind == TickKind::Major)
            .count()
    }
}

/// Outcome of annotating one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureOutcome {
    /// Ticks were generated (possibly none, if nothing was visible).
    Annotated(FeatureAnnotation),
    /// Ticks were deliberately not generated.
    Suppressed(Suppression),
}

/// Annotate a single feature.
///
/// Measures the polyline, picks tick intervals for the resolution and
/// classification, and generates the visible ticks. Labels are stripped
/// on right carriageways, which duplicate the left carriageway's
/// chainage.
///
/// # Errors
///
/// Returns any [`AnnotateError`] from measuring or tick generation.
pub fn annotate_feature(
    feature: &RoadFeature,
    ctx: &FrameContext,
) -> Result<FeatureOutcome, AnnotateError> {
    if !Layer::SlkTicks.is_visible(&ctx.settings, ctx.resolution) {
        return Ok(FeatureOutcome::Suppressed(Suppression::LayerHidden));
    }
    if Layer::for_network(feature.network_type) != Layer::StateRoads {
        return Ok(FeatureOutcome::Suppressed(Suppression::NotOnTickLayer));
    }
    let Some(intervals) = annotation_intervals(feature.network_type, ctx.resolution) else {
        return Ok(FeatureOutcome::Suppressed(Suppression::Decluttered));
    };

    let measured = measure(&feature.vertices)?;
    let request = TickRequest {
        chainage: feature.chainage,
        intervals,
        viewport: ctx.viewport,
    };
    let mut ticks = generate_ticks(&measured, &request)?;

    if !feature.carriageway.shows_tick_labels() {
        for tick in &mut ticks {
            tick.label = None;
        }
    }

    Ok(FeatureOutcome::Annotated(FeatureAnnotation { intervals, ticks }))
}

/// A feature that could not be annotated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFeature {
    /// Position of the feature in the input.
    pub index: usize,
    /// What went wrong.
    pub error: AnnotateError,
}

/// An annotated feature and its position in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedFeature {
    /// Position of the feature in the input.
    pub index: usize,
    /// Its ticks.
    pub annotation: FeatureAnnotation,
}

/// Annotation results for every feature in one redraw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameAnnotation {
    /// Features that produced ticks (or an empty visible set).
    pub annotated: Vec<AnnotatedFeature>,
    /// Features deliberately left without ticks, with the reason.
    pub suppressed: Vec<(usize, Suppression)>,
    /// Features that failed; the rest of the frame is unaffected.
    pub skipped: Vec<SkippedFeature>,
}

impl FrameAnnotation {
    /// Total ticks across every annotated feature.
    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.annotated.iter().map(|f| f.annotation.ticks.len()).sum()
    }

    /// Total major ticks across every annotated feature.
    #[must_use]
    pub fn major_tick_count(&self) -> usize {
        self.annotated.iter().map(|f| f.annotation.major_count()).sum()
    }

    /// The annotation for the feature at input position `index`, if any.
    #[must_use]
    pub fn for_feature(&self, index: usize) -> Option<&FeatureAnnotation> {
        self.annotated
            .iter()
            .find(|f| f.index == index)
            .map(|f| &f.annotation)
    }
}

/// Annotate every feature of a frame, skipping and recording failures.
#[must_use]
pub fn annotate_frame(features: &[RoadFeature], ctx: &FrameContext) -> FrameAnnotation {
    collect_frame(features.iter().map(|f| Ok(Cow::Borrowed(f))), ctx)
}

/// Like [`annotate_frame`] for raw host records: records whose
/// classification cannot be parsed are skipped like any other failure.
#[must_use]
pub fn annotate_records(records: &[FeatureRecord], ctx: &FrameContext) -> FrameAnnotation {
    collect_frame(
        records
            .iter()
            .map(|record| RoadFeature::try_from(record).map(Cow::Owned)),
        ctx,
    )
}

fn collect_frame<'a>(
    features: impl Iterator<Item = Result<Cow<'a, RoadFeature>, AnnotateError>>,
    ctx: &FrameContext,
) -> FrameAnnotation {
    let mut frame = FrameAnnotation::default();
    for (index, feature) in features.enumerate() {
        match feature.and_then(|f| annotate_feature(&f, ctx)) {
            Ok(FeatureOutcome::Annotated(annotation)) => {
                frame.annotated.push(AnnotatedFeature { index, annotation });
            }
            Ok(FeatureOutcome::Suppressed(reason)) => frame.suppressed.push((index, reason)),
            Err(error) => {
                log::warn!(index, %error, "skipping feature");
                frame.skipped.push(SkippedFeature { index, error });
            }
        }
    }
    log::debug!(
        annotated = frame.annotated.len(),
        suppressed = frame.suppressed.len(),
        skipped = frame.skipped.len(),
        ticks = frame.tick_count(),
        "annotated frame"
    );
    frame
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::network::{Carriageway, NetworkType};
    use crate::types::ChainageRange;
    use crate::vector::Vector;

    fn ctx(resolution: f64) -> FrameContext {
        FrameContext {
            resolution,
            viewport: Viewport::new(1000.0, 200.0),
            settings: RoadSettings::default(),
        }
    }

    fn state_road(from: f64, to: f64) -> RoadFeature {
        RoadFeature::new(
            vec![Vector::new(0.0, 100.0), Vector::new(1000.0, 100.0)],
            ChainageRange::new(from, to),
            NetworkType::StateRoad,
        )
    }

    fn annotation(outcome: FeatureOutcome) -> FeatureAnnotation {
        match outcome {
            FeatureOutcome::Annotated(annotation) => annotation,
            FeatureOutcome::Suppressed(reason) => panic!("unexpected suppression {reason:?}"),
        }
    }

    #[test]
    fn picks_intervals_from_resolution() {
        // Resolution 2 m/px: 0.1 km minor ticks, label every 1 km.
        let result = annotation(annotate_feature(&state_road(0.0, 2.0), &ctx(2.0)).unwrap());
        assert!((result.intervals.minor_interval_km - 0.1).abs() < f64::EPSILON);
        assert_eq!(result.ticks.len(), 20);
        let labels: Vec<&str> = result.ticks.iter().filter_map(|t| t.label.as_deref()).collect();
        assert_eq!(labels, vec!["0", "1"]);
    }

    #[test]
    fn right_carriageway_keeps_ticks_but_drops_labels() {
        let mut feature = state_road(0.0, 2.0);
        feature.carriageway = Carriageway::Right;
        let result = annotation(annotate_feature(&feature, &ctx(2.0)).unwrap());
        assert_eq!(result.ticks.len(), 20);
        assert_eq!(result.major_count(), 2);
        assert!(result.ticks.iter().all(|t| t.label.is_none()));
    }

    #[test]
    fn controlled_path_is_decluttered_when_zoomed_out() {
        let mut feature = state_road(0.0, 20.0);
        feature.network_type = NetworkType::MainRoadsControlledPath;
        assert_eq!(
            annotate_feature(&feature, &ctx(5.0)).unwrap(),
            FeatureOutcome::Suppressed(Suppression::Decluttered)
        );
        assert!(matches!(
            annotate_feature(&feature, &ctx(3.0)).unwrap(),
            FeatureOutcome::Annotated(_)
        ));

        feature.network_type = NetworkType::StateRoad;
        assert!(matches!(
            annotate_feature(&feature, &ctx(5.0)).unwrap(),
            FeatureOutcome::Annotated(_)
        ));
    }

    #[test]
    fn local_roads_are_not_on_the_tick_layer() {
        let mut feature = state_road(0.0, 1.0);
        feature.network_type = NetworkType::LocalRoad;
        assert_eq!(
            annotate_feature(&feature, &ctx(1.0)).unwrap(),
            FeatureOutcome::Suppressed(Suppression::NotOnTickLayer)
        );
    }

    #[test]
    fn hidden_tick_layer_suppresses_everything() {
        let mut context = ctx(1.0);
        context.settings.show_slk_ticks = false;
        assert_eq!(
            annotate_feature(&state_road(0.0, 1.0), &context).unwrap(),
            FeatureOutcome::Suppressed(Suppression::LayerHidden)
        );
        // Zoomed out past the tick layer's minimum zoom.
        assert_eq!(
            annotate_feature(&state_road(0.0, 1.0), &ctx(100.0)).unwrap(),
            FeatureOutcome::Suppressed(Suppression::LayerHidden)
        );
    }

    #[test]
    fn frame_skips_failures_and_continues() {
        let mut broken = state_road(0.0, 1.0);
        broken.vertices.clear();
        let features = vec![state_road(0.0, 1.0), broken, state_road(5.0, 6.0)];
        let frame = annotate_frame(&features, &ctx(2.0));

        assert_eq!(frame.annotated.len(), 2);
        assert_eq!(frame.annotated[0].index, 0);
        assert_eq!(frame.annotated[1].index, 2);
        assert_eq!(
            frame.skipped,
            vec![SkippedFeature {
                index: 1,
                error: AnnotateError::EmptyPolyline,
            }]
        );
        assert_eq!(frame.tick_count(), 20);
        assert!(frame.for_feature(1).is_none());
        assert!(frame.for_feature(2).is_some());
    }

    #[test]
    fn records_with_unknown_types_are_skipped() {
        let records: Vec<FeatureRecord> = serde_json::from_str(
            r#"[
                {"vertices": [[0, 100], [1000, 100]], "START_SLK": 0, "END_SLK": 1,
                 "NETWORK_TYPE": "State Road"},
                {"vertices": [[0, 100], [1000, 100]], "START_SLK": 0, "END_SLK": 1,
                 "NETWORK_TYPE": "Goat Track"},
                {"vertices": [[0, 100], [1000, 100]], "START_SLK": 0, "END_SLK": 1,
                 "NETWORK_TYPE": "Local Road"}
            ]"#,
        )
        .unwrap();
        let frame = annotate_records(&records, &ctx(2.0));
        assert_eq!(frame.annotated.len(), 1);
        assert_eq!(frame.suppressed, vec![(2, Suppression::NotOnTickLayer)]);
        assert_eq!(frame.skipped.len(), 1);
        assert_eq!(frame.skipped[0].index, 1);
        assert!(matches!(
            frame.skipped[0].error,
            AnnotateError::UnknownNetworkType(_)
        ));
    }

    #[test]
    fn frame_serializes_to_json() {
        let frame = annotate_frame(&[state_road(0.0, 2.0)], &ctx(2.0));
        let json = serde_json::to_string(&frame).unwrap();
        let back: FrameAnnotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }
}
