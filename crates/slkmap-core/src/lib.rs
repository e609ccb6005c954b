//! slkmap-core: straight-line-kilometre tick annotation for road maps (sans-IO).
//!
//! Given a road segment already projected into screen pixels, its
//! chainage at both ends and its classification, computes the short
//! perpendicular tick marks (and labels for major ticks) that show
//! real-world distance along the road:
//!
//! measure polyline -> pick intervals for the resolution -> walk the
//! line emitting ticks at absolute chainage multiples -> keep the ones
//! inside the viewport.
//!
//! Every call is a pure function of its inputs. Nothing is cached
//! between redraws, and drawing is left to the caller (see
//! `slkmap-export`).

pub mod annotate;
pub mod diagnostics;
pub mod direction;
pub mod feature;
pub mod log;
pub mod measure;
pub mod network;
pub mod policy;
pub mod settings;
pub mod style;
pub mod ticks;
pub mod types;
pub mod vector;

pub use annotate::{
    AnnotatedFeature, FeatureAnnotation, FeatureOutcome, FrameAnnotation, FrameContext,
    SkippedFeature, Suppression, annotate_feature, annotate_frame, annotate_records,
};
pub use diagnostics::{Clock, FrameDiagnostics, NoClock, annotate_frame_with_diagnostics};
pub use direction::direction_at;
pub use feature::{FeatureRecord, RoadFeature};
pub use measure::{MeasuredPoint, MeasuredPolyline, Segment, measure};
pub use network::{Carriageway, NetworkType};
pub use policy::{
    Layer, TickIntervals, annotation_intervals, road_label_text, tick_intervals_for_resolution,
    zoom_for_resolution,
};
pub use settings::RoadSettings;
pub use style::{Color, RoadStyle, resolve_style};
pub use ticks::{Tick, TickKind, TickRequest, generate_ticks};
pub use types::{AnnotateError, ChainageRange, Viewport};
pub use vector::Vector;
