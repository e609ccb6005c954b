//! slkmap-export: drawing backends for annotated frames (sans-IO).
//!
//! Turns road features and their chainage ticks into something a person
//! can look at: an SVG document with styled roads, tick marks and
//! upright labels, or a PNG preview of the strokes.

pub mod label;
pub mod raster;
pub mod scene;
pub mod svg;

pub use label::{LabelPlacement, TextAlign, place_label, place_road_label, upright};
pub use raster::{ExportError, render_pixmap, render_png};
pub use scene::{Scene, SceneFeature, SceneFile};
pub use self::svg::{SvgMetadata, build_path_data, to_svg};
