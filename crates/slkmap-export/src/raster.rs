//! PNG preview rendering via tiny-skia.
//!
//! Roads and ticks are stroked anti-aliased onto a white canvas.
//! `tiny-skia` has no text support, so labels are left to the SVG
//! output.

use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

use slkmap_core::{Color, RoadStyle, Vector};

use crate::scene::Scene;

/// Stroke width of tick marks, in pixels before scaling.
const TICK_STROKE_WIDTH: f32 = 1.0;

/// Errors from rasterising a scene.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The scale factor is not a positive finite number.
    #[error("invalid raster scale {0}")]
    InvalidScale(f64),

    /// The scaled canvas has a zero or unrepresentable size.
    #[error("cannot allocate a {width}x{height} canvas")]
    InvalidCanvas {
        /// Requested width in pixels.
        width: f64,
        /// Requested height in pixels.
        height: f64,
    },

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Render a scene to PNG bytes at `scale` output pixels per scene pixel.
///
/// # Errors
///
/// Returns [`ExportError::InvalidScale`] for a non-positive or
/// non-finite scale, [`ExportError::InvalidCanvas`] if the scaled
/// viewport is empty or too large, and [`ExportError::Encode`] if PNG
/// encoding fails.
pub fn render_png(scene: &Scene, scale: f64) -> Result<Vec<u8>, ExportError> {
    let pixmap = render_pixmap(scene, scale)?;
    pixmap
        .encode_png()
        .map_err(|e| ExportError::Encode(e.to_string()))
}

/// Render a scene into a pixmap at `scale` output pixels per scene pixel.
///
/// # Errors
///
/// See [`render_png`].
#[allow(clippy::cast_possible_truncation)]
pub fn render_pixmap(scene: &Scene, scale: f64) -> Result<Pixmap, ExportError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(ExportError::InvalidScale(scale));
    }
    let width = (scene.viewport.width * scale).ceil();
    let height = (scene.viewport.height * scale).ceil();
    let invalid = || ExportError::InvalidCanvas { width, height };
    let mut pixmap = Pixmap::new(
        canvas_dimension(width).ok_or_else(invalid)?,
        canvas_dimension(height).ok_or_else(invalid)?,
    )
    .ok_or_else(invalid)?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let transform = Transform::from_scale(scale as f32, scale as f32);

    for feature in &scene.features {
        if feature.road_visible {
            stroke_polyline(&mut pixmap, &feature.feature.vertices, &feature.style, transform);
        }

        let Some(annotation) = &feature.annotation else {
            continue;
        };
        let tick_style = RoadStyle {
            width: f64::from(TICK_STROKE_WIDTH),
            dash: None,
            ..feature.style
        };
        for tick in &annotation.ticks {
            let (a, b) = tick.segment;
            stroke_polyline(&mut pixmap, &[a, b], &tick_style, transform);
        }
    }

    Ok(pixmap)
}

#[allow(clippy::cast_possible_truncation)]
fn stroke_polyline(
    pixmap: &mut Pixmap,
    vertices: &[Vector],
    style: &RoadStyle,
    transform: Transform,
) {
    let [first, rest @ ..] = vertices else {
        return;
    };
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for v in rest {
        pb.line_to(v.x as f32, v.y as f32);
    }
    let Some(path) = pb.finish() else {
        // Single vertex or non-finite coordinates: nothing to draw.
        return;
    };

    let stroke = Stroke {
        width: style.width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        dash: style
            .dash
            .and_then(|[dash, gap]| StrokeDash::new(vec![dash as f32, gap as f32], 0.0)),
        ..Stroke::default()
    };

    pixmap.stroke_path(&path, &paint(style.color), &stroke, transform, None);
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.alpha_u8());
    paint.anti_alias = true;
    paint
}

/// Whole-pixel canvas side, or `None` if it cannot be allocated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn canvas_dimension(value: f64) -> Option<u32> {
    (value >= 1.0 && value <= f64::from(u32::MAX)).then(|| value as u32)
}
