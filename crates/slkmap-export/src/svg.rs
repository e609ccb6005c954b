//! SVG export serializer.
//!
//! Draws a [`Scene`] with the [`svg`] crate: each road becomes a
//! `<path>` in its resolved style, each tick a `<line>` in the road
//! colour and each label a rotated `<text>` with a white halo so it
//! stays legible over other roads.
//!
//! Optional [`SvgMetadata`] embeds `<title>`, `<desc>` and the display
//! settings used, so exported files carry enough to reproduce them.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Group, Line, Path, Title};
use svg::node::{Node, Text, Value};

use slkmap_core::{Color, RoadStyle, Tick, Vector};

use crate::label::LabelPlacement;
use crate::scene::Scene;

/// Stroke width of tick marks, in pixels.
const TICK_STROKE_WIDTH: f64 = 1.0;

/// Label font size, in pixels.
const LABEL_FONT_SIZE: f64 = 16.0;

/// Width of the halo drawn behind label text, in pixels.
const LABEL_HALO_WIDTH: f64 = 3.0;

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped automatically
/// by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized display settings, emitted inside `<metadata>` in a
    /// namespaced `<slkmap:settings>` element.
    pub settings_json: Option<&'a str>,
}

/// Build an SVG path `d` attribute string from road vertices.
///
/// Uses `M` for the first vertex and `L` for the rest. Returns an empty
/// string for fewer than 2 vertices.
///
/// # Examples
///
/// ```
/// use slkmap_core::Vector;
/// use slkmap_export::build_path_data;
///
/// let d = build_path_data(&[Vector::new(10.0, 20.0), Vector::new(30.0, 40.0)]);
/// assert_eq!(d, "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(vertices: &[Vector]) -> String {
    let [first, rest @ ..] = vertices else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to((first.x, first.y));
    for v in rest {
        data = data.line_to((v.x, v.y));
    }
    String::from(Value::from(data))
}

/// Serialize a scene into an SVG document string.
///
/// The document is sized to the scene viewport. Roads are drawn first,
/// then ticks, then labels on top.
#[must_use]
pub fn to_svg(scene: &Scene, metadata: &SvgMetadata<'_>) -> String {
    let width = scene.viewport.width;
    let height = scene.viewport.height;
    let mut doc = Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0.0, 0.0, width, height));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }
    if let Some(settings_json) = metadata.settings_json {
        let mut settings_el = Element::new("slkmap:settings");
        settings_el.assign("xmlns:slkmap", "https://github.com/slkmap/slkmap/ns/1");
        settings_el.append(Text::new(settings_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(settings_el);
        doc = doc.add(metadata_el);
    }

    let mut roads = Group::new().set("id", "roads").set("fill", "none");
    let mut ticks = Group::new().set("id", "ticks");
    let mut labels = Group::new()
        .set("id", "labels")
        .set("font-family", "sans-serif")
        .set("font-size", LABEL_FONT_SIZE)
        .set("font-weight", "bold");

    for feature in &scene.features {
        if feature.road_visible {
            let d = build_path_data(&feature.feature.vertices);
            if !d.is_empty() {
                roads = roads.add(road_path(d, &feature.style));
            }
        }

        let color = feature.style.color;
        if let Some(annotation) = &feature.annotation {
            for tick in &annotation.ticks {
                ticks = ticks.add(tick_line(tick, color));
            }
        }
        for placement in feature.tick_labels() {
            labels = labels.add(label_text(&placement, color));
        }
        if let Some(placement) = &feature.road_label {
            labels = labels.add(label_text(placement, color));
        }
    }

    doc = doc.add(roads).add(ticks).add(labels);

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

fn road_path(d: String, style: &RoadStyle) -> Path {
    let mut path = Path::new()
        .set("d", d)
        .set("stroke", style.color.to_string())
        .set("stroke-width", round2(style.width))
        .set("stroke-linecap", "round")
        .set("stroke-linejoin", "round");
    if let Some([dash, gap]) = style.dash {
        path = path.set("stroke-dasharray", format!("{} {}", round2(dash), round2(gap)));
    }
    path
}

fn tick_line(tick: &Tick, color: Color) -> Line {
    let (a, b) = tick.segment;
    Line::new()
        .set("x1", round2(a.x))
        .set("y1", round2(a.y))
        .set("x2", round2(b.x))
        .set("y2", round2(b.y))
        .set("stroke", color.to_string())
        .set("stroke-width", TICK_STROKE_WIDTH)
}

fn label_text(placement: &LabelPlacement, color: Color) -> Element {
    let x = round2(placement.anchor.x);
    let y = round2(placement.anchor.y);
    let mut text = Element::new("text");
    text.assign("x", x);
    text.assign("y", y);
    text.assign("text-anchor", placement.align.svg_anchor());
    text.assign(
        "transform",
        format!("rotate({} {x} {y})", round2(placement.rotation_degrees())),
    );
    text.assign("fill", color.to_string());
    text.assign("stroke", "white");
    text.assign("stroke-width", LABEL_HALO_WIDTH);
    text.assign("paint-order", "stroke");
    text.append(Text::new(placement.text.as_str()));
    text
}

/// Round to hundredths of a pixel to keep the document compact.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
