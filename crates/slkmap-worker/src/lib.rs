//! WASM entry point for slkmap tick annotation.
//!
//! The map host calls into this module once per redraw with the current
//! resolution, viewport, settings and every visible road segment, and
//! draws the ticks that come back. Two ways in:
//!
//! - [`annotate`]: a plain synchronous function for the host's render
//!   callback. JSON string in, JSON string out.
//! - [`worker_main`]: a `Worker` message loop for hosts that annotate off
//!   the main thread. Requests carry a generation counter that is echoed
//!   back so stale responses can be dropped.
//!
//! Each frame is computed from scratch; nothing is kept between calls.

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use slkmap_core::{
    Clock, FeatureRecord, FrameAnnotation, FrameContext, FrameDiagnostics, RoadSettings,
    Viewport, annotate_frame_with_diagnostics,
};

/// One redraw's worth of input, as sent by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotateRequest {
    /// Map resolution in metres per pixel.
    pub resolution: f64,
    /// Visible pixel window.
    pub viewport: Viewport,
    /// Display settings; defaults apply when omitted.
    #[serde(default)]
    pub settings: RoadSettings,
    /// Visible road segments, projected into pixels.
    pub features: Vec<FeatureRecord>,
}

impl AnnotateRequest {
    fn context(&self) -> FrameContext {
        FrameContext {
            resolution: self.resolution,
            viewport: self.viewport,
            settings: self.settings.clone(),
        }
    }
}

/// Reply to an [`AnnotateRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotateResponse {
    /// The frame was annotated. Individual features may still have been
    /// skipped; see [`FrameAnnotation::skipped`].
    Success {
        /// Always `true`.
        ok: bool,
        /// Ticks per feature.
        frame: FrameAnnotation,
        /// Counts and timing.
        diagnostics: FrameDiagnostics,
    },
    /// The request itself could not be handled.
    Failure {
        /// Always `false`.
        ok: bool,
        /// What went wrong.
        error: String,
    },
}

/// Handle a JSON request, timing it with `clock`.
pub fn handle_request<C: Clock>(request_json: &str, clock: &C) -> AnnotateResponse {
    let request: AnnotateRequest = match serde_json::from_str(request_json) {
        Ok(request) => request,
        Err(e) => {
            return AnnotateResponse::Failure {
                ok: false,
                error: format!("failed to parse request: {e}"),
            };
        }
    };
    let (frame, diagnostics) =
        annotate_frame_with_diagnostics(&request.features, &request.context(), clock);
    AnnotateResponse::Success {
        ok: true,
        frame,
        diagnostics,
    }
}

fn response_json(response: &AnnotateResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        serde_json::json!({
            "ok": false,
            "error": format!("failed to serialize response: {e}"),
        })
        .to_string()
    })
}

/// [`Clock`] backed by `Date.now()` (millisecond resolution).
struct DateClock;

impl Clock for DateClock {
    type Instant = f64;

    fn now(&self) -> f64 {
        js_sys::Date::now()
    }

    fn elapsed(&self, since: &f64) -> std::time::Duration {
        let millis = (js_sys::Date::now() - since).max(0.0);
        std::time::Duration::try_from_secs_f64(millis / 1000.0).unwrap_or_default()
    }
}

/// Annotate one frame synchronously.
///
/// Takes a JSON-serialized [`AnnotateRequest`] and returns a
/// JSON-serialized [`AnnotateResponse`]: `{"ok": true, "frame": ...,
/// "diagnostics": ...}` or `{"ok": false, "error": "..."}`.
#[wasm_bindgen]
#[must_use]
pub fn annotate(request_json: &str) -> String {
    response_json(&handle_request(request_json, &DateClock))
}

/// Message protocol: the main thread sends a JS object with:
/// - `requestJson`: `String` containing a JSON-serialized [`AnnotateRequest`]
/// - `generation`: `f64` generation counter (passed through to response)
///
/// The worker responds with a JS object containing:
/// - `generation`: `f64` matching the request generation
/// - `ok`: `bool`
/// - `responseJson`: `String`, the JSON-serialized [`AnnotateResponse`]
///
/// # Worker entry point
///
/// Called automatically when the WASM module is instantiated. Outside a
/// `DedicatedWorkerGlobalScope` only the panic hook is installed, so the
/// same module can be loaded on the main thread for [`annotate`].
#[wasm_bindgen(start)]
pub fn worker_main() {
    console_error_panic_hook::set_once();

    let Ok(global) = js_sys::global().dyn_into::<web_sys::DedicatedWorkerGlobalScope>() else {
        return;
    };

    let onmessage =
        Closure::<dyn FnMut(web_sys::MessageEvent)>::new(move |event: web_sys::MessageEvent| {
            handle_message(&event);
        });
    global.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget(); // leak: lives for the worker lifetime
}

/// Handle an incoming message from the main thread.
fn handle_message(event: &web_sys::MessageEvent) {
    let data = event.data();

    let generation = js_sys::Reflect::get(&data, &JsValue::from_str("generation"))
        .ok()
        .and_then(|v| JsValue::as_f64(&v))
        .unwrap_or(0.0);
    let response = js_sys::Reflect::get(&data, &JsValue::from_str("requestJson"))
        .ok()
        .and_then(|v| JsValue::as_string(&v))
        .map_or_else(
            || AnnotateResponse::Failure {
                ok: false,
                error: "requestJson is missing or not a string".into(),
            },
            |json| handle_request(&json, &DateClock),
        );

    post_response(generation, &response);
}

/// Post a response back to the main thread.
fn post_response(generation: f64, response: &AnnotateResponse) {
    let ok = matches!(response, AnnotateResponse::Success { .. });
    let message = js_sys::Object::new();
    let set = |key: &str, val: &JsValue| {
        let _ = js_sys::Reflect::set(&message, &JsValue::from_str(key), val);
    };
    set("generation", &JsValue::from_f64(generation));
    set("ok", &JsValue::from_bool(ok));
    set("responseJson", &JsValue::from_str(&response_json(response)));

    if let Ok(global) = js_sys::global().dyn_into::<web_sys::DedicatedWorkerGlobalScope>() {
        let _ = global.post_message(&message);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use slkmap_core::NoClock;

    use super::*;

    const REQUEST: &str = r#"{
        "resolution": 2.0,
        "viewport": {"width": 1000, "height": 200},
        "features": [
            {"vertices": [[0, 100], [1000, 100]], "START_SLK": 0, "END_SLK": 1,
             "NETWORK_TYPE": "State Road"},
            {"vertices": [[0, 100]], "START_SLK": 0, "END_SLK": 1,
             "NETWORK_TYPE": "Goat Track"}
        ]
    }"#;

    #[test]
    fn annotates_a_request() {
        let AnnotateResponse::Success {
            ok,
            frame,
            diagnostics,
        } = handle_request(REQUEST, &NoClock)
        else {
            panic!("expected success");
        };
        assert!(ok);
        assert_eq!(frame.tick_count(), 10);
        assert_eq!(frame.skipped.len(), 1);
        assert_eq!(diagnostics.feature_count, 2);
    }

    #[test]
    fn settings_default_when_omitted() {
        let request: AnnotateRequest = serde_json::from_str(REQUEST).unwrap();
        assert_eq!(request.settings, RoadSettings::default());
    }

    #[test]
    fn bad_json_is_a_failure_response() {
        let response = handle_request("{not json", &NoClock);
        let json: serde_json::Value = serde_json::from_str(&response_json(&response)).unwrap();
        assert_eq!(json["ok"], false);
        assert!(
            json["error"]
                .as_str()
                .unwrap()
                .starts_with("failed to parse request")
        );
    }

    #[test]
    fn success_json_has_ok_and_frame() {
        let json: serde_json::Value =
            serde_json::from_str(&response_json(&handle_request(REQUEST, &NoClock))).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["frame"]["annotated"].as_array().unwrap().len(), 1);
        assert_eq!(json["diagnostics"]["tick_count"], 10);
    }
}
