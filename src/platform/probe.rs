use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, Window};

use crate::domain::HostSignals;

/// Snapshot the host signals the tier decision needs.
/// Anything the browser refuses to report stays `None`.
pub fn probe_signals(window: &Window, enabled: bool) -> HostSignals {
    let navigator = window.navigator();

    let reduced_motion = window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .map(|m| m.matches())
        .unwrap_or(false);

    let cores = navigator.hardware_concurrency();
    let logical_cores = (cores.is_finite() && cores > 0.0).then(|| cores as u32);

    let device_memory_gb = Reflect::get(&navigator, &JsValue::from_str("deviceMemory"))
        .ok()
        .and_then(|v| v.as_f64())
        .map(|v| v as f32);

    let effective_connection = Reflect::get(&navigator, &JsValue::from_str("connection"))
        .ok()
        .filter(|c| c.is_object())
        .and_then(|c| Reflect::get(&c, &JsValue::from_str("effectiveType")).ok())
        .and_then(|t| t.as_string());

    HostSignals {
        enabled,
        reduced_motion,
        gpu_context: has_webgl(window),
        logical_cores,
        device_memory_gb,
        effective_connection,
    }
}

/// Throwaway canvas; some browsers only fail at context creation
fn has_webgl(window: &Window) -> bool {
    let Some(document) = window.document() else {
        return false;
    };
    let Ok(canvas) = document
        .create_element("canvas")
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().map_err(JsValue::from))
    else {
        return false;
    };
    ["webgl2", "webgl", "experimental-webgl"]
        .iter()
        .any(|kind| matches!(canvas.get_context(kind), Ok(Some(_))))
}
