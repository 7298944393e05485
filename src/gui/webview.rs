//! Wry webview child of the winit window.
//!
//! Creates a [`wry::WebView`] positioned at the right edge of the window,
//! loads the inline parameter panel, and bridges IPC between the page and
//! the native engine.

use std::sync::mpsc;

use wry::{dpi, Rect, WebView, WebViewBuilder};

use crate::controller::{PanelParams, SpraySnapshot};

/// Width of the parameter panel in physical pixels.
pub const PANEL_WIDTH: u32 = 260;

/// Actions sent from the panel page to the native engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    /// Spray › angle slider moved.
    SetAngle(f32),
    /// Spray › clear button pressed.
    Clear,
    /// Camera › z slider moved.
    SetCameraZ(f32),
    /// Show or hide the panel.
    TogglePanel,
}

/// Create the wry webview as a child of the given window.
///
/// Returns `(webview, action_rx)`; the receiver yields [`UiAction`]s
/// from the page.
pub fn create_webview<W: wry::raw_window_handle::HasWindowHandle>(
    window: &W,
    window_width: u32,
    window_height: u32,
) -> Result<(WebView, mpsc::Receiver<UiAction>), wry::Error> {
    let (tx, rx) = mpsc::channel();

    let webview = WebViewBuilder::new()
        .with_bounds(panel_bounds(window_width, window_height))
        .with_transparent(true)
        .with_initialization_script(BRIDGE_JS)
        .with_html(PANEL_HTML)
        .with_ipc_handler(move |req| {
            let body = req.body();
            match serde_json::from_str::<serde_json::Value>(body) {
                Ok(msg) => match parse_action(&msg) {
                    Some(action) => {
                        let _ = tx.send(action);
                    }
                    None => log::warn!("unrecognized panel message: {body}"),
                },
                Err(e) => log::warn!("malformed panel message: {e}"),
            }
        })
        .build_as_child(window)?;

    Ok((webview, rx))
}

/// Compute the [`Rect`] for the panel at the right edge of the window.
#[must_use]
pub fn panel_bounds(window_width: u32, window_height: u32) -> Rect {
    let x = window_width.saturating_sub(PANEL_WIDTH);
    Rect {
        position: dpi::Position::Physical(dpi::PhysicalPosition::new(
            x as i32, 0,
        )),
        size: dpi::Size::Physical(dpi::PhysicalSize::new(
            PANEL_WIDTH.min(window_width),
            window_height,
        )),
    }
}

/// Bounds that park the panel just past the right edge.
#[must_use]
pub fn hidden_bounds(window_width: u32, window_height: u32) -> Rect {
    Rect {
        position: dpi::Position::Physical(dpi::PhysicalPosition::new(
            window_width as i32,
            0,
        )),
        size: dpi::Size::Physical(dpi::PhysicalSize::new(
            PANEL_WIDTH,
            window_height,
        )),
    }
}

/// Push the slider schema and the current values (call once after
/// creation).
pub fn push_schema(webview: &WebView, params: &PanelParams) {
    let schema = schemars::schema_for!(PanelParams);
    match serde_json::to_string(&schema) {
        Ok(json) => eval_with_json(webview, "__nozzle_push_schema", &json),
        Err(e) => log::error!("panel schema serialization failed: {e}"),
    }
    push_state(webview, params, None);
}

/// Push current slider values, plus the spray summary when available.
pub fn push_state(
    webview: &WebView,
    params: &PanelParams,
    spray: Option<&SpraySnapshot>,
) {
    let state = serde_json::json!({ "params": params, "spray": spray });
    eval_with_json(webview, "__nozzle_push_state", &state.to_string());
}

fn eval_with_json(webview: &WebView, function: &str, json: &str) {
    let escaped = escape_js(json);
    if let Err(e) =
        webview.evaluate_script(&format!("window.{function}('{escaped}')"))
    {
        log::warn!("{function} failed: {e}");
    }
}

/// Escape a string for a single-quoted JS literal.
fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

// ── Internals ────────────────────────────────────────────────────────────

/// JavaScript injected before page load. Defines the push functions the
/// native side calls and dispatches `CustomEvent`s to the page.
///
/// Pushes that arrive before the page registered its listeners are
/// buffered and replayed when a listener attaches.
const BRIDGE_JS: &str = r#"
(function() {
    var pending = { schema: null, state: null };

    function dispatch(name, json) {
        window.dispatchEvent(new CustomEvent(name, { detail: json }));
    }

    window.__nozzle_push_schema = function(json) {
        pending.schema = json;
        dispatch('nozzle-schema', json);
    };
    window.__nozzle_push_state = function(json) {
        pending.state = json;
        dispatch('nozzle-state', json);
    };
    window.__nozzle_send = function(msg) {
        window.ipc.postMessage(JSON.stringify(msg));
    };

    var origAdd = EventTarget.prototype.addEventListener;
    EventTarget.prototype.addEventListener = function(type, fn, opts) {
        origAdd.call(this, type, fn, opts);
        if (this === window && type === 'nozzle-schema' && pending.schema) {
            dispatch('nozzle-schema', pending.schema);
        }
        if (this === window && type === 'nozzle-state' && pending.state) {
            dispatch('nozzle-state', pending.state);
        }
    };
})();
"#;

/// Panel page: a "Spray" folder (angle slider, clear button) and a
/// "Camera" folder (z slider). Slider ranges come from the pushed schema.
const PANEL_HTML: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<style>
  body { margin: 0; font: 12px sans-serif; color: #ddd; background: rgba(26, 26, 26, 0.9); }
  details { border-bottom: 1px solid #333; }
  summary { padding: 6px 8px; cursor: pointer; background: #222; font-weight: bold; }
  .row { display: flex; align-items: center; gap: 6px; padding: 4px 8px; }
  .row label { width: 44px; }
  .row input[type=range] { flex: 1; }
  .row output { width: 36px; text-align: right; }
  button { flex: 1; background: #333; color: #ddd; border: 1px solid #444; padding: 4px; }
  #status { padding: 4px 8px; color: #888; }
</style>
</head>
<body>
  <details open>
    <summary>Spray</summary>
    <div class="row" data-field="angle" data-action="set_angle"></div>
    <div class="row"><button id="clear">clear</button></div>
    <div id="status"></div>
  </details>
  <details open>
    <summary>Camera</summary>
    <div class="row" data-field="camera_z" data-action="set_camera_z"></div>
  </details>
<script>
  var inputs = {};

  function buildSlider(row, prop) {
    var label = document.createElement('label');
    label.textContent = prop.title || row.dataset.field;
    var input = document.createElement('input');
    input.type = 'range';
    input.min = prop.minimum;
    input.max = prop.maximum;
    input.step = prop.step;
    var out = document.createElement('output');
    input.addEventListener('input', function() {
      out.textContent = input.value;
      window.__nozzle_send({ action: row.dataset.action, value: parseFloat(input.value) });
    });
    row.replaceChildren(label, input, out);
    inputs[row.dataset.field] = { input: input, out: out };
  }

  window.addEventListener('nozzle-schema', function(e) {
    var schema = JSON.parse(e.detail);
    document.querySelectorAll('[data-field]').forEach(function(row) {
      var prop = schema.properties[row.dataset.field];
      if (prop) { buildSlider(row, prop); }
    });
  });

  window.addEventListener('nozzle-state', function(e) {
    var state = JSON.parse(e.detail);
    Object.keys(state.params).forEach(function(field) {
      var slot = inputs[field];
      if (slot && document.activeElement !== slot.input) {
        slot.input.value = state.params[field];
        slot.out.textContent = slot.input.value;
      }
    });
    if (state.spray) {
      document.getElementById('status').textContent =
        state.spray.visible + ' shown, ' + state.spray.hidden + ' hidden';
    }
  });

  document.getElementById('clear').addEventListener('click', function() {
    window.__nozzle_send({ action: 'clear' });
  });

  window.addEventListener('keydown', function(e) {
    if (e.key === 'Escape') { window.__nozzle_send({ action: 'toggle_panel' }); }
  });
</script>
</body>
</html>
"#;

/// Parse an IPC message from the panel into a [`UiAction`].
fn parse_action(msg: &serde_json::Value) -> Option<UiAction> {
    let action = msg.get("action")?.as_str()?;
    let value = || msg.get("value")?.as_f64().map(|v| v as f32);
    match action {
        "set_angle" => Some(UiAction::SetAngle(value()?)),
        "clear" => Some(UiAction::Clear),
        "set_camera_z" => Some(UiAction::SetCameraZ(value()?)),
        "toggle_panel" => Some(UiAction::TogglePanel),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_known_actions() {
        assert_eq!(
            parse_action(&json!({"action": "set_angle", "value": 12.5})),
            Some(UiAction::SetAngle(12.5))
        );
        assert_eq!(
            parse_action(&json!({"action": "clear"})),
            Some(UiAction::Clear)
        );
        assert_eq!(
            parse_action(&json!({"action": "set_camera_z", "value": 3})),
            Some(UiAction::SetCameraZ(3.0))
        );
        assert_eq!(
            parse_action(&json!({"action": "toggle_panel"})),
            Some(UiAction::TogglePanel)
        );
    }

    #[test]
    fn rejects_malformed_actions() {
        assert_eq!(parse_action(&json!({"action": "set_angle"})), None);
        assert_eq!(
            parse_action(&json!({"action": "set_angle", "value": "x"})),
            None
        );
        assert_eq!(parse_action(&json!({"action": "explode"})), None);
        assert_eq!(parse_action(&json!({"value": 1.0})), None);
    }

    #[test]
    fn bounds_hug_right_edge() {
        let rect = panel_bounds(1000, 600);
        assert_eq!(
            rect.position,
            dpi::Position::Physical(dpi::PhysicalPosition::new(740, 0))
        );
        let narrow = panel_bounds(100, 600);
        assert_eq!(
            narrow.size,
            dpi::Size::Physical(dpi::PhysicalSize::new(100, 600))
        );
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape_js(r#"{"a":"it's \n"}"#), r#"{"a":"it\'s \\n"}"#);
    }
}
