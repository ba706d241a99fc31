//! The hydration packager (C8): serializes the callback-id → action
//! mapping produced during a render into a JSON marker script, and
//! supplies the bootstrap script that rebinds DOM listeners against it
//! without re-running any composable.
//!
//! Grounded on sycamore-web's hydration handshake (`hydrate_in_scope`
//! collecting every `[data-hk]` element into `HYDRATE_NODES` before
//! composables run again) — but inverted: `summon-html` never re-runs
//! composables on the client at all (§4.8 says hydration only rebinds
//! listeners), so there is no `HYDRATE_NODES` lookup table to build on
//! the client. Instead the server embeds the finished id→action map
//! directly as JSON, and the bootstrap script is a plain
//! `querySelectorAll('[data-summon-on-*]')` walk.

use crate::callback::CallbackEntry;
use crate::error::RenderError;

pub const HYDRATION_DATA_ELEMENT_ID: &str = "summon-hydration-data";
pub const BOOTSTRAP_SCRIPT_PATH: &str = "/__summon/bootstrap.js";

/// Renders the `<script type="application/json">` marker carrying the
/// callback table for this root render: a JSON object mapping each
/// callback id to its action descriptor (§4.8), e.g.
/// `{"cb-0":{"kind":"user","id":"cb-0"}}`, not an array of entries — the
/// bootstrap script looks actions up by id directly rather than
/// scanning. Insertion order (registration order, `cb-0..cb-N`) is
/// preserved in the serialized object since `serde_json`'s `Map` here is
/// backed by an order-preserving map (`preserve_order` feature) rather
/// than sorting keys alphabetically.
pub fn render_hydration_script(callbacks: &[CallbackEntry]) -> Result<String, RenderError> {
    let mut table = serde_json::Map::with_capacity(callbacks.len());
    for entry in callbacks {
        table.insert(entry.id.clone(), serde_json::to_value(&entry.action)?);
    }
    let json = serde_json::to_string(&table)?;
    Ok(format!(
        r#"<script type="application/json" id="{HYDRATION_DATA_ELEMENT_ID}">{json}</script>"#
    ))
}

/// Renders the `<script>` tag that loads the client bootstrap. Callers
/// typically `push_head` this (or append it at the end of `<body>`) so
/// it loads after the hydration data marker exists in the DOM.
pub fn bootstrap_script_tag() -> String {
    format!(r#"<script src="{BOOTSTRAP_SCRIPT_PATH}" defer></script>"#)
}

/// The bootstrap script's source. A real deployment serves this at
/// [`BOOTSTRAP_SCRIPT_PATH`]; it is kept here as a constant rather than
/// a separate asset pipeline because the spec explicitly scopes out
/// build tooling (§1) — this crate's job ends at handing the bytes back.
///
/// It reads the JSON marker once (an id → action-descriptor object, not
/// an array — see [`render_hydration_script`]), then for every element
/// carrying a `data-summon-on-<event>` attribute, attaches a listener
/// that resolves the action: `nav`/`toggle` resolve purely client-side,
/// `rpc`/`user` POST to the callback-dispatch endpoint
/// (`crate::http::callback_path`) with no request body, the id in the
/// URL path, and apply the `{action,status}` reply (`"reload"` triggers
/// `location.reload()`). No composable runs on the client; this is
/// strictly rebinding, not rehydration in the virtual-DOM-diffing sense.
pub const BOOTSTRAP_SCRIPT_SOURCE: &str = r#"(function () {
  var dataEl = document.getElementById("summon-hydration-data");
  if (!dataEl) return;
  var table;
  try {
    table = JSON.parse(dataEl.textContent || "{}");
  } catch (e) {
    return;
  }

  document.querySelectorAll("[data-summon-on-click]").forEach(function (el) {
    var id = el.getAttribute("data-summon-on-click");
    var action = table[id];
    if (!action) return;
    el.addEventListener("click", function (ev) {
      ev.preventDefault();
      dispatchSummonAction(id, action);
    });
  });

  function dispatchSummonAction(id, action) {
    if (action.kind === "nav") {
      window.location.href = action.url;
      return;
    }
    if (action.kind === "toggle") {
      var target = document.getElementById(action.targetId);
      if (target) target.hidden = !target.hidden;
      return;
    }
    fetch("/summon/callback/" + encodeURIComponent(id), { method: "POST" })
      .then(function (res) { return res.json(); })
      .then(function (reply) {
        if (reply.action === "reload") {
          window.location.reload();
        }
      });
  }
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::ActionDescriptor;

    #[test]
    fn script_embeds_valid_json() {
        let entries = vec![CallbackEntry {
            id: "cb-0".into(),
            event: "click".into(),
            action: ActionDescriptor::UserClosure { id: "cb-0".into() },
        }];
        let script = render_hydration_script(&entries).unwrap();
        assert!(script.starts_with(r#"<script type="application/json""#));
        assert!(script.contains(r#"{"cb-0":{"kind":"user","id":"cb-0"}}"#));
        assert!(script.ends_with("</script>"));
    }

    #[test]
    fn empty_callback_table_still_produces_valid_json() {
        let script = render_hydration_script(&[]).unwrap();
        assert!(script.contains("{}"));
    }

    #[test]
    fn marker_preserves_registration_order() {
        let entries = vec![
            CallbackEntry {
                id: "cb-0".into(),
                event: "click".into(),
                action: ActionDescriptor::Navigate { url: "/a".into() },
            },
            CallbackEntry {
                id: "cb-1".into(),
                event: "click".into(),
                action: ActionDescriptor::Navigate { url: "/b".into() },
            },
        ];
        let script = render_hydration_script(&entries).unwrap();
        let start = script.find("{\"cb-0\"").unwrap();
        let pos0 = start;
        let pos1 = script.find("\"cb-1\"").unwrap();
        assert!(pos0 < pos1, "cb-0 must appear before cb-1 in the marker");
    }
}
