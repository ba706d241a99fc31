//! The callback registry (C7) and the action-descriptor sum type (§4.8)
//! it hands out ids for.
//!
//! Every element-level event registered through
//! [`crate::modifier::Modifier::on`] gets a monotonically increasing id
//! (`cb-0`, `cb-1`, ...) scoped to one root render. The registry is
//! cleared at the start of every root render (not merely appended to),
//! so ids are never reused *within* a render's lifetime but also never
//! accumulate *across* renders of the same root — each render of a root
//! produces a self-contained `cb-0..cb-N` space that the hydration
//! payload (§4.8) serializes alongside the markup that references it.

use serde::{Deserialize, Serialize};

/// What happens when a registered callback fires, as a closed sum type
/// instead of an opaque closure — this is what gets serialized into the
/// hydration payload and sent back across the callback-dispatch HTTP
/// contract (`crate::http`).
///
/// Tagged by `"kind"`, with the short wire values `"nav"`/`"rpc"`/
/// `"toggle"`/`"user"` (§4.8) rather than the variant's own Rust name —
/// the hydration payload is read by a small vanilla-JS bootstrap, not by
/// another Rust process, so the wire shape is kept terse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ActionDescriptor {
    #[serde(rename = "toggle")]
    ToggleVisibility {
        #[serde(rename = "targetId")]
        target_id: String,
    },
    #[serde(rename = "rpc")]
    ServerRpc {
        endpoint: String,
        payload: serde_json::Value,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        optimistic: Option<serde_json::Value>,
    },
    #[serde(rename = "nav")]
    Navigate { url: String },
    #[serde(rename = "user")]
    UserClosure { id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackEntry {
    pub id: String,
    pub event: String,
    pub action: ActionDescriptor,
}

/// Hands out callback ids for a single root render and remembers which
/// action each id maps to, so the hydration packager can serialize the
/// whole table once the render finishes.
#[derive(Default)]
pub struct CallbackRegistry {
    next_id: u64,
    entries: Vec<CallbackEntry>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `action` for `event` and returns its id (`cb-0`,
    /// `cb-1`, ...).
    pub fn register(&mut self, event: impl Into<String>, action: ActionDescriptor) -> String {
        let id = format!("cb-{}", self.next_id);
        self.next_id += 1;
        self.entries.push(CallbackEntry {
            id: id.clone(),
            event: event.into(),
            action,
        });
        id
    }

    pub fn entries(&self) -> &[CallbackEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resets the registry to a fresh, empty state with id allocation
    /// restarting at `cb-0`. Must be called once per root render, after
    /// the previous render's hydration payload (if any) has already
    /// been packaged — callbacks never survive across root renders.
    pub fn clear(&mut self) {
        self.next_id = 0;
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_within_a_render() {
        let mut reg = CallbackRegistry::new();
        let a = reg.register("click", ActionDescriptor::Navigate { url: "/a".into() });
        let b = reg.register("click", ActionDescriptor::Navigate { url: "/b".into() });
        assert_eq!(a, "cb-0");
        assert_eq!(b, "cb-1");
    }

    #[test]
    fn clear_resets_the_id_space_for_the_next_root() {
        let mut reg = CallbackRegistry::new();
        reg.register("click", ActionDescriptor::Navigate { url: "/a".into() });
        reg.clear();
        assert!(reg.is_empty());
        let id = reg.register("click", ActionDescriptor::Navigate { url: "/b".into() });
        assert_eq!(id, "cb-0");
    }

    #[test]
    fn action_descriptor_round_trips_through_json() {
        let action = ActionDescriptor::ServerRpc {
            endpoint: "/api/like".into(),
            payload: serde_json::json!({"postId": 42}),
            optimistic: None,
        };
        let json = serde_json::to_string(&action).unwrap();
        let back: ActionDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }

    #[test]
    fn action_descriptor_uses_the_spec_wire_shape() {
        let action = ActionDescriptor::UserClosure { id: "cb-0".into() };
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"kind":"user","id":"cb-0"}"#);

        let toggle = ActionDescriptor::ToggleVisibility { target_id: "panel".into() };
        let json = serde_json::to_string(&toggle).unwrap();
        assert_eq!(json, r#"{"kind":"toggle","targetId":"panel"}"#);
    }
}
