//! The callback-dispatch HTTP contract: the wire shape a host web
//! framework exchanges with the bootstrap script
//! (`crate::hydration::BOOTSTRAP_SCRIPT_SOURCE`) when a rebound listener
//! fires a `rpc`/`user` action. This module defines the wire types and
//! path parsing only — it does not start a server, since that belongs to
//! the host application's own framework (axum, actix-web, ...), not to
//! this crate (§1, §6).
//!
//! Per §4.8/§6/§7: the request is `POST /summon/callback/{id}` with the
//! callback id carried in the URL path and **no request body** (the
//! server already knows the action a given id maps to — the client's job
//! is only to say *which* callback fired). The response is
//! `{"action":"reload"|"noop"|"error","status":"ok"|"missing"|...}`,
//! with the HTTP status code distinguishing a callback that ran (200), a
//! callback id the server has no record of (404), and a callback whose
//! body raised (500).

use serde::Serialize;

use crate::error::RenderError;

pub const CALLBACK_PATH_PREFIX: &str = "/summon/callback/";

/// Builds the dispatch URL path for `id` (what the bootstrap script
/// POSTs to).
pub fn callback_path(id: &str) -> String {
    format!("{CALLBACK_PATH_PREFIX}{id}")
}

/// Extracts the callback id from a request path, if it matches
/// `/summon/callback/{id}`. Rejects an empty id.
pub fn parse_callback_path(path: &str) -> Option<&str> {
    let id = path.strip_prefix(CALLBACK_PATH_PREFIX)?;
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// What happened when a dispatched callback was looked up and run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The callback ran and changed state the client cannot derive on
    /// its own; the client should reload to pick up the new render.
    Reload,
    /// The callback ran but the client needs no further action (the
    /// action already resolved purely client-side, or the server-side
    /// effect has nothing visible to refresh).
    Noop,
    /// No callback is registered under this id — it expired (the
    /// render that produced it is no longer the current one) or never
    /// existed.
    Missing,
    /// The callback's body raised. `message` is the panic/error message;
    /// callers decide whether to expose it to the client.
    Errored(String),
}

impl CallbackOutcome {
    /// The HTTP status code a host framework should respond with.
    pub fn http_status(&self) -> u16 {
        match self {
            CallbackOutcome::Reload | CallbackOutcome::Noop => 200,
            CallbackOutcome::Missing => 404,
            CallbackOutcome::Errored(_) => 500,
        }
    }

    pub fn to_response(&self) -> CallbackResponse {
        match self {
            CallbackOutcome::Reload => CallbackResponse {
                action: "reload",
                status: "ok".into(),
            },
            CallbackOutcome::Noop => CallbackResponse {
                action: "noop",
                status: "ok".into(),
            },
            CallbackOutcome::Missing => CallbackResponse {
                action: "error",
                status: "missing".into(),
            },
            CallbackOutcome::Errored(message) => CallbackResponse {
                action: "error",
                status: message.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CallbackResponse {
    pub action: &'static str,
    pub status: String,
}

pub fn serialize_callback_response(response: &CallbackResponse) -> Result<String, RenderError> {
    Ok(serde_json::to_string(response)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_id_out_of_the_path() {
        assert_eq!(parse_callback_path("/summon/callback/cb-0"), Some("cb-0"));
    }

    #[test]
    fn rejects_a_path_with_no_id() {
        assert_eq!(parse_callback_path("/summon/callback/"), None);
        assert_eq!(parse_callback_path("/other"), None);
    }

    #[test]
    fn reload_outcome_maps_to_200_and_reload_action() {
        let outcome = CallbackOutcome::Reload;
        assert_eq!(outcome.http_status(), 200);
        let response = outcome.to_response();
        assert_eq!(response.action, "reload");
        assert_eq!(response.status, "ok");
    }

    #[test]
    fn missing_outcome_maps_to_404() {
        let outcome = CallbackOutcome::Missing;
        assert_eq!(outcome.http_status(), 404);
        assert_eq!(outcome.to_response().status, "missing");
    }

    #[test]
    fn errored_outcome_maps_to_500() {
        let outcome = CallbackOutcome::Errored("boom".into());
        assert_eq!(outcome.http_status(), 500);
        let response = outcome.to_response();
        assert_eq!(response.action, "error");
        assert_eq!(response.status, "boom");
    }

    #[test]
    fn serializes_the_action_and_status_fields() {
        let json = serialize_callback_response(&CallbackOutcome::Noop.to_response()).unwrap();
        assert_eq!(json, r#"{"action":"noop","status":"ok"}"#);
    }
}
