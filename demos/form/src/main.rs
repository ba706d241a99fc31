//! Renders a comment form: a `<form>` whose submit button gets
//! `type="submit"` injected automatically, and a preview of a
//! previously submitted (untrusted) comment run through the sanitizer
//! before being embedded as raw HTML.

use summon_html::{ActionDescriptor, Modifier, RenderError};
use summon_macros::composable;

const UNTRUSTED_COMMENT: &str =
    r#"<p>Nice post!</p><script>document.location='https://evil.example'</script>"#;

/// Builds the RPC payload for the submit button's `ServerRpc` action.
/// `#[composable]` contains a panic here (e.g. from a future validation
/// rule) at this call site instead of unwinding out through the whole
/// form render.
#[composable]
fn comment_payload(field: &str) -> serde_json::Value {
    serde_json::json!({ "field": field })
}

fn render_page() -> Result<String, RenderError> {
    let payload = comment_payload("body")?;
    summon_html::render_to_string(move |r| {
        r.push_head("<title>Leave a comment</title>");

        r.element("h2", &Modifier::new(), |r| {
            r.text("Previous comment");
            Ok(())
        })?;
        r.html(UNTRUSTED_COMMENT, true, &Modifier::new().class("comment-preview"));

        r.form(&Modifier::new().attr("id", "comment-form"), |r| {
            r.element("label", &Modifier::new().attr("for", "body"), |r| {
                r.text("Comment");
                Ok(())
            })?;
            r.void_element(
                "input",
                &Modifier::new()
                    .id("body")
                    .attr("name", "body")
                    .attr("type", "text"),
            );
            // no explicit `type` here: inside the form this becomes
            // `type="submit"` automatically.
            r.element(
                "button",
                &Modifier::new().on(
                    "click",
                    ActionDescriptor::ServerRpc {
                        endpoint: "/comments".into(),
                        payload: payload.clone(),
                        optimistic: None,
                    },
                ),
                |r| {
                    r.text("Post comment");
                    Ok(())
                },
            )
        })
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let html = render_page()?;
    println!("{html}");
    Ok(())
}
