//! The HTML platform renderer (C6): an append-only buffer renderer that
//! walks composables and emits markup, tracking just enough ambient
//! state — the form-scope, the deferred `<head>` buffer, the callback
//! registry — to implement §4.6 without ever building an intermediate
//! node tree.
//!
//! There is no GPU analogue to borrow structurally here (the teacher's
//! render path walks a `View` tree it already built and owns), so the
//! append-only-buffer shape is grounded on how `ssr::render_recursive`
//! in sycamore-web writes directly into a `String` as it visits nodes,
//! adapted so that *we* are the thing invoking composables (there is no
//! pre-built tree to walk) and so an element's children are produced by
//! a plain Rust closure rather than a materialized `Vec<View>`.

use crate::callback::{ActionDescriptor, CallbackRegistry};
use crate::error::RenderError;
use crate::escape::{escape_attr, escape_text};
use crate::modifier::Modifier;
use crate::sanitize::sanitize_html;

/// Whether the renderer is currently inside a `<form>` element. Plain
/// buttons render `type="button"` outside a form (clicking them must
/// never submit a form they are not part of) and `type="submit"` inside
/// one, unless the caller set an explicit `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormScope {
    OutsideForm,
    InsideForm,
}

/// The renderer's running state for one root render.
pub struct Renderer {
    body: String,
    head: String,
    form_scope: FormScope,
    callbacks: CallbackRegistry,
    debug_errors: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            body: String::new(),
            head: String::new(),
            form_scope: FormScope::OutsideForm,
            callbacks: CallbackRegistry::new(),
            debug_errors: false,
        }
    }

    /// When set, a fallback element emitted for an aborted scope (§4.3,
    /// §7) carries the panic message in its `data-summon-error`
    /// attribute. Off by default: a production render should not leak
    /// panic messages, which may echo internal state, into client markup.
    pub fn set_debug_errors(&mut self, debug_errors: bool) {
        self.debug_errors = debug_errors;
    }

    pub fn form_scope(&self) -> FormScope {
        self.form_scope
    }

    /// Appends pre-escaped, self-closing-safe markup straight to the
    /// body buffer. Internal helper; composables should go through
    /// [`Renderer::element`]/[`Renderer::text`].
    fn write_raw(&mut self, s: &str) {
        self.body.push_str(s);
    }

    /// Writes escaped text content.
    pub fn text(&mut self, content: &str) {
        self.body.push_str(&escape_text(content));
    }

    /// `render_raw_html` (§4.6): writes `content` verbatim — never
    /// sanitized, never wrapped. For content the application fully
    /// trusts (an inline `<script>`, a server-generated SVG/shader
    /// payload), never for untrusted input; use [`Renderer::html`] for
    /// that.
    pub fn raw_html(&mut self, content: &str) {
        self.body.push_str(content);
    }

    /// `render_html` (§4.6): wraps `content` in a `<div>` carrying
    /// `modifier`'s classes/styles/attrs, running it through the
    /// sanitizer first when `sanitize` is true. Use this for markup the
    /// application does not fully control (e.g. user-submitted rich
    /// text); pass `sanitize: false` for trusted content that still
    /// wants the wrapping `<div>`.
    pub fn html(&mut self, content: &str, sanitize: bool, modifier: &Modifier) {
        self.open_tag("div", modifier);
        if sanitize {
            self.body.push_str(&sanitize_html(content));
        } else {
            self.body.push_str(content);
        }
        self.close_tag("div");
    }

    /// Queues `content` for the document's `<head>`. May be called from
    /// anywhere in the tree, at any depth, since the real `<head>`
    /// position is only known once the whole render finishes; see
    /// [`Renderer::finish`].
    pub fn push_head(&mut self, content: &str) {
        self.head.push_str(content);
    }

    /// Renders one element: opening tag (with classes/styles/attrs/
    /// event hooks from `modifier`), `children`, closing tag. `children`
    /// runs inside its own composer scope (see
    /// [`Renderer::run_contained`]), so a panic inside it aborts only
    /// this element's content — the tag still closes and the parent
    /// keeps rendering.
    pub fn element(
        &mut self,
        tag: &str,
        modifier: &Modifier,
        children: impl FnOnce(&mut Renderer) -> Result<(), RenderError>,
    ) -> Result<(), RenderError> {
        self.open_tag(tag, modifier);
        self.run_contained(children)?;
        self.close_tag(tag);
        Ok(())
    }

    /// Runs `children` inside a freshly minted child composer scope,
    /// containing a panic as a scope abort (§4.3, §7, §9) rather than
    /// letting it unwind past this element: effects registered in the
    /// aborted subtree are never committed (the child scope is disposed
    /// along with everything above it at the end of the render), a
    /// `<div data-summon-error>` fallback is written in its place, and
    /// the parent keeps rendering. Outside any composer scope (e.g. a
    /// renderer unit test building elements directly with no SSR root
    /// behind it), there is nothing to scope a containment boundary to,
    /// so `children` just runs directly and a panic is the caller's
    /// problem, as it always was before this method existed.
    fn run_contained(
        &mut self,
        children: impl FnOnce(&mut Renderer) -> Result<(), RenderError>,
    ) -> Result<(), RenderError> {
        match summon_core::current_scope() {
            Some(scope) => {
                let child = scope.child();
                match summon_core::compose(&child, || children(self)) {
                    Ok(inner) => inner,
                    Err(summon_core::ScopeAbort::Panicked(message)) => {
                        self.write_error_fallback(&message);
                        Ok(())
                    }
                }
            }
            None => children(self),
        }
    }

    fn write_error_fallback(&mut self, message: &str) {
        if self.debug_errors {
            self.write_raw("<div data-summon-error=\"");
            self.write_raw(&escape_attr(message));
            self.write_raw("\"></div>");
        } else {
            self.write_raw("<div data-summon-error></div>");
        }
    }

    /// Renders a void element (`<br>`, `<img>`, ...) with no children
    /// and no closing tag.
    pub fn void_element(&mut self, tag: &str, modifier: &Modifier) {
        self.open_tag_inner(tag, modifier, true);
    }

    fn open_tag(&mut self, tag: &str, modifier: &Modifier) {
        self.open_tag_inner(tag, modifier, false);
    }

    fn open_tag_inner(&mut self, tag: &str, modifier: &Modifier, self_closing: bool) {
        self.write_raw("<");
        self.write_raw(tag);

        if !modifier.classes().is_empty() {
            self.write_raw(" class=\"");
            self.write_raw(&escape_attr(&modifier.classes().join(" ")));
            self.write_raw("\"");
        }

        if !modifier.styles().is_empty() {
            let style_value = modifier
                .styles()
                .iter()
                .map(|(k, v)| format!("{k}: {v};"))
                .collect::<Vec<_>>()
                .join(" ");
            self.write_raw(" style=\"");
            self.write_raw(&escape_attr(&style_value));
            self.write_raw("\"");
        }

        let has_explicit_type = modifier.attrs().iter().any(|(k, _)| k == "type");
        for (name, value) in modifier.attrs() {
            self.write_raw(" ");
            self.write_raw(name);
            self.write_raw("=\"");
            self.write_raw(&escape_attr(value));
            self.write_raw("\"");
        }

        if tag.eq_ignore_ascii_case("button") && !has_explicit_type {
            let ty = match self.form_scope {
                FormScope::InsideForm => "submit",
                FormScope::OutsideForm => "button",
            };
            self.write_raw(" type=\"");
            self.write_raw(ty);
            self.write_raw("\"");
        }

        for (event, action) in modifier.events() {
            let id = self.callbacks.register(event.clone(), action.clone());
            self.write_raw(&format!(" data-summon-on-{event}=\"{id}\""));
        }

        if self_closing {
            self.write_raw(" />");
        } else {
            self.write_raw(">");
        }
    }

    fn close_tag(&mut self, tag: &str) {
        self.write_raw("</");
        self.write_raw(tag);
        self.write_raw(">");
    }

    /// Renders a `<form>` element. Returns [`RenderError::NestedForm`]
    /// without writing anything if already inside another form — nested
    /// forms have no well-defined submission target and most browsers
    /// silently break them.
    pub fn form(
        &mut self,
        modifier: &Modifier,
        children: impl FnOnce(&mut Renderer) -> Result<(), RenderError>,
    ) -> Result<(), RenderError> {
        if self.form_scope == FormScope::InsideForm {
            return Err(RenderError::NestedForm);
        }
        self.open_tag("form", modifier);
        let previous = self.form_scope;
        self.form_scope = FormScope::InsideForm;
        let result = self.run_contained(children);
        self.form_scope = previous;
        self.close_tag("form");
        result
    }

    pub fn callback_entries(&self) -> &[crate::callback::CallbackEntry] {
        self.callbacks.entries()
    }

    /// Registers a standalone action not tied to an element-level
    /// `Modifier::on` (e.g. a navigation link's `href`-style action
    /// resolved purely client-side). Exposed for callers assembling
    /// hydration payloads directly.
    pub fn register_action(&mut self, event: impl Into<String>, action: ActionDescriptor) -> String {
        self.callbacks.register(event, action)
    }

    /// Consumes the renderer, returning the finished body markup and
    /// the accumulated head markup separately. The caller (an SSR entry
    /// point) is responsible for splicing `head` into an actual
    /// `<head>` element and clearing the callback registry for the next
    /// root render — this renderer is single-use.
    pub fn finish(self) -> RenderedOutput {
        RenderedOutput {
            body: self.body,
            head: self.head,
            callbacks: self.callbacks,
        }
    }
}

pub struct RenderedOutput {
    pub body: String,
    pub head: String,
    pub callbacks: CallbackRegistry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_outside_form_gets_type_button() {
        let mut r = Renderer::new();
        r.element("button", &Modifier::new(), |r| {
            r.text("go");
            Ok(())
        })
        .unwrap();
        let out = r.finish();
        assert!(out.body.contains(r#"type="button""#));
    }

    #[test]
    fn button_inside_form_gets_type_submit() {
        let mut r = Renderer::new();
        r.form(&Modifier::new(), |r| {
            r.element("button", &Modifier::new(), |r| {
                r.text("save");
                Ok(())
            })
        })
        .unwrap();
        let out = r.finish();
        assert!(out.body.contains(r#"type="submit""#));
    }

    #[test]
    fn explicit_type_is_not_overridden() {
        let mut r = Renderer::new();
        r.form(&Modifier::new(), |r| {
            r.element("button", &Modifier::new().attr("type", "button"), |r| {
                r.text("cancel");
                Ok(())
            })
        })
        .unwrap();
        let out = r.finish();
        assert!(out.body.contains(r#"type="button""#));
        assert!(!out.body.contains(r#"type="submit""#));
    }

    #[test]
    fn nested_form_is_rejected() {
        let mut r = Renderer::new();
        let result = r.form(&Modifier::new(), |r| {
            r.form(&Modifier::new(), |_| Ok(()))
        });
        assert!(matches!(result, Err(RenderError::NestedForm)));
    }

    #[test]
    fn text_is_escaped() {
        let mut r = Renderer::new();
        r.text("<b>hi</b> & bye");
        let out = r.finish();
        assert_eq!(out.body, "&lt;b&gt;hi&lt;/b&gt; &amp; bye");
    }

    #[test]
    fn head_is_accumulated_separately_from_body() {
        let mut r = Renderer::new();
        r.push_head("<title>A</title>");
        r.text("body content");
        r.push_head("<meta name=\"x\">");
        let out = r.finish();
        assert_eq!(out.head, "<title>A</title><meta name=\"x\">");
        assert_eq!(out.body, "body content");
    }

    #[test]
    fn events_register_callbacks_and_emit_hook_attributes() {
        let mut r = Renderer::new();
        r.element(
            "button",
            &Modifier::new().on("click", ActionDescriptor::Navigate { url: "/x".into() }),
            |r| {
                r.text("go");
                Ok(())
            },
        )
        .unwrap();
        let out = r.finish();
        assert_eq!(out.callbacks.entries().len(), 1);
        assert!(out.body.contains("data-summon-on-click=\"cb-0\""));
    }

    #[test]
    fn raw_html_is_never_sanitized_or_wrapped() {
        let mut r = Renderer::new();
        r.raw_html("<script>ok()</script>");
        let out = r.finish();
        assert_eq!(out.body, "<script>ok()</script>");
    }

    #[test]
    fn html_wraps_in_a_div_and_sanitizes_when_asked() {
        let mut r = Renderer::new();
        r.html(
            "<p>hi</p><script>evil()</script>",
            true,
            &Modifier::new().class("preview"),
        );
        let out = r.finish();
        assert!(out.body.starts_with(r#"<div class="preview">"#));
        assert!(out.body.contains("<p>hi</p>"));
        assert!(!out.body.contains("<script>"));
        assert!(out.body.ends_with("</div>"));
    }

    #[test]
    fn html_skips_sanitizing_when_asked_to_trust_the_content() {
        let mut r = Renderer::new();
        r.html("<b>trusted</b>", false, &Modifier::new());
        let out = r.finish();
        assert_eq!(out.body, "<div><b>trusted</b></div>");
    }

    #[test]
    fn a_panicking_child_is_contained_and_the_parent_keeps_rendering() {
        use summon_core::scope::Scope;

        let root = Scope::new();
        let mut r = Renderer::new();
        let result = summon_core::compose(&root, || {
            r.element("div", &Modifier::new(), |r| {
                r.element("span", &Modifier::new(), |_| panic!("boom"))?;
                r.text("sibling survives");
                Ok(())
            })
        });
        assert!(result.is_ok(), "the outer composition itself must not abort");
        let out = r.finish();
        assert!(out.body.contains("data-summon-error"));
        assert!(out.body.contains("sibling survives"));
        assert!(!out.body.contains("boom"));
    }

    #[test]
    fn debug_errors_embeds_the_panic_message() {
        use summon_core::scope::Scope;

        let root = Scope::new();
        let mut r = Renderer::new();
        r.set_debug_errors(true);
        summon_core::compose(&root, || {
            r.element("div", &Modifier::new(), |_| panic!("kaboom"))
        })
        .unwrap();
        let out = r.finish();
        assert!(out.body.contains(r#"data-summon-error="kaboom""#));
    }
}
