//! The HTML `Modifier`: an ordered set of classes, inline style
//! declarations, plain attributes and event registrations attached to
//! one element.
//!
//! Grounded on `modifier.rs`'s builder-method style (`padding`, `size`,
//! `background`, `on_pointer_down`, ...) — each call returns `Self` so
//! call sites read as a chain — generalized from GPU layout/paint
//! properties to HTML's own three attachment points: a `style`
//! attribute, a flat attribute map, and `on_*` event bindings that the
//! callback registry (§4.7) turns into `data-` hook attributes rather
//! than inline `onclick="..."` (which the sanitizer would strip anyway).
//!
//! Insertion order is preserved everywhere (`Vec`, not `HashMap`) because
//! the renderer must produce byte-identical output for byte-identical
//! input (§8, "positional stability").

use crate::callback::ActionDescriptor;

/// camelCase → kebab-case, leaving any name that already contains a `-`
/// untouched (§4.6).
fn normalize_style_property(name: &str) -> String {
    if name.contains('-') {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[derive(Clone, Debug, Default)]
pub struct Modifier {
    classes: Vec<String>,
    styles: Vec<(String, String)>,
    attrs: Vec<(String, String)>,
    events: Vec<(String, ActionDescriptor)>,
}

impl Modifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, name: impl Into<String>) -> Self {
        self.classes.push(name.into());
        self
    }

    /// Sets a style property (§4.6). The property name is normalized to
    /// kebab-case when it arrives in camelCase and does not already
    /// contain a `-` (`backgroundColor` → `background-color`;
    /// `background-color` is left alone). Setting the same (normalized)
    /// property twice overrides the earlier value in place rather than
    /// emitting a duplicate declaration — the property keeps its
    /// original position in the style attribute's insertion order.
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        let key = normalize_style_property(&property.into());
        let value = value.into();
        if let Some(existing) = self.styles.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = value;
        } else {
            self.styles.push((key, value));
        }
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Registers `action` to run when `event` (e.g. `"click"`,
    /// `"input"`) fires on this element. The renderer assigns the
    /// callback its id at render time (§4.7) and emits a
    /// `data-summon-on-<event>` hook attribute instead of an inline
    /// handler.
    pub fn on(mut self, event: impl Into<String>, action: ActionDescriptor) -> Self {
        self.events.push((event.into(), action));
        self
    }

    pub(crate) fn classes(&self) -> &[String] {
        &self.classes
    }

    pub(crate) fn styles(&self) -> &[(String, String)] {
        &self.styles
    }

    pub(crate) fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    pub(crate) fn events(&self) -> &[(String, ActionDescriptor)] {
        &self.events
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.styles.is_empty()
            && self.attrs.is_empty()
            && self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_insertion_order() {
        let m = Modifier::new()
            .style("color", "red")
            .style("margin", "0")
            .attr("data-x", "1");
        assert_eq!(
            m.styles(),
            &[
                ("color".to_string(), "red".to_string()),
                ("margin".to_string(), "0".to_string()),
            ]
        );
        assert_eq!(m.attrs(), &[("data-x".to_string(), "1".to_string())]);
    }

    #[test]
    fn style_names_are_normalized_to_kebab_case() {
        let m = Modifier::new().style("backgroundColor", "red").style("margin-top", "1px");
        assert_eq!(
            m.styles(),
            &[
                ("background-color".to_string(), "red".to_string()),
                ("margin-top".to_string(), "1px".to_string()),
            ]
        );
    }

    #[test]
    fn later_style_write_overrides_earlier_without_duplicating() {
        let m = Modifier::new()
            .style("color", "red")
            .style("margin", "0")
            .style("color", "blue");
        assert_eq!(
            m.styles(),
            &[
                ("color".to_string(), "blue".to_string()),
                ("margin".to_string(), "0".to_string()),
            ]
        );
    }
}
