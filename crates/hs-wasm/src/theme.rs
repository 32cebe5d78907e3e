//! Page theme detection
//!
//! The results page does not expose `prefers-color-scheme` directly; the
//! reliable signal is the appbar's "Dark theme" toggle, so that is probed
//! first and the media query only breaks ties.

use wasm_bindgen::JsCast;
use web_sys::{Document, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn attr_value(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    fn border_color(self) -> &'static str {
        match self {
            Self::Dark => "#3c4043",
            Self::Light => "#dadce0",
        }
    }
}

/// Detect the current page theme.
pub fn detect(window: &Window, document: &Document) -> Theme {
    if let Ok(spans) = document.query_selector_all("#appbar a span") {
        for i in 0..spans.length() {
            let Some(span) = spans.item(i) else { continue };
            if span.text_content().as_deref() != Some("Dark theme") {
                continue;
            }
            if let Some(sibling) = span.next_sibling() {
                match sibling.text_content().as_deref() {
                    Some("On") => return Theme::Dark,
                    Some("Off") => return Theme::Light,
                    _ => {}
                }
            }
        }
    }

    match window.match_media("(prefers-color-scheme: dark)") {
        Ok(Some(query)) if query.matches() => Theme::Dark,
        _ => Theme::Light,
    }
}

/// Publish the theme's border color as a CSS custom property on the
/// document root, where the injected control styles pick it up.
pub fn apply(document: &Document, theme: Theme) {
    let Some(root) = document.document_element() else {
        return;
    };
    let Some(root) = root.dyn_ref::<web_sys::HtmlElement>() else {
        return;
    };
    if let Err(err) = root
        .style()
        .set_property("--hypersearch-border-color", theme.border_color())
    {
        log::warn!("failed to set theme property: {err:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_values() {
        assert_eq!(Theme::Light.attr_value(), "light");
        assert_eq!(Theme::Dark.attr_value(), "dark");
    }

    #[test]
    fn test_border_colors_differ() {
        assert_ne!(Theme::Light.border_color(), Theme::Dark.border_color());
    }
}
