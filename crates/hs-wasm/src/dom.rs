//! DOM scanning and style application
//!
//! The only code that touches live elements. Each scan resets every marked
//! result to neutral, classifies the current result set, and applies the
//! actions the core resolver hands back. Marker attributes are the only
//! state carried between scans.

use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, NodeList};

use hs_core::{classify, classify_all, resolve, Action, CardTypes, Config, ResultKind, ResultProbe};

use crate::theme::Theme;

// Selectors and markers shared between scan passes.
pub const ROOT_SELECTOR: &str = "#center_col";
// leaf result containers that have not been initialized yet
const NEW_RESULT_SELECTOR: &str = "div.g:not([data-hypersearch-opts]):not(:has(.g))";
const MARKED_RESULT_SELECTOR: &str = "div.g[data-hypersearch-opts]";
const VIDEO_SLOT_SELECTOR: &str = ":scope > [jsslot]";
const SOCIAL_SECTION_SELECTOR: &str = ":scope > g-section-with-header";
const SOCIAL_OPT_CONTAINER_SELECTOR: &str = ":scope > g-section-with-header > div:first-of-type";

pub const OPTS_MARKER: &str = "data-hypersearch-opts";
pub const HIDDEN_MARKER: &str = "data-hypersearch-hidden";
pub const THEME_ATTR: &str = "data-hypersearch-theme";
pub const TYPE_ATTR: &str = "data-hypersearch-type";
const ACTION_ATTR: &str = "data-hypersearch-action";

const PIN_BACKGROUND: &str = "rgba(127,255,127,0.05)";
const PIN_BORDER_RADIUS: &str = "4px";

fn iter_elements(list: NodeList) -> impl Iterator<Item = Element> {
    (0..list.length()).filter_map(move |i| list.item(i)?.dyn_into::<Element>().ok())
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    match document.query_selector_all(selector) {
        Ok(list) => iter_elements(list).collect(),
        Err(err) => {
            log::warn!("selector '{selector}' failed: {err:?}");
            Vec::new()
        }
    }
}

// =============================================================================
// Probing
// =============================================================================

fn anchor_href(result: &Element) -> Option<String> {
    let anchor = result.query_selector("a").ok().flatten()?;
    match anchor.dyn_into::<web_sys::HtmlAnchorElement>() {
        // the property view resolves relative hrefs for us
        Ok(anchor) => Some(anchor.href()),
        Err(element) => element.get_attribute("href"),
    }
}

/// Reduce a result container to the structural facts the classifier needs.
pub fn probe_result(result: &Element) -> ResultProbe {
    ResultProbe {
        has_video_slot: result
            .query_selector(VIDEO_SLOT_SELECTOR)
            .ok()
            .flatten()
            .is_some(),
        has_social_section: result
            .query_selector(SOCIAL_SECTION_SELECTOR)
            .ok()
            .flatten()
            .is_some(),
        anchor_href: anchor_href(result),
    }
}

// =============================================================================
// Style application
// =============================================================================

/// Return a result element to the neutral visible state and clear its
/// hidden marker. Runs for every marked element before actions apply, so a
/// deleted rule's effect is never sticky.
pub fn reset_result(element: &Element) {
    let _ = element.remove_attribute(HIDDEN_MARKER);

    let Some(html) = element.dyn_ref::<HtmlElement>() else {
        return;
    };
    let style = html.style();
    // initialized containers are laid out as grid to make room for the
    // injected controls
    let display = if element.class_list().contains("hypersearch-result") {
        "grid"
    } else {
        "block"
    };
    let _ = style.set_property("display", display);
    let _ = style.set_property("background-color", "initial");
    let _ = style.set_property("border-radius", "initial");
}

/// Apply a resolved action to an element that was just reset.
pub fn apply_action(element: &Element, action: Action) {
    let Some(html) = element.dyn_ref::<HtmlElement>() else {
        return;
    };
    let style = html.style();

    match action {
        Action::None => {}
        Action::Remove => {
            let _ = style.set_property("display", "none");
            let _ = element.set_attribute(HIDDEN_MARKER, "true");
        }
        Action::Pin => {
            let _ = style.set_property("background-color", PIN_BACKGROUND);
            let _ = style.set_property("border-radius", PIN_BORDER_RADIUS);
        }
    }
}

// =============================================================================
// Affordance injection
// =============================================================================

/// Which sub-node of the result receives the control affordance.
fn opt_container(result: &Element, kind: ResultKind) -> Element {
    let slot = match kind {
        ResultKind::Video => result.query_selector(VIDEO_SLOT_SELECTOR).ok().flatten(),
        ResultKind::Social => result
            .query_selector(SOCIAL_OPT_CONTAINER_SELECTOR)
            .ok()
            .flatten(),
        ResultKind::Default => None,
    };
    slot.unwrap_or_else(|| result.clone())
}

fn make_button(document: &Document, action: &str, glyph: &str) -> Result<Element, JsValue> {
    let button = document.create_element("button")?;
    button.set_class_name("hypersearch-opt");
    button.set_attribute(ACTION_ATTR, action)?;
    button.set_attribute("tabindex", "0")?;
    button.set_text_content(Some(glyph));
    Ok(button)
}

fn attach_control(button: &Element, hostname: String, pin: bool) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut()>::new(move || {
        let hostname = hostname.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = if pin {
                crate::runtime::pin_and_rescan(&hostname).await
            } else {
                crate::runtime::hide_and_rescan(&hostname).await
            };
            if let Err(err) = outcome {
                log::warn!("control action failed for {hostname}: {err}");
            }
        });
    });
    button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    // the listener lives as long as the element does
    closure.forget();
    Ok(())
}

fn inject_controls(
    document: &Document,
    result: &Element,
    kind: ResultKind,
    hostname: &str,
    theme: Theme,
) -> Result<(), JsValue> {
    let container = opt_container(result, kind);

    let wrapper = document.create_element("div")?;
    wrapper.set_class_name("hypersearch-opts");
    wrapper.set_attribute(THEME_ATTR, theme.attr_value())?;

    let hide = make_button(document, "hide", "\u{274c}")?;
    attach_control(&hide, hostname.to_owned(), false)?;
    let pin = make_button(document, "pin", "\u{1f4cc}")?;
    attach_control(&pin, hostname.to_owned(), true)?;

    wrapper.append_child(&hide)?;
    wrapper.append_child(&pin)?;
    container.append_child(&wrapper)?;

    container.class_list().add_1("hypersearch-result")?;
    if let Some(html) = container.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property("display", "grid");
    }
    Ok(())
}

/// Initialize result containers that have not been seen before: classify,
/// mark, and inject the hide/pin controls. The marker is set first so a
/// failed injection is not retried on every mutation.
fn initialize_new_results(document: &Document, theme: Theme) {
    for result in query_all(document, NEW_RESULT_SELECTOR) {
        let probe = probe_result(&result);
        if let Err(err) = result.set_attribute(OPTS_MARKER, "true") {
            log::warn!("failed to mark result: {err:?}");
            continue;
        }

        let element = match classify(&probe) {
            Ok(element) => element,
            Err(skip) => {
                log::debug!("skipping result: {skip}");
                continue;
            }
        };

        if let Err(err) =
            inject_controls(document, &result, element.kind, &element.hostname, theme)
        {
            log::warn!("failed to inject controls for {}: {err:?}", element.hostname);
        }
    }
}

// =============================================================================
// Scan
// =============================================================================

/// One full scan over the result container.
///
/// Initializes new results, resets every marked element to neutral, then
/// resolves and applies actions from a fresh config snapshot. Re-running
/// with unchanged config and DOM is idempotent.
pub fn run_scan(document: &Document, config: &Config, theme: Theme) {
    initialize_new_results(document, theme);

    let marked = query_all(document, MARKED_RESULT_SELECTOR);
    for element in &marked {
        reset_result(element);
    }

    let probes: Vec<ResultProbe> = marked.iter().map(probe_result).collect();
    let classified = classify_all(&probes);
    let elements: Vec<_> = classified
        .iter()
        .map(|(_, element)| element.clone())
        .collect();

    let resolutions = resolve(&elements, &config.domains);

    for ((dom_index, _), resolution) in classified.iter().zip(&resolutions) {
        apply_action(&marked[*dom_index], resolution.action);
    }

    apply_card_visibility(document, config.hidden_cards);
}

// =============================================================================
// Targeted message passes
// =============================================================================

/// Hide results whose hostname is in `domains` and unhide the rest, without
/// re-reading the store. Exact hostname comparison, as the message payload
/// carries literal hostnames.
pub fn update_hidden_results(document: &Document, domains: &[String]) {
    for result in query_all(document, MARKED_RESULT_SELECTOR) {
        let probe = probe_result(&result);
        let Ok(element) = classify(&probe) else {
            continue;
        };

        let hidden_now = result.has_attribute(HIDDEN_MARKER);
        let should_hide = domains.iter().any(|domain| *domain == element.hostname);

        if should_hide && !hidden_now {
            reset_result(&result);
            apply_action(&result, Action::Remove);
        } else if !should_hide && hidden_now {
            reset_result(&result);
        }
    }
}

// =============================================================================
// Cards
// =============================================================================

fn card_selector(card: CardTypes) -> Option<&'static str> {
    match card {
        CardTypes::DEFINITIONS => {
            Some("div[data-corpus]:has(div[data-attrid='SenseDefinition'])")
        }
        CardTypes::RELATED_QUESTIONS => Some("div[jsaction][data-initq][data-miif]"),
        CardTypes::RELATED_RESULTS => Some("div[data-abe]"),
        // TODO: news cards still need a reliable selector; the
        // heading-based probe matches far too broadly.
        CardTypes::NEWS => None,
        _ => None,
    }
}

fn mark_cards(document: &Document) {
    for card in CardTypes::all().iter() {
        let Some(selector) = card_selector(card) else {
            continue;
        };
        let Some(name) = card.name() else { continue };

        let query = format!("{selector}:not([{OPTS_MARKER}])");
        for element in query_all(document, &query) {
            let _ = element.class_list().add_1("hypersearch-card");
            let _ = element.set_attribute(OPTS_MARKER, "true");
            let _ = element.set_attribute(TYPE_ATTR, name);
        }
    }
}

/// Hide or show auxiliary cards per the flag set.
pub fn apply_card_visibility(document: &Document, hidden: CardTypes) {
    mark_cards(document);

    for card in CardTypes::all().iter() {
        let Some(selector) = card_selector(card) else {
            continue;
        };
        let hide = hidden.contains(card);

        for element in query_all(document, selector) {
            let Some(html) = element.dyn_ref::<HtmlElement>() else {
                continue;
            };
            if hide {
                let _ = html.style().set_property("display", "none");
                let _ = element.set_attribute(HIDDEN_MARKER, "true");
            } else if element.has_attribute(HIDDEN_MARKER) {
                let _ = html.style().set_property("display", "block");
                let _ = element.remove_attribute(HIDDEN_MARKER);
            }
        }
    }
}
