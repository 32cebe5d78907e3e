//! Content-script runtime
//!
//! Orchestrates the scan loop: every pass loads a fresh config snapshot
//! from the store, so no context holds a long-lived mutable copy. Control
//! clicks write to the store first and rescan afterwards.

use std::cell::Cell;

use js_sys::{Function, Reflect};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};

use hs_core::config::StoreError;
use hs_core::Message;

use crate::theme::Theme;
use crate::{dom, observer, store, theme};

thread_local! {
    static THEME: Cell<Theme> = Cell::new(Theme::Light);
}

pub fn current_theme() -> Theme {
    THEME.with(Cell::get)
}

/// Set up the runtime on page load: detect the theme, run the initial
/// scan, and subscribe to mutations and runtime messages.
pub async fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let detected = theme::detect(&window, &document);
    THEME.with(|cell| cell.set(detected));
    theme::apply(&document, detected);

    rescan().await;
    observer::install(&document)?;
    install_message_listener()?;
    Ok(())
}

/// Run one scan against a fresh config snapshot. Storage failures leave
/// the page in its last-known state.
pub async fn rescan() {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };

    match store::load_config().await {
        Ok(config) => {
            // the debug flag gates scan-level logging, re-read every pass
            log::set_max_level(if config.opts.debug {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Warn
            });
            dom::run_scan(&document, &config, current_theme());
        }
        Err(err) => log::warn!("config load failed: {err}; keeping last-known state"),
    }
}

/// Hide control: persist the rule, then rescan.
pub async fn hide_and_rescan(hostname: &str) -> Result<(), StoreError> {
    let mut config = store::load_config().await?;
    if config.hide_domain(hostname) {
        store::store_config(&config).await?;
    }
    rescan().await;
    Ok(())
}

/// Pin control: persist the rule, then rescan.
pub async fn pin_and_rescan(hostname: &str) -> Result<(), StoreError> {
    let mut config = store::load_config().await?;
    if config.pin_domain(hostname) {
        store::store_config(&config).await?;
    }
    rescan().await;
    Ok(())
}

/// Dispatch one cross-context message.
pub fn handle_message(message: Message) {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };

    match message {
        Message::Log(line) => log::info!("{line}"),
        Message::UpdateHiddenResults(domains) => dom::update_hidden_results(&document, &domains),
        Message::UpdateHiddenCards(cards) => dom::apply_card_visibility(&document, cards),
        // pin styling is config-driven, so re-resolve from the store
        Message::UpdatePinnedResults(_) => wasm_bindgen_futures::spawn_local(rescan()),
        Message::Unknown => {}
    }
}

/// Subscribe to `runtime.onMessage`. Unparseable payloads are dropped with
/// a debug log, never an error.
fn install_message_listener() -> Result<(), JsValue> {
    let callback = Closure::<dyn FnMut(JsValue)>::new(move |raw: JsValue| {
        match serde_wasm_bindgen::from_value::<Message>(raw) {
            Ok(message) => handle_message(message),
            Err(err) => log::debug!("ignoring unparseable message: {err}"),
        }
    });

    let global = js_sys::global();
    let ns = Reflect::get(&global, &"browser".into())
        .ok()
        .filter(|value| !value.is_undefined())
        .or_else(|| {
            Reflect::get(&global, &"chrome".into())
                .ok()
                .filter(|value| !value.is_undefined())
        })
        .ok_or_else(|| JsValue::from_str("no extension namespace"))?;

    let runtime = Reflect::get(&ns, &"runtime".into())?;
    let on_message = Reflect::get(&runtime, &"onMessage".into())?;
    let add_listener: Function = Reflect::get(&on_message, &"addListener".into())?.dyn_into()?;
    add_listener.call1(&on_message, callback.as_ref().unchecked_ref())?;

    callback.forget();
    Ok(())
}
