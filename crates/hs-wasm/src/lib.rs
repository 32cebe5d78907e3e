//! WebAssembly bindings for Hypersearch

mod dom;
mod observer;
mod runtime;
mod store;
mod theme;

use std::sync::Once;

use wasm_bindgen::prelude::*;

use hs_core::{resolve, Config, Message, ResultElement, ResultKind};

static INIT: Once = Once::new();

fn init_runtime_support() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::new(log::Level::Debug));
    });
}

fn store_err(err: hs_core::StoreError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    init_runtime_support();
}

/// Entry point for the content-script loader: initial scan plus mutation
/// and message subscriptions.
#[wasm_bindgen]
pub async fn run_content_script() -> Result<(), JsValue> {
    init_runtime_support();
    runtime::start().await
}

/// Feed one runtime message through the dispatcher. Unknown or
/// unparseable messages are no-ops.
#[wasm_bindgen]
pub fn handle_runtime_message(message: JsValue) {
    match serde_wasm_bindgen::from_value::<Message>(message) {
        Ok(message) => runtime::handle_message(message),
        Err(err) => log::debug!("ignoring unparseable message: {err}"),
    }
}

/// Registrable domain of a hostname, or undefined when the public-suffix
/// list cannot anchor it.
#[wasm_bindgen]
pub fn registrable_domain_js(host: &str) -> Option<String> {
    hs_core::registrable_domain(host)
}

/// Validate popup domain input; resolves to the normalized domain or
/// rejects with a user-displayable message.
#[wasm_bindgen]
pub fn validate_domain(input: &str) -> Result<String, JsValue> {
    hs_core::validate_domain_input(input).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Resolve the action for a single hostname against a config record.
/// Returns the action as its wire integer (0 none, 1 remove, 2 pin).
#[wasm_bindgen]
pub fn action_for(config: JsValue, hostname: &str) -> Result<u8, JsValue> {
    let config: Config =
        serde_wasm_bindgen::from_value(config).map_err(|err| JsValue::from_str(&err.to_string()))?;
    let elements = vec![ResultElement::new(ResultKind::Default, hostname)];
    let resolutions = resolve(&elements, &config.domains);
    Ok(resolutions[0].action as u8)
}

/// Batch form of [`action_for`], index-aligned with the input hostnames.
#[wasm_bindgen]
pub fn resolve_actions(config: JsValue, hostnames: Vec<String>) -> Result<Vec<u8>, JsValue> {
    let config: Config =
        serde_wasm_bindgen::from_value(config).map_err(|err| JsValue::from_str(&err.to_string()))?;
    let elements: Vec<ResultElement> = hostnames
        .iter()
        .map(|hostname| ResultElement::new(ResultKind::Default, hostname.as_str()))
        .collect();
    let resolutions = resolve(&elements, &config.domains);
    Ok(resolutions
        .iter()
        .map(|resolution| resolution.action as u8)
        .collect())
}

/// Fold the pre-config storage keys into a config record.
#[wasm_bindgen]
pub fn migrate_legacy_record(
    hidden: Vec<String>,
    pinned: Vec<String>,
    cards_mask: u32,
) -> Result<JsValue, JsValue> {
    let config = hs_core::migrate_legacy(&hidden, &pinned, cards_mask);
    serde_wasm_bindgen::to_value(&config).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Popup op: add a hide rule for the domain. Resolves to false when the
/// domain was already configured.
#[wasm_bindgen]
pub async fn store_hidden_domain(domain: String) -> Result<bool, JsValue> {
    let mut config = store::load_config().await.map_err(store_err)?;
    let added = config.hide_domain(&domain);
    if added {
        store::store_config(&config).await.map_err(store_err)?;
    }
    Ok(added)
}

/// Popup op: pin the domain (upserting an existing rule).
#[wasm_bindgen]
pub async fn store_pinned_domain(domain: String) -> Result<bool, JsValue> {
    let mut config = store::load_config().await.map_err(store_err)?;
    let added = config.pin_domain(&domain);
    if added {
        store::store_config(&config).await.map_err(store_err)?;
    }
    Ok(added)
}

/// Popup op: drop every rule for the domain.
#[wasm_bindgen]
pub async fn remove_stored_domain(domain: String) -> Result<bool, JsValue> {
    let mut config = store::load_config().await.map_err(store_err)?;
    let removed = config.unhide_domain(&domain);
    if removed {
        store::store_config(&config).await.map_err(store_err)?;
    }
    Ok(removed)
}

/// Popup op: drop pinned rules for the domain; plain hide rules survive.
#[wasm_bindgen]
pub async fn unpin_stored_domain(domain: String) -> Result<bool, JsValue> {
    let mut config = store::load_config().await.map_err(store_err)?;
    let removed = config.unpin_domain(&domain);
    if removed {
        store::store_config(&config).await.map_err(store_err)?;
    }
    Ok(removed)
}
