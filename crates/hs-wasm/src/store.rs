//! `chrome.storage.local` adapter
//!
//! Same record format as the native file store, reached through the
//! extension namespace (`browser` preferred, `chrome` fallback). All
//! failures surface as [`StoreError`] and stay non-fatal; callers log and
//! keep the last-known state.

use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use hs_core::config::{
    Config, StoreError, CONFIG_KEY, LEGACY_CARDS_KEY, LEGACY_HIDDEN_KEY, LEGACY_PINNED_KEY,
};
use hs_core::migrate_legacy;

fn unavailable(err: JsValue) -> StoreError {
    StoreError::Unavailable(format!("{err:?}"))
}

/// Resolve `storage.local` from the extension namespace.
fn storage_area() -> Result<Object, StoreError> {
    let global = js_sys::global();

    let ns = Reflect::get(&global, &"browser".into())
        .ok()
        .filter(|value| !value.is_undefined())
        .or_else(|| {
            Reflect::get(&global, &"chrome".into())
                .ok()
                .filter(|value| !value.is_undefined())
        })
        .ok_or_else(|| StoreError::Unavailable("no extension namespace".into()))?;

    let storage = Reflect::get(&ns, &"storage".into()).map_err(unavailable)?;
    let local = Reflect::get(&storage, &"local".into()).map_err(unavailable)?;
    local
        .dyn_into::<Object>()
        .map_err(|_| StoreError::Unavailable("storage.local missing".into()))
}

async fn get_key(key: &str) -> Result<JsValue, StoreError> {
    let area = storage_area()?;
    let get = Reflect::get(&area, &"get".into())
        .map_err(unavailable)?
        .dyn_into::<Function>()
        .map_err(|_| StoreError::Unavailable("storage.get is not callable".into()))?;

    let promise: Promise = get
        .call1(&area, &JsValue::from_str(key))
        .map_err(unavailable)?
        .dyn_into()
        .map_err(|_| StoreError::Unavailable("storage.get returned no promise".into()))?;

    let record = JsFuture::from(promise).await.map_err(unavailable)?;
    Reflect::get(&record, &key.into()).map_err(unavailable)
}

async fn set_key(key: &str, value: &JsValue) -> Result<(), StoreError> {
    let area = storage_area()?;
    let set = Reflect::get(&area, &"set".into())
        .map_err(unavailable)?
        .dyn_into::<Function>()
        .map_err(|_| StoreError::Unavailable("storage.set is not callable".into()))?;

    let record = Object::new();
    Reflect::set(&record, &key.into(), value).map_err(unavailable)?;

    let promise: Promise = set
        .call1(&area, &record)
        .map_err(unavailable)?
        .dyn_into()
        .map_err(|_| StoreError::Unavailable("storage.set returned no promise".into()))?;

    JsFuture::from(promise).await.map_err(unavailable)?;
    Ok(())
}

async fn get_string_list(key: &str) -> Result<Vec<String>, StoreError> {
    let value = get_key(key).await?;
    if value.is_undefined() || value.is_null() {
        return Ok(Vec::new());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| StoreError::Malformed(err.to_string()))
}

/// Load the config record.
///
/// Records written by older builds under the separate hidden/pinned/cards
/// keys are migrated in memory; when nothing is stored at all the default
/// generator applies.
pub async fn load_config() -> Result<Config, StoreError> {
    let value = get_key(CONFIG_KEY).await?;
    if !value.is_undefined() && !value.is_null() {
        return serde_wasm_bindgen::from_value(value)
            .map_err(|err| StoreError::Malformed(err.to_string()));
    }

    let hidden = get_string_list(LEGACY_HIDDEN_KEY).await?;
    let pinned = get_string_list(LEGACY_PINNED_KEY).await?;
    let cards = get_key(LEGACY_CARDS_KEY)
        .await?
        .as_f64()
        .unwrap_or_default() as u32;

    if hidden.is_empty() && pinned.is_empty() && cards == 0 {
        return Ok(Config::default());
    }

    log::info!(
        "migrating legacy record ({} hidden, {} pinned)",
        hidden.len(),
        pinned.len()
    );
    Ok(migrate_legacy(&hidden, &pinned, cards))
}

/// Replace the config record.
pub async fn store_config(config: &Config) -> Result<(), StoreError> {
    let value = serde_wasm_bindgen::to_value(config)
        .map_err(|err| StoreError::Malformed(err.to_string()))?;
    set_key(CONFIG_KEY, &value).await
}
