//! Debounced mutation subscription
//!
//! The results container mutates in bursts while the page hydrates; firing
//! a scan per raw mutation record would re-walk the tree dozens of times.
//! Instead at most one scan is pending at any moment: the first record of
//! a burst schedules it, the rest are coalesced.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, MutationObserver, MutationObserverInit};

use crate::dom::ROOT_SELECTOR;

const DEBOUNCE_MS: i32 = 150;

/// Observe the result container and schedule coalesced rescans.
pub fn install(document: &Document) -> Result<(), JsValue> {
    let Some(root) = document.query_selector(ROOT_SELECTOR)? else {
        log::warn!("no result container to observe");
        return Ok(());
    };

    let pending = Rc::new(Cell::new(false));

    let scan_pending = Rc::clone(&pending);
    let run = Closure::<dyn FnMut()>::new(move || {
        scan_pending.set(false);
        wasm_bindgen_futures::spawn_local(crate::runtime::rescan());
    });

    let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
        move |_records: js_sys::Array, _observer: MutationObserver| {
            if pending.get() {
                return;
            }
            pending.set(true);

            let Some(window) = web_sys::window() else {
                pending.set(false);
                return;
            };
            if window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    run.as_ref().unchecked_ref(),
                    DEBOUNCE_MS,
                )
                .is_err()
            {
                pending.set(false);
            }
        },
    );

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(&root, &init)?;

    // observer and callback live for the rest of the page
    callback.forget();
    Ok(())
}
