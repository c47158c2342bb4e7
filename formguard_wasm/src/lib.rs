// Browser side of formguard: wires the planning logic of the `formguard` crate to the live page.
//
// The page calls `init` once, optionally with a JSON configuration (see `formguard::config`):
//
//   import init_wasm, { init } from "./formguard_wasm.js";
//   await init_wasm();
//   init(JSON.stringify({ log_level: "debug" }));

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

extern crate console_error_panic_hook;
extern crate wasm_bindgen;

extern crate formguard;

pub mod ajax_modal;
pub mod delete_ui;
pub mod form_protect;
pub mod formset_ui;
pub mod web_document;
pub mod web_element_ext;
pub mod web_error_handling;
pub mod web_fields;
pub mod web_iterators;
pub mod web_logger;
pub mod web_util;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use formguard::GlueConfig;
use wasm_bindgen::prelude::*;

use crate::web_document::web_document;
use crate::web_element_ext::listen_and_forget;
use crate::web_error_handling::{JsResult, set_panic_hook};


thread_local! {
    static INITIALIZED: Cell<bool> = const { Cell::new(false) };
    static CONFIG: RefCell<Option<Rc<GlueConfig>>> = const { RefCell::new(None) };
}

#[wasm_bindgen]
pub fn init(config_json: Option<String>) -> JsResult<()> {
    set_panic_hook();
    let config = GlueConfig::from_json(config_json.as_deref().unwrap_or_default())
        .map_err(|err| rust_error!("{err}"))?;
    web_logger::init_logger(config.log_level.to_level_filter());
    if INITIALIZED.with(|initialized| initialized.replace(true)) {
        log::warn!("formguard is already initialized");
        return Ok(());
    }

    let config = Rc::new(config);
    CONFIG.with(|cell| *cell.borrow_mut() = Some(Rc::clone(&config)));
    let document = web_document()?;
    if document.is_loading() {
        let mut config = Some(config);
        listen_and_forget(document.raw(), "DOMContentLoaded", move |_: web_sys::Event| {
            match config.take() {
                Some(config) => install_all(config),
                None => Ok(()),
            }
        })
    } else {
        install_all(config)
    }
}

fn install_all(config: Rc<GlueConfig>) -> JsResult<()> {
    delete_ui::install(Rc::clone(&config))?;
    ajax_modal::install(Rc::clone(&config))?;
    formset_ui::install(Rc::clone(&config))?;
    form_protect::install(config)?;
    log::info!("formguard initialized");
    Ok(())
}

#[wasm_bindgen]
pub fn has_unsaved_changes() -> bool { form_protect::any_dirty() }

#[wasm_bindgen]
pub fn is_form_dirty(form_name: &str) -> bool { form_protect::is_dirty(form_name) }

// For pages that save a tracked form through their own scripts.
#[wasm_bindgen]
pub fn mark_form_clean(form_name: &str) -> JsResult<()> { form_protect::mark_clean(form_name) }

#[wasm_bindgen]
pub fn add_formset_row(prefix: &str) -> JsResult<()> {
    let config = CONFIG.with(|cell| cell.borrow().clone()).unwrap_or_default();
    formset_ui::add_row(&config.formset, prefix)
}
