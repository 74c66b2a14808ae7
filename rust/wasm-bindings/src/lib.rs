// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BudgetLink WebAssembly Bindings
//!
//! JavaScript/TypeScript API for BudgetLink built with wasm-bindgen.

use wasm_bindgen::prelude::*;

#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

mod links;
mod utils;
mod viewer;

pub use links::{
    export_linking_config, generate_patterns, import_linking_config, import_linking_csv,
    validate_linking_config,
};
pub use utils::set_panic_hook as init_panic_hook;
pub use viewer::LinkingViewer;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    utils::set_panic_hook();
}

/// Get the version of BudgetLink
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
