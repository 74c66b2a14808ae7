// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Browser tests, run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use budget_link_wasm::{import_linking_config, LinkingViewer};
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn js(json: &str) -> JsValue {
    js_sys::JSON::parse(json).unwrap()
}

#[wasm_bindgen_test]
fn toggle_calls_set_material_per_element() {
    let items = js(r#"[{"code": "2.1", "description": "Vigas"}]"#);
    let elements = js(r#"[
        {"id": "a", "name": "2.1_"},
        {"id": "b", "name": "2.1_.001"},
        {"id": "c", "name": "2.2_.001"}
    ]"#);
    let mut viewer = LinkingViewer::new(items, elements).unwrap();

    let calls = js_sys::Array::new();
    let recorder = {
        let calls = calls.clone();
        Closure::<dyn FnMut(JsValue, JsValue)>::new(move |id: JsValue, _material: JsValue| {
            calls.push(&id);
        })
    };
    let set_material: &js_sys::Function = recorder.as_ref().unchecked_ref();

    viewer.toggle("2.1", set_material).unwrap();
    assert_eq!(calls.length(), 2);

    viewer.clear(set_material).unwrap();
    assert_eq!(calls.length(), 4);
}

#[wasm_bindgen_test]
fn invalid_import_is_null() {
    assert!(import_linking_config("{not json").is_null());
}
