//! Browser tests for the mounted background
//!
//! Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use fluid_backdrop::platform::{mount, Mount};
use fluid_backdrop::Tier;
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;
use web_sys::{HtmlCanvasElement, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn container() -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let div: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    div.style().set_property("width", "320px").unwrap();
    div.style().set_property("height", "200px").unwrap();
    document.body().unwrap().append_child(&div).unwrap();
    div
}

fn canvas_of(container: &HtmlElement) -> Option<HtmlCanvasElement> {
    container.query_selector("canvas").unwrap().and_then(|el| el.dyn_into().ok())
}

#[wasm_bindgen_test]
fn canvas_screen_blends_over_the_page() {
    let host = container();
    let mut m = mount(host.clone(), "{}", None).unwrap();

    let canvas = canvas_of(&host).expect("canvas mounted");
    let style = canvas.style();
    assert_eq!(style.get_property_value("mix-blend-mode").unwrap(), "screen");
    assert_eq!(style.get_property_value("pointer-events").unwrap(), "none");
    assert_eq!(canvas.get_attribute("aria-hidden").as_deref(), Some("true"));

    m.dispose();
    assert!(canvas_of(&host).is_none());
    m.dispose();
}

#[wasm_bindgen_test]
fn degrade_callback_may_query_the_mount() {
    let slot: Rc<RefCell<Option<Mount>>> = Rc::new(RefCell::new(None));
    let seen: Rc<RefCell<Vec<(String, Option<Tier>)>>> = Rc::new(RefCell::new(Vec::new()));

    let callback = {
        let slot = Rc::clone(&slot);
        let seen = Rc::clone(&seen);
        Closure::wrap(Box::new(move |reason: JsValue| {
            let tier = slot.borrow().as_ref().map(|m| m.tier());
            seen.borrow_mut().push((reason.as_string().unwrap_or_default(), tier));
        }) as Box<dyn FnMut(JsValue)>)
    };
    let function: js_sys::Function = callback.as_ref().unchecked_ref::<js_sys::Function>().clone();

    let m = mount(container(), "{}", Some(function)).unwrap();
    let on_gpu = m.tier() == Tier::Gpu;
    *slot.borrow_mut() = Some(m);
    let before = seen.borrow().len();

    let degraded = slot.borrow().as_ref().unwrap().degrade("lost context");

    assert_eq!(degraded, on_gpu);
    let seen = seen.borrow();
    if degraded {
        assert_eq!(seen.len(), before + 1);
        let (reason, tier) = &seen[before];
        assert!(reason.contains("lost context"));
        assert_eq!(*tier, Some(Tier::Fallback2d));
    } else {
        assert_eq!(seen.len(), before);
    }

    let mut m = slot.borrow_mut().take().unwrap();
    m.dispose();
}
