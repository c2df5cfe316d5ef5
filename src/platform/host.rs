use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Event, EventTarget, HtmlCanvasElement, HtmlElement,
    MouseEvent, TouchEvent, Window,
};

use crate::domain::{EngineConfig, Tier};
use crate::simulation::{EngineCore, FrameOutcome, Renderer};
use crate::systems::input::{InputEvent, Rect};

use super::present::{CanvasPresenter, GlPresenter, Presenter};
use super::probe::probe_signals;

const CANVAS_STYLE: [(&str, &str); 8] = [
    ("position", "absolute"),
    ("inset", "0"),
    ("width", "100%"),
    ("height", "100%"),
    ("display", "block"),
    ("pointer-events", "none"),
    ("z-index", "0"),
    ("mix-blend-mode", "screen"),
];

struct HostState {
    window: Window,
    engine: EngineCore,
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    presenter: Presenter,
    raf_id: Option<i32>,
    hovering: bool,
    /// Container rect as of the last frame or resize
    bounds: Rect,
}

type Shared = Rc<RefCell<HostState>>;
type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
/// Degrade reason recorded by the engine, reported once the host state is released
type PendingDegrade = Rc<RefCell<Option<String>>>;

impl HostState {
    fn now(&self) -> f64 {
        self.window.performance().map(|p| p.now()).unwrap_or(0.0)
    }

    /// The only layout read; runs once per frame and on resize
    fn refresh_bounds(&mut self) -> Rect {
        let r = self.container.get_bounding_client_rect();
        self.bounds = Rect::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32);
        self.bounds
    }

    fn sync_size(&mut self) {
        let r = self.refresh_bounds();
        let dpr = self.window.device_pixel_ratio() as f32;
        self.engine.resize(r.width, r.height, dpr);
        let (w, h) = match self.engine.tier() {
            Tier::Gpu => self.engine.viewport().device_size(),
            _ => self.engine.surface_size(),
        };
        if self.canvas.width() != w || self.canvas.height() != h {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
        }
    }

    /// Present the engine's latest frame; a GL failure degrades the tier
    fn present(&mut self) {
        let (w, h) = self.engine.surface_size();
        let canvas_size = (self.canvas.width(), self.canvas.height());
        let result = match &self.presenter {
            Presenter::Gl(gl) => gl.present(self.engine.pixels(), w, h, canvas_size),
            Presenter::Canvas(ctx) => ctx
                .present(self.engine.pixels(), w, h)
                .map_err(|e| format!("{e:?}")),
            Presenter::None => Ok(()),
        };
        if let Err(reason) = result {
            self.degrade(&reason);
        }
    }

    /// A canvas that ever held a webgl context cannot hand out a 2d one,
    /// so the software tier gets a fresh element
    fn degrade(&mut self, reason: &str) {
        if !self.engine.degrade(reason) {
            return;
        }
        self.presenter.release();
        match self.replace_canvas() {
            Ok(()) => match CanvasPresenter::new(&self.canvas) {
                Ok(p) => self.presenter = Presenter::Canvas(p),
                Err(e) => log::error!("2d presenter unavailable: {e}"),
            },
            Err(e) => log::error!("canvas swap failed: {e:?}"),
        }
        self.sync_size();
    }

    fn replace_canvas(&mut self) -> Result<(), JsValue> {
        let document = self.window.document().ok_or("no document")?;
        let fresh = create_canvas(&document)?;
        self.container.replace_child(&fresh, &self.canvas)?;
        self.canvas = fresh;
        Ok(())
    }

    fn push(&mut self, event: InputEvent) {
        self.engine.push_event(event);
    }

    /// Hover is derived from the cached container rect, the canvas never receives events
    fn track_hover(&mut self, x: f32, y: f32, at_ms: f64) {
        let inside = self.bounds.contains(x, y);
        if inside != self.hovering {
            self.hovering = inside;
            self.push(if inside {
                InputEvent::HoverEnter { at_ms }
            } else {
                InputEvent::HoverLeave { at_ms }
            });
        }
    }
}

fn create_canvas(document: &Document) -> Result<HtmlCanvasElement, JsValue> {
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    let style = canvas.style();
    for (name, value) in CANVAS_STYLE {
        style.set_property(name, value)?;
    }
    canvas.set_attribute("aria-hidden", "true")?;
    Ok(canvas)
}

/// A passive DOM listener that can be detached again
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(target: &EventTarget, kind: &'static str, closure: Closure<dyn FnMut(Event)>) -> Result<Self, JsValue> {
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self { target: target.clone(), kind, closure })
    }

    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

fn listen(state: &Shared, target: &EventTarget, kind: &'static str, f: fn(&mut HostState, &Event)) -> Result<Listener, JsValue> {
    let state = Rc::clone(state);
    let closure = Closure::wrap(Box::new(move |event: Event| {
        if let Ok(mut s) = state.try_borrow_mut() {
            f(&mut s, &event);
        }
    }) as Box<dyn FnMut(Event)>);
    Listener::attach(target, kind, closure)
}

fn on_mouse_move(s: &mut HostState, event: &Event) {
    let Some(e) = event.dyn_ref::<MouseEvent>() else { return };
    let (x, y, at_ms) = (e.client_x() as f32, e.client_y() as f32, s.now());
    s.track_hover(x, y, at_ms);
    s.push(InputEvent::PointerMove { x, y, at_ms });
}

fn on_mouse_leave(s: &mut HostState, _: &Event) {
    if s.hovering {
        s.hovering = false;
        let at_ms = s.now();
        s.push(InputEvent::HoverLeave { at_ms });
    }
}

fn touch_point(event: &Event) -> Option<(f32, f32, u32)> {
    let e = event.dyn_ref::<TouchEvent>()?;
    let touches = e.touches();
    let first = touches.get(0)?;
    Some((first.client_x() as f32, first.client_y() as f32, touches.length()))
}

fn on_touch_start(s: &mut HostState, event: &Event) {
    if let Some((x, y, touches)) = touch_point(event) {
        let at_ms = s.now();
        s.track_hover(x, y, at_ms);
        s.push(InputEvent::TouchStart { x, y, touches, at_ms });
    }
}

fn on_touch_move(s: &mut HostState, event: &Event) {
    if let Some((x, y, touches)) = touch_point(event) {
        let at_ms = s.now();
        s.push(InputEvent::TouchMove { x, y, touches, at_ms });
    }
}

fn on_touch_end(s: &mut HostState, _: &Event) {
    s.hovering = false;
    let at_ms = s.now();
    s.push(InputEvent::TouchEnd { at_ms });
}

fn on_wheel(s: &mut HostState, _: &Event) {
    let now = s.now();
    s.engine.notify_wheel(now);
}

fn on_resize(s: &mut HostState, _: &Event) {
    s.sync_size();
}

fn on_visibility(s: &mut HostState, _: &Event) {
    let visible = s.window.document().map(|d| !d.hidden()).unwrap_or(true);
    s.engine.set_visibility(visible);
}

/// Hand a recorded degrade reason to the host callback. Must run with no
/// `HostState` borrow held, the callback may call back into `Mount`.
fn report_degrade(pending: &PendingDegrade, callback: Option<&js_sys::Function>) {
    let Some(reason) = pending.borrow_mut().take() else { return };
    if let Some(callback) = callback {
        if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&reason)) {
            log::error!("degrade callback failed: {e:?}");
        }
    }
}

/// Request the next animation frame unless one is pending or the loop is stopped
fn arm(state: &Shared, slot: &FrameSlot) {
    let mut s = state.borrow_mut();
    if s.raf_id.is_some() || !s.engine.is_running() {
        return;
    }
    if let Some(callback) = slot.borrow().as_ref() {
        match s.window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => s.raf_id = Some(id),
            Err(e) => log::error!("requestAnimationFrame failed: {e:?}"),
        }
    }
}

/// Handle returned by `mount`; dropping it without `dispose` leaks the loop
#[wasm_bindgen]
pub struct Mount {
    state: Shared,
    frame: FrameSlot,
    listeners: Vec<Listener>,
    pending: PendingDegrade,
    on_degrade: Option<js_sys::Function>,
    disposed: bool,
}

/// Attach a fluid background to `container`.
///
/// `on_degrade(reason)` runs once if the GPU tier falls back to 2D.
#[wasm_bindgen(js_name = mountBackground)]
pub fn mount(container: HtmlElement, config_json: &str, on_degrade: Option<js_sys::Function>) -> Result<Mount, JsValue> {
    let to_js = |e: crate::error::EngineError| JsValue::from_str(&e.to_string());
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let config = EngineConfig::from_json(config_json).map_err(|e| to_js(e.into()))?;
    let signals = probe_signals(&window, config.enabled);
    let mut engine = EngineCore::new(config, &signals).map_err(to_js)?;
    let pending: PendingDegrade = Rc::new(RefCell::new(None));
    {
        let pending = Rc::clone(&pending);
        engine.set_degrade_handler(Box::new(move |error| {
            *pending.borrow_mut() = Some(error.to_string());
            Ok(())
        }));
    }

    let canvas = create_canvas(&document)?;
    container.append_child(&canvas)?;

    let state: Shared = Rc::new(RefCell::new(HostState {
        window: window.clone(),
        engine,
        container,
        canvas,
        presenter: Presenter::None,
        raf_id: None,
        hovering: false,
        bounds: Rect::default(),
    }));

    {
        let mut s = state.borrow_mut();
        match s.engine.tier() {
            Tier::Gpu => match GlPresenter::new(&s.canvas) {
                Ok(gl) => s.presenter = Presenter::Gl(gl),
                Err(reason) => s.degrade(&reason),
            },
            Tier::Fallback2d => match CanvasPresenter::new(&s.canvas) {
                Ok(p) => s.presenter = Presenter::Canvas(p),
                Err(e) => log::error!("2d presenter unavailable: {e}"),
            },
            Tier::Disabled => {}
        }
        s.sync_size();
    }
    report_degrade(&pending, on_degrade.as_ref());

    let frame: FrameSlot = Rc::new(RefCell::new(None));
    {
        let state = Rc::clone(&state);
        let slot = Rc::clone(&frame);
        let pending = Rc::clone(&pending);
        let on_degrade = on_degrade.clone();
        *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            {
                let mut s = state.borrow_mut();
                s.raf_id = None;
                let bounds = s.refresh_bounds();
                if s.engine.frame(now, bounds) == FrameOutcome::Rendered {
                    s.present();
                }
            }
            report_degrade(&pending, on_degrade.as_ref());
            arm(&state, &slot);
        }) as Box<dyn FnMut(f64)>));
    }

    let window_target: &EventTarget = window.as_ref();
    let document_target: &EventTarget = document.as_ref();
    let mut listeners = Vec::with_capacity(8);
    if !state.borrow().engine.renderer().is_inert() {
        listeners.push(listen(&state, window_target, "mousemove", on_mouse_move)?);
        listeners.push(listen(&state, document_target, "mouseleave", on_mouse_leave)?);
        listeners.push(listen(&state, window_target, "touchstart", on_touch_start)?);
        listeners.push(listen(&state, window_target, "touchmove", on_touch_move)?);
        listeners.push(listen(&state, window_target, "touchend", on_touch_end)?);
        listeners.push(listen(&state, window_target, "wheel", on_wheel)?);
        listeners.push(listen(&state, window_target, "resize", on_resize)?);
    }
    // visibility changes must also re-arm the loop
    {
        let state_v = Rc::clone(&state);
        let slot = Rc::clone(&frame);
        let closure = Closure::wrap(Box::new(move |event: Event| {
            if let Ok(mut s) = state_v.try_borrow_mut() {
                on_visibility(&mut s, &event);
            }
            arm(&state_v, &slot);
        }) as Box<dyn FnMut(Event)>);
        listeners.push(Listener::attach(document_target, "visibilitychange", closure)?);
    }

    let mount = Mount { state, frame, listeners, pending, on_degrade, disposed: false };
    mount.start();
    log::info!("background mounted, tier {:?}", mount.state.borrow().engine.tier());
    Ok(mount)
}

#[wasm_bindgen]
impl Mount {
    #[wasm_bindgen(getter)]
    pub fn tier(&self) -> Tier {
        self.state.borrow().engine.tier()
    }

    pub fn start(&self) {
        if self.disposed {
            return;
        }
        self.state.borrow_mut().engine.start();
        arm(&self.state, &self.frame);
    }

    pub fn pause(&self) {
        self.state.borrow_mut().engine.pause();
    }

    pub fn set_throttle(&self, fps: u32) {
        self.state.borrow_mut().engine.set_throttle(fps);
    }

    /// Drop to the software tier; `false` when not on the GPU tier
    pub fn degrade(&self, reason: &str) -> bool {
        if self.disposed {
            return false;
        }
        let degraded = {
            let mut s = self.state.borrow_mut();
            let before = s.engine.tier();
            s.degrade(reason);
            before != s.engine.tier()
        };
        report_degrade(&self.pending, self.on_degrade.as_ref());
        degraded
    }

    /// Cancel the loop, detach every listener and remove the canvas
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        let window = {
            let mut s = self.state.borrow_mut();
            if let Some(id) = s.raf_id.take() {
                let _ = s.window.cancel_animation_frame(id);
            }
            s.presenter.release();
            s.canvas.remove();
            s.engine.dispose();
            s.window.clone()
        };
        self.pending.borrow_mut().take();
        // dispose may be called from inside the frame callback; drop it after the stack unwinds
        if let Some(frame) = self.frame.borrow_mut().take() {
            let release = Closure::once_into_js(move || drop(frame));
            if window.set_timeout_with_callback(release.unchecked_ref()).is_err() {
                log::warn!("could not defer frame callback release");
            }
        }
    }

    /// Bytes held by the active renderer
    #[wasm_bindgen(getter)]
    pub fn memory_bytes(&self) -> usize {
        self.state.borrow().engine.renderer().memory_bytes()
    }
}
