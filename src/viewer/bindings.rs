//! Browser bindings.
//!
//! `GridHost` owns a registry of canvas-backed grids and drives it from a
//! `requestAnimationFrame` loop. `SheetGrid` is the handle JavaScript holds
//! for one grid.
//!
//! JS observers are never called while the registry is borrowed: their
//! calls are queued in an outbox and flushed once the borrow ends, so a
//! callback may call back into its grid. Closures owned by DOM listeners
//! are only dropped from the animation frame, never from inside themselves.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use js_sys::{Array, Function};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Event, EventTarget, HtmlCanvasElement, HtmlElement, HtmlImageElement, MouseEvent,
    MutationObserver, MutationObserverInit, Node, WheelEvent,
};

use super::{Grid, GridRegistry, HostElement, ImageLoader, PointerButton, PointerEvent};
use crate::error::{Result, SheetgridError};
use crate::listeners::{
    self, CellValueProvider, ContextMenuObserver, HoverObserver, SelectionObserver,
};
use crate::render::CanvasSurface;
use crate::types::lenient::{row_size_map, size_map, value_to_index};
use crate::types::{CellAddr, CellValue, GridId, GridOptions, Selection};

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or_else(js_sys::Date::now, |p| p.now())
}

fn js_to_json(value: JsValue) -> Option<serde_json::Value> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    serde_wasm_bindgen::from_value(value).ok()
}

// ============================================================================
// Deferred JS calls
// ============================================================================

type Deferred = Box<dyn FnOnce()>;

#[derive(Default)]
struct Outbox(RefCell<Vec<Deferred>>);

impl Outbox {
    fn push(&self, call: Deferred) {
        self.0.borrow_mut().push(call);
    }

    fn flush(&self) {
        loop {
            let batch = std::mem::take(&mut *self.0.borrow_mut());
            if batch.is_empty() {
                break;
            }
            for call in batch {
                call();
            }
        }
    }
}

/// A JS function registered through `SheetGrid.on`.
struct JsObserver {
    func: Function,
    outbox: Rc<Outbox>,
}

impl JsObserver {
    fn defer(&self, args: Vec<JsValue>) {
        let func = self.func.clone();
        self.outbox.push(Box::new(move || {
            let args: Array = args.iter().collect();
            if let Err(err) = func.apply(&JsValue::NULL, &args) {
                tracing::debug!(?err, "observer threw");
            }
        }));
    }
}

#[allow(clippy::cast_precision_loss)]
fn pointer_args(col: &str, row: i64, page_x: f64, page_y: f64) -> Vec<JsValue> {
    vec![
        JsValue::from_str(col),
        JsValue::from_f64(row as f64),
        JsValue::from_f64(page_x),
        JsValue::from_f64(page_y),
    ]
}

fn addr_to_js(addr: Option<&CellAddr>) -> JsValue {
    addr.and_then(|a| serde_wasm_bindgen::to_value(a).ok())
        .unwrap_or(JsValue::NULL)
}

impl listeners::ResizeObserver for JsObserver {
    fn resized(&mut self) {
        self.defer(Vec::new());
    }
}

impl HoverObserver for JsObserver {
    fn hover(&mut self, col: &str, row: i64, page_x: f64, page_y: f64) {
        self.defer(pointer_args(col, row, page_x, page_y));
    }
}

impl ContextMenuObserver for JsObserver {
    fn context_menu(&mut self, col: &str, row: i64, page_x: f64, page_y: f64) {
        self.defer(pointer_args(col, row, page_x, page_y));
    }
}

impl SelectionObserver for JsObserver {
    fn selection_changed(&mut self, start: Option<&CellAddr>, end: Option<&CellAddr>) {
        self.defer(vec![addr_to_js(start), addr_to_js(end)]);
    }
}

/// `cellValue(tag, col, row)` is synchronous: it runs during the frame.
struct JsCellValues(Function);

impl CellValueProvider for JsCellValues {
    fn cell_value(&self, tag: &str, col: &str, row: u32) -> Option<CellValue> {
        let value = self
            .0
            .call3(
                &JsValue::NULL,
                &JsValue::from_str(tag),
                &JsValue::from_str(col),
                &JsValue::from(row),
            )
            .ok()?;
        if value.is_null() || value.is_undefined() {
            return None;
        }
        serde_wasm_bindgen::from_value(value).ok()
    }
}

// ============================================================================
// Images
// ============================================================================

struct ActiveLoad {
    image: HtmlImageElement,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

#[derive(Default)]
struct ImageQueue {
    active: RefCell<HashMap<String, ActiveLoad>>,
    /// URL and whether it decoded.
    finished: RefCell<Vec<(String, bool)>>,
}

struct WebImageLoader {
    queue: Rc<ImageQueue>,
}

impl WebImageLoader {
    fn report(queue: &Weak<ImageQueue>, url: &str, ok: bool) -> Closure<dyn FnMut()> {
        let queue = Weak::clone(queue);
        let url = url.to_string();
        Closure::new(move || {
            if let Some(queue) = queue.upgrade() {
                queue.finished.borrow_mut().push((url.clone(), ok));
            }
        })
    }
}

impl ImageLoader for WebImageLoader {
    fn load(&mut self, url: &str) {
        let Ok(image) = HtmlImageElement::new() else {
            self.queue
                .finished
                .borrow_mut()
                .push((url.to_string(), false));
            return;
        };
        let weak = Rc::downgrade(&self.queue);
        let onload = Self::report(&weak, url, true);
        let onerror = Self::report(&weak, url, false);
        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        image.set_src(url);
        self.queue.active.borrow_mut().insert(
            url.to_string(),
            ActiveLoad {
                image,
                _onload: onload,
                _onerror: onerror,
            },
        );
    }

    fn cancel(&mut self, url: &str) {
        let cancelled = self.queue.active.borrow_mut().remove(url);
        if let Some(load) = cancelled {
            load.image.set_onload(None);
            load.image.set_onerror(None);
            load.image.set_src("");
        }
    }
}

// ============================================================================
// DOM host
// ============================================================================

struct WebHost {
    holder: HtmlElement,
    canvas: HtmlCanvasElement,
}

impl HostElement for WebHost {
    fn size(&self) -> (f64, f64) {
        (
            f64::from(self.holder.offset_width()),
            f64::from(self.holder.offset_height()),
        )
    }

    fn device_pixel_ratio(&self) -> f64 {
        web_sys::window().map_or(1.0, |w| w.device_pixel_ratio())
    }

    fn is_attached(&self) -> bool {
        let holder: &Node = &self.holder;
        let canvas: &Node = &self.canvas;
        let in_document = self
            .holder
            .owner_document()
            .and_then(|d| d.body())
            .is_some_and(|body| body.contains(Some(holder)));
        in_document && holder.contains(Some(canvas))
    }

    fn release(&mut self) {
        self.canvas.remove();
    }
}

/// DOM listeners and observers installed for one grid.
struct GridWiring {
    listeners: Vec<(EventTarget, &'static str, Closure<dyn FnMut(Event)>)>,
    resize_observer: web_sys::ResizeObserver,
    _on_resize: Closure<dyn FnMut()>,
    mutation_observer: MutationObserver,
    _on_mutation: Closure<dyn FnMut()>,
}

impl GridWiring {
    fn disconnect(&self) {
        for (target, name, callback) in &self.listeners {
            let _ = target.remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
        }
        self.resize_observer.disconnect();
        self.mutation_observer.disconnect();
    }
}

// ============================================================================
// Shared host state
// ============================================================================

struct HostInner {
    registry: RefCell<GridRegistry<CanvasSurface>>,
    outbox: Rc<Outbox>,
    images: Rc<ImageQueue>,
    wiring: RefCell<HashMap<GridId, GridWiring>>,
    /// Wiring whose closures may still be on the stack; dropped next frame.
    retired: RefCell<Vec<GridWiring>>,
    attach_checks: RefCell<Vec<GridId>>,
    pending_detach: RefCell<Vec<GridId>>,
    running: Cell<bool>,
}

impl HostInner {
    fn new() -> Self {
        let images = Rc::new(ImageQueue::default());
        let mut registry = GridRegistry::new();
        registry.set_image_loader(Box::new(WebImageLoader {
            queue: Rc::clone(&images),
        }));
        Self {
            registry: RefCell::new(registry),
            outbox: Rc::new(Outbox::default()),
            images,
            wiring: RefCell::new(HashMap::new()),
            retired: RefCell::new(Vec::new()),
            attach_checks: RefCell::new(Vec::new()),
            pending_detach: RefCell::new(Vec::new()),
            running: Cell::new(true),
        }
    }

    /// Run `f` on a grid, then deliver whatever it queued for JS.
    fn with_grid<R>(
        &self,
        id: GridId,
        f: impl FnOnce(&mut Grid<CanvasSurface>) -> R,
    ) -> Option<R> {
        let result = {
            let mut registry = self.registry.try_borrow_mut().ok()?;
            registry.grid_mut(id).map(f)
        };
        self.outbox.flush();
        result
    }

    fn retire(&self, id: GridId) {
        let wiring = self.wiring.borrow_mut().remove(&id);
        if let Some(wiring) = wiring {
            wiring.disconnect();
            self.retired.borrow_mut().push(wiring);
        }
    }

    fn detach(&self, id: GridId) {
        match self.registry.try_borrow_mut() {
            Ok(mut registry) => {
                registry.detach(id);
            }
            Err(_) => {
                self.pending_detach.borrow_mut().push(id);
                return;
            }
        }
        self.retire(id);
    }

    fn tick(&self, now: f64) {
        self.retired.borrow_mut().clear();

        let mut gone = Vec::new();
        {
            let Ok(mut registry) = self.registry.try_borrow_mut() else {
                return;
            };
            let checks = std::mem::take(&mut *self.attach_checks.borrow_mut());
            let detaches = std::mem::take(&mut *self.pending_detach.borrow_mut());
            let finished = std::mem::take(&mut *self.images.finished.borrow_mut());

            for (url, ok) in finished {
                let load = self.images.active.borrow_mut().remove(&url);
                let Some(load) = load else {
                    continue;
                };
                load.image.set_onload(None);
                load.image.set_onerror(None);
                if ok {
                    registry.image_loaded(&url, load.image);
                } else {
                    registry.image_failed(&url);
                }
            }
            for id in detaches {
                registry.detach(id);
                gone.push(id);
            }
            for id in checks {
                if registry.contains(id) && !registry.check_attached(id) {
                    gone.push(id);
                }
            }
            registry.tick(now);
        }
        for id in gone {
            self.retire(id);
        }
        self.outbox.flush();
    }
}

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Result<i32> {
    web_sys::window()
        .ok_or_else(|| SheetgridError::Host("No window".to_string()))?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|_| SheetgridError::Host("requestAnimationFrame failed".to_string()))
}

fn start_frame_loop(inner: &Rc<HostInner>) -> Result<()> {
    let slot: FrameSlot = Rc::new(RefCell::new(None));
    let next = Rc::clone(&slot);
    let weak = Rc::downgrade(inner);
    *slot.borrow_mut() = Some(Closure::new(move |now: f64| {
        let Some(inner) = weak.upgrade().filter(|i| i.running.get()) else {
            // Drop our own handle; the closure is freed once it returns.
            let _ = next.borrow_mut().take();
            return;
        };
        inner.tick(now);
        if let Some(callback) = next.borrow().as_ref() {
            if let Err(err) = request_frame(callback) {
                tracing::debug!(%err, "frame loop stopped");
            }
        }
    }));
    let first = slot.borrow();
    if let Some(callback) = first.as_ref() {
        request_frame(callback)?;
    }
    Ok(())
}

fn listen(
    target: &EventTarget,
    name: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(EventTarget, &'static str, Closure<dyn FnMut(Event)>)> {
    let callback = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
        .map_err(|_| SheetgridError::Host(format!("Failed to listen for {name}")))?;
    Ok((target.clone(), name, callback))
}

fn pointer_event(canvas: &HtmlCanvasElement, event: &MouseEvent) -> PointerEvent {
    let rect = canvas.get_bounding_client_rect();
    PointerEvent {
        x: f64::from(event.client_x()) - rect.left(),
        y: f64::from(event.client_y()) - rect.top(),
        page_x: f64::from(event.page_x()),
        page_y: f64::from(event.page_y()),
        button: PointerButton::from_dom(event.button()),
    }
}

fn install_wiring(
    inner: &Rc<HostInner>,
    id: GridId,
    holder: &HtmlElement,
    canvas: &HtmlCanvasElement,
    document: &Document,
) -> Result<GridWiring> {
    let window = web_sys::window().ok_or_else(|| SheetgridError::Host("No window".to_string()))?;
    let canvas_target: &EventTarget = canvas;
    let window_target: &EventTarget = &window;
    let mut listeners = Vec::new();

    {
        let weak = Rc::downgrade(inner);
        let canvas = canvas.clone();
        listeners.push(listen(canvas_target, "mousedown", move |event| {
            let (Some(inner), Some(event)) = (weak.upgrade(), event.dyn_ref::<MouseEvent>())
            else {
                return;
            };
            let pointer = pointer_event(&canvas, event);
            inner.with_grid(id, |grid| grid.pointer_down(pointer));
        })?);
    }
    {
        let weak = Rc::downgrade(inner);
        let canvas = canvas.clone();
        listeners.push(listen(canvas_target, "mousemove", move |event| {
            let (Some(inner), Some(event)) = (weak.upgrade(), event.dyn_ref::<MouseEvent>())
            else {
                return;
            };
            let pointer = pointer_event(&canvas, event);
            inner.with_grid(id, |grid| grid.pointer_move(pointer));
        })?);
    }
    {
        // On the window so a drag released outside the canvas still ends.
        let weak = Rc::downgrade(inner);
        listeners.push(listen(window_target, "mouseup", move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.with_grid(id, Grid::pointer_up);
            }
        })?);
    }
    listeners.push(listen(canvas_target, "contextmenu", |event| {
        event.prevent_default();
        event.stop_propagation();
    })?);
    {
        let weak = Rc::downgrade(inner);
        listeners.push(listen(canvas_target, "wheel", move |event| {
            let (Some(inner), Some(event)) = (weak.upgrade(), event.dyn_ref::<WheelEvent>())
            else {
                return;
            };
            // The page must not scroll underneath the grid.
            event.prevent_default();
            let (dx, dy) = (event.delta_x(), event.delta_y());
            inner.with_grid(id, |grid| grid.wheel(dx, dy, now_ms()));
        })?);
    }

    let on_resize = {
        let weak = Rc::downgrade(inner);
        Closure::<dyn FnMut()>::new(move || {
            if let Some(inner) = weak.upgrade() {
                if let Ok(mut registry) = inner.registry.try_borrow_mut() {
                    registry.request_resize(id, now_ms());
                }
            }
        })
    };
    let resize_observer = web_sys::ResizeObserver::new(on_resize.as_ref().unchecked_ref())
        .map_err(|_| SheetgridError::Host("Failed to create ResizeObserver".to_string()))?;
    resize_observer.observe(holder);

    let on_mutation = {
        let weak = Rc::downgrade(inner);
        Closure::<dyn FnMut()>::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.attach_checks.borrow_mut().push(id);
            }
        })
    };
    let mutation_observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())
        .map_err(|_| SheetgridError::Host("Failed to create MutationObserver".to_string()))?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    let body = document
        .body()
        .ok_or_else(|| SheetgridError::Host("Document has no body".to_string()))?;
    mutation_observer
        .observe_with_options(&body, &init)
        .map_err(|_| SheetgridError::Host("Failed to observe document".to_string()))?;

    Ok(GridWiring {
        listeners,
        resize_observer,
        _on_resize: on_resize,
        mutation_observer,
        _on_mutation: on_mutation,
    })
}

// ============================================================================
// JS API
// ============================================================================

/// Owns every grid on the page and repaints them once per animation frame.
#[wasm_bindgen]
pub struct GridHost {
    inner: Rc<HostInner>,
}

#[wasm_bindgen]
impl GridHost {
    #[wasm_bindgen(constructor)]
    pub fn new() -> std::result::Result<GridHost, JsValue> {
        console_error_panic_hook::set_once();
        let inner = Rc::new(HostInner::new());
        start_frame_loop(&inner)?;
        Ok(GridHost { inner })
    }

    /// Create a grid filling `holder`. `options` is a plain object or
    /// `undefined`.
    pub fn create(
        &self,
        holder: HtmlElement,
        options: JsValue,
    ) -> std::result::Result<SheetGrid, JsValue> {
        let options = if options.is_null() || options.is_undefined() {
            GridOptions::default()
        } else {
            serde_wasm_bindgen::from_value::<GridOptions>(options)
                .map_err(SheetgridError::from)?
                .sanitized()
        };
        let document = holder
            .owner_document()
            .ok_or_else(|| SheetgridError::Host("Holder is not in a document".to_string()))?;
        let surface = CanvasSurface::create(&document)?;
        let canvas = surface.canvas().clone();
        holder
            .append_child(&canvas)
            .map_err(|_| SheetgridError::Host("Failed to insert canvas".to_string()))?;

        let host = WebHost {
            holder: holder.clone(),
            canvas: canvas.clone(),
        };
        let id = self
            .inner
            .registry
            .try_borrow_mut()
            .map_err(|_| SheetgridError::Host("Grid host is busy".to_string()))?
            .create(options, surface, Box::new(host));

        match install_wiring(&self.inner, id, &holder, &canvas, &document) {
            Ok(wiring) => {
                self.inner.wiring.borrow_mut().insert(id, wiring);
                tracing::debug!(grid = %id, "grid created");
                Ok(SheetGrid {
                    inner: Rc::clone(&self.inner),
                    id,
                })
            }
            Err(err) => {
                self.inner.detach(id);
                Err(err.into())
            }
        }
    }

    #[wasm_bindgen(js_name = gridCount)]
    pub fn grid_count(&self) -> usize {
        self.inner.registry.try_borrow().map_or(0, |r| r.len())
    }
}

impl Drop for GridHost {
    fn drop(&mut self) {
        self.inner.running.set(false);
    }
}

/// Handle to one grid.
#[wasm_bindgen]
pub struct SheetGrid {
    inner: Rc<HostInner>,
    id: GridId,
}

impl SheetGrid {
    fn update(
        &self,
        f: impl FnOnce(&mut Grid<CanvasSurface>),
    ) -> std::result::Result<(), JsValue> {
        let attached = self
            .inner
            .registry
            .try_borrow()
            .map_err(|_| SheetgridError::Host("Grid is busy".to_string()))?
            .contains(self.id);
        if attached && self.inner.with_grid(self.id, f).is_none() {
            return Err(SheetgridError::Host("Grid is busy".to_string()).into());
        }
        Ok(())
    }
}

#[wasm_bindgen]
impl SheetGrid {
    #[wasm_bindgen(js_name = setSize)]
    pub fn set_size(&self, rows: u32, columns: u32) -> std::result::Result<(), JsValue> {
        self.update(|grid| grid.set_size(rows, columns))
    }

    /// Column widths keyed by label; `undefined` clears them.
    #[wasm_bindgen(js_name = setColumnSizes)]
    pub fn set_column_sizes(&self, sizes: JsValue) -> std::result::Result<(), JsValue> {
        let sizes = js_to_json(sizes).map(|v| size_map(&v));
        self.update(|grid| grid.set_column_sizes(sizes))
    }

    /// Row heights keyed by row index; `undefined` clears them.
    #[wasm_bindgen(js_name = setRowSizes)]
    pub fn set_row_sizes(&self, sizes: JsValue) -> std::result::Result<(), JsValue> {
        let sizes = js_to_json(sizes).map(|v| row_size_map(&v));
        self.update(|grid| grid.set_row_sizes(sizes))
    }

    #[wasm_bindgen(js_name = setMinRow)]
    pub fn set_min_row(&self, min: JsValue) -> std::result::Result<(), JsValue> {
        let min = js_to_json(min).map_or(0, |v| value_to_index(&v));
        self.update(|grid| grid.set_min_row(min))
    }

    #[wasm_bindgen(js_name = setMinCol)]
    pub fn set_min_col(&self, min: JsValue) -> std::result::Result<(), JsValue> {
        let min = js_to_json(min).map_or(0, |v| value_to_index(&v));
        self.update(|grid| grid.set_min_col(min))
    }

    /// `{start, end, tmp}` or `null` to clear.
    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&self, selection: JsValue) -> std::result::Result<(), JsValue> {
        let selection = if selection.is_null() || selection.is_undefined() {
            None
        } else {
            Some(
                serde_wasm_bindgen::from_value::<Selection>(selection)
                    .map_err(SheetgridError::from)?,
            )
        };
        self.update(|grid| grid.set_selection(selection))
    }

    #[wasm_bindgen(js_name = dataChanged)]
    pub fn data_changed(&self) -> std::result::Result<(), JsValue> {
        self.update(Grid::data_changed)
    }

    /// Register (or with no function, remove) a callback: `resize`, `hover`,
    /// `contextMenu`, `selection` or `cellValue`.
    pub fn on(&self, event: &str, func: Option<Function>) -> std::result::Result<(), JsValue> {
        let outbox = Rc::clone(&self.inner.outbox);
        let observer = |func: Function| JsObserver { func, outbox };
        match event {
            "resize" => self.update(|grid| {
                let observer = func.map(|f| -> Box<dyn listeners::ResizeObserver> {
                    Box::new(observer(f))
                });
                grid.on_resize(observer);
            }),
            "hover" => self.update(|grid| {
                let observer =
                    func.map(|f| -> Box<dyn HoverObserver> { Box::new(observer(f)) });
                grid.on_hover(observer);
            }),
            "contextMenu" => self.update(|grid| {
                let observer =
                    func.map(|f| -> Box<dyn ContextMenuObserver> { Box::new(observer(f)) });
                grid.on_context_menu(observer);
            }),
            "selection" => self.update(|grid| {
                let observer =
                    func.map(|f| -> Box<dyn SelectionObserver> { Box::new(observer(f)) });
                grid.on_selection(observer);
            }),
            "cellValue" => self.update(|grid| {
                let provider =
                    func.map(|f| -> Box<dyn CellValueProvider> { Box::new(JsCellValues(f)) });
                grid.set_cell_value_provider(provider);
            }),
            other => Err(SheetgridError::Other(format!("Unknown event: {other}")).into()),
        }
    }

    /// Remove the grid from the page. Safe to call more than once.
    pub fn detach(&self) {
        self.inner.detach(self.id);
    }

    #[wasm_bindgen(getter)]
    pub fn attached(&self) -> bool {
        self.inner
            .registry
            .try_borrow()
            .is_ok_and(|r| r.grid(self.id).is_some_and(Grid::is_attached))
    }
}
