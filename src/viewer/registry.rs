//! Grid registry and frame scheduler.
//!
//! The registry owns every live grid together with the shared image cache.
//! The host drives it by calling [`GridRegistry::tick`] once per animation
//! frame; a tick applies debounced resizes, repaints dirty grids and hands
//! newly requested image URLs to the [`ImageLoader`].

use std::collections::{BTreeMap, HashMap};

use super::{Grid, HostElement};
use crate::render::{ImageCache, Surface, DEFAULT_IMAGE_CAPACITY};
use crate::types::{GridId, GridOptions};

/// Quiet period before a requested resize is applied.
pub const RESIZE_DEBOUNCE_MS: f64 = 40.0;

/// Starts and cancels image loads. Results come back through
/// [`GridRegistry::image_loaded`] and [`GridRegistry::image_failed`].
pub trait ImageLoader {
    fn load(&mut self, url: &str);

    /// Nobody waits for `url` any more.
    fn cancel(&mut self, _url: &str) {}
}

pub struct GridRegistry<S: Surface> {
    next_id: u64,
    grids: BTreeMap<GridId, Grid<S>>,
    images: ImageCache<S::Image>,
    loader: Option<Box<dyn ImageLoader>>,
    /// Grid id → time at which its pending resize becomes due.
    resize_due: HashMap<GridId, f64>,
}

impl<S: Surface> Default for GridRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Surface> GridRegistry<S> {
    pub fn new() -> Self {
        Self::with_image_capacity(DEFAULT_IMAGE_CAPACITY)
    }

    pub fn with_image_capacity(capacity: usize) -> Self {
        Self {
            next_id: 1,
            grids: BTreeMap::new(),
            images: ImageCache::new(capacity),
            loader: None,
            resize_due: HashMap::new(),
        }
    }

    pub fn set_image_loader(&mut self, loader: Box<dyn ImageLoader>) {
        self.loader = Some(loader);
    }

    /// Create a grid and attach it to `surface` inside `host`.
    pub fn create(
        &mut self,
        options: GridOptions,
        surface: S,
        host: Box<dyn HostElement>,
    ) -> GridId {
        let id = GridId(self.next_id);
        self.next_id += 1;
        let mut grid = Grid::new(id, options);
        grid.attach(surface, host);
        self.grids.insert(id, grid);
        id
    }

    pub fn grid(&self, id: GridId) -> Option<&Grid<S>> {
        self.grids.get(&id)
    }

    pub fn grid_mut(&mut self, id: GridId) -> Option<&mut Grid<S>> {
        self.grids.get_mut(&id)
    }

    pub fn contains(&self, id: GridId) -> bool {
        self.grids.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = GridId> + '_ {
        self.grids.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    pub fn images(&self) -> &ImageCache<S::Image> {
        &self.images
    }

    /// Detach a grid and drop it from the scheduler. Loads only it was
    /// waiting for are cancelled. Returns false when `id` is unknown, so a
    /// second call is a no-op.
    pub fn detach(&mut self, id: GridId) -> bool {
        let Some(mut grid) = self.grids.remove(&id) else {
            return false;
        };
        grid.detach();
        self.resize_due.remove(&id);
        for url in self.images.release_waiter(id) {
            tracing::debug!(grid = %id, url = %url, "image load cancelled");
            if let Some(loader) = self.loader.as_mut() {
                loader.cancel(&url);
            }
        }
        true
    }

    /// Detach `id` if its host no longer holds it. Returns whether it is
    /// still attached.
    pub fn check_attached(&mut self, id: GridId) -> bool {
        let attached = self
            .grids
            .get_mut(&id)
            .is_some_and(|grid| grid.check_attached());
        if !attached {
            self.detach(id);
        }
        attached
    }

    /// Ask for a resize; repeated requests push the deadline back.
    pub fn request_resize(&mut self, id: GridId, now_ms: f64) {
        if self.grids.contains_key(&id) {
            self.resize_due.insert(id, now_ms + RESIZE_DEBOUNCE_MS);
        }
    }

    pub fn resize_pending(&self, id: GridId) -> bool {
        self.resize_due.contains_key(&id)
    }

    /// Run one scheduler frame. Returns how many grids were repainted.
    pub fn tick(&mut self, now_ms: f64) -> usize {
        let due: Vec<GridId> = self
            .resize_due
            .iter()
            .filter(|&(_, &at)| at <= now_ms)
            .map(|(&id, _)| id)
            .collect();
        for id in due {
            self.resize_due.remove(&id);
            if let Some(grid) = self.grids.get_mut(&id) {
                grid.resize();
            }
        }

        let mut painted = 0;
        for grid in self.grids.values_mut() {
            if grid.render(&mut self.images).is_some() {
                painted += 1;
            }
        }

        let requests = self.images.take_requests();
        if !requests.is_empty() {
            match self.loader.as_mut() {
                Some(loader) => {
                    for url in &requests {
                        tracing::debug!(url = %url, "image requested");
                        loader.load(url);
                    }
                }
                None => tracing::debug!(count = requests.len(), "no image loader installed"),
            }
        }

        painted
    }

    /// A load finished; grids that drew without it repaint next tick.
    pub fn image_loaded(&mut self, url: &str, image: S::Image) {
        let waiters = self.images.complete(url, image);
        tracing::debug!(url = %url, waiters = waiters.len(), "image loaded");
        self.mark_dirty(&waiters);
    }

    /// A load failed; the URL is not retried.
    pub fn image_failed(&mut self, url: &str) {
        let waiters = self.images.fail(url);
        tracing::debug!(url = %url, waiters = waiters.len(), "image failed");
        self.mark_dirty(&waiters);
    }

    fn mark_dirty(&mut self, ids: &[GridId]) {
        for id in ids {
            if let Some(grid) = self.grids.get_mut(id) {
                grid.mark_dirty();
            }
        }
    }
}

impl<S: Surface> std::fmt::Debug for GridRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridRegistry")
            .field("grids", &self.grids.keys().collect::<Vec<_>>())
            .field("resize_due", &self.resize_due)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::layout::Rect;
    use crate::render::TextStyle;
    use crate::types::CellValue;

    #[derive(Default)]
    struct CountingSurface {
        frames: Rc<Cell<usize>>,
    }

    impl Surface for CountingSurface {
        type Image = String;
        fn set_size(&mut self, _: u32, _: u32) {
            self.frames.set(self.frames.get() + 1);
        }
        fn clear_rect(&mut self, _: Rect) {}
        fn fill_rect(&mut self, _: Rect, _: &str) {}
        fn stroke_path(&mut self, _: &[(f64, f64)], _: &str, _: f64) {}
        fn set_font(&mut self, _: &str) {}
        fn measure_text(&mut self, _: &str) -> f64 {
            0.0
        }
        fn fill_text(&mut self, _: &str, _: f64, _: f64, _: TextStyle<'_>) {}
        fn draw_image(&mut self, _: &String, _: Rect) {}
    }

    struct Host {
        size: Rc<Cell<(f64, f64)>>,
        attached: Rc<Cell<bool>>,
    }

    impl HostElement for Host {
        fn size(&self) -> (f64, f64) {
            self.size.get()
        }
        fn device_pixel_ratio(&self) -> f64 {
            1.0
        }
        fn is_attached(&self) -> bool {
            self.attached.get()
        }
    }

    #[derive(Clone, Default)]
    struct RecordingLoader {
        loads: Rc<RefCell<Vec<String>>>,
        cancels: Rc<RefCell<Vec<String>>>,
    }

    impl ImageLoader for RecordingLoader {
        fn load(&mut self, url: &str) {
            self.loads.borrow_mut().push(url.to_string());
        }
        fn cancel(&mut self, url: &str) {
            self.cancels.borrow_mut().push(url.to_string());
        }
    }

    struct Fixture {
        registry: GridRegistry<CountingSurface>,
        frames: Rc<Cell<usize>>,
        size: Rc<Cell<(f64, f64)>>,
        attached: Rc<Cell<bool>>,
    }

    fn fixture() -> (Fixture, GridId) {
        let frames = Rc::new(Cell::new(0));
        let size = Rc::new(Cell::new((500.0, 300.0)));
        let attached = Rc::new(Cell::new(true));
        let mut registry = GridRegistry::new();
        let id = registry.create(
            GridOptions::default(),
            CountingSurface {
                frames: Rc::clone(&frames),
            },
            Box::new(Host {
                size: Rc::clone(&size),
                attached: Rc::clone(&attached),
            }),
        );
        (
            Fixture {
                registry,
                frames,
                size,
                attached,
            },
            id,
        )
    }

    #[test]
    fn only_dirty_grids_repaint() {
        let (mut fx, id) = fixture();
        assert_eq!(fx.registry.tick(0.0), 1);
        assert_eq!(fx.registry.tick(16.0), 0);
        fx.registry.grid_mut(id).unwrap().set_size(10, 5);
        assert_eq!(fx.registry.tick(32.0), 1);
        assert_eq!(fx.frames.get(), 2);
    }

    #[test]
    fn resize_is_debounced() {
        let (mut fx, id) = fixture();
        fx.registry.tick(0.0);
        fx.size.set((800.0, 600.0));

        fx.registry.request_resize(id, 100.0);
        fx.registry.request_resize(id, 120.0);
        fx.registry.tick(150.0);
        assert_eq!(fx.registry.grid(id).unwrap().viewport().width, 500.0);
        assert!(fx.registry.resize_pending(id));

        assert_eq!(fx.registry.tick(160.0), 1);
        assert_eq!(fx.registry.grid(id).unwrap().viewport().width, 800.0);
        assert!(!fx.registry.resize_pending(id));
    }

    #[test]
    fn images_load_then_repaint_waiters() {
        let (mut fx, id) = fixture();
        let loader = RecordingLoader::default();
        fx.registry.set_image_loader(Box::new(loader.clone()));
        fx.registry
            .grid_mut(id)
            .unwrap()
            .set_cell_value_provider(Some(Box::new(|_: &str, col: &str, row: u32| {
                (col == "A" && row == 0).then(|| CellValue {
                    image_url: Some("logo.png".to_string()),
                    ..CellValue::default()
                })
            })));

        fx.registry.tick(0.0);
        assert_eq!(loader.loads.borrow().as_slice(), &["logo.png".to_string()]);
        assert!(fx.registry.images().is_pending("logo.png"));
        assert_eq!(fx.registry.tick(16.0), 0);

        fx.registry.image_loaded("logo.png", "pixels".to_string());
        assert!(fx.registry.images().is_loaded("logo.png"));
        assert_eq!(fx.registry.tick(32.0), 1);
        assert_eq!(loader.loads.borrow().len(), 1);
    }

    #[test]
    fn detach_cancels_abandoned_loads_and_is_idempotent() {
        let (mut fx, id) = fixture();
        let loader = RecordingLoader::default();
        fx.registry.set_image_loader(Box::new(loader.clone()));
        fx.registry
            .grid_mut(id)
            .unwrap()
            .set_cell_value_provider(Some(Box::new(|_: &str, _: &str, _: u32| {
                Some(CellValue {
                    image_url: Some("big.png".to_string()),
                    ..CellValue::default()
                })
            })));
        fx.registry.tick(0.0);

        assert!(fx.registry.detach(id));
        assert!(!fx.registry.detach(id));
        assert!(fx.registry.is_empty());
        assert_eq!(loader.cancels.borrow().as_slice(), &["big.png".to_string()]);
        assert!(!fx.registry.images().is_pending("big.png"));
    }

    #[test]
    fn host_removal_detaches() {
        let (mut fx, id) = fixture();
        assert!(fx.registry.check_attached(id));
        fx.attached.set(false);
        assert!(!fx.registry.check_attached(id));
        assert!(!fx.registry.contains(id));
        assert_eq!(fx.registry.tick(0.0), 0);
    }

    #[test]
    fn ids_are_unique() {
        let (mut fx, first) = fixture();
        let second = fx.registry.create(
            GridOptions::default(),
            CountingSurface::default(),
            Box::new(Host {
                size: Rc::clone(&fx.size),
                attached: Rc::clone(&fx.attached),
            }),
        );
        assert_ne!(first, second);
        assert_eq!(fx.registry.ids().collect::<Vec<_>>(), vec![first, second]);
    }
}
