//! Responsive scale controller.
//!
//! Keeps the on-screen scale of the fixed 1920x1080 canvas in step with
//! the viewport. The scale is a pure function of the current geometry
//! and the full-screen flag; it is recomputed whenever either changes.
//! Content coordinates and exports never see it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use log::{debug, warn};

use crate::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Margin kept around the canvas in full-screen mode
pub const FULL_SCREEN_FILL: f64 = 0.95;

/// Sizes the scale depends on, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportGeometry {
    /// Width of the 16:9 box hosting the canvas in windowed mode
    pub container_width: f64,
    pub window_width: f64,
    pub window_height: f64,
}

/// A window exactly the size of the canvas
impl Default for ViewportGeometry {
    fn default() -> Self {
        Self::new(CANVAS_WIDTH as f64, CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64)
    }
}

impl ViewportGeometry {
    pub fn new(container_width: f64, window_width: f64, window_height: f64) -> Self {
        Self { container_width, window_width, window_height }
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Scale that fits the canvas into `geom`.
///
/// Windowed: the canvas fills the container width exactly. Full screen:
/// the canvas fits inside the window with a 5% margin on the binding side.
/// Returns `None` when the relevant dimensions are not positive.
pub fn scale_factor(geom: &ViewportGeometry, is_full_screen: bool) -> Option<f64> {
    let (cw, ch) = (CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64);
    if is_full_screen {
        if !positive(geom.window_width) || !positive(geom.window_height) {
            return None;
        }
        Some((geom.window_width / cw).min(geom.window_height / ch) * FULL_SCREEN_FILL)
    } else {
        if !positive(geom.container_width) {
            return None;
        }
        Some(geom.container_width / cw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub is_full_screen: bool,
    /// Always > 0
    pub scale_factor: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self { is_full_screen: false, scale_factor: 1.0 }
    }
}

impl ViewportState {
    /// On-screen size of the scaled canvas
    pub fn footprint(&self) -> (f64, f64) {
        (
            CANVAS_WIDTH as f64 * self.scale_factor,
            CANVAS_HEIGHT as f64 * self.scale_factor,
        )
    }

    /// Top-left of the scaled canvas when centered in a `width`x`height` box
    pub fn display_origin(&self, width: f64, height: f64) -> (f64, f64) {
        let (w, h) = self.footprint();
        ((width - w) / 2.0, (height - h) / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    WindowResized { width: f64, height: f64 },
    ContainerResized { width: f64 },
}

type Listener = Box<dyn Fn(&ViewportEvent) + Send + Sync>;
type Listeners = Mutex<Vec<(u64, Listener)>>;

fn lock(listeners: &Listeners) -> MutexGuard<'_, Vec<(u64, Listener)>> {
    match listeners.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Broadcasts resize events to subscribers.
///
/// Listeners run synchronously inside [`ViewportEvents::emit`] and must
/// not subscribe or emit on the same hub.
#[derive(Default)]
pub struct ViewportEvents {
    listeners: Arc<Listeners>,
    next_id: AtomicU64,
}

impl ViewportEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ViewportEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners).push((id, Box::new(listener)));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn emit(&self, event: ViewportEvent) {
        for (_, listener) in lock(&self.listeners).iter() {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}

/// Registration handle; dropping it removes the listener
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).retain(|(id, _)| *id != self.id);
        }
    }
}

/// Current geometry plus the scale derived from it.
///
/// Owned directly by a session, or shared with event listeners through a
/// [`ScaleController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTracker {
    geometry: ViewportGeometry,
    state: ViewportState,
}

impl ViewportTracker {
    pub fn new(geometry: ViewportGeometry, is_full_screen: bool) -> Self {
        let mut tracker = Self {
            geometry,
            state: ViewportState { is_full_screen, ..Default::default() },
        };
        tracker.recompute();
        tracker
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn geometry(&self) -> ViewportGeometry {
        self.geometry
    }

    pub fn set_full_screen(&mut self, on: bool) {
        if self.state.is_full_screen != on {
            self.state.is_full_screen = on;
            self.recompute();
        }
    }

    fn recompute(&mut self) {
        match scale_factor(&self.geometry, self.state.is_full_screen) {
            Some(s) => {
                debug!("Viewport scale -> {:.4} (full screen: {})", s, self.state.is_full_screen);
                self.state.scale_factor = s;
            }
            None => warn!("Ignoring degenerate viewport geometry {:?}", self.geometry),
        }
    }

    /// Apply a resize event. Non-positive or non-finite sizes are ignored.
    pub fn handle(&mut self, event: &ViewportEvent) {
        let previous = self.geometry;
        match *event {
            ViewportEvent::WindowResized { width, height } => {
                if !positive(width) || !positive(height) {
                    warn!("Ignoring window resize to {}x{}", width, height);
                    return;
                }
                self.geometry.window_width = width;
                self.geometry.window_height = height;
            }
            ViewportEvent::ContainerResized { width } => {
                if !positive(width) {
                    warn!("Ignoring container resize to {}", width);
                    return;
                }
                self.geometry.container_width = width;
            }
        }
        if self.geometry != previous {
            self.recompute();
        }
    }
}

/// Live scale tracking for one mounted view.
///
/// Listens to window and container resizes from mount until it is
/// unmounted or dropped.
pub struct ScaleController {
    tracked: Arc<Mutex<ViewportTracker>>,
    subscriptions: Vec<Subscription>,
}

impl ScaleController {
    pub fn mount(
        window: &ViewportEvents,
        container: &ViewportEvents,
        geometry: ViewportGeometry,
        is_full_screen: bool,
    ) -> Self {
        let tracked = Arc::new(Mutex::new(ViewportTracker::new(geometry, is_full_screen)));
        let subscriptions = [window, container]
            .into_iter()
            .map(|hub| {
                let t = Arc::clone(&tracked);
                hub.subscribe(move |event| with_tracked(&t, |tr| tr.handle(event)))
            })
            .collect();

        Self { tracked, subscriptions }
    }

    pub fn set_full_screen(&self, on: bool) {
        with_tracked(&self.tracked, |t| t.set_full_screen(on));
    }

    pub fn state(&self) -> ViewportState {
        with_tracked(&self.tracked, |t| t.state())
    }

    pub fn geometry(&self) -> ViewportGeometry {
        with_tracked(&self.tracked, |t| t.geometry())
    }

    /// Stop listening; returns the last state
    pub fn unmount(mut self) -> ViewportState {
        self.subscriptions.clear();
        self.state()
    }
}

fn with_tracked<R>(tracked: &Mutex<ViewportTracker>, f: impl FnOnce(&mut ViewportTracker) -> R) -> R {
    let mut guard = match tracked.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    f(&mut guard)
}
