// Application icon animation

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock};
use std::time::Duration;

use crate::error::{AnimError, AnimResult};
use crate::model::sequence::{Advance, FrameSequence};
use crate::services::{ImageLookup, PeriodicTimer, TickFn, TimerHandle};
use crate::surface::{IconSurface, IconView};

pub const DEFAULT_DOCK_INTERVAL: Duration = Duration::from_millis(100);

static SHARED: OnceLock<DockIconAnimator> = OnceLock::new();

/// Animates the shared application icon. Always loops.
///
/// The animator never decodes frames itself: a tick only publishes the next
/// id and asks the surface to redraw, and the installed [`IconView`]
/// resolves that id when drawn. All state sits behind one mutex, and redraws
/// are requested while holding it, so a `stop` cannot be overtaken by a tick
/// that was already running.
pub struct DockIconAnimator {
    inner: Arc<DockInner>,
}

struct DockInner {
    surface: Arc<dyn IconSurface>,
    lookup: Arc<dyn ImageLookup>,
    timer: Arc<dyn PeriodicTimer>,
    current_id: Arc<RwLock<String>>,
    state: Mutex<DockState>,
}

struct DockState {
    interval: Duration,
    sequence: FrameSequence,
    timer: Option<TimerHandle>,
    generation: u64,
}

impl DockIconAnimator {
    pub fn new(
        surface: Arc<dyn IconSurface>,
        lookup: Arc<dyn ImageLookup>,
        timer: Arc<dyn PeriodicTimer>,
    ) -> Self {
        Self {
            inner: Arc::new(DockInner {
                surface,
                lookup,
                timer,
                current_id: Arc::new(RwLock::new(String::new())),
                state: Mutex::new(DockState {
                    interval: DEFAULT_DOCK_INTERVAL,
                    sequence: FrameSequence::new(),
                    timer: None,
                    generation: 0,
                }),
            }),
        }
    }

    /// Makes this animator the process-wide one returned by [`Self::shared`].
    pub fn install_shared(self) -> AnimResult<&'static DockIconAnimator> {
        SHARED.set(self).map_err(|_| AnimError::AlreadyInstalled)?;
        SHARED.get().ok_or(AnimError::AlreadyInstalled)
    }

    pub fn shared() -> Option<&'static DockIconAnimator> {
        SHARED.get()
    }

    pub fn add_id(&self, id: impl Into<String>) {
        self.inner.state().sequence.add_id(id);
    }

    pub fn add_batch_ids(&self, prefix: &str, start: u32, end: u32, padding: usize) -> AnimResult<()> {
        self.inner
            .state()
            .sequence
            .add_batch_ids(prefix, start, end, padding)
    }

    /// Takes effect on the next `start`.
    pub fn set_interval(&self, interval: Duration) -> AnimResult<()> {
        if interval.is_zero() {
            return Err(AnimError::InvalidInterval(0.0));
        }
        self.inner.state().interval = interval;
        Ok(())
    }

    pub fn start(&self) -> AnimResult<()> {
        let inner = &self.inner;
        let mut state = inner.state();

        let first = state
            .sequence
            .ids()
            .first()
            .cloned()
            .ok_or(AnimError::EmptySequence)?;
        let image = inner
            .lookup
            .image_named(&first)
            .ok_or_else(|| AnimError::FrameUnresolved {
                id: first.clone(),
                path: None,
            })?;

        if let Some(previous) = state.timer.take() {
            previous.cancel();
        }
        state.generation += 1;
        let generation = state.generation;
        let weak = Arc::downgrade(inner);
        let callback: TickFn = Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_tick(generation);
            }
        });
        // ticks wait on the state lock, so the view is in place before the first one
        let handle = inner.timer.schedule(state.interval, callback)?;
        state.timer = Some(handle);

        let view = IconView::new(
            (image.width(), image.height()),
            Arc::clone(&inner.current_id),
            Arc::clone(&inner.lookup),
        );
        inner.surface.set_content_view(Arc::new(view));
        {
            let mut current = inner.current_id.write().unwrap_or_else(PoisonError::into_inner);
            if current.is_empty() {
                *current = first;
            }
        }

        log::info!(
            "Dock animation started: {} frames every {:?}",
            state.sequence.len(),
            state.interval
        );
        Ok(())
    }

    /// Stops and leaves the icon on the first frame.
    pub fn stop(&self) {
        let inner = &self.inner;
        let mut state = inner.state();
        if let Some(handle) = state.timer.take() {
            handle.cancel();
            log::info!("Dock animation stopped");
        }
        state.generation += 1;

        state.sequence.seek_first();
        let Some(first) = state.sequence.current().map(str::to_string) else {
            return;
        };
        inner.publish(first);
        inner.surface.request_redraw();
    }

    pub fn is_running(&self) -> bool {
        self.inner.state().timer.is_some()
    }

    /// Id the icon is showing, empty before the first start.
    pub fn current_id(&self) -> String {
        self.inner
            .current_id
            .read()
            .map(|id| id.clone())
            .unwrap_or_default()
    }

    pub fn ids(&self) -> Vec<String> {
        self.inner.state().sequence.ids().to_vec()
    }
}

impl Drop for DockIconAnimator {
    fn drop(&mut self) {
        if let Some(handle) = self.inner.state().timer.take() {
            handle.cancel();
        }
    }
}

impl DockInner {
    fn state(&self) -> MutexGuard<'_, DockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, id: String) {
        *self.current_id.write().unwrap_or_else(PoisonError::into_inner) = id;
    }

    fn on_tick(&self, generation: u64) {
        let mut state = self.state();
        if state.generation != generation || state.timer.is_none() {
            return;
        }
        match state.sequence.advance(true) {
            Advance::Frame { id, .. } => {
                log::trace!("Dock frame {}", id);
                self.publish(id);
                self.surface.request_redraw();
            }
            Advance::Exhausted => {}
        }
    }
}
