// Timer-driven frame animation for a single display surface

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{AnimEvent, Services};
use crate::config::AnimationOptions;
use crate::error::{AnimError, AnimResult};
use crate::model::frame_id::DEFAULT_PADDING;
use crate::model::sequence::{Advance, FrameSequence};
use crate::services::{FrameImage, TickFn, TimerHandle};
use crate::surface::DisplaySurface;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    /// Ids are logical names resolved by the lookup service.
    Named,
    /// Ids are file stems: `<dir>/<id>.<extension>`.
    Folder { dir: PathBuf, extension: String },
}

impl FrameSource {
    fn from_options(options: &AnimationOptions) -> Self {
        match &options.folder {
            Some(dir) => FrameSource::Folder {
                dir: dir.clone(),
                extension: options.image_type.clone(),
            },
            None => FrameSource::Named,
        }
    }

    pub fn path_for(&self, id: &str) -> Option<PathBuf> {
        match self {
            FrameSource::Named => None,
            FrameSource::Folder { dir, extension } => Some(dir.join(format!("{}.{}", id, extension))),
        }
    }
}

/// Cycles the frames of one [`FrameSequence`] into one [`DisplaySurface`].
///
/// Each tick advances the sequence, resolves the frame on the background
/// context and hands it to the surface on the display context. Ticks are
/// serialized: one that arrives while the previous frame is still being
/// resolved or presented is dropped. Once [`AnimationDriver::stop`] returns
/// the surface receives nothing more from this run, even from frames that
/// were already in flight.
pub struct AnimationDriver {
    inner: Arc<DriverInner>,
}

struct DriverInner {
    surface: Arc<dyn DisplaySurface>,
    services: Services,
    interval: Duration,
    looping: bool,
    source: FrameSource,
    state: Mutex<DriverState>,
    in_flight: AtomicBool,
}

struct DriverState {
    label: String,
    sequence: FrameSequence,
    timer: Option<TimerHandle>,
    // bumped on every start and stop; work from an older run is discarded
    generation: u64,
}

/// Marks a tick as in flight until dropped, wherever the job ends up.
struct InFlight(Arc<DriverInner>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}

impl AnimationDriver {
    pub fn new(
        surface: Arc<dyn DisplaySurface>,
        options: AnimationOptions,
        services: Services,
    ) -> AnimResult<Self> {
        let interval = options.interval()?;
        let inner = DriverInner {
            surface,
            services,
            interval,
            looping: options.looping,
            source: FrameSource::from_options(&options),
            state: Mutex::new(DriverState {
                label: "animation".to_string(),
                sequence: FrameSequence::new(),
                timer: None,
                generation: 0,
            }),
            in_flight: AtomicBool::new(false),
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Looping 30 fps driver populated by discovering `prefix00000`,
    /// `prefix00001`, ... until the first missing name.
    pub fn with_prefix(
        surface: Arc<dyn DisplaySurface>,
        prefix: &str,
        services: Services,
    ) -> AnimResult<Self> {
        let driver = Self::new(surface, AnimationOptions::default(), services)?;
        driver.set_label(prefix);
        let found = driver.auto_add_ids(prefix, 0, DEFAULT_PADDING);
        log::debug!("Discovered {} frames for prefix '{}'", found, prefix);
        Ok(driver)
    }

    pub fn set_label(&self, label: impl Into<String>) {
        self.inner.state().label = label.into();
    }

    pub fn label(&self) -> String {
        self.inner.state().label.clone()
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

    /// Probes through this driver's frame source and returns how many ids
    /// were added.
    pub fn auto_add_ids(&self, prefix: &str, start: u32, padding: usize) -> usize {
        // probe without holding the lock, lookups may decode from disk
        let mut found = FrameSequence::new();
        let inner = &self.inner;
        found.auto_add_ids(prefix, start, padding, |name| inner.probe(name));

        let mut state = self.inner.state();
        for id in found.ids() {
            state.sequence.add_id(id.as_str());
        }
        found.len()
    }

    pub fn remove_all_ids(&self) {
        self.inner.state().sequence.remove_all_ids();
    }

    pub fn start(&self) -> AnimResult<()> {
        let mut state = self.inner.state();
        if state.sequence.is_empty() {
            return Err(AnimError::EmptySequence);
        }

        if let Some(previous) = state.timer.take() {
            log::debug!("[{}] restarting, cancelling previous timer", state.label);
            previous.cancel();
        }
        if !self.inner.looping && (state.sequence.is_exhausted() || state.sequence.is_at_last()) {
            state.sequence.rewind();
        }

        state.generation += 1;
        let generation = state.generation;
        let weak = Arc::downgrade(&self.inner);
        let callback: TickFn = Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_tick(generation);
            }
        });
        let handle = self.inner.services.timer.schedule(self.inner.interval, callback)?;
        state.timer = Some(handle);

        log::info!(
            "[{}] started: {} frames every {:?}",
            state.label,
            state.sequence.len(),
            self.inner.interval
        );
        Ok(())
    }

    pub fn stop(&self) {
        let handle = {
            let mut state = self.inner.state();
            let handle = state.timer.take();
            if handle.is_some() {
                state.generation += 1;
                log::info!("[{}] stopped", state.label);
            }
            handle
        };
        drop(handle);
    }

    pub fn is_running(&self) -> bool {
        self.inner.state().timer.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    pub fn looping(&self) -> bool {
        self.inner.looping
    }

    pub fn source(&self) -> &FrameSource {
        &self.inner.source
    }

    pub fn frame_count(&self) -> usize {
        self.inner.state().sequence.len()
    }

    pub fn ids(&self) -> Vec<String> {
        self.inner.state().sequence.ids().to_vec()
    }

    /// Id of the frame most recently advanced to.
    pub fn current_id(&self) -> Option<String> {
        self.inner.state().sequence.current().map(str::to_string)
    }

    pub fn surface(&self) -> Arc<dyn DisplaySurface> {
        Arc::clone(&self.inner.surface)
    }
}

impl Drop for AnimationDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

impl DriverInner {
    fn state(&self) -> MutexGuard<'_, DriverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn probe(&self, name: &str) -> bool {
        match self.source.path_for(name) {
            Some(path) => self.services.lookup.image_at_path(&path).is_some(),
            None => self.services.lookup.image_named(name).is_some(),
        }
    }

    fn resolve(&self, id: &str) -> AnimResult<Option<FrameImage>> {
        match self.source.path_for(id) {
            None => Ok(self.services.lookup.image_named(id)),
            Some(path) => match self.services.lookup.image_at_path(&path) {
                Some(image) => Ok(Some(image)),
                None => Err(AnimError::FrameUnresolved {
                    id: id.to_string(),
                    path: Some(path),
                }),
            },
        }
    }

    fn on_tick(self: &Arc<Self>, generation: u64) {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            log::debug!("[{}] previous frame still in flight, dropping tick", self.state().label);
            return;
        }
        let guard = InFlight(Arc::clone(self));

        let step = {
            let mut state = self.state();
            if state.generation != generation || state.timer.is_none() {
                return;
            }
            state.sequence.advance(self.looping)
        };

        let id = match step {
            Advance::Frame { id, .. } => id,
            Advance::Exhausted => {
                drop(guard);
                self.finish(generation);
                return;
            }
        };

        self.services
            .background
            .execute(Box::new(move || Self::resolve_frame(guard, generation, id)));
    }

    fn resolve_frame(guard: InFlight, generation: u64, id: String) {
        let inner = Arc::clone(&guard.0);
        match inner.resolve(&id) {
            Ok(Some(image)) => {
                inner
                    .services
                    .display
                    .execute(Box::new(move || Self::present(guard, generation, image)));
            }
            Ok(None) => {
                log::debug!("[{}] frame '{}' not found, keeping previous image", inner.state().label, id);
            }
            Err(error) => {
                let label = inner.state().label.clone();
                log::warn!("[{}] {}", label, error);
                inner.services.emit(AnimEvent::FrameFailed { label, error });
            }
        }
    }

    fn present(guard: InFlight, generation: u64, image: FrameImage) {
        let inner = Arc::clone(&guard.0);
        let finished = {
            let state = inner.state();
            if state.generation != generation || state.timer.is_none() {
                log::debug!("[{}] discarding frame from a stopped run", state.label);
                return;
            }
            inner.surface.set_image(image);
            !inner.looping && state.sequence.is_at_last()
        };
        drop(guard);

        if finished {
            inner.finish(generation);
        }
    }

    /// Natural end of a non-looping run.
    fn finish(&self, generation: u64) {
        let (handle, label) = {
            let mut state = self.state();
            if state.generation != generation {
                return;
            }
            state.generation += 1;
            (state.timer.take(), state.label.clone())
        };
        drop(handle);

        log::info!("[{}] finished", label);
        self.services.emit(AnimEvent::Finished { label });
    }
}
