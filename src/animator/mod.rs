pub mod dock;
pub mod driver;
pub mod multi;


use crossbeam_channel::Sender;
use std::sync::Arc;

use crate::error::AnimError;
use crate::services::{Background, ExecutionContext, ImageLookup, Inline, PeriodicTimer};

pub use dock::DockIconAnimator;
pub use driver::AnimationDriver;
pub use multi::MultiAnimationDriver;

/// Asynchronous notifications from running drivers.
#[derive(Debug)]
pub enum AnimEvent {
    FrameFailed { label: String, error: AnimError },
    Finished { label: String },
}

/// Collaborators a driver needs, wired at the composition root.
#[derive(Clone)]
pub struct Services {
    pub lookup: Arc<dyn ImageLookup>,
    pub timer: Arc<dyn PeriodicTimer>,
    /// Where frames are resolved.
    pub background: Arc<dyn ExecutionContext>,
    /// Where surfaces are mutated.
    pub display: Arc<dyn ExecutionContext>,
    pub events: Option<Sender<AnimEvent>>,
}

impl Services {
    /// Lookups on the rayon pool and display updates inline on that same
    /// worker. Pass a [`crate::services::MainQueue`] through
    /// [`Services::with_display`] when the surface belongs to a UI thread.
    pub fn new(lookup: Arc<dyn ImageLookup>, timer: Arc<dyn PeriodicTimer>) -> Self {
        Self {
            lookup,
            timer,
            background: Arc::new(Background),
            display: Arc::new(Inline),
            events: None,
        }
    }

    pub fn with_background(mut self, context: Arc<dyn ExecutionContext>) -> Self {
        self.background = context;
        self
    }

    pub fn with_display(mut self, context: Arc<dyn ExecutionContext>) -> Self {
        self.display = context;
        self
    }

    pub fn with_events(mut self, events: Sender<AnimEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Everything runs on the thread that fires the timer.
    pub fn inline(lookup: Arc<dyn ImageLookup>, timer: Arc<dyn PeriodicTimer>) -> Self {
        Self::new(lookup, timer).with_background(Arc::new(Inline))
    }

    pub(crate) fn emit(&self, event: AnimEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}
