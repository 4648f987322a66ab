// Several independently sequenced drivers started and stopped together

use std::sync::Arc;

use super::{AnimationDriver, Services};
use crate::config::{AnimationOptions, SequenceConfig};
use crate::error::{AnimError, AnimResult};
use crate::surface::DisplaySurface;

/// One driver per id prefix. The first draws into the surface it was given,
/// each of the others into a clone of it. Drivers keep their own timers and
/// cursors; nothing keeps them in step.
pub struct MultiAnimationDriver {
    drivers: Vec<AnimationDriver>,
}

impl MultiAnimationDriver {
    /// One looping 30 fps driver per prefix, each discovering its frames
    /// from index 0 with the default padding.
    pub fn new<S: AsRef<str>>(
        surface: Arc<dyn DisplaySurface>,
        prefixes: &[S],
        services: Services,
        autostart: bool,
    ) -> AnimResult<Self> {
        let multi = Self::build(surface, prefixes, |target, prefix| {
            AnimationDriver::with_prefix(target, prefix.as_ref(), services.clone())
        })?;
        if autostart {
            multi.start()?;
        }
        Ok(multi)
    }

    /// Like [`Self::new`], with shared playback options and a start index
    /// and padding per sequence.
    pub fn from_sequences(
        surface: Arc<dyn DisplaySurface>,
        sequences: &[SequenceConfig],
        options: &AnimationOptions,
        services: Services,
        autostart: bool,
    ) -> AnimResult<Self> {
        let multi = Self::build(surface, sequences, |target, seq| {
            let driver = AnimationDriver::new(target, options.clone(), services.clone())?;
            driver.set_label(seq.prefix.as_str());
            driver.auto_add_ids(&seq.prefix, seq.start, seq.padding);
            Ok(driver)
        })?;
        if autostart {
            multi.start()?;
        }
        Ok(multi)
    }

    fn build<T, F>(surface: Arc<dyn DisplaySurface>, items: &[T], mut make: F) -> AnimResult<Self>
    where
        F: FnMut(Arc<dyn DisplaySurface>, &T) -> AnimResult<AnimationDriver>,
    {
        let Some((first, rest)) = items.split_first() else {
            return Err(AnimError::NoSequences);
        };

        let mut drivers = Vec::with_capacity(items.len());
        drivers.push(make(Arc::clone(&surface), first)?);
        for item in rest {
            drivers.push(make(surface.clone_surface(), item)?);
        }
        Ok(Self { drivers })
    }

    /// Starts every driver, or none of them if any has no frames.
    pub fn start(&self) -> AnimResult<()> {
        if let Some(empty) = self.drivers.iter().find(|d| d.frame_count() == 0) {
            log::warn!("Sequence '{}' has no frames, not starting", empty.label());
            return Err(AnimError::EmptySequence);
        }
        for driver in &self.drivers {
            driver.start()?;
        }
        Ok(())
    }

    pub fn stop(&self) {
        for driver in &self.drivers {
            driver.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.drivers.iter().any(AnimationDriver::is_running)
    }

    pub fn drivers(&self) -> &[AnimationDriver] {
        &self.drivers
    }

    pub fn surfaces(&self) -> Vec<Arc<dyn DisplaySurface>> {
        self.drivers.iter().map(AnimationDriver::surface).collect()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}
