// Name- and path-keyed image lookup with memoization

use image::DynamicImage;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

/// Decoded frame shared between the cache, drivers and surfaces.
pub type FrameImage = Arc<DynamicImage>;

/// Resolves frame ids to decoded images. Implementations are shared by every
/// driver and must tolerate concurrent calls.
pub trait ImageLookup: Send + Sync {
    fn image_named(&self, name: &str) -> Option<FrameImage>;

    fn image_at_path(&self, path: &Path) -> Option<FrameImage>;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum CacheKey {
    Name(String),
    Path(PathBuf),
}

type Slot = Arc<Mutex<Option<FrameImage>>>;

/// Default [`ImageLookup`].
///
/// Named images are either registered up front or read from
/// `<root>/<name>.<extension>` under each search root, in order. Every key
/// owns a slot lock, so concurrent misses on the same key decode it once
/// while other keys proceed in parallel. Misses are not memoized, which lets
/// frames written after startup show up on the next lookup.
pub struct ImageCache {
    roots: Vec<PathBuf>,
    extension: String,
    registered: RwLock<HashMap<String, FrameImage>>,
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            extension: "png".to_string(),
            registered: RwLock::new(HashMap::new()),
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn register(&self, name: impl Into<String>, image: DynamicImage) {
        if let Ok(mut registered) = self.registered.write() {
            registered.insert(name.into(), Arc::new(image));
        }
    }

    /// Number of decoded entries currently memoized.
    pub fn cached_len(&self) -> usize {
        let Ok(slots) = self.slots.lock() else {
            return 0;
        };
        slots
            .values()
            .filter(|slot| slot.lock().map(|s| s.is_some()).unwrap_or(false))
            .count()
    }

    /// Decodes the given names on the rayon pool and returns how many
    /// resolved.
    pub fn preload(&self, names: &[String]) -> usize {
        names
            .par_iter()
            .filter(|name| self.image_named(name).is_some())
            .count()
    }

    fn slot(&self, key: CacheKey) -> Option<Slot> {
        let mut slots = self.slots.lock().ok()?;
        Some(Arc::clone(slots.entry(key).or_default()))
    }

    fn get_or_decode<F>(&self, key: CacheKey, decode: F) -> Option<FrameImage>
    where
        F: FnOnce() -> Option<DynamicImage>,
    {
        let slot = self.slot(key)?;
        let mut entry = slot.lock().ok()?;
        if let Some(image) = entry.as_ref() {
            return Some(Arc::clone(image));
        }

        let image = Arc::new(decode()?);
        *entry = Some(Arc::clone(&image));
        Some(image)
    }

    fn find_named_file(&self, name: &str) -> Option<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(format!("{}.{}", name, self.extension)))
            .find(|candidate| candidate.is_file())
    }
}

fn decode_file(path: &Path) -> Option<DynamicImage> {
    match image::open(path) {
        Ok(image) => {
            log::debug!("Decoded {} ({}x{})", path.display(), image.width(), image.height());
            Some(image)
        }
        Err(e) => {
            log::warn!("Failed to decode {}: {}", path.display(), e);
            None
        }
    }
}

impl ImageLookup for ImageCache {
    fn image_named(&self, name: &str) -> Option<FrameImage> {
        if let Some(image) = self
            .registered
            .read()
            .ok()
            .and_then(|registered| registered.get(name).cloned())
        {
            return Some(image);
        }

        // probing for absent names is the normal end of discovery
        let path = self.find_named_file(name)?;
        self.get_or_decode(CacheKey::Name(name.to_string()), || decode_file(&path))
    }

    fn image_at_path(&self, path: &Path) -> Option<FrameImage> {
        if !path.is_file() {
            return None;
        }
        self.get_or_decode(CacheKey::Path(path.to_path_buf()), || decode_file(path))
    }
}
