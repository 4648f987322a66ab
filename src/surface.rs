// Display capabilities the animators draw into

use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::services::{FrameImage, ImageLookup};

/// Something that shows one frame at a time, such as an image view.
///
/// `set_image` is called on whatever context the driver was given for
/// display work, while the driver holds its own lock, so implementations
/// must not call back into the driver.
pub trait DisplaySurface: Send + Sync {
    fn set_image(&self, image: FrameImage);

    /// A surface with the same placement and an independent image buffer.
    fn clone_surface(&self) -> Arc<dyn DisplaySurface>;
}

/// The process-wide application icon.
pub trait IconSurface: Send + Sync {
    fn set_content_view(&self, view: Arc<IconView>);

    fn request_redraw(&self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// In-memory surface that keeps the latest frame.
#[derive(Default)]
pub struct BufferSurface {
    placement: Placement,
    current: Mutex<Option<FrameImage>>,
    updates: AtomicUsize,
}

impl BufferSurface {
    pub fn new(placement: Placement) -> Self {
        Self {
            placement,
            ..Self::default()
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn current(&self) -> Option<FrameImage> {
        self.current.lock().ok().and_then(|c| c.clone())
    }

    /// Number of `set_image` calls so far. Renderers compare it against the
    /// last value they drew to skip unchanged frames.
    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::Acquire)
    }
}

impl DisplaySurface for BufferSurface {
    fn set_image(&self, image: FrameImage) {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(image);
        }
        self.updates.fetch_add(1, Ordering::AcqRel);
    }

    fn clone_surface(&self) -> Arc<dyn DisplaySurface> {
        Arc::new(BufferSurface::new(self.placement))
    }
}

/// Drawable content installed on an [`IconSurface`]. Holds no pixels of its
/// own: every draw resolves whatever id the dock animator currently shows.
pub struct IconView {
    width: u32,
    height: u32,
    current_id: Arc<RwLock<String>>,
    lookup: Arc<dyn ImageLookup>,
}

impl IconView {
    pub(crate) fn new(
        (width, height): (u32, u32),
        current_id: Arc<RwLock<String>>,
        lookup: Arc<dyn ImageLookup>,
    ) -> Self {
        Self {
            width,
            height,
            current_id,
            lookup,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn current_id(&self) -> String {
        self.current_id
            .read()
            .map(|id| id.clone())
            .unwrap_or_default()
    }

    /// Renders the current frame scaled to fill `width` x `height`.
    pub fn draw(&self, width: u32, height: u32) -> Option<RgbaImage> {
        let id = self.current_id();
        let Some(image) = self.lookup.image_named(&id) else {
            log::debug!("Icon frame '{}' not found, leaving icon unchanged", id);
            return None;
        };

        let rgba = image.to_rgba8();
        if rgba.width() == width && rgba.height() == height {
            return Some(rgba);
        }
        Some(imageops::resize(&rgba, width, height, FilterType::Lanczos3))
    }

    /// Renders at the size the view was created with.
    pub fn draw_bounds(&self) -> Option<RgbaImage> {
        self.draw(self.width, self.height)
    }
}

/// Icon surface that renders its view into memory on every redraw request.
#[derive(Default)]
pub struct BufferIconSurface {
    view: RwLock<Option<Arc<IconView>>>,
    rendered: Mutex<Option<RgbaImage>>,
    redraws: AtomicUsize,
}

impl BufferIconSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> Option<Arc<IconView>> {
        self.view.read().ok().and_then(|v| v.clone())
    }

    pub fn rendered(&self) -> Option<RgbaImage> {
        self.rendered.lock().ok().and_then(|r| r.clone())
    }

    pub fn redraws(&self) -> usize {
        self.redraws.load(Ordering::Acquire)
    }
}

impl IconSurface for BufferIconSurface {
    fn set_content_view(&self, view: Arc<IconView>) {
        if let Ok(mut slot) = self.view.write() {
            *slot = Some(view);
        }
    }

    fn request_redraw(&self) {
        self.redraws.fetch_add(1, Ordering::AcqRel);
        let Some(view) = self.view() else {
            return;
        };
        if let Some(image) = view.draw_bounds() {
            if let Ok(mut rendered) = self.rendered.lock() {
                *rendered = Some(image);
            }
        }
    }
}
