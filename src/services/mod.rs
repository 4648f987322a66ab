pub mod context;
pub mod image_cache;
pub mod timer;

pub use context::{Background, ExecutionContext, Inline, Job, MainQueue, MainQueueRunner};
pub use image_cache::{FrameImage, ImageCache, ImageLookup};
pub use timer::{ManualTimer, PeriodicTimer, ThreadTimer, TickFn, TimerHandle};
