// Library exports for framecycle

pub mod animator;
pub mod app;
pub mod components;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod model;
pub mod services;
pub mod surface;
pub mod widgets;

pub use animator::{AnimEvent, AnimationDriver, DockIconAnimator, MultiAnimationDriver, Services};
pub use error::{AnimError, AnimResult};
