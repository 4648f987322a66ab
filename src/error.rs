// Error types for the animation core

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnimError {
    #[error("fps must be greater than zero when no update interval is given")]
    InvalidFps,

    #[error("update interval must be a finite, non-negative number of seconds that fits a timer (got {0})")]
    InvalidInterval(f64),

    #[error("cannot start an animation without frame ids")]
    EmptySequence,

    #[error("empty id range: end {end} is before start {start}")]
    EmptyRange { start: u32, end: u32 },

    #[error("no sequence prefixes given")]
    NoSequences,

    #[error("frame '{id}' could not be resolved{}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    FrameUnresolved { id: String, path: Option<PathBuf> },

    #[error("failed to spawn timer thread: {0}")]
    TimerSpawn(std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("a shared dock animator is already installed")]
    AlreadyInstalled,

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type AnimResult<T> = Result<T, AnimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_message_includes_path() {
        let err = AnimError::FrameUnresolved {
            id: "walk_00001".to_string(),
            path: Some(PathBuf::from("frames/walk_00001.png")),
        };
        assert_eq!(
            err.to_string(),
            "frame 'walk_00001' could not be resolved at frames/walk_00001.png"
        );

        let named = AnimError::FrameUnresolved {
            id: "idle".to_string(),
            path: None,
        };
        assert_eq!(named.to_string(), "frame 'idle' could not be resolved");
    }
}
