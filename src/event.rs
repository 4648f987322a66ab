use crossterm::event::KeyEvent;

use crate::animator::AnimEvent;

#[derive(Clone, Debug)]
pub enum AppMsg {
    Tick,
    Key(KeyEvent),
    Quit,

    // Playback control
    ToggleSequences,
    ToggleDock,

    // Driver notifications
    SequenceFinished(String),

    // General
    ErrorOccurred(String),
    LogMessage(String),
}

impl From<AnimEvent> for AppMsg {
    fn from(event: AnimEvent) -> Self {
        match event {
            AnimEvent::FrameFailed { label, error } => {
                AppMsg::ErrorOccurred(format!("{}: {}", label, error))
            }
            AnimEvent::Finished { label } => AppMsg::SequenceFinished(label),
        }
    }
}
