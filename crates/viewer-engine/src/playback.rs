//! Playback modes and state.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Transport control state.
///
/// `Play` persists until stopped; `First`, `Last`, `Prev` and `Next` are
/// applied by one tick and then collapse to `Stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackMode {
    #[default]
    Stop,
    Play,
    First,
    Last,
    Prev,
    Next,
}

impl PlaybackMode {
    pub fn is_one_shot(&self) -> bool {
        matches!(
            self,
            PlaybackMode::First | PlaybackMode::Last | PlaybackMode::Prev | PlaybackMode::Next
        )
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaybackMode::Stop => "stop",
            PlaybackMode::Play => "play",
            PlaybackMode::First => "first",
            PlaybackMode::Last => "last",
            PlaybackMode::Prev => "prev",
            PlaybackMode::Next => "next",
        };
        f.write_str(s)
    }
}

impl FromStr for PlaybackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stop" => Ok(PlaybackMode::Stop),
            "play" => Ok(PlaybackMode::Play),
            "first" => Ok(PlaybackMode::First),
            "last" => Ok(PlaybackMode::Last),
            "prev" => Ok(PlaybackMode::Prev),
            "next" => Ok(PlaybackMode::Next),
            other => Err(format!("unknown playback mode '{}'", other)),
        }
    }
}

/// Frame position and timing, owned by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    pub mode: PlaybackMode,
    pub frame_count: usize,
    /// Index into the frame list, or -1 when undetermined
    pub current_frame: isize,
    /// Last index handed to the display, -1 forces a redraw
    pub last_rendered_frame: isize,
    pub wait: Duration,
}

impl PlaybackState {
    /// Startup state: stopped, one placeholder frame, nothing rendered.
    pub fn initial(wait: Duration) -> Self {
        Self {
            mode: PlaybackMode::Stop,
            frame_count: 1,
            current_frame: -1,
            last_rendered_frame: -1,
            wait,
        }
    }

    pub fn is_on_last_frame(&self) -> bool {
        self.frame_count > 0 && self.current_frame == self.frame_count as isize - 1
    }
}
