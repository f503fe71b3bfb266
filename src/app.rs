//! Application root: owns the playlist and drives playback, persistence and
//! the visualizer on behalf of the TUI and runtime.

mod model;
mod prompt;

pub use model::App;
pub use prompt::{Prompt, PromptKind};
