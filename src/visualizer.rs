//! Spectrum visualization: the frame-driven sampling loop, bar geometry and
//! the ratatui widget that draws it.

mod bars;
mod frame_loop;
mod widget;

pub use bars::{BAR_HEIGHT_FRACTION, Bar, gradient_at, layout_bars};
pub use frame_loop::{FrameTicket, VisualizationLoop};
pub use widget::SpectrumWidget;

#[cfg(test)]
mod tests;
