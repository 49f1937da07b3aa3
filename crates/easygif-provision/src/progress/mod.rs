//! Download progress accounting and rendering.
//!
//! The arithmetic lives in [`ProgressSample`] and [`ProgressTracker`] so it can be
//! tested without a terminal; [`ProgressPanel`] only draws what a sample says.

mod format;
mod panel;
mod sample;

pub use format::{format_bytes, format_duration};
pub use panel::{NoProgress, ProgressPanel, ProgressSink};
pub use sample::{ProgressSample, ProgressTracker};
