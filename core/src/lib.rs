// #![warn(clippy::pedantic)]

// #![warn(clippy::nursery)]
// #![warn(clippy::cargo)]
#![warn(clippy::complexity)]
#![warn(clippy::correctness)]
#![warn(clippy::perf)]
#![warn(clippy::style)]
#![warn(clippy::suspicious)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
// #![warn(clippy::todo)]
// #![warn(clippy::unimplemented)]
// #![warn(clippy::dbg_macro)]

// #![warn(clippy::unwrap_used)]
// #![warn(clippy::expect_used)]

//! Core of the ndview array viewer.
//!
//! Everything in here is independent of any GUI toolkit: the [`SliceNavigator`]
//! picks the 2D slice to show, [`render`] turns it into pixels and [`event`]
//! describes what a display surface hands back to the caller.

pub mod error;
pub mod event;
pub mod navigator;
pub mod options;
pub mod render;
pub mod source;
pub mod stats;

pub use error::Error;
pub use event::{ClickEvent, EventKind, EventListener, ImagePos, Overlay, Overlays};
pub use navigator::SliceNavigator;
pub use options::ViewerOptions;
pub use render::{render_slice, Colormap, RgbaImage};
pub use source::{ArraySource, NpyFile};
pub use stats::{ArrayStats, Levels, RangeIncl};
