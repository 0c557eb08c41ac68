//! Text renderers for projections.

pub mod charset;
pub mod outline;

pub use charset::{CharSet, TreeGlyphs};
pub use outline::{OutlineOptions, render_outline};
