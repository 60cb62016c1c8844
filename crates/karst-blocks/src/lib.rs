//! Block labels and the display palette.
#![forbid(unsafe_code)]

pub mod palette;
pub mod types;

pub use palette::{BlockPalette, Rgb};
pub use types::Block;
