//! Data types shared by the layout engine, renderer and viewer.

mod cell;
mod grid_id;
pub mod lenient;
mod options;
mod selection;

pub use cell::*;
pub use grid_id::GridId;
pub use options::*;
pub use selection::*;
