//! Surface construction and reconstruction
//!
//! - builder: raw quotes + market context -> cleaned surface rows
//! - grid: scattered surface rows -> regular mesh for rendering

pub mod builder;
pub mod grid;

pub use builder::{build_surface, solve_point};
pub use grid::{reconstruct, GridPoint, GridSurface, DEFAULT_GRID_SIZE};
