//! Shared value types for the housing audit client: block positions,
//! world-space vectors, and RGBA area colors.

pub mod color;
pub mod types;

pub use color::{ColorError, ColorRgba};
pub use types::{BlockPos, Vec3};
