//! Composite renderables: higher-level chart furniture that expands
//! into primitives at construction time.

mod axis;
mod grid;
mod ortho_axis;
mod scissor;

pub use axis::{Axis, AxisLabel, AxisOptions};
pub use grid::{Grid, GridOptions};
pub use ortho_axis::{AxisDirection, OrthoAxis, OrthoAxisInfo, OrthoAxisOptions};
pub use scissor::Scissor;
