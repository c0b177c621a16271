//! A hybrid retained/immediate 2D plotting engine on wgpu.
//!
//! Charts are described as trees of renderables: leaf primitives that
//! issue instanced draws, and composites that expand into other
//! renderables. The [`Engine`] traverses a tree under a
//! [coordinate system](coords::CoordinateSystem), compiling one program
//! per coordinate-fragment/primitive-kind pair and caching it for the
//! engine's lifetime. [Datasets](dataset::Dataset) wrap GPU buffers with
//! a retain/auto-dispose policy so per-frame data never leaks and
//! retained data never re-uploads.
//!
//! ```no_run
//! use candela::prelude::*;
//!
//! let ctx: RenderCtx = WgpuBackend::new(WgpuBackendOptions::default()).unwrap();
//! let engine = Engine::new(ctx.clone());
//!
//! let coords: CoordsHandle = Cartesian::new(
//!     Scale::linear([0.0, 1.0], [0.0, 800.0]),
//!     Scale::linear([0.0, 1.0], [0.0, 600.0]),
//! );
//! let line = LineSegments::new(
//!     &ctx,
//!     vec![0.1f32, 0.1, 0.9, 0.9],
//!     LineSegmentsOptions::default(),
//! );
//!
//! engine.clear([1.0, 1.0, 1.0, 1.0]);
//! engine
//!     .render(
//!         &coords,
//!         Viewport::new(0.0, 0.0, 800.0, 600.0),
//!         &line.into(),
//!     )
//!     .unwrap();
//! ```

pub mod composites;
pub mod coords;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod logging;
pub mod primitives;
pub mod render;
pub mod renderable;
pub mod scale;

pub use engine::Engine;
pub use error::PlotError;

// Re-exported so callers can build the `DVec2` arguments of the public
// API without pinning their own glam version.
pub use glam;

pub mod prelude {
    pub use crate::composites::{
        Axis, AxisDirection, AxisOptions, Grid, GridOptions, OrthoAxis, OrthoAxisOptions, Scissor,
    };
    pub use crate::coords::{Cartesian, CoordinateSystem, CoordsHandle, Polar};
    pub use crate::dataset::{DataSource, Dataset, DatasetHandle};
    pub use crate::engine::Engine;
    pub use crate::error::PlotError;
    pub use crate::primitives::{
        Circles, CirclesOptions, HLines, HLinesOptions, LineSegments, LineSegmentsOptions,
        LineStrip, LineStripOptions, Rects, RectsOptions, VLines, VLinesOptions,
    };
    pub use crate::render::{RenderCtx, Viewport, WgpuBackend, WgpuBackendOptions};
    pub use crate::renderable::Renderable;
    pub use crate::scale::Scale;
}
