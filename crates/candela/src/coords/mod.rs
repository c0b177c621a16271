//! Coordinate systems: compositions of scales into 2D mappings.
//!
//! A coordinate system maps 2D domain points into 2D pixel-range points
//! (and back), and emits a WGSL fragment performing the identical mapping
//! per-vertex on the GPU. The fragment depends only on the *kinds* of the
//! composed scales, never on their mutable bounds — systems that compose
//! the same kinds share compiled programs. Current bounds are re-resolved
//! on every render call through [`CoordinateSystem::scope_values`].

mod cartesian;
mod polar;

pub use cartesian::Cartesian;
pub use polar::Polar;

use std::rc::Rc;

use glam::DVec2;

use crate::render::UniformValue;

/// Shared handle to a coordinate system. Engine caches are keyed by this
/// handle's identity.
pub type CoordsHandle = Rc<dyn CoordinateSystem>;

/// The device-side half of a coordinate system.
#[derive(Debug, Clone)]
pub struct CoordsFragment {
    /// WGSL source: the uniform struct, the axis-qualified scale function
    /// pairs, and the composed vector `to_range`/`to_domain`.
    pub text: String,
    /// The vec2 fields of the uniform struct, in declaration order.
    pub fields: Vec<&'static str>,
}

/// A pluggable 2D domain/range mapping.
pub trait CoordinateSystem {
    /// Map a domain point into pixel-range space.
    fn to_range(&self, v: DVec2) -> DVec2;

    /// Map a pixel-range point back into domain space.
    fn to_domain(&self, v: DVec2) -> DVec2;

    /// The shader fragment, computed once at construction.
    fn fragment(&self) -> &CoordsFragment;

    /// Current bounds for the fragment's uniforms, resolved per render.
    fn scope_values(&self) -> Vec<(&'static str, UniformValue)>;
}

/// Rename a scale's parametrized function pair to axis-qualified names so
/// differently-kinded scales can coexist in one shader.
pub(crate) fn qualify(wgsl: &str, axis: &str) -> String {
    wgsl.replace("to_domain", &format!("to_{axis}_domain"))
        .replace("to_range", &format!("to_{axis}_range"))
}

pub(crate) fn vec2_uniform(v: [f64; 2]) -> UniformValue {
    UniformValue::Vec2([v[0] as f32, v[1] as f32])
}
