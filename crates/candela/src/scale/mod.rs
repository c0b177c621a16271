//! Bidirectional domain/range value mappings.
//!
//! A [`Scale`] maps values from data space (the *domain*) into pixel space
//! (the *range*) and back. Each scale also carries a WGSL fragment
//! implementing the same mapping on the GPU, so host-computed geometry
//! (tick positions) lands exactly where device-computed geometry
//! (per-vertex positions) lands.
//!
//! Scales are shared by handle: a [`ScaleHandle`] cloned into several
//! coordinate systems aliases one set of domain/range bounds, so mutating
//! them (pan/zoom) is visible everywhere at once. There is no
//! copy-on-write.

mod linear;
mod log;

pub use linear::LinearScale;
pub use log::LogScale;

use std::rc::Rc;

/// Shared-ownership handle to a scale.
///
/// Mutations through any handle are globally visible; this is what makes
/// synchronized pan/zoom across coordinate systems work.
pub type ScaleHandle = Rc<Scale>;

/// Discriminant of a scale's mapping function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleKind {
    Linear,
    Log,
}

/// A domain/range mapping, linear or logarithmic.
#[derive(Debug)]
pub enum Scale {
    Linear(LinearScale),
    Log(LogScale),
}

impl Scale {
    /// Create a shared linear scale.
    pub fn linear(domain: [f64; 2], range: [f64; 2]) -> ScaleHandle {
        Rc::new(Scale::Linear(LinearScale::new(domain, range)))
    }

    /// Create a shared log scale with the given base.
    pub fn log(base: f64, domain: [f64; 2], range: [f64; 2]) -> ScaleHandle {
        Rc::new(Scale::Log(LogScale::new(base, domain, range)))
    }

    pub fn kind(&self) -> ScaleKind {
        match self {
            Self::Linear(_) => ScaleKind::Linear,
            Self::Log(_) => ScaleKind::Log,
        }
    }

    /// The log base, for log scales.
    pub fn base(&self) -> Option<f64> {
        match self {
            Self::Linear(_) => None,
            Self::Log(s) => Some(s.base()),
        }
    }

    pub fn domain(&self) -> [f64; 2] {
        match self {
            Self::Linear(s) => s.domain(),
            Self::Log(s) => s.domain(),
        }
    }

    pub fn set_domain(&self, domain: [f64; 2]) {
        match self {
            Self::Linear(s) => s.set_domain(domain),
            Self::Log(s) => s.set_domain(domain),
        }
    }

    pub fn range(&self) -> [f64; 2] {
        match self {
            Self::Linear(s) => s.range(),
            Self::Log(s) => s.range(),
        }
    }

    pub fn set_range(&self, range: [f64; 2]) {
        match self {
            Self::Linear(s) => s.set_range(range),
            Self::Log(s) => s.set_range(range),
        }
    }

    /// Map a domain value into range space.
    pub fn to_range(&self, v: f64) -> f64 {
        match self {
            Self::Linear(s) => s.to_range(v),
            Self::Log(s) => s.to_range(v),
        }
    }

    /// Map a range value back into domain space.
    pub fn to_domain(&self, v: f64) -> f64 {
        match self {
            Self::Linear(s) => s.to_domain(v),
            Self::Log(s) => s.to_domain(v),
        }
    }

    /// The device-side mapping as a WGSL fragment defining the
    /// parametrized pair `to_domain(v, domain, range)` /
    /// `to_range(v, domain, range)`.
    ///
    /// The fragment depends only on the scale kind (and base, for log
    /// scales), never on the mutable domain/range bounds, so coordinate
    /// systems built from identically-kinded scales generate identical
    /// shader text and share compiled programs.
    pub fn wgsl(&self) -> &str {
        match self {
            Self::Linear(s) => s.wgsl(),
            Self::Log(s) => s.wgsl(),
        }
    }
}
