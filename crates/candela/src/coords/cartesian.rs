//! Cartesian coordinate system.

use std::rc::Rc;

use glam::DVec2;

use crate::coords::{CoordinateSystem, CoordsFragment, qualify, vec2_uniform};
use crate::render::UniformValue;
use crate::scale::ScaleHandle;

/// Composes an x and a y scale into a per-axis 2D mapping.
///
/// The scales are held by handle, not copied: mutating a scale's bounds
/// (pan/zoom) is immediately visible to every system sharing it.
pub struct Cartesian {
    x: ScaleHandle,
    y: ScaleHandle,
    fragment: CoordsFragment,
}

impl Cartesian {
    pub fn new(x: ScaleHandle, y: ScaleHandle) -> Rc<Self> {
        let x_fns = qualify(x.wgsl(), "x");
        let y_fns = qualify(y.wgsl(), "y");
        let text = format!(
            "struct CoordUniforms {{
    x_domain: vec2<f32>,
    x_range: vec2<f32>,
    y_domain: vec2<f32>,
    y_range: vec2<f32>,
}}

@group(0) @binding(0) var<uniform> coord: CoordUniforms;
{x_fns}{y_fns}
fn to_range(v: vec2<f32>) -> vec2<f32> {{
    return vec2<f32>(
        to_x_range(v.x, coord.x_domain, coord.x_range),
        to_y_range(v.y, coord.y_domain, coord.y_range),
    );
}}

fn to_domain(v: vec2<f32>) -> vec2<f32> {{
    return vec2<f32>(
        to_x_domain(v.x, coord.x_domain, coord.x_range),
        to_y_domain(v.y, coord.y_domain, coord.y_range),
    );
}}
"
        );
        Rc::new(Self {
            x,
            y,
            fragment: CoordsFragment {
                text,
                fields: vec!["x_domain", "x_range", "y_domain", "y_range"],
            },
        })
    }

    pub fn x_scale(&self) -> &ScaleHandle {
        &self.x
    }

    pub fn y_scale(&self) -> &ScaleHandle {
        &self.y
    }
}

impl CoordinateSystem for Cartesian {
    fn to_range(&self, v: DVec2) -> DVec2 {
        DVec2::new(self.x.to_range(v.x), self.y.to_range(v.y))
    }

    fn to_domain(&self, v: DVec2) -> DVec2 {
        DVec2::new(self.x.to_domain(v.x), self.y.to_domain(v.y))
    }

    fn fragment(&self) -> &CoordsFragment {
        &self.fragment
    }

    fn scope_values(&self) -> Vec<(&'static str, UniformValue)> {
        vec![
            ("x_domain", vec2_uniform(self.x.domain())),
            ("x_range", vec2_uniform(self.x.range())),
            ("y_domain", vec2_uniform(self.y.domain())),
            ("y_range", vec2_uniform(self.y.range())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::Scale;

    #[test]
    fn test_roundtrip() {
        let coords = Cartesian::new(
            Scale::linear([0.0, 10.0], [0.0, 640.0]),
            Scale::log(10.0, [1.0, 1000.0], [0.0, 480.0]),
        );
        let p = DVec2::new(2.5, 30.0);
        let r = coords.to_range(p);
        let rt = coords.to_domain(r);
        assert!((rt.x - p.x).abs() < 1e-9);
        assert!((rt.y - p.y).abs() / p.y < 1e-9);
    }

    #[test]
    fn test_fragment_depends_on_kinds_only() {
        let a = Cartesian::new(
            Scale::linear([0.0, 1.0], [0.0, 100.0]),
            Scale::linear([0.0, 1.0], [0.0, 100.0]),
        );
        let b = Cartesian::new(
            Scale::linear([-5.0, 5.0], [0.0, 640.0]),
            Scale::linear([2.0, 3.0], [0.0, 480.0]),
        );
        let c = Cartesian::new(
            Scale::linear([0.0, 1.0], [0.0, 100.0]),
            Scale::log(10.0, [1.0, 10.0], [0.0, 100.0]),
        );
        assert_eq!(a.fragment().text, b.fragment().text);
        assert_ne!(a.fragment().text, c.fragment().text);
    }

    #[test]
    fn test_aliased_scale_mutation_is_shared() {
        let x = Scale::linear([0.0, 1.0], [0.0, 100.0]);
        let y = Scale::linear([0.0, 1.0], [0.0, 100.0]);
        let a = Cartesian::new(x.clone(), y.clone());
        let b = Cartesian::new(x.clone(), y);
        x.set_domain([0.0, 2.0]);
        assert_eq!(a.to_range(DVec2::new(2.0, 0.0)).x, 100.0);
        assert_eq!(b.to_range(DVec2::new(2.0, 0.0)).x, 100.0);
    }

    #[test]
    fn test_axis_qualified_function_names() {
        let coords = Cartesian::new(
            Scale::linear([0.0, 1.0], [0.0, 100.0]),
            Scale::log(10.0, [1.0, 10.0], [0.0, 100.0]),
        );
        let text = &coords.fragment().text;
        assert!(text.contains("fn to_x_range"));
        assert!(text.contains("fn to_y_range"));
        assert!(text.contains("fn to_y_domain"));
        // The scale-level names must be fully qualified away, leaving only
        // the composed vector pair.
        assert!(text.contains("fn to_range(v: vec2<f32>)"));
        assert!(!text.contains("fn to_range(v: f32"));
    }
}
