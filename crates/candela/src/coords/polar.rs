//! Polar coordinate system.

use std::rc::Rc;

use glam::DVec2;

use crate::coords::{CoordinateSystem, CoordsFragment, qualify, vec2_uniform};
use crate::render::UniformValue;
use crate::scale::ScaleHandle;

/// Composes radial, angular, x, and y scales into a polar mapping.
///
/// `to_range` maps `(r, θ)` through the radial/angular scales into polar
/// range space, converts to Cartesian (`r·cosθ, r·sinθ`), then maps the
/// result through the x/y scales. `to_domain` runs the exact inverse
/// chain: x/y inverses, magnitude and `atan2`, then the radial/angular
/// inverses.
pub struct Polar {
    radial: ScaleHandle,
    angular: ScaleHandle,
    x: ScaleHandle,
    y: ScaleHandle,
    fragment: CoordsFragment,
}

impl Polar {
    pub fn new(
        radial: ScaleHandle,
        angular: ScaleHandle,
        x: ScaleHandle,
        y: ScaleHandle,
    ) -> Rc<Self> {
        let radial_fns = qualify(radial.wgsl(), "radial");
        let angular_fns = qualify(angular.wgsl(), "angular");
        let x_fns = qualify(x.wgsl(), "x");
        let y_fns = qualify(y.wgsl(), "y");
        let text = format!(
            "struct CoordUniforms {{
    radial_domain: vec2<f32>,
    radial_range: vec2<f32>,
    angular_domain: vec2<f32>,
    angular_range: vec2<f32>,
    x_domain: vec2<f32>,
    x_range: vec2<f32>,
    y_domain: vec2<f32>,
    y_range: vec2<f32>,
}}

@group(0) @binding(0) var<uniform> coord: CoordUniforms;
{radial_fns}{angular_fns}{x_fns}{y_fns}
fn to_range(v: vec2<f32>) -> vec2<f32> {{
    let polar = vec2<f32>(
        to_radial_range(v.x, coord.radial_domain, coord.radial_range),
        to_angular_range(v.y, coord.angular_domain, coord.angular_range),
    );
    let cartesian = polar.x * vec2<f32>(cos(polar.y), sin(polar.y));
    return vec2<f32>(
        to_x_range(cartesian.x, coord.x_domain, coord.x_range),
        to_y_range(cartesian.y, coord.y_domain, coord.y_range),
    );
}}

fn to_domain(v: vec2<f32>) -> vec2<f32> {{
    let cartesian = vec2<f32>(
        to_x_domain(v.x, coord.x_domain, coord.x_range),
        to_y_domain(v.y, coord.y_domain, coord.y_range),
    );
    let polar = vec2<f32>(length(cartesian), atan2(cartesian.y, cartesian.x));
    return vec2<f32>(
        to_radial_domain(polar.x, coord.radial_domain, coord.radial_range),
        to_angular_domain(polar.y, coord.angular_domain, coord.angular_range),
    );
}}
"
        );
        Rc::new(Self {
            radial,
            angular,
            x,
            y,
            fragment: CoordsFragment {
                text,
                fields: vec![
                    "radial_domain",
                    "radial_range",
                    "angular_domain",
                    "angular_range",
                    "x_domain",
                    "x_range",
                    "y_domain",
                    "y_range",
                ],
            },
        })
    }

    pub fn radial_scale(&self) -> &ScaleHandle {
        &self.radial
    }

    pub fn angular_scale(&self) -> &ScaleHandle {
        &self.angular
    }
}

impl CoordinateSystem for Polar {
    fn to_range(&self, v: DVec2) -> DVec2 {
        let polar = DVec2::new(self.radial.to_range(v.x), self.angular.to_range(v.y));
        let cartesian = polar.x * DVec2::new(polar.y.cos(), polar.y.sin());
        DVec2::new(self.x.to_range(cartesian.x), self.y.to_range(cartesian.y))
    }

    fn to_domain(&self, v: DVec2) -> DVec2 {
        let cartesian = DVec2::new(self.x.to_domain(v.x), self.y.to_domain(v.y));
        let polar = DVec2::new(cartesian.length(), cartesian.y.atan2(cartesian.x));
        DVec2::new(
            self.radial.to_domain(polar.x),
            self.angular.to_domain(polar.y),
        )
    }

    fn fragment(&self) -> &CoordsFragment {
        &self.fragment
    }

    fn scope_values(&self) -> Vec<(&'static str, UniformValue)> {
        vec![
            ("radial_domain", vec2_uniform(self.radial.domain())),
            ("radial_range", vec2_uniform(self.radial.range())),
            ("angular_domain", vec2_uniform(self.angular.domain())),
            ("angular_range", vec2_uniform(self.angular.range())),
            ("x_domain", vec2_uniform(self.x.domain())),
            ("x_range", vec2_uniform(self.x.range())),
            ("y_domain", vec2_uniform(self.y.domain())),
            ("y_range", vec2_uniform(self.y.range())),
        ]
    }
}
