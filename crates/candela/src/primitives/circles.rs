//! Instanced circles with analytic borders.

use std::rc::Rc;

use crate::dataset::{DataSource, Dataset, DatasetHandle};
use crate::error::PlotError;
use crate::primitives::PrimitiveCore;
use crate::render::{
    DrawCall, InstancedBinding, ProgramId, RenderBackend, RenderCtx, UniformValue, divisor_step,
};
use crate::renderable::{Primitive, PrimitiveKind, ShaderSpec};

pub struct CirclesOptions {
    /// Interior RGBA color. A single value applies to every circle.
    /// Default half-transparent black.
    pub colors: DataSource,
    /// Radius in pixels, border included. A single value applies to
    /// every circle. Default 10.
    pub radii: DataSource,
    /// Border RGBA color. A single value applies to every circle.
    /// Default opaque black.
    pub border_colors: DataSource,
    /// Border width in pixels. A single value applies to every circle.
    /// Default 3.
    pub border_widths: DataSource,
}

impl Default for CirclesOptions {
    fn default() -> Self {
        Self {
            colors: vec![[0.0, 0.0, 0.0, 0.5]].into(),
            radii: 10.0.into(),
            border_colors: vec![[0.0, 0.0, 0.0, 1.0]].into(),
            border_widths: 3.0.into(),
        }
    }
}

const QUAD_TEMPLATE: [f32; 12] = [
    -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0,
];

// The fragment stage classifies four sub-pixel offsets against the
// outer radius and the border's inner radius and averages, giving
// cheap 4x antialiasing without derivatives.
const BODY: &str = "
@group(1) @binding(0) var<storage, read> circle_xs: array<f32>;
@group(1) @binding(1) var<storage, read> circle_ys: array<f32>;
@group(1) @binding(2) var<storage, read> circle_colors: array<f32>;
@group(1) @binding(3) var<storage, read> circle_radii: array<f32>;
@group(1) @binding(4) var<storage, read> circle_border_widths: array<f32>;
@group(1) @binding(5) var<storage, read> circle_border_colors: array<f32>;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) border_color: vec4<f32>,
    @location(2) local: vec2<f32>,
    @location(3) radius: f32,
    @location(4) border_width: f32,
}

@vertex
fn vs_main(@location(0) position: vec2<f32>, @builtin(instance_index) instance: u32) -> VsOut {
    let center = vec2<f32>(circle_xs[instance], circle_ys[instance]);
    let ci = instance * frame.steps.x * 4u;
    let radius = circle_radii[instance * frame.steps.y];
    let border_width = circle_border_widths[instance * frame.steps.z];
    let bi = instance * frame.steps.w * 4u;

    var out: VsOut;
    out.local = position * radius;
    out.position = range_to_clip(to_range(center) + out.local);
    out.color = vec4<f32>(
        circle_colors[ci], circle_colors[ci + 1u], circle_colors[ci + 2u], circle_colors[ci + 3u],
    );
    out.border_color = vec4<f32>(
        circle_border_colors[bi], circle_border_colors[bi + 1u],
        circle_border_colors[bi + 2u], circle_border_colors[bi + 3u],
    );
    out.radius = radius;
    out.border_width = border_width;
    return out;
}

fn classify(in: VsOut, d2: f32, r2: f32, inner2: f32) -> vec4<f32> {
    if d2 > r2 {
        if in.border_width > 0.0 {
            return vec4<f32>(in.border_color.rgb, 0.0);
        }
        return vec4<f32>(in.color.rgb, 0.0);
    }
    if d2 > inner2 {
        return in.border_color;
    }
    return in.color;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let p1 = in.local + vec2<f32>(-0.25, 0.35);
    let p2 = in.local + vec2<f32>(0.35, 0.25);
    let p3 = in.local + vec2<f32>(0.25, -0.35);
    let p4 = in.local + vec2<f32>(-0.35, -0.25);
    let r2 = in.radius * in.radius;
    let inner = in.radius - in.border_width;
    let inner2 = inner * inner;
    var acc = vec4<f32>(0.0);
    acc += classify(in, dot(p1, p1), r2, inner2);
    acc += classify(in, dot(p2, p2), r2, inner2);
    acc += classify(in, dot(p3, p3), r2, inner2);
    acc += classify(in, dot(p4, p4), r2, inner2);
    if acc.a == 0.0 {
        discard;
    }
    return 0.25 * acc;
}
";

/// Circles centered at per-instance `(x, y)` positions given as two
/// parallel flat arrays.
pub struct Circles {
    core: PrimitiveCore,
    xs: DatasetHandle,
    ys: DatasetHandle,
    colors: DatasetHandle,
    radii: DatasetHandle,
    border_widths: DatasetHandle,
    border_colors: DatasetHandle,
}

impl Circles {
    pub fn new(
        ctx: &RenderCtx,
        xs: impl Into<DataSource>,
        ys: impl Into<DataSource>,
        options: CirclesOptions,
    ) -> Rc<Self> {
        Rc::new(Self {
            core: PrimitiveCore::new(ctx, &QUAD_TEMPLATE),
            xs: Dataset::create(ctx, xs),
            ys: Dataset::create(ctx, ys),
            colors: Dataset::create(ctx, options.colors),
            radii: Dataset::create(ctx, options.radii),
            border_widths: Dataset::create(ctx, options.border_widths),
            border_colors: Dataset::create(ctx, options.border_colors),
        })
    }
}

impl Primitive for Circles {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Circles
    }

    fn shader(&self) -> ShaderSpec {
        ShaderSpec {
            label: "circles",
            body: BODY,
            instanced_bindings: 6,
            vertex_components: 2,
        }
    }

    fn draw(&self, ctx: &dyn RenderBackend, program: ProgramId) -> Result<(), PlotError> {
        let instances = self.xs.count(1)?;
        let color_divisor = self.colors.divisor(instances, 4)?;
        let radius_divisor = self.radii.divisor(instances, 1)?;
        let border_width_divisor = self.border_widths.divisor(instances, 1)?;
        let border_color_divisor = self.border_colors.divisor(instances, 4)?;
        ctx.draw(
            program,
            &DrawCall {
                vertices: 6,
                instances: instances as u32,
                geometry: self.core.geometry(),
                bindings: vec![
                    InstancedBinding {
                        buffer: self.xs.buffer(),
                        divisor: 1,
                    },
                    InstancedBinding {
                        buffer: self.ys.buffer(),
                        divisor: 1,
                    },
                    InstancedBinding {
                        buffer: self.colors.buffer(),
                        divisor: color_divisor,
                    },
                    InstancedBinding {
                        buffer: self.radii.buffer(),
                        divisor: radius_divisor,
                    },
                    InstancedBinding {
                        buffer: self.border_widths.buffer(),
                        divisor: border_width_divisor,
                    },
                    InstancedBinding {
                        buffer: self.border_colors.buffer(),
                        divisor: border_color_divisor,
                    },
                ],
                uniforms: vec![(
                    "steps",
                    UniformValue::UVec4([
                        divisor_step(color_divisor),
                        divisor_step(radius_divisor),
                        divisor_step(border_width_divisor),
                        divisor_step(border_color_divisor),
                    ]),
                )],
            },
        );
        Ok(())
    }

    fn dispose(&self) {
        self.core.release(&[
            &self.xs,
            &self.ys,
            &self.colors,
            &self.radii,
            &self.border_widths,
            &self.border_colors,
        ]);
    }

    fn retained(&self) -> bool {
        self.core.retained()
    }

    fn set_retained(&self, retained: bool) {
        self.core.set_retained(retained);
    }
}
