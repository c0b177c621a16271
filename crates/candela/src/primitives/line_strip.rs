//! A connected polyline with round caps and joins.

use std::f32::consts::{FRAC_PI_2, PI};
use std::rc::Rc;

use crate::dataset::{DataSource, Dataset, DatasetHandle};
use crate::error::PlotError;
use crate::primitives::PrimitiveCore;
use crate::render::{
    DrawCall, InstancedBinding, ProgramId, RenderBackend, RenderCtx, UniformValue, divisor_step,
};
use crate::renderable::{Primitive, PrimitiveKind, ShaderSpec};

pub struct LineStripOptions {
    /// Width of the strip in pixels. A single value applies to the whole
    /// strip. Default 1.
    pub widths: DataSource,
    /// RGBA color per segment. A single value applies to the whole
    /// strip. Default opaque black.
    pub colors: DataSource,
}

impl Default for LineStripOptions {
    fn default() -> Self {
        Self {
            widths: 1.0.into(),
            colors: vec![[0.0, 0.0, 0.0, 1.0]].into(),
        }
    }
}

// Semicircle steps per cap. Joins reuse the caps: overlapping circles at
// shared endpoints read as round joins under any turn angle.
const CAP_RESOLUTION: u32 = 16;

// One instance covers one segment. The template's z component selects
// the endpoint the vertex belongs to: a quad spanning both endpoints
// plus a semicircle fan at each.
fn round_cap_template(resolution: u32) -> Vec<f32> {
    let mut template = vec![
        0.0, -0.5, 0.0,
        0.0, -0.5, 1.0,
        0.0, 0.5, 1.0,
        0.0, -0.5, 0.0,
        0.0, 0.5, 1.0,
        0.0, 0.5, 0.0,
    ];
    for (start, select) in [(FRAC_PI_2, 0.0f32), (3.0 * FRAC_PI_2, 1.0)] {
        for step in 0..resolution {
            let theta0 = start + step as f32 * PI / resolution as f32;
            let theta1 = start + (step + 1) as f32 * PI / resolution as f32;
            template.extend_from_slice(&[0.0, 0.0, select]);
            template.extend_from_slice(&[0.5 * theta0.cos(), 0.5 * theta0.sin(), select]);
            template.extend_from_slice(&[0.5 * theta1.cos(), 0.5 * theta1.sin(), select]);
        }
    }
    template
}

const BODY: &str = "
@group(1) @binding(0) var<storage, read> strip_xs: array<f32>;
@group(1) @binding(1) var<storage, read> strip_ys: array<f32>;
@group(1) @binding(2) var<storage, read> strip_widths: array<f32>;
@group(1) @binding(3) var<storage, read> strip_colors: array<f32>;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @builtin(instance_index) instance: u32) -> VsOut {
    let point_a = vec2<f32>(strip_xs[instance], strip_ys[instance]);
    let point_b = vec2<f32>(strip_xs[instance + 1u], strip_ys[instance + 1u]);
    let width = strip_widths[instance * frame.steps.x];
    let ci = instance * frame.steps.y * 4u;
    let color = vec4<f32>(
        strip_colors[ci], strip_colors[ci + 1u], strip_colors[ci + 2u], strip_colors[ci + 3u],
    );

    let screen_a = to_range(point_a);
    let screen_b = to_range(point_b);

    let x_basis = normalize(screen_b - screen_a);
    let y_basis = vec2<f32>(-x_basis.y, x_basis.x);
    let offset = width * (position.x * x_basis + position.y * y_basis);
    let point = mix(screen_a + offset, screen_b + offset, position.z);

    var out: VsOut;
    out.position = range_to_clip(point);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return in.color;
}
";

/// A polyline through per-vertex `(x, y)` positions given as two
/// parallel flat arrays. Adjacent points share an endpoint, so `n`
/// points draw `n - 1` segments.
pub struct LineStrip {
    core: PrimitiveCore,
    vertices: u32,
    xs: DatasetHandle,
    ys: DatasetHandle,
    widths: DatasetHandle,
    colors: DatasetHandle,
}

impl LineStrip {
    pub fn new(
        ctx: &RenderCtx,
        xs: impl Into<DataSource>,
        ys: impl Into<DataSource>,
        options: LineStripOptions,
    ) -> Rc<Self> {
        let template = round_cap_template(CAP_RESOLUTION);
        Rc::new(Self {
            core: PrimitiveCore::new(ctx, &template),
            vertices: (template.len() / 3) as u32,
            xs: Dataset::create(ctx, xs),
            ys: Dataset::create(ctx, ys),
            widths: Dataset::create(ctx, options.widths),
            colors: Dataset::create(ctx, options.colors),
        })
    }

    pub fn xs(&self) -> &DatasetHandle {
        &self.xs
    }

    pub fn ys(&self) -> &DatasetHandle {
        &self.ys
    }
}

impl Primitive for LineStrip {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::LineStrip
    }

    fn shader(&self) -> ShaderSpec {
        ShaderSpec {
            label: "line-strip",
            body: BODY,
            instanced_bindings: 4,
            vertex_components: 3,
        }
    }

    fn draw(&self, ctx: &dyn RenderBackend, program: ProgramId) -> Result<(), PlotError> {
        let instances = self.xs.count(1)?.saturating_sub(1);
        let width_divisor = self.widths.divisor(instances, 1)?;
        let color_divisor = self.colors.divisor(instances, 4)?;
        ctx.draw(
            program,
            &DrawCall {
                vertices: self.vertices,
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
                        buffer: self.widths.buffer(),
                        divisor: width_divisor,
                    },
                    InstancedBinding {
                        buffer: self.colors.buffer(),
                        divisor: color_divisor,
                    },
                ],
                uniforms: vec![(
                    "steps",
                    UniformValue::UVec4([
                        divisor_step(width_divisor),
                        divisor_step(color_divisor),
                        0,
                        0,
                    ]),
                )],
            },
        );
        Ok(())
    }

    fn dispose(&self) {
        self.core
            .release(&[&self.xs, &self.ys, &self.widths, &self.colors]);
    }

    fn retained(&self) -> bool {
        self.core.retained()
    }

    fn set_retained(&self, retained: bool) {
        self.core.set_retained(retained);
    }
}
