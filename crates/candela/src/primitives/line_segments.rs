//! Instanced line segments of arbitrary screen-space width.

use std::rc::Rc;

use crate::dataset::{DataSource, Dataset, DatasetHandle};
use crate::error::PlotError;
use crate::primitives::PrimitiveCore;
use crate::render::{
    DrawCall, InstancedBinding, ProgramId, RenderBackend, RenderCtx, UniformValue, divisor_step,
};
use crate::renderable::{Primitive, PrimitiveKind, ShaderSpec};

pub struct LineSegmentsOptions {
    /// Width of the segments in pixels. A single value applies to every
    /// segment. Default 1.
    pub widths: DataSource,
    /// RGBA color of the segments. A single value applies to every
    /// segment. Default opaque black.
    pub colors: DataSource,
}

impl Default for LineSegmentsOptions {
    fn default() -> Self {
        Self {
            widths: 1.0.into(),
            colors: vec![[0.0, 0.0, 0.0, 1.0]].into(),
        }
    }
}

// Quad along the segment: x selects the endpoint, y the side offset.
const SEGMENT_TEMPLATE: [f32; 12] = [
    0.0, -0.5, 1.0, -0.5, 1.0, 0.5, 0.0, -0.5, 1.0, 0.5, 0.0, 0.5,
];

const BODY: &str = "
@group(1) @binding(0) var<storage, read> seg_points: array<f32>;
@group(1) @binding(1) var<storage, read> seg_widths: array<f32>;
@group(1) @binding(2) var<storage, read> seg_colors: array<f32>;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(@location(0) position: vec2<f32>, @builtin(instance_index) instance: u32) -> VsOut {
    let pi = instance * 4u;
    let point_a = vec2<f32>(seg_points[pi], seg_points[pi + 1u]);
    let point_b = vec2<f32>(seg_points[pi + 2u], seg_points[pi + 3u]);
    let width = seg_widths[instance * frame.steps.x];
    let ci = instance * frame.steps.y * 4u;
    let color = vec4<f32>(
        seg_colors[ci], seg_colors[ci + 1u], seg_colors[ci + 2u], seg_colors[ci + 3u],
    );

    let screen_a = to_range(point_a);
    let screen_b = to_range(point_b);

    let x_basis = screen_b - screen_a;
    let y_basis = normalize(vec2<f32>(-x_basis.y, x_basis.x));
    let point = screen_a + x_basis * position.x + y_basis * width * position.y;

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

/// Line segments given as endpoint pairs `[x0, y0, x1, y1, ...]`.
pub struct LineSegments {
    core: PrimitiveCore,
    points: DatasetHandle,
    widths: DatasetHandle,
    colors: DatasetHandle,
}

impl LineSegments {
    pub fn new(
        ctx: &RenderCtx,
        points: impl Into<DataSource>,
        options: LineSegmentsOptions,
    ) -> Rc<Self> {
        Rc::new(Self {
            core: PrimitiveCore::new(ctx, &SEGMENT_TEMPLATE),
            points: Dataset::create(ctx, points),
            widths: Dataset::create(ctx, options.widths),
            colors: Dataset::create(ctx, options.colors),
        })
    }

    pub fn points(&self) -> &DatasetHandle {
        &self.points
    }
}

impl Primitive for LineSegments {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::LineSegments
    }

    fn shader(&self) -> ShaderSpec {
        ShaderSpec {
            label: "line-segments",
            body: BODY,
            instanced_bindings: 3,
            vertex_components: 2,
        }
    }

    fn draw(&self, ctx: &dyn RenderBackend, program: ProgramId) -> Result<(), PlotError> {
        let instances = self.points.count(2)? / 2;
        let width_divisor = self.widths.divisor(instances, 1)?;
        let color_divisor = self.colors.divisor(instances, 4)?;
        ctx.draw(
            program,
            &DrawCall {
                vertices: 6,
                instances: instances as u32,
                geometry: self.core.geometry(),
                bindings: vec![
                    InstancedBinding {
                        buffer: self.points.buffer(),
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
            .release(&[&self.points, &self.widths, &self.colors]);
    }

    fn retained(&self) -> bool {
        self.core.retained()
    }

    fn set_retained(&self, retained: bool) {
        self.core.set_retained(retained);
    }
}
