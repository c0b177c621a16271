//! Axis-aligned filled rectangles in domain space.

use std::rc::Rc;

use crate::dataset::{DataSource, Dataset, DatasetHandle};
use crate::error::PlotError;
use crate::primitives::PrimitiveCore;
use crate::render::{
    DrawCall, InstancedBinding, ProgramId, RenderBackend, RenderCtx, UniformValue, divisor_step,
};
use crate::renderable::{Primitive, PrimitiveKind, ShaderSpec};

pub struct RectsOptions {
    /// RGBA fill color. A single value applies to every rectangle.
    /// Default half-transparent black.
    pub colors: DataSource,
}

impl Default for RectsOptions {
    fn default() -> Self {
        Self {
            colors: vec![[0.0, 0.0, 0.0, 0.5]].into(),
        }
    }
}

// Unit quad scaled and offset per instance in the vertex stage.
const RECT_TEMPLATE: [f32; 12] = [
    0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0,
];

const BODY: &str = "
@group(1) @binding(0) var<storage, read> rect_rects: array<f32>;
@group(1) @binding(1) var<storage, read> rect_colors: array<f32>;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(@location(0) position: vec2<f32>, @builtin(instance_index) instance: u32) -> VsOut {
    let ri = instance * 4u;
    let corner = vec2<f32>(rect_rects[ri], rect_rects[ri + 1u]);
    let size = vec2<f32>(rect_rects[ri + 2u], rect_rects[ri + 3u]);
    let ci = instance * frame.steps.x * 4u;

    var out: VsOut;
    out.position = domain_to_clip(corner + position * size);
    out.color = vec4<f32>(
        rect_colors[ci], rect_colors[ci + 1u], rect_colors[ci + 2u], rect_colors[ci + 3u],
    );
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return in.color;
}
";

/// Rectangles given as `[x, y, width, height, ...]` quadruples, anchored
/// at the lower-left corner in domain units.
pub struct Rects {
    core: PrimitiveCore,
    rects: DatasetHandle,
    colors: DatasetHandle,
}

impl Rects {
    pub fn new(ctx: &RenderCtx, rects: impl Into<DataSource>, options: RectsOptions) -> Rc<Self> {
        Rc::new(Self {
            core: PrimitiveCore::new(ctx, &RECT_TEMPLATE),
            rects: Dataset::create(ctx, rects),
            colors: Dataset::create(ctx, options.colors),
        })
    }

    pub fn rects(&self) -> &DatasetHandle {
        &self.rects
    }
}

impl Primitive for Rects {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Rects
    }

    fn shader(&self) -> ShaderSpec {
        ShaderSpec {
            label: "rects",
            body: BODY,
            instanced_bindings: 2,
            vertex_components: 2,
        }
    }

    fn draw(&self, ctx: &dyn RenderBackend, program: ProgramId) -> Result<(), PlotError> {
        let instances = self.rects.count(4)?;
        let color_divisor = self.colors.divisor(instances, 4)?;
        ctx.draw(
            program,
            &DrawCall {
                vertices: 6,
                instances: instances as u32,
                geometry: self.core.geometry(),
                bindings: vec![
                    InstancedBinding {
                        buffer: self.rects.buffer(),
                        divisor: 1,
                    },
                    InstancedBinding {
                        buffer: self.colors.buffer(),
                        divisor: color_divisor,
                    },
                ],
                uniforms: vec![(
                    "steps",
                    UniformValue::UVec4([divisor_step(color_divisor), 0, 0, 0]),
                )],
            },
        );
        Ok(())
    }

    fn dispose(&self) {
        self.core.release(&[&self.rects, &self.colors]);
    }

    fn retained(&self) -> bool {
        self.core.retained()
    }

    fn set_retained(&self, retained: bool) {
        self.core.set_retained(retained);
    }
}
