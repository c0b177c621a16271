//! Pixel-snapped vertical lines.

use std::rc::Rc;

use crate::dataset::{DataSource, Dataset, DatasetHandle};
use crate::error::PlotError;
use crate::primitives::PrimitiveCore;
use crate::render::{
    DrawCall, InstancedBinding, ProgramId, RenderBackend, RenderCtx, UniformValue, divisor_step,
};
use crate::renderable::{Primitive, PrimitiveKind, ShaderSpec};

pub struct VLinesOptions {
    /// Width of the lines in pixels. A single value applies to every
    /// line. Default 1.
    pub widths: DataSource,
    /// RGBA color of the lines. A single value applies to every line.
    /// Default opaque black.
    pub colors: DataSource,
}

impl Default for VLinesOptions {
    fn default() -> Self {
        Self {
            widths: 1.0.into(),
            colors: vec![[0.0, 0.0, 0.0, 1.0]].into(),
        }
    }
}

const LINE_TEMPLATE: [f32; 12] = [
    -0.5, 0.0, 0.5, 0.0, 0.5, 1.0, -0.5, 0.0, 0.5, 1.0, -0.5, 1.0,
];

// Widths round to a whole pixel count (minimum 1) and the line center
// snaps to a pixel edge for even widths or a pixel center for odd ones,
// so every line covers an exact column of pixels.
const BODY: &str = "
@group(1) @binding(0) var<storage, read> vline_lines: array<f32>;
@group(1) @binding(1) var<storage, read> vline_widths: array<f32>;
@group(1) @binding(2) var<storage, read> vline_colors: array<f32>;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(@location(0) position: vec2<f32>, @builtin(instance_index) instance: u32) -> VsOut {
    let li = instance * 3u;
    let x = vline_lines[li];
    let y0 = min(vline_lines[li + 1u], vline_lines[li + 2u]);
    let y1 = max(vline_lines[li + 1u], vline_lines[li + 2u]);
    let w = max(1.0, floor(vline_widths[instance * frame.steps.x] + 0.5));
    let ci = instance * frame.steps.y * 4u;
    let color = vec4<f32>(
        vline_colors[ci], vline_colors[ci + 1u], vline_colors[ci + 2u], vline_colors[ci + 3u],
    );

    var p0 = to_range(vec2<f32>(x, y0));
    var p1 = to_range(vec2<f32>(x, y1));
    p0.y = floor(p0.y);
    p1.y = ceil(p1.y);
    if w % 2.0 == 0.0 {
        p0.x = floor(p0.x + 0.5);
    } else {
        p0.x = floor(p0.x) + 0.5;
    }

    let point = vec2<f32>(p0.x + w * position.x, p0.y + (p1.y - p0.y) * position.y);

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

/// Vertical lines given as `[x, y0, y1, ...]` triples, snapped to whole
/// pixel columns so axis and tick strokes stay crisp.
pub struct VLines {
    core: PrimitiveCore,
    lines: DatasetHandle,
    widths: DatasetHandle,
    colors: DatasetHandle,
}

impl VLines {
    pub fn new(ctx: &RenderCtx, lines: impl Into<DataSource>, options: VLinesOptions) -> Rc<Self> {
        Rc::new(Self {
            core: PrimitiveCore::new(ctx, &LINE_TEMPLATE),
            lines: Dataset::create(ctx, lines),
            widths: Dataset::create(ctx, options.widths),
            colors: Dataset::create(ctx, options.colors),
        })
    }

    pub fn lines(&self) -> &DatasetHandle {
        &self.lines
    }
}

impl Primitive for VLines {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::VLines
    }

    fn shader(&self) -> ShaderSpec {
        ShaderSpec {
            label: "vlines",
            body: BODY,
            instanced_bindings: 3,
            vertex_components: 2,
        }
    }

    fn draw(&self, ctx: &dyn RenderBackend, program: ProgramId) -> Result<(), PlotError> {
        let instances = self.lines.count(3)?;
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
                        buffer: self.lines.buffer(),
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
            .release(&[&self.lines, &self.widths, &self.colors]);
    }

    fn retained(&self) -> bool {
        self.core.retained()
    }

    fn set_retained(&self, retained: bool) {
        self.core.set_retained(retained);
    }
}
