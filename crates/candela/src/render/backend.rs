//! The GPU backend contract consumed by the engine.
//!
//! Everything the engine needs from a GPU is expressed through
//! [`RenderBackend`]: buffer allocation, program compilation, scoped draw
//! state, and draw submission. The production implementation is
//! [`WgpuBackend`](crate::render::WgpuBackend); tests substitute a
//! recording mock. The trait is object-safe and handed around as a
//! reference-counted [`RenderCtx`] — the engine assumes a single
//! render/update thread, so no locking is required of implementations'
//! callers.

use std::rc::Rc;

use crate::error::PlotError;

/// Shared handle to the GPU backend, cloned into every object that owns
/// GPU resources.
pub type RenderCtx = Rc<dyn RenderBackend>;

/// Handle to a GPU buffer owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

/// Handle to a compiled draw program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u64);

/// Handle to a draw-state scope created from a [`ScopeDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u64);

/// Handle to an offscreen surface usable as a `copy_to` destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// A pixel-space viewport rectangle, origin at the bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// A uniform value resolved at draw time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec4([f32; 4]),
    UVec4([u32; 4]),
}

/// Description of a draw program to compile.
///
/// `source` is complete WGSL: the coordinate-system fragment, the engine's
/// common helpers, and the primitive body. `coord_uniforms` lists the
/// vec2 fields of the fragment's uniform struct in declaration order so
/// the backend can pack scope values by name. `instanced_bindings` is the
/// number of read-only storage buffers the primitive binds in group 1.
#[derive(Debug, Clone)]
pub struct ProgramDescriptor {
    pub label: &'static str,
    pub source: String,
    pub coord_uniforms: Vec<&'static str>,
    pub instanced_bindings: usize,
    /// Components per geometry-template vertex (2 or 3).
    pub vertex_components: usize,
}

/// One instanced storage binding of a draw call.
///
/// `divisor` follows the dataset contract: `1` advances the attribute
/// once per instance; any other value broadcasts element zero to every
/// instance.
#[derive(Debug, Clone, Copy)]
pub struct InstancedBinding {
    pub buffer: BufferId,
    pub divisor: usize,
}

/// Convert a dataset divisor into the shader-side index step.
pub fn divisor_step(divisor: usize) -> u32 {
    if divisor == 1 { 1 } else { 0 }
}

/// A single draw submission.
#[derive(Debug, Clone)]
pub struct DrawCall {
    /// Vertices per instance, read from the geometry template.
    pub vertices: u32,
    pub instances: u32,
    /// Per-vertex geometry template (vec2 positions).
    pub geometry: BufferId,
    /// Storage bindings in group-1 binding order; must match the
    /// program's `instanced_bindings` count.
    pub bindings: Vec<InstancedBinding>,
    /// Per-draw uniforms (e.g. the `steps` index-step vector).
    pub uniforms: Vec<(&'static str, UniformValue)>,
}

/// Description of a reusable uniform scope: the names it binds.
#[derive(Debug, Clone)]
pub struct ScopeDescriptor {
    pub uniforms: Vec<&'static str>,
}

/// A scissor box in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScissorBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One entry pushed onto the backend's draw-state stack.
#[derive(Debug, Clone)]
pub enum ScopePush {
    /// Bind current values for a previously created uniform scope.
    Uniforms {
        scope: ScopeId,
        values: Vec<(&'static str, UniformValue)>,
    },
    /// Restrict rendering to a viewport; also provides the `resolution`
    /// uniform.
    Viewport(Viewport),
    /// Restrict rendering to a scissor box.
    Scissor(ScissorBox),
}

/// GPU operations consumed by the engine.
///
/// Implementations use interior mutability; all methods take `&self`.
/// Scope pushes and pops must nest — the engine guarantees balance via
/// [`ScopeGuard`] even on early error returns.
pub trait RenderBackend {
    /// Allocate a buffer initialized with `data`.
    fn create_buffer(&self, data: &[f32]) -> BufferId;

    /// Replace a buffer's contents (the buffer may grow or shrink).
    fn update_buffer(&self, buffer: BufferId, data: &[f32]);

    /// Release a buffer. Destroying an already-destroyed buffer is a
    /// caller error; implementations may ignore it.
    fn destroy_buffer(&self, buffer: BufferId);

    /// Compile a draw program. Failures are returned, not retried; the
    /// engine caches the failure for the offending program shape.
    fn compile_program(&self, desc: &ProgramDescriptor) -> Result<ProgramId, PlotError>;

    /// Create a reusable uniform scope.
    fn create_scope(&self, desc: &ScopeDescriptor) -> ScopeId;

    /// Push draw state; it applies to every draw until popped.
    fn push_scope(&self, push: ScopePush);

    /// Pop the most recent draw-state entry.
    fn pop_scope(&self);

    /// Issue one instanced draw under the current scope stack.
    fn draw(&self, program: ProgramId, call: &DrawCall);

    /// Clear the active surface to a color.
    fn clear(&self, color: [f32; 4]);

    /// Allocate an offscreen destination surface.
    fn create_surface(&self, width: u32, height: u32) -> SurfaceId;

    /// Composite `source` (read bottom-up) into a rectangle of the
    /// destination surface, allocating a destination when none is given.
    fn copy_to(
        &self,
        source: Viewport,
        destination: Option<SurfaceId>,
        destination_viewport: Option<Viewport>,
    ) -> SurfaceId;
}

/// RAII guard keeping scope pushes balanced on every exit path.
pub struct ScopeGuard<'a> {
    ctx: &'a dyn RenderBackend,
}

impl<'a> ScopeGuard<'a> {
    pub fn push(ctx: &'a dyn RenderBackend, push: ScopePush) -> Self {
        ctx.push_scope(push);
        Self { ctx }
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.ctx.pop_scope();
    }
}
