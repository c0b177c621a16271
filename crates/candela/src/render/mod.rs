//! GPU abstraction: the backend trait the engine draws through, and the
//! headless wgpu implementation.

mod backend;
mod wgpu_backend;

pub use backend::{
    BufferId, DrawCall, InstancedBinding, ProgramDescriptor, ProgramId, RenderBackend, RenderCtx,
    ScissorBox, ScopeDescriptor, ScopeGuard, ScopeId, ScopePush, SurfaceId, UniformValue,
    Viewport, divisor_step,
};
pub use wgpu_backend::{WgpuBackend, WgpuBackendOptions};
