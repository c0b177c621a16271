//! Recording mock of the render backend.

use std::rc::Rc;

use candela::PlotError;
use candela::render::{
    BufferId, DrawCall, ProgramDescriptor, ProgramId, RenderBackend, ScopeDescriptor, ScopeId,
    ScopePush, SurfaceId, Viewport,
};
use parking_lot::Mutex;

/// One recorded backend operation, in call order.
#[derive(Debug, Clone)]
pub enum BackendCall {
    CreateBuffer { id: u64, len: usize },
    UpdateBuffer { id: u64, len: usize },
    DestroyBuffer { id: u64 },
    CompileProgram { id: u64, label: &'static str },
    CreateScope { id: u64 },
    PushScope,
    PopScope,
    Draw { program: u64, instances: u32 },
    Clear { color: [f32; 4] },
    CreateSurface { id: u64, width: u32, height: u32 },
    CopyTo { destination: u64 },
}

/// Records operations without touching a GPU.
///
/// Methods take `&self` and mutate internal state behind `Mutex`es; the
/// engine is single-threaded, so the locks are uncontended and exist
/// only to provide interior mutability with a stable API.
#[derive(Default)]
pub struct MockBackend {
    calls: Mutex<Vec<BackendCall>>,
    /// Creation-time snapshot of every buffer, in creation order.
    created: Mutex<Vec<Vec<f32>>>,
    /// Latest contents of live buffers.
    live: Mutex<Vec<(u64, Vec<f32>)>>,
    draws: Mutex<Vec<DrawCall>>,
    pushes: Mutex<Vec<ScopePush>>,
    depth: Mutex<usize>,
    fail_compiles: Mutex<bool>,
    next_id: Mutex<u64>,
}

impl MockBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn next_id(&self) -> u64 {
        let mut next = self.next_id.lock();
        let id = *next;
        *next += 1;
        id
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().push(call);
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    /// Make every subsequent `compile_program` fail.
    pub fn set_fail_compiles(&self, fail: bool) {
        *self.fail_compiles.lock() = fail;
    }

    /// Number of compile attempts, successful or not.
    pub fn compile_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, BackendCall::CompileProgram { .. }))
            .count()
    }

    pub fn draw_count(&self) -> usize {
        self.draws.lock().len()
    }

    /// Recorded draw calls, in submission order.
    pub fn draws(&self) -> Vec<DrawCall> {
        self.draws.lock().clone()
    }

    pub fn last_draw(&self) -> Option<DrawCall> {
        self.draws.lock().last().cloned()
    }

    /// Creation-time contents of every buffer ever created.
    pub fn created_buffers(&self) -> Vec<Vec<f32>> {
        self.created.lock().clone()
    }

    pub fn destroyed_buffers(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, BackendCall::DestroyBuffer { .. }))
            .count()
    }

    pub fn live_buffer_count(&self) -> usize {
        self.live.lock().len()
    }

    /// Latest contents of a live buffer.
    pub fn buffer_data(&self, buffer: BufferId) -> Option<Vec<f32>> {
        self.live
            .lock()
            .iter()
            .find(|(id, _)| *id == buffer.0)
            .map(|(_, data)| data.clone())
    }

    /// Current scope stack depth. Zero after every balanced render.
    pub fn scope_depth(&self) -> usize {
        *self.depth.lock()
    }

    /// Recorded scope pushes, in order.
    pub fn scope_pushes(&self) -> Vec<ScopePush> {
        self.pushes.lock().clone()
    }
}

impl RenderBackend for MockBackend {
    fn create_buffer(&self, data: &[f32]) -> BufferId {
        let id = self.next_id();
        self.created.lock().push(data.to_vec());
        self.live.lock().push((id, data.to_vec()));
        self.record(BackendCall::CreateBuffer {
            id,
            len: data.len(),
        });
        BufferId(id)
    }

    fn update_buffer(&self, buffer: BufferId, data: &[f32]) {
        let mut live = self.live.lock();
        if let Some((_, contents)) = live.iter_mut().find(|(id, _)| *id == buffer.0) {
            *contents = data.to_vec();
        }
        self.record(BackendCall::UpdateBuffer {
            id: buffer.0,
            len: data.len(),
        });
    }

    fn destroy_buffer(&self, buffer: BufferId) {
        self.live.lock().retain(|(id, _)| *id != buffer.0);
        self.record(BackendCall::DestroyBuffer { id: buffer.0 });
    }

    fn compile_program(&self, desc: &ProgramDescriptor) -> Result<ProgramId, PlotError> {
        // Attempts are recorded whether or not they succeed, so callers
        // can assert that cached failures are not retried.
        let id = self.next_id();
        self.record(BackendCall::CompileProgram {
            id,
            label: desc.label,
        });
        if *self.fail_compiles.lock() {
            return Err(PlotError::ProgramCompile(format!(
                "forced failure for {}",
                desc.label
            )));
        }
        Ok(ProgramId(id))
    }

    fn create_scope(&self, _desc: &ScopeDescriptor) -> ScopeId {
        let id = self.next_id();
        self.record(BackendCall::CreateScope { id });
        ScopeId(id)
    }

    fn push_scope(&self, push: ScopePush) {
        *self.depth.lock() += 1;
        self.pushes.lock().push(push);
        self.record(BackendCall::PushScope);
    }

    fn pop_scope(&self) {
        *self.depth.lock() -= 1;
        self.record(BackendCall::PopScope);
    }

    fn draw(&self, program: ProgramId, call: &DrawCall) {
        self.record(BackendCall::Draw {
            program: program.0,
            instances: call.instances,
        });
        self.draws.lock().push(call.clone());
    }

    fn clear(&self, color: [f32; 4]) {
        self.record(BackendCall::Clear { color });
    }

    fn create_surface(&self, width: u32, height: u32) -> SurfaceId {
        let id = self.next_id();
        self.record(BackendCall::CreateSurface { id, width, height });
        SurfaceId(id)
    }

    fn copy_to(
        &self,
        _source: Viewport,
        destination: Option<SurfaceId>,
        destination_viewport: Option<Viewport>,
    ) -> SurfaceId {
        let _ = destination_viewport;
        let destination = destination.unwrap_or_else(|| SurfaceId(self.next_id()));
        self.record(BackendCall::CopyTo {
            destination: destination.0,
        });
        destination
    }
}
