//! GPU-resident data with a retain/auto-dispose lifetime policy.

use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

use crate::error::PlotError;
use crate::render::{BufferId, RenderCtx};

/// Shared handle to a dataset. Primitives hold their inputs through this.
pub type DatasetHandle = Rc<Dataset>;

/// CPU-side numeric data accepted by [`Dataset::update`].
///
/// A scalar becomes a one-element buffer; a flat slice uploads as-is; a
/// nested slice of fixed-arity tuples flattens to outer × inner elements.
#[derive(Debug, Clone)]
pub enum DataInput {
    Scalar(f32),
    Flat(Vec<f32>),
    Pairs(Vec<[f32; 2]>),
    Quads(Vec<[f32; 4]>),
}

impl DataInput {
    fn flatten(&self) -> (Vec<f32>, usize) {
        match self {
            DataInput::Scalar(v) => (vec![*v], 1),
            DataInput::Flat(v) => (v.clone(), v.len()),
            DataInput::Pairs(v) => {
                let flat: Vec<f32> = v.iter().flatten().copied().collect();
                let len = flat.len();
                (flat, len)
            }
            DataInput::Quads(v) => {
                let flat: Vec<f32> = v.iter().flatten().copied().collect();
                let len = flat.len();
                (flat, len)
            }
        }
    }
}

impl From<f32> for DataInput {
    fn from(v: f32) -> Self {
        DataInput::Scalar(v)
    }
}

impl From<Vec<f32>> for DataInput {
    fn from(v: Vec<f32>) -> Self {
        DataInput::Flat(v)
    }
}

impl From<&[f32]> for DataInput {
    fn from(v: &[f32]) -> Self {
        DataInput::Flat(v.to_vec())
    }
}

impl From<Vec<[f32; 2]>> for DataInput {
    fn from(v: Vec<[f32; 2]>) -> Self {
        DataInput::Pairs(v)
    }
}

impl From<Vec<[f32; 4]>> for DataInput {
    fn from(v: Vec<[f32; 4]>) -> Self {
        DataInput::Quads(v)
    }
}

/// Either raw data to upload or an already-created dataset to reuse.
///
/// Every primitive constructor takes this, so call sites can mix raw
/// per-frame arrays with shared handles freely. Passing an existing
/// dataset marks it retained: a handle the caller holds is a handle the
/// caller manages.
pub enum DataSource {
    Raw(DataInput),
    Existing(DatasetHandle),
}

impl From<f32> for DataSource {
    fn from(v: f32) -> Self {
        DataSource::Raw(v.into())
    }
}

impl From<Vec<f32>> for DataSource {
    fn from(v: Vec<f32>) -> Self {
        DataSource::Raw(v.into())
    }
}

impl From<&[f32]> for DataSource {
    fn from(v: &[f32]) -> Self {
        DataSource::Raw(v.into())
    }
}

impl From<Vec<[f32; 2]>> for DataSource {
    fn from(v: Vec<[f32; 2]>) -> Self {
        DataSource::Raw(v.into())
    }
}

impl From<Vec<[f32; 4]>> for DataSource {
    fn from(v: Vec<[f32; 4]>) -> Self {
        DataSource::Raw(v.into())
    }
}

impl From<DatasetHandle> for DataSource {
    fn from(v: DatasetHandle) -> Self {
        DataSource::Existing(v)
    }
}

/// One GPU buffer wrapping CPU numeric data.
///
/// Freshly created datasets are automatic: the engine disposes them at
/// the end of the first render pass that consumes them. Calling
/// [`retain`](Self::retain) opts out, and the dataset then survives
/// across passes until [`dispose`](Self::dispose).
pub struct Dataset {
    ctx: RenderCtx,
    buffer: BufferId,
    length: Cell<usize>,
    auto: Cell<bool>,
    disposed: Cell<bool>,
}

impl Dataset {
    /// Upload `data` into a fresh automatic dataset.
    pub fn new(ctx: &RenderCtx, data: impl Into<DataInput>) -> DatasetHandle {
        let (flat, length) = data.into().flatten();
        let buffer = ctx.create_buffer(&flat);
        trace!(?buffer, length, "created dataset");
        Rc::new(Self {
            ctx: ctx.clone(),
            buffer,
            length: Cell::new(length),
            auto: Cell::new(true),
            disposed: Cell::new(false),
        })
    }

    /// Resolve a source: upload for raw data, retaining passthrough for
    /// existing handles.
    pub fn create(ctx: &RenderCtx, source: impl Into<DataSource>) -> DatasetHandle {
        match source.into() {
            DataSource::Existing(handle) => handle.retain(),
            DataSource::Raw(input) => Self::new(ctx, input),
        }
    }

    /// Mark this dataset as caller-managed and return the handle for
    /// chaining.
    pub fn retain(self: &Rc<Self>) -> DatasetHandle {
        self.auto.set(false);
        self.clone()
    }

    pub fn is_auto(&self) -> bool {
        self.auto.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    pub(crate) fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// Element count of the underlying flat buffer.
    pub fn length(&self) -> usize {
        self.length.get()
    }

    /// Number of `component_size`-tuples held. Errors when the length
    /// does not divide evenly, which catches mismatched attribute arity
    /// before it reaches the GPU.
    pub fn count(&self, component_size: usize) -> Result<usize, PlotError> {
        let length = self.length.get();
        if length % component_size != 0 {
            return Err(PlotError::IncompatibleSize {
                size: component_size,
                length,
            });
        }
        Ok(length / component_size)
    }

    /// Instance divisor for a draw of `instances`: a single-tuple dataset
    /// broadcasts (divisor = `instances`), anything else advances once
    /// per instance (divisor = 1).
    pub fn divisor(&self, instances: usize, component_size: usize) -> Result<usize, PlotError> {
        Ok(if self.count(component_size)? == 1 {
            instances
        } else {
            1
        })
    }

    /// Replace the contents. The buffer may change size.
    pub fn update(&self, data: impl Into<DataInput>) -> Result<(), PlotError> {
        if self.disposed.get() {
            return Err(PlotError::DatasetDisposed);
        }
        let (flat, length) = data.into().flatten();
        self.ctx.update_buffer(self.buffer, &flat);
        self.length.set(length);
        Ok(())
    }

    /// Release the GPU buffer. Further `update` calls error.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        trace!(buffer = ?self.buffer, "disposed dataset");
        self.ctx.destroy_buffer(self.buffer);
    }

    /// Release only when the dataset is still automatic. The engine calls
    /// this after each render pass.
    pub fn dispose_if_auto(&self) {
        if self.auto.get() {
            self.dispose();
        }
    }
}
