//! Leaf renderables.
//!
//! Every primitive follows the same scheme: a fixed geometry template
//! (a six-vertex quad for most, a cap-and-quad fan for strips) expanded
//! per instance in the vertex stage, instanced attributes pulled from
//! group-1 storage buffers, and a `steps` uniform carrying the index
//! step of each variable-rate attribute (1 advances per instance, 0
//! broadcasts element zero).

mod circles;
mod hlines;
mod line_segments;
mod line_strip;
mod rects;
mod vlines;

pub use circles::{Circles, CirclesOptions};
pub use hlines::{HLines, HLinesOptions};
pub use line_segments::{LineSegments, LineSegmentsOptions};
pub use line_strip::{LineStrip, LineStripOptions};
pub use rects::{Rects, RectsOptions};
pub use vlines::{VLines, VLinesOptions};

use std::cell::Cell;

use crate::dataset::DatasetHandle;
use crate::render::{BufferId, RenderCtx};
use crate::renderable::Retention;

/// State common to every primitive: the backend handle, the geometry
/// template, and the retention/disposal flags.
pub(crate) struct PrimitiveCore {
    ctx: RenderCtx,
    geometry: BufferId,
    retained: Retention,
    disposed: Cell<bool>,
}

impl PrimitiveCore {
    pub(crate) fn new(ctx: &RenderCtx, template: &[f32]) -> Self {
        Self {
            ctx: ctx.clone(),
            geometry: ctx.create_buffer(template),
            retained: Retention::default(),
            disposed: Cell::new(false),
        }
    }

    pub(crate) fn geometry(&self) -> BufferId {
        self.geometry
    }

    pub(crate) fn retained(&self) -> bool {
        self.retained.get()
    }

    pub(crate) fn set_retained(&self, retained: bool) {
        self.retained.set(retained);
    }

    /// Release automatic datasets and the geometry template. Idempotent
    /// so an engine pass and an explicit dispose cannot double-free.
    pub(crate) fn release(&self, datasets: &[&DatasetHandle]) {
        if self.disposed.replace(true) {
            return;
        }
        for dataset in datasets {
            dataset.dispose_if_auto();
        }
        self.ctx.destroy_buffer(self.geometry);
    }
}
