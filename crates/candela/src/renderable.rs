//! The scene-graph contracts: leaf primitives, composites, and the tree
//! that nests them.

use std::cell::Cell;
use std::rc::Rc;

use crate::coords::CoordinateSystem;
use crate::error::PlotError;
use crate::render::{ProgramId, RenderBackend, ScopePush};

/// Cache discriminant for compiled programs. One program is compiled per
/// (coordinate-system fragment, kind) pair; every instance of a kind
/// shares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    LineSegments,
    LineStrip,
    VLines,
    HLines,
    Circles,
    Rects,
}

/// The device-side shape of a primitive kind, consumed on cache miss.
#[derive(Debug, Clone, Copy)]
pub struct ShaderSpec {
    pub label: &'static str,
    /// WGSL entry points plus the group-1 storage bindings they read.
    pub body: &'static str,
    /// Number of group-1 storage bindings, in binding order.
    pub instanced_bindings: usize,
    /// Components per geometry-template vertex (2 or 3).
    pub vertex_components: usize,
}

/// A leaf renderable issuing one instanced draw.
///
/// Primitives own their datasets. They start out transient: the engine
/// disposes them at the end of the render pass that consumed them, which
/// in turn releases each owned dataset still marked automatic. Call
/// [`retain`](Self::retain) to reuse a primitive across passes; it is
/// then the caller's job to [`dispose`](Self::dispose) it.
pub trait Primitive {
    fn kind(&self) -> PrimitiveKind;

    /// The kind's shader shape; must not vary per instance.
    fn shader(&self) -> ShaderSpec;

    /// Issue the draw with a program previously compiled from
    /// [`shader`](Self::shader). Instance counts are derived from the
    /// owned datasets.
    fn draw(&self, ctx: &dyn RenderBackend, program: ProgramId) -> Result<(), PlotError>;

    /// Release the geometry template and every owned dataset still
    /// marked automatic. Retained datasets stay alive for their owners.
    fn dispose(&self);

    fn retained(&self) -> bool;

    fn set_retained(&self, retained: bool);
}

/// A renderable that expands into children, optionally wrapping them in
/// an extra draw-state scope.
pub trait Composite {
    /// The expansion, computed once at construction.
    fn children(&self) -> &[Renderable];

    /// Extra draw state installed around the children for the duration
    /// of their traversal.
    fn scope(&self, coords: &dyn CoordinateSystem) -> Option<ScopePush> {
        let _ = coords;
        None
    }
}

/// A tree of drawables. Groups nest arbitrarily and flatten during
/// traversal; children draw in declared order, last on top.
pub enum Renderable {
    Primitive(Rc<dyn Primitive>),
    Composite(Rc<dyn Composite>),
    Group(Vec<Renderable>),
}

impl Renderable {
    /// Mark every primitive in the tree as caller-managed.
    pub fn retain(&self) -> &Self {
        self.visit_primitives(&mut |p| p.set_retained(true));
        self
    }

    /// Dispose every primitive in the tree, clearing retention first so
    /// automatic datasets are actually released.
    pub fn dispose(&self) {
        self.visit_primitives(&mut |p| {
            p.set_retained(false);
            p.dispose();
        });
    }

    fn visit_primitives(&self, f: &mut impl FnMut(&dyn Primitive)) {
        match self {
            Renderable::Primitive(p) => f(p.as_ref()),
            Renderable::Composite(c) => {
                for child in c.children() {
                    child.visit_primitives(f);
                }
            }
            Renderable::Group(items) => {
                for item in items {
                    item.visit_primitives(f);
                }
            }
        }
    }
}

impl<P: Primitive + 'static> From<Rc<P>> for Renderable {
    fn from(p: Rc<P>) -> Self {
        Renderable::Primitive(p)
    }
}

impl From<Vec<Renderable>> for Renderable {
    fn from(items: Vec<Renderable>) -> Self {
        Renderable::Group(items)
    }
}

/// Retention flag embedded in every primitive.
#[derive(Debug, Default)]
pub(crate) struct Retention(Cell<bool>);

impl Retention {
    pub(crate) fn get(&self) -> bool {
        self.0.get()
    }

    pub(crate) fn set(&self, retained: bool) {
        self.0.set(retained);
    }
}
