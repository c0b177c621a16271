//! The render orchestrator: traversal, program cache, scope cache.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::debug;

use crate::coords::CoordsHandle;
use crate::error::PlotError;
use crate::render::{
    ProgramDescriptor, ProgramId, RenderCtx, ScopeDescriptor, ScopeGuard, ScopeId, ScopePush,
    SurfaceId, Viewport,
};
use crate::renderable::{Primitive, PrimitiveKind, Renderable};

// Appended between the coordinate-system fragment and the primitive
// body. `frame.steps` carries the per-draw index steps of the variable
// rate instanced attributes.
const COMMON_WGSL: &str = "
struct FrameUniforms {
    resolution: vec2<f32>,
    steps: vec4<u32>,
}

@group(0) @binding(1) var<uniform> frame: FrameUniforms;

fn range_to_clip(v: vec2<f32>) -> vec4<f32> {
    return vec4<f32>(2.0 * v / frame.resolution - 1.0, 0.0, 1.0);
}

fn domain_to_clip(v: vec2<f32>) -> vec4<f32> {
    return range_to_clip(to_range(v));
}
";

/// Renders trees of renderables against a GPU backend.
///
/// The engine keeps two caches for the lifetime of the instance. The
/// program cache is keyed by coordinate-fragment text and primitive
/// kind, so ten thousand `Circles` under one coordinate system compile
/// exactly one program; a failed compile is cached too and poisons only
/// its own slot. The scope cache is keyed by coordinate-system handle
/// identity. Neither cache is invalidated implicitly; call
/// [`clear_caches`](Self::clear_caches) after dropping coordinate
/// systems if the engine is long-lived.
pub struct Engine {
    ctx: RenderCtx,
    programs: RefCell<AHashMap<(String, PrimitiveKind), Result<ProgramId, PlotError>>>,
    scopes: RefCell<AHashMap<usize, ScopeId>>,
}

impl Engine {
    pub fn new(ctx: RenderCtx) -> Self {
        Self {
            ctx,
            programs: RefCell::new(AHashMap::new()),
            scopes: RefCell::new(AHashMap::new()),
        }
    }

    pub fn ctx(&self) -> &RenderCtx {
        &self.ctx
    }

    /// Render a tree under one coordinate system and viewport.
    ///
    /// One blocking call: cache lookups, scope pushes, and draw
    /// submissions all happen in declaration order before it returns.
    /// On error the frame is abandoned mid-traversal; draws already
    /// submitted stay on the surface. Primitives consumed by the
    /// traversal are disposed on the way out unless retained.
    pub fn render(
        &self,
        coords: &CoordsHandle,
        viewport: Viewport,
        renderable: &Renderable,
    ) -> Result<(), PlotError> {
        let scope = self.coords_scope(coords);
        let _coords_guard = ScopeGuard::push(
            self.ctx.as_ref(),
            ScopePush::Uniforms {
                scope,
                values: coords.scope_values(),
            },
        );
        let _viewport_guard = ScopeGuard::push(self.ctx.as_ref(), ScopePush::Viewport(viewport));

        let mut consumed: Vec<Rc<dyn Primitive>> = Vec::new();
        let result = self.render_node(coords, renderable, &mut consumed);
        for primitive in consumed {
            if !primitive.retained() {
                primitive.dispose();
            }
        }
        result
    }

    fn render_node(
        &self,
        coords: &CoordsHandle,
        node: &Renderable,
        consumed: &mut Vec<Rc<dyn Primitive>>,
    ) -> Result<(), PlotError> {
        match node {
            Renderable::Group(items) => {
                for item in items {
                    self.render_node(coords, item, consumed)?;
                }
            }
            Renderable::Primitive(primitive) => {
                let program = self.program(coords, primitive.as_ref())?;
                primitive.draw(self.ctx.as_ref(), program)?;
                consumed.push(primitive.clone());
            }
            Renderable::Composite(composite) => {
                let _guard = composite
                    .scope(coords.as_ref())
                    .map(|push| ScopeGuard::push(self.ctx.as_ref(), push));
                for child in composite.children() {
                    self.render_node(coords, child, consumed)?;
                }
            }
        }
        Ok(())
    }

    fn program(
        &self,
        coords: &CoordsHandle,
        primitive: &dyn Primitive,
    ) -> Result<ProgramId, PlotError> {
        let fragment = coords.fragment();
        let key = (fragment.text.clone(), primitive.kind());
        if let Some(cached) = self.programs.borrow().get(&key) {
            return cached.clone();
        }
        let spec = primitive.shader();
        debug!(label = spec.label, kind = ?primitive.kind(), "compiling program");
        let result = self.ctx.compile_program(&ProgramDescriptor {
            label: spec.label,
            source: format!("{}{}{}", fragment.text, COMMON_WGSL, spec.body),
            coord_uniforms: fragment.fields.clone(),
            instanced_bindings: spec.instanced_bindings,
            vertex_components: spec.vertex_components,
        });
        self.programs.borrow_mut().insert(key, result.clone());
        result
    }

    fn coords_scope(&self, coords: &CoordsHandle) -> ScopeId {
        let key = Rc::as_ptr(coords) as *const () as usize;
        if let Some(scope) = self.scopes.borrow().get(&key) {
            return *scope;
        }
        let scope = self.ctx.create_scope(&ScopeDescriptor {
            uniforms: coords.fragment().fields.clone(),
        });
        self.scopes.borrow_mut().insert(key, scope);
        scope
    }

    /// Clear the active surface to a color.
    pub fn clear(&self, color: [f32; 4]) {
        self.ctx.clear(color);
    }

    /// Composite a viewport of the active surface onto another surface,
    /// allocating one when none is given.
    pub fn copy_to(
        &self,
        source: Viewport,
        destination: Option<SurfaceId>,
        destination_viewport: Option<Viewport>,
    ) -> SurfaceId {
        self.ctx.copy_to(source, destination, destination_viewport)
    }

    /// Drop both caches. Compiled programs and scopes are recreated
    /// lazily on the next render.
    pub fn clear_caches(&self) {
        self.programs.borrow_mut().clear();
        self.scopes.borrow_mut().clear();
    }
}
