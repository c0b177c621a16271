//! Engine behavior against the recording mock backend.

use std::rc::Rc;

use candela::Engine;
use candela::PlotError;
use candela::coords::{Cartesian, CoordsHandle};
use candela::dataset::Dataset;
use candela::primitives::{
    Circles, CirclesOptions, LineSegments, LineSegmentsOptions, LineStrip, LineStripOptions,
    Rects, RectsOptions,
};
use candela::render::{RenderCtx, Viewport};
use candela::renderable::Renderable;
use candela::scale::Scale;
use candela_test_utils::{BackendCall, MockBackend};

fn viewport() -> Viewport {
    Viewport::new(0.0, 0.0, 800.0, 600.0)
}

fn linear_coords() -> CoordsHandle {
    Cartesian::new(
        Scale::linear([0.0, 1.0], [0.0, 800.0]),
        Scale::linear([0.0, 1.0], [0.0, 600.0]),
    )
}

fn segments(ctx: &RenderCtx) -> Rc<LineSegments> {
    LineSegments::new(
        ctx,
        vec![0.0f32, 0.0, 1.0, 1.0],
        LineSegmentsOptions::default(),
    )
}

#[test]
fn test_same_kind_primitives_share_one_program() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let engine = Engine::new(ctx.clone());
    let coords = linear_coords();

    let tree = Renderable::Group(vec![segments(&ctx).into(), segments(&ctx).into()]);
    engine.render(&coords, viewport(), &tree).unwrap();

    assert_eq!(mock.compile_count(), 1);
    assert_eq!(mock.draw_count(), 2);
}

#[test]
fn test_distinct_kinds_compile_separately() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let engine = Engine::new(ctx.clone());
    let coords = linear_coords();

    let circles = Circles::new(
        &ctx,
        vec![0.5f32],
        vec![0.5f32],
        CirclesOptions::default(),
    );
    let tree = Renderable::Group(vec![segments(&ctx).into(), circles.into()]);
    engine.render(&coords, viewport(), &tree).unwrap();

    assert_eq!(mock.compile_count(), 2);
}

#[test]
fn test_strip_and_rects_render_with_own_programs() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let engine = Engine::new(ctx.clone());
    let coords = linear_coords();

    let strip = LineStrip::new(
        &ctx,
        vec![0.0f32, 0.3, 0.6, 1.0],
        vec![0.0f32, 0.8, 0.2, 1.0],
        LineStripOptions::default(),
    );
    let rects = Rects::new(
        &ctx,
        vec![0.1f32, 0.0, 0.2, 0.5, 0.5, 0.0, 0.2, 0.9],
        RectsOptions::default(),
    );
    let tree = Renderable::Group(vec![rects.into(), strip.into()]);
    engine.render(&coords, viewport(), &tree).unwrap();

    assert_eq!(mock.compile_count(), 2);
    let draws = mock.draws();
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0].instances, 2);
    assert_eq!(draws[1].instances, 3);
}

#[test]
fn test_scale_kind_changes_program_but_bounds_do_not() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let engine = Engine::new(ctx.clone());

    // Same scale kinds, different bounds: the fragment text is identical
    // so the compiled program is reused across coordinate systems.
    let a = linear_coords();
    let b: CoordsHandle = Cartesian::new(
        Scale::linear([-5.0, 5.0], [0.0, 100.0]),
        Scale::linear([2.0, 3.0], [0.0, 100.0]),
    );
    engine.render(&a, viewport(), &segments(&ctx).into()).unwrap();
    engine.render(&b, viewport(), &segments(&ctx).into()).unwrap();
    assert_eq!(mock.compile_count(), 1);

    // A log scale changes the fragment and forces a second compile.
    let c: CoordsHandle = Cartesian::new(
        Scale::linear([0.0, 1.0], [0.0, 800.0]),
        Scale::log(10.0, [1.0, 1000.0], [0.0, 600.0]),
    );
    engine.render(&c, viewport(), &segments(&ctx).into()).unwrap();
    assert_eq!(mock.compile_count(), 2);
}

#[test]
fn test_children_draw_in_declaration_order() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let engine = Engine::new(ctx.clone());
    let coords = linear_coords();

    let first = segments(&ctx);
    let second = segments(&ctx);
    let tree = Renderable::Group(vec![
        first.into(),
        Renderable::Group(vec![second.into()]),
    ]);
    engine.render(&coords, viewport(), &tree).unwrap();

    let draws = mock.draws();
    assert_eq!(draws.len(), 2);
    // Nested groups flatten; the first-declared primitive draws first.
    // Buffer ids allocate monotonically, so the earlier primitive's
    // bindings carry smaller ids.
    assert_ne!(draws[0].geometry, draws[1].geometry);
    assert!(draws[0].bindings[0].buffer.0 < draws[1].bindings[0].buffer.0);
}

#[test]
fn test_auto_primitives_dispose_after_render() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let engine = Engine::new(ctx.clone());
    let coords = linear_coords();

    let line = segments(&ctx);
    let points = line.points().clone();
    engine.render(&coords, viewport(), &line.into()).unwrap();

    // Points, widths, colors, and the geometry template are all gone.
    assert!(points.is_disposed());
    assert_eq!(mock.live_buffer_count(), 0);
    assert_eq!(points.update(1.0f32), Err(PlotError::DatasetDisposed));
}

#[test]
fn test_retained_primitive_survives_and_rerenders() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let engine = Engine::new(ctx.clone());
    let coords = linear_coords();

    let line = segments(&ctx);
    let points = line.points().clone();
    let tree: Renderable = line.into();
    tree.retain();

    engine.render(&coords, viewport(), &tree).unwrap();
    engine.render(&coords, viewport(), &tree).unwrap();

    assert!(!points.is_disposed());
    assert_eq!(mock.draw_count(), 2);
    assert_eq!(mock.compile_count(), 1);

    tree.dispose();
    assert_eq!(mock.live_buffer_count(), 0);
}

#[test]
fn test_retained_dataset_survives_auto_primitive() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let engine = Engine::new(ctx.clone());
    let coords = linear_coords();

    // Handing a held dataset to a primitive marks it retained.
    let points = Dataset::new(&ctx, vec![0.0f32, 0.0, 1.0, 1.0]);
    let line = LineSegments::new(&ctx, points.clone(), LineSegmentsOptions::default());
    engine.render(&coords, viewport(), &line.into()).unwrap();

    // The primitive was consumed, but the retained dataset lives on and
    // can feed another primitive next pass.
    assert!(!points.is_disposed());
    points.update(vec![1.0f32, 1.0, 2.0, 2.0]).unwrap();

    let line = LineSegments::new(&ctx, points.clone(), LineSegmentsOptions::default());
    engine.render(&coords, viewport(), &line.into()).unwrap();
    assert_eq!(mock.draw_count(), 2);

    points.dispose();
}

#[test]
fn test_failed_compile_poisons_only_its_slot() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let engine = Engine::new(ctx.clone());
    let coords = linear_coords();

    mock.set_fail_compiles(true);
    let result = engine.render(&coords, viewport(), &segments(&ctx).into());
    assert!(matches!(result, Err(PlotError::ProgramCompile(_))));
    assert_eq!(mock.compile_count(), 1);

    // The failure is cached: no recompile attempt, same error.
    mock.set_fail_compiles(false);
    let result = engine.render(&coords, viewport(), &segments(&ctx).into());
    assert!(matches!(result, Err(PlotError::ProgramCompile(_))));
    assert_eq!(mock.compile_count(), 1);

    // Other kinds are unaffected.
    let circles = Circles::new(&ctx, vec![0.5f32], vec![0.5f32], CirclesOptions::default());
    engine.render(&coords, viewport(), &circles.into()).unwrap();
    assert_eq!(mock.compile_count(), 2);

    // An explicit cache clear allows the retry to succeed.
    engine.clear_caches();
    engine.render(&coords, viewport(), &segments(&ctx).into()).unwrap();
    assert_eq!(mock.compile_count(), 3);
}

#[test]
fn test_scopes_balance_on_error() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let engine = Engine::new(ctx.clone());
    let coords = linear_coords();

    // Ragged points: three floats cannot form (x, y) pairs, so the draw
    // errors mid-traversal.
    let bad = LineSegments::new(&ctx, vec![0.0f32, 0.0, 1.0], LineSegmentsOptions::default());
    let tree = candela::composites::Scissor::new(
        0.0,
        0.0,
        0.5,
        0.5,
        false,
        vec![segments(&ctx).into(), bad.into()],
    );

    let result = engine.render(&coords, viewport(), &tree.into());
    assert!(matches!(result, Err(PlotError::IncompatibleSize { .. })));
    assert_eq!(mock.scope_depth(), 0);
    // The draw before the failure stayed on the surface.
    assert_eq!(mock.draw_count(), 1);
}

#[test]
fn test_coordinate_scope_cached_by_identity() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let engine = Engine::new(ctx.clone());
    let coords = linear_coords();

    engine.render(&coords, viewport(), &segments(&ctx).into()).unwrap();
    engine.render(&coords, viewport(), &segments(&ctx).into()).unwrap();
    let scope_creates = mock
        .calls()
        .iter()
        .filter(|call| matches!(call, BackendCall::CreateScope { .. }))
        .count();
    assert_eq!(scope_creates, 1);
}

#[test]
fn test_clear_and_copy_delegate() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let engine = Engine::new(ctx.clone());

    engine.clear([1.0, 1.0, 1.0, 1.0]);
    let surface = engine.copy_to(viewport(), None, None);
    let calls = mock.calls();
    assert!(calls.iter().any(|c| matches!(c, BackendCall::Clear { .. })));
    assert!(
        calls
            .iter()
            .any(|c| matches!(c, BackendCall::CopyTo { destination } if *destination == surface.0))
    );
}
