//! Primitive draw submission against the recording mock: instance
//! counts, binding order, and `steps` index-step derivation.

use candela::primitives::{
    Circles, CirclesOptions, LineSegments, LineSegmentsOptions, LineStrip, LineStripOptions,
    Rects, RectsOptions, VLines, VLinesOptions,
};
use candela::render::{ProgramId, RenderCtx, UniformValue};
use candela::renderable::Primitive;
use candela_test_utils::MockBackend;

#[test]
fn test_draw_derives_instances_and_steps() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let segments = LineSegments::new(
        &ctx,
        vec![0.0f32, 0.0, 1.0, 1.0, 1.0, 1.0, 2.0, 0.0],
        LineSegmentsOptions::default(),
    );
    let program = ProgramId(7);
    segments.draw(ctx.as_ref(), program).unwrap();
    let call = mock.last_draw().unwrap();
    assert_eq!(call.vertices, 6);
    assert_eq!(call.instances, 2);
    assert_eq!(call.bindings.len(), 3);
    // Default width and color are single-tuple broadcasts.
    assert_eq!(
        call.uniforms,
        vec![("steps", UniformValue::UVec4([0, 0, 0, 0]))]
    );
}

#[test]
fn test_draw_rejects_ragged_points() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let segments = LineSegments::new(&ctx, vec![0.0f32, 0.0, 1.0], LineSegmentsOptions::default());
    assert!(segments.draw(ctx.as_ref(), ProgramId(0)).is_err());
    assert_eq!(mock.draw_count(), 0);
}

#[test]
fn test_per_instance_attributes_advance() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let segments = LineSegments::new(
        &ctx,
        vec![0.0f32, 0.0, 1.0, 1.0, 1.0, 1.0, 2.0, 0.0],
        LineSegmentsOptions {
            widths: vec![1.0f32, 3.0].into(),
            colors: vec![[1.0f32, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0]].into(),
        },
    );
    segments.draw(ctx.as_ref(), ProgramId(0)).unwrap();
    let call = mock.last_draw().unwrap();
    assert_eq!(
        call.uniforms,
        vec![("steps", UniformValue::UVec4([1, 1, 0, 0]))]
    );
}

#[test]
fn test_vline_instances_are_line_triples() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let lines = VLines::new(
        &ctx,
        vec![0.0f32, 0.0, 10.0, 5.0, 2.0, 8.0],
        VLinesOptions::default(),
    );
    lines.draw(ctx.as_ref(), ProgramId(0)).unwrap();
    assert_eq!(mock.last_draw().unwrap().instances, 2);
}

#[test]
fn test_circle_mixed_broadcast_and_per_instance_steps() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let circles = Circles::new(
        &ctx,
        vec![0.0f32, 1.0, 2.0],
        vec![0.0f32, 1.0, 2.0],
        CirclesOptions {
            radii: vec![1.0f32, 2.0, 3.0].into(),
            ..Default::default()
        },
    );
    circles.draw(ctx.as_ref(), ProgramId(0)).unwrap();
    let call = mock.last_draw().unwrap();
    assert_eq!(call.instances, 3);
    assert_eq!(call.bindings.len(), 6);
    assert_eq!(
        call.uniforms,
        vec![("steps", UniformValue::UVec4([0, 1, 0, 0]))]
    );
}

#[test]
fn test_strip_draws_one_segment_per_adjacent_pair() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let strip = LineStrip::new(
        &ctx,
        vec![0.0f32, 1.0, 2.0, 3.0],
        vec![0.0f32, 1.0, 0.0, 1.0],
        LineStripOptions::default(),
    );
    strip.draw(ctx.as_ref(), ProgramId(0)).unwrap();
    let call = mock.last_draw().unwrap();
    // Four points form three segments; caps add a 16-step semicircle at
    // each end of the template quad.
    assert_eq!(call.instances, 3);
    assert_eq!(call.vertices, 6 + 2 * 16 * 3);
    assert_eq!(call.bindings.len(), 4);
    assert_eq!(
        call.uniforms,
        vec![("steps", UniformValue::UVec4([0, 0, 0, 0]))]
    );
}

#[test]
fn test_strip_per_segment_colors_advance() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let strip = LineStrip::new(
        &ctx,
        vec![0.0f32, 1.0, 2.0],
        vec![0.0f32, 1.0, 0.0],
        LineStripOptions {
            widths: 2.0.into(),
            colors: vec![[1.0f32, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0]].into(),
        },
    );
    strip.draw(ctx.as_ref(), ProgramId(0)).unwrap();
    assert_eq!(
        mock.last_draw().unwrap().uniforms,
        vec![("steps", UniformValue::UVec4([0, 1, 0, 0]))]
    );
}

#[test]
fn test_strip_single_point_draws_no_segments() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let strip = LineStrip::new(&ctx, 0.5f32, 0.5f32, LineStripOptions::default());
    strip.draw(ctx.as_ref(), ProgramId(0)).unwrap();
    assert_eq!(mock.last_draw().unwrap().instances, 0);
}

#[test]
fn test_rect_instances_are_corner_size_quads() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let rects = Rects::new(
        &ctx,
        vec![0.0f32, 0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 4.0],
        RectsOptions::default(),
    );
    rects.draw(ctx.as_ref(), ProgramId(0)).unwrap();
    let call = mock.last_draw().unwrap();
    assert_eq!(call.vertices, 6);
    assert_eq!(call.instances, 2);
    assert_eq!(call.bindings.len(), 2);
    assert_eq!(
        call.uniforms,
        vec![("steps", UniformValue::UVec4([0, 0, 0, 0]))]
    );
}

#[test]
fn test_rect_rejects_partial_quadruple() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let rects = Rects::new(&ctx, vec![0.0f32, 0.0, 1.0], RectsOptions::default());
    assert!(rects.draw(ctx.as_ref(), ProgramId(0)).is_err());
    assert_eq!(mock.draw_count(), 0);
}
