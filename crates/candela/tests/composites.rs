//! Composite expansion against the recording mock: axis geometry, tick
//! generation, and grid layout.

use std::rc::Rc;

use candela::PlotError;
use candela::composites::{
    Axis, AxisDirection, AxisOptions, Grid, GridOptions, OrthoAxis, OrthoAxisOptions,
};
use candela::coords::Cartesian;
use candela::glam::DVec2;
use candela::render::RenderCtx;
use candela::renderable::Composite;
use candela::scale::{Scale, ScaleHandle};
use candela_test_utils::MockBackend;

fn ctx() -> RenderCtx {
    MockBackend::new()
}

fn cartesian(x: ScaleHandle, y: ScaleHandle) -> Rc<Cartesian> {
    Cartesian::new(x, y)
}

fn anisotropic_coords() -> Rc<Cartesian> {
    Cartesian::new(
        Scale::linear([0.0, 10.0], [0.0, 1000.0]),
        Scale::linear([0.0, 10.0], [0.0, 500.0]),
    )
}

#[test]
fn test_horizontal_axis_ticks_are_vertical() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let coords = anisotropic_coords();
    let axis = Axis::new(
        &ctx,
        coords.as_ref(),
        DVec2::new(0.0, 5.0),
        DVec2::new(10.0, 5.0),
        &[0.0, 5.0, 10.0],
        &["0".into(), "5".into(), "10".into()],
        AxisOptions::default(),
    );
    // Axis line plus major ticks.
    assert_eq!(axis.children().len(), 2);
    assert_eq!(axis.labels().len(), 3);
}

#[test]
fn test_tick_length_is_screen_space() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    // Anisotropic mapping: 100 px/unit in x, 50 px/unit in y.
    let coords = anisotropic_coords();
    let _axis = Axis::new(
        &ctx,
        coords.as_ref(),
        DVec2::new(0.0, 5.0),
        DVec2::new(10.0, 5.0),
        &[5.0],
        &["5".into()],
        AxisOptions {
            tick_length: 12.0,
            ..Default::default()
        },
    );
    // Tick endpoints land 6 px either side of the axis: 0.12 domain
    // units at 50 px/unit.
    let buffers = mock.created_buffers();
    let ticks = buffers
        .iter()
        .find(|data| data.len() == 3 && data[0] == 5.0)
        .expect("one vline triple");
    assert_eq!(ticks[0], 5.0);
    assert!((ticks[1] - 4.88).abs() < 1e-4);
    assert!((ticks[2] - 5.12).abs() < 1e-4);
}

#[test]
fn test_default_anchor_points_at_axis() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let coords = anisotropic_coords();
    let axis = Axis::new(
        &ctx,
        coords.as_ref(),
        DVec2::new(0.0, 0.0),
        DVec2::new(10.0, 0.0),
        &[5.0],
        &["5".into()],
        AxisOptions::default(),
    );
    // With the default side the label sits past the tick, anchored
    // at its bottom edge so the text reads away from the axis.
    let label = &axis.labels()[0];
    assert_eq!(label.anchor, DVec2::new(0.0, -1.0));
    assert!(label.position.y > 0.0);
}

#[test]
fn test_zero_step_errors() {
    let coords = cartesian(
        Scale::linear([0.0, 10.0], [0.0, 100.0]),
        Scale::linear([0.0, 10.0], [0.0, 100.0]),
    );
    let result = OrthoAxis::new(
        &ctx(),
        &coords,
        AxisDirection::X,
        OrthoAxisOptions {
            tick_step: 0.0,
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(PlotError::ZeroTickStep)));
}

#[test]
fn test_linear_ticks_cover_bounds() {
    let coords = cartesian(
        Scale::linear([0.0, 10.0], [0.0, 100.0]),
        Scale::linear([0.0, 10.0], [0.0, 100.0]),
    );
    let axis = OrthoAxis::new(
        &ctx(),
        &coords,
        AxisDirection::X,
        OrthoAxisOptions {
            tick_step: 2.0,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(axis.info().ticks, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
}

#[test]
fn test_tick_origin_shifts_lattice() {
    let coords = cartesian(
        Scale::linear([0.0, 3.0], [0.0, 100.0]),
        Scale::linear([0.0, 1.0], [0.0, 100.0]),
    );
    let axis = OrthoAxis::new(
        &ctx(),
        &coords,
        AxisDirection::X,
        OrthoAxisOptions {
            tick_origin: 0.1,
            ..Default::default()
        },
    )
    .unwrap();
    let ticks = &axis.info().ticks;
    assert_eq!(ticks.len(), 3);
    for (tick, expected) in ticks.iter().zip([0.1, 1.1, 2.1]) {
        assert!((tick - expected).abs() < 1e-9);
    }
}

#[test]
fn test_negative_step_is_normalized() {
    let coords = cartesian(
        Scale::linear([0.0, 4.0], [0.0, 100.0]),
        Scale::linear([0.0, 1.0], [0.0, 100.0]),
    );
    let a = OrthoAxis::new(
        &ctx(),
        &coords,
        AxisDirection::X,
        OrthoAxisOptions {
            tick_step: -2.0,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(a.info().ticks, vec![0.0, 2.0, 4.0]);
}

#[test]
fn test_log_ticks_at_powers() {
    let coords = cartesian(
        Scale::log(10.0, [1.0, 100000.0], [0.0, 100.0]),
        Scale::linear([0.0, 1.0], [0.0, 100.0]),
    );
    let axis = OrthoAxis::new(&ctx(), &coords, AxisDirection::X, OrthoAxisOptions::default())
        .unwrap();
    let ticks = &axis.info().ticks;
    assert_eq!(ticks.len(), 6);
    for (tick, expected) in ticks
        .iter()
        .zip([1.0, 10.0, 100.0, 1000.0, 10000.0, 100000.0])
    {
        assert!((tick - expected).abs() / expected < 1e-9);
    }
}

#[test]
fn test_minor_ticks_subdivide_and_bound() {
    let coords = cartesian(
        Scale::linear([0.0, 2.0], [0.0, 100.0]),
        Scale::linear([0.0, 1.0], [0.0, 100.0]),
    );
    let axis = OrthoAxis::new(
        &ctx(),
        &coords,
        AxisDirection::X,
        OrthoAxisOptions {
            minor_tick_count: Some(1),
            ..Default::default()
        },
    )
    .unwrap();
    let info = axis.info();
    assert_eq!(info.ticks, vec![0.0, 1.0, 2.0]);
    // Minors from the overscanned majors are clipped to the axis
    // span, leaving one between each surviving pair and none beyond.
    assert_eq!(info.minor_ticks, vec![0.5, 1.5]);
    for minor in &info.minor_ticks {
        assert!(*minor >= 0.0 && *minor <= 2.0);
    }
}

#[test]
fn test_log_minor_ticks_are_geometric_gaps() {
    let coords = cartesian(
        Scale::linear([0.0, 1.0], [0.0, 100.0]),
        Scale::log(10.0, [1.0, 100.0], [0.0, 100.0]),
    );
    let axis = OrthoAxis::new(
        &ctx(),
        &coords,
        AxisDirection::Y,
        OrthoAxisOptions {
            minor_tick_count: Some(4),
            ..Default::default()
        },
    )
    .unwrap();
    let info = axis.info();
    // Between 1 and 10 the minors are arithmetic within the gap.
    let expected = [2.8, 4.6, 6.4, 8.2];
    for (minor, want) in info.minor_ticks.iter().zip(expected) {
        assert!((minor - want).abs() < 1e-9, "got {minor}, want {want}");
    }
}

#[test]
fn test_labels_use_formatter() {
    let coords = cartesian(
        Scale::linear([0.0, 2.0], [0.0, 100.0]),
        Scale::linear([0.0, 1.0], [0.0, 100.0]),
    );
    let axis = OrthoAxis::new(
        &ctx(),
        &coords,
        AxisDirection::X,
        OrthoAxisOptions {
            label_formatter: Box::new(|n| format!("{n:.1}s")),
            ..Default::default()
        },
    )
    .unwrap();
    let texts: Vec<&str> = axis.labels().iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["0.0s", "1.0s", "2.0s"]);
}

#[test]
fn test_empty_positions_produce_no_children() {
    let ctx: RenderCtx = MockBackend::new();
    let grid = Grid::new(&ctx, &[], &[], [0.0, 1.0], [0.0, 1.0], GridOptions::default());
    assert!(grid.children().is_empty());
}

#[test]
fn test_lines_span_extents() {
    let mock = MockBackend::new();
    let ctx: RenderCtx = mock.clone();
    let _grid = Grid::new(
        &ctx,
        &[1.0, 2.0],
        &[5.0],
        [0.0, 10.0],
        [-1.0, 1.0],
        GridOptions::default(),
    );
    let buffers = mock.created_buffers();
    assert!(buffers.contains(&vec![1.0, -1.0, 1.0, 2.0, -1.0, 1.0]));
    assert!(buffers.contains(&vec![0.0, 10.0, 5.0]));
}
