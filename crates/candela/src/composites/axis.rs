//! A general axis along an arbitrary segment, with ticks and label
//! placements.

use std::rc::Rc;

use glam::DVec2;

use crate::coords::CoordinateSystem;
use crate::primitives::{
    HLines, HLinesOptions, LineSegments, LineSegmentsOptions, VLines, VLinesOptions,
};
use crate::render::RenderCtx;
use crate::renderable::{Composite, Renderable};

pub struct AxisOptions {
    /// Color of the primary axis line. Default opaque black.
    pub axis_color: [f32; 4],
    /// Width of the primary axis line in pixels. Default 1.
    pub axis_width: f32,
    /// Anchor of the label relative to its quad, on `[-1, -1]` (bottom
    /// left) to `[1, 1]` (top right). Derived from the axis direction
    /// when `None`.
    pub label_anchor: Option<DVec2>,
    /// Rotation of the label around its anchor. Default 0.
    pub label_angle: f64,
    /// Color of the tick labels. Default opaque black.
    pub label_color: [f32; 4],
    /// Padding between ticks and labels in pixels. Default 3.
    pub label_pad: f64,
    /// Which side of the axis labels are placed on. Default -1.
    pub label_side: f64,
    /// Label font size in pixels. Default 12.
    pub label_size: f64,
    /// Color of the major ticks. Default opaque black.
    pub tick_color: [f32; 4],
    /// Length of the major ticks in pixels. Default 12.
    pub tick_length: f64,
    /// Shift of the ticks from centered on the axis line. Default 0.
    pub tick_offset: f64,
    /// Width of the major ticks in pixels. Default 1.
    pub tick_width: f32,
    /// Minor tick positions as distances from `start`. Default empty.
    pub minor_ticks: Vec<f64>,
    /// Color of the minor ticks. Default opaque black.
    pub minor_tick_color: [f32; 4],
    /// Length of the minor ticks in pixels. Default 6.
    pub minor_tick_length: f64,
    /// Shift of the minor ticks from centered. Default 0.
    pub minor_tick_offset: f64,
    /// Width of the minor ticks in pixels. Default 1.
    pub minor_tick_width: f32,
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self {
            axis_color: [0.0, 0.0, 0.0, 1.0],
            axis_width: 1.0,
            label_anchor: None,
            label_angle: 0.0,
            label_color: [0.0, 0.0, 0.0, 1.0],
            label_pad: 3.0,
            label_side: -1.0,
            label_size: 12.0,
            tick_color: [0.0, 0.0, 0.0, 1.0],
            tick_length: 12.0,
            tick_offset: 0.0,
            tick_width: 1.0,
            minor_ticks: Vec::new(),
            minor_tick_color: [0.0, 0.0, 0.0, 1.0],
            minor_tick_length: 6.0,
            minor_tick_offset: 0.0,
            minor_tick_width: 1.0,
        }
    }
}

/// Placement data for one tick label, in lieu of rasterized text: the
/// domain-space position plus the anchor/angle/size/color styling needed
/// by whatever text layer the application brings.
#[derive(Debug, Clone)]
pub struct AxisLabel {
    pub text: String,
    /// Label position in domain units.
    pub position: DVec2,
    pub anchor: DVec2,
    pub angle: f64,
    pub size: f64,
    pub color: [f32; 4],
}

/// An axis along the segment `start`..`end`, in domain units.
///
/// Tick geometry is laid out perpendicular to the axis in screen space
/// (so ticks stay perpendicular under anisotropic scales) and then
/// mapped back to domain space for rendering. Purely vertical or
/// horizontal axes use the pixel-snapped line primitives; anything
/// oblique falls back to plain segments.
pub struct Axis {
    children: Vec<Renderable>,
    labels: Vec<AxisLabel>,
}

impl Axis {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: &RenderCtx,
        coords: &dyn CoordinateSystem,
        start: DVec2,
        end: DVec2,
        ticks: &[f64],
        labels: &[String],
        options: AxisOptions,
    ) -> Rc<Self> {
        let dir_world = (end - start).normalize();
        let start_screen = coords.to_range(start);
        let end_screen = coords.to_range(end);
        let screen_dir = end_screen - start_screen;
        let ortho_screen = DVec2::new(-screen_dir.y, screen_dir.x).normalize();

        let anchor = options.label_anchor.unwrap_or_else(|| {
            let a = ortho_screen * options.label_side;
            a / a.x.abs().max(a.y.abs())
        });

        let mut tick_points = Vec::with_capacity(ticks.len() * 4);
        let mut axis_labels = Vec::with_capacity(ticks.len());
        for (tick, label) in ticks.iter().zip(labels) {
            let center =
                coords.to_range(start + dir_world * *tick) + ortho_screen * options.tick_offset;
            let half = ortho_screen * (0.5 * options.tick_length);
            push_point(&mut tick_points, coords.to_domain(center - half));
            push_point(&mut tick_points, coords.to_domain(center + half));

            let label_position = center
                + ortho_screen * (-options.label_side * (0.5 * options.tick_length + options.label_pad));
            axis_labels.push(AxisLabel {
                text: label.clone(),
                position: coords.to_domain(label_position),
                anchor,
                angle: options.label_angle,
                size: options.label_size,
                color: options.label_color,
            });
        }

        let mut minor_points = Vec::with_capacity(options.minor_ticks.len() * 4);
        for tick in &options.minor_ticks {
            let center = coords.to_range(start + dir_world * *tick)
                + ortho_screen * options.minor_tick_offset;
            let half = ortho_screen * (0.5 * options.minor_tick_length);
            push_point(&mut minor_points, coords.to_domain(center - half));
            push_point(&mut minor_points, coords.to_domain(center + half));
        }

        let vertical = start.x == end.x;
        let horizontal = start.y == end.y;
        let mut axis_points = Vec::with_capacity(4);
        push_point(&mut axis_points, start);
        push_point(&mut axis_points, end);

        let mut children = Vec::new();
        children.push(segments(
            ctx,
            axis_points,
            vertical,
            horizontal,
            options.axis_width,
            options.axis_color,
        ));
        if !tick_points.is_empty() {
            // Ticks run perpendicular to the axis, so the snapped
            // variants swap.
            children.push(segments(
                ctx,
                tick_points,
                horizontal,
                vertical,
                options.tick_width,
                options.tick_color,
            ));
        }
        if !minor_points.is_empty() {
            children.push(segments(
                ctx,
                minor_points,
                horizontal,
                vertical,
                options.minor_tick_width,
                options.minor_tick_color,
            ));
        }

        Rc::new(Self {
            children,
            labels: axis_labels,
        })
    }

    /// Label placements for the application's text layer.
    pub fn labels(&self) -> &[AxisLabel] {
        &self.labels
    }
}

impl Composite for Axis {
    fn children(&self) -> &[Renderable] {
        &self.children
    }
}

impl From<Rc<Axis>> for Renderable {
    fn from(c: Rc<Axis>) -> Self {
        Renderable::Composite(c)
    }
}

fn push_point(points: &mut Vec<f32>, p: DVec2) {
    points.push(p.x as f32);
    points.push(p.y as f32);
}

fn segments(
    ctx: &RenderCtx,
    points: Vec<f32>,
    vertical: bool,
    horizontal: bool,
    width: f32,
    color: [f32; 4],
) -> Renderable {
    if vertical {
        VLines::new(
            ctx,
            segments_to_vlines(&points),
            VLinesOptions {
                widths: width.into(),
                colors: vec![color].into(),
            },
        )
        .into()
    } else if horizontal {
        HLines::new(
            ctx,
            segments_to_hlines(&points),
            HLinesOptions {
                widths: width.into(),
                colors: vec![color].into(),
            },
        )
        .into()
    } else {
        LineSegments::new(
            ctx,
            points,
            LineSegmentsOptions {
                widths: width.into(),
                colors: vec![color].into(),
            },
        )
        .into()
    }
}

fn segments_to_hlines(segments: &[f32]) -> Vec<f32> {
    segments
        .chunks_exact(4)
        .flat_map(|s| [s[0], s[2], s[1]])
        .collect()
}

fn segments_to_vlines(segments: &[f32]) -> Vec<f32> {
    segments
        .chunks_exact(4)
        .flat_map(|s| [s[0], s[1], s[3]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_reshaping() {
        let segs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(segments_to_hlines(&segs), vec![1.0, 3.0, 2.0, 5.0, 7.0, 6.0]);
        assert_eq!(segments_to_vlines(&segs), vec![1.0, 2.0, 4.0, 5.0, 6.0, 8.0]);
    }
}
