//! Axis-aligned axis with generated ticks.

use std::rc::Rc;

use glam::DVec2;

use crate::composites::{Axis, AxisLabel, AxisOptions};
use crate::coords::Cartesian;
use crate::error::PlotError;
use crate::render::RenderCtx;
use crate::renderable::{Composite, Renderable};
use crate::scale::Scale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisDirection {
    X,
    Y,
}

pub struct OrthoAxisOptions {
    /// Styling forwarded to the underlying [`Axis`].
    pub axis: AxisOptions,
    /// Maximum value encompassed by this axis. Defaults to the scale's
    /// upper domain bound.
    pub axis_high: Option<f64>,
    /// Position on the opposing axis that this axis intercepts.
    /// Defaults to the opposing scale's lower domain bound.
    pub axis_intercept: Option<f64>,
    /// Minimum value encompassed by this axis. Defaults to the scale's
    /// lower domain bound.
    pub axis_low: Option<f64>,
    /// Tick label formatter. Default `f64::to_string`.
    pub label_formatter: Box<dyn Fn(f64) -> String>,
    /// Number of minor ticks between consecutive major ticks. Default
    /// none.
    pub minor_tick_count: Option<usize>,
    /// Anchors ticks to the axis: an origin of 0.1 with a step of 1.0
    /// yields ticks at `... -1.9, -0.9, 0.1, 1.1 ...`. Default 0.
    pub tick_origin: f64,
    /// Distance between major ticks, in domain units for linear scales
    /// and in exponent units for log scales. Default 1.
    pub tick_step: f64,
}

impl Default for OrthoAxisOptions {
    fn default() -> Self {
        Self {
            axis: AxisOptions::default(),
            axis_high: None,
            axis_intercept: None,
            axis_low: None,
            label_formatter: Box::new(|n| n.to_string()),
            minor_tick_count: None,
            tick_origin: 0.0,
            tick_step: 1.0,
        }
    }
}

/// The generated tick positions, in domain units.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthoAxisInfo {
    pub ticks: Vec<f64>,
    pub minor_ticks: Vec<f64>,
}

/// A horizontal or vertical axis that derives its endpoints from the
/// coordinate system and generates boundary-correct tick positions.
pub struct OrthoAxis {
    axis: Rc<Axis>,
    children: Vec<Renderable>,
    info: OrthoAxisInfo,
}

impl OrthoAxis {
    pub fn new(
        ctx: &RenderCtx,
        coords: &Rc<Cartesian>,
        direction: AxisDirection,
        options: OrthoAxisOptions,
    ) -> Result<Rc<Self>, PlotError> {
        if options.tick_step == 0.0 {
            return Err(PlotError::ZeroTickStep);
        }
        let step = options.tick_step.abs();

        let is_x = direction == AxisDirection::X;
        let scale = if is_x { coords.x_scale() } else { coords.y_scale() };
        let other = if is_x { coords.y_scale() } else { coords.x_scale() };

        let intercept = options.axis_intercept.unwrap_or(other.domain()[0]);
        let low = options.axis_low.unwrap_or(scale.domain()[0]);
        let high = options.axis_high.unwrap_or(scale.domain()[1]);

        let ticks = generate_ticks(scale.as_ref(), options.tick_origin, step, low, high);
        let minor_ticks = subdivide(&ticks, options.minor_tick_count.unwrap_or(0));

        let span = high - low;
        let bounded: Vec<f64> = ticks.iter().copied().filter(|t| (0.0..=span).contains(t)).collect();
        let bounded_minor: Vec<f64> = minor_ticks
            .iter()
            .copied()
            .filter(|t| (0.0..=span).contains(t))
            .collect();

        let labels: Vec<String> = bounded
            .iter()
            .map(|t| (options.label_formatter)(t + low))
            .collect();

        let (start, end) = if is_x {
            (DVec2::new(low, intercept), DVec2::new(high, intercept))
        } else {
            (DVec2::new(intercept, low), DVec2::new(intercept, high))
        };

        let info = OrthoAxisInfo {
            ticks: bounded.iter().map(|t| t + low).collect(),
            minor_ticks: bounded_minor.iter().map(|t| t + low).collect(),
        };

        let axis = Axis::new(
            ctx,
            coords.as_ref(),
            start,
            end,
            &bounded,
            &labels,
            AxisOptions {
                minor_ticks: bounded_minor,
                ..options.axis
            },
        );

        Ok(Rc::new(Self {
            children: vec![axis.clone().into()],
            axis,
            info,
        }))
    }

    pub fn info(&self) -> &OrthoAxisInfo {
        &self.info
    }

    /// Label placements generated for the major ticks.
    pub fn labels(&self) -> &[AxisLabel] {
        self.axis.labels()
    }
}

impl Composite for OrthoAxis {
    fn children(&self) -> &[Renderable] {
        &self.children
    }
}

impl From<Rc<OrthoAxis>> for Renderable {
    fn from(c: Rc<OrthoAxis>) -> Self {
        Renderable::Composite(c)
    }
}

/// Tick positions as distances from `low`, deliberately overscanning
/// both ends so that subdivision can produce minor ticks outside the
/// outermost majors; callers bound the result to `[0, high - low]`.
fn generate_ticks(scale: &Scale, origin: f64, step: f64, low: f64, high: f64) -> Vec<f64> {
    let mut ticks = Vec::new();
    match scale {
        Scale::Linear(_) => {
            let mut location = origin + step * ((low - origin) / step).floor() - step * 2.0;
            while location <= high + step {
                ticks.push(location - low);
                location += step;
            }
        }
        Scale::Log(log) => {
            let base = log.base();
            let power_low = low.ln() / base.ln();
            let power_high = high.ln() / base.ln();
            let mut power = origin + step * ((power_low - origin) / step).floor() - step;
            while power <= power_high + step {
                ticks.push(base.powf(power) - low);
                power += step;
            }
        }
    }
    ticks
}

/// Evenly place `count` minor ticks in every gap between consecutive
/// major ticks. In log scales the gaps are geometric, so minors are
/// evenly spaced within each gap but not across the axis.
fn subdivide(ticks: &[f64], count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let mut minor = Vec::with_capacity(ticks.len().saturating_sub(1) * count);
    for pair in ticks.windows(2) {
        let gap = (pair[1] - pair[0]) / (count + 1) as f64;
        for j in 1..=count {
            minor.push(pair[0] + j as f64 * gap);
        }
    }
    minor
}
