//! Grid lines spanning the plot area.

use std::rc::Rc;

use crate::primitives::{HLines, HLinesOptions, VLines, VLinesOptions};
use crate::render::RenderCtx;
use crate::renderable::{Composite, Renderable};

pub struct GridOptions {
    /// Width of the grid lines in pixels. Default 1.
    pub width: f32,
    /// Color of the grid lines. Default light gray.
    pub color: [f32; 4],
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            color: [0.75, 0.75, 0.75, 1.0],
        }
    }
}

/// Vertical lines at `x_positions` spanning `y_extents`, and horizontal
/// lines at `y_positions` spanning `x_extents`. Typically fed from
/// [`OrthoAxisInfo`](crate::composites::OrthoAxisInfo) tick positions.
pub struct Grid {
    children: Vec<Renderable>,
}

impl Grid {
    pub fn new(
        ctx: &RenderCtx,
        x_positions: &[f64],
        y_positions: &[f64],
        x_extents: [f64; 2],
        y_extents: [f64; 2],
        options: GridOptions,
    ) -> Rc<Self> {
        let mut children = Vec::new();
        if !x_positions.is_empty() {
            let lines: Vec<f32> = x_positions
                .iter()
                .flat_map(|x| [*x as f32, y_extents[0] as f32, y_extents[1] as f32])
                .collect();
            children.push(
                VLines::new(
                    ctx,
                    lines,
                    VLinesOptions {
                        widths: options.width.into(),
                        colors: vec![options.color].into(),
                    },
                )
                .into(),
            );
        }
        if !y_positions.is_empty() {
            let lines: Vec<f32> = y_positions
                .iter()
                .flat_map(|y| [x_extents[0] as f32, x_extents[1] as f32, *y as f32])
                .collect();
            children.push(
                HLines::new(
                    ctx,
                    lines,
                    HLinesOptions {
                        widths: options.width.into(),
                        colors: vec![options.color].into(),
                    },
                )
                .into(),
            );
        }
        Rc::new(Self { children })
    }
}

impl Composite for Grid {
    fn children(&self) -> &[Renderable] {
        &self.children
    }
}

impl From<Rc<Grid>> for Renderable {
    fn from(c: Rc<Grid>) -> Self {
        Renderable::Composite(c)
    }
}
