//! Scissored subtree.

use std::rc::Rc;

use glam::DVec2;

use crate::coords::CoordinateSystem;
use crate::render::{ScissorBox, ScopePush};
use crate::renderable::{Composite, Renderable};

/// Clips its children to a rectangle. The rectangle is interpreted in
/// screen pixels when `screen_space` is set, otherwise in domain units
/// and mapped through the active coordinate system at render time.
pub struct Scissor {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    screen_space: bool,
    children: Vec<Renderable>,
}

impl Scissor {
    pub fn new(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        screen_space: bool,
        children: Vec<Renderable>,
    ) -> Rc<Self> {
        Rc::new(Self {
            x,
            y,
            width,
            height,
            screen_space,
            children,
        })
    }
}

impl Composite for Scissor {
    fn children(&self) -> &[Renderable] {
        &self.children
    }

    fn scope(&self, coords: &dyn CoordinateSystem) -> Option<ScopePush> {
        let scissor = if self.screen_space {
            ScissorBox {
                x: self.x as f32,
                y: self.y as f32,
                width: self.width as f32,
                height: self.height as f32,
            }
        } else {
            let lo = coords.to_range(DVec2::new(self.x, self.y));
            let hi = coords.to_range(DVec2::new(self.x + self.width, self.y + self.height));
            ScissorBox {
                x: lo.x as f32,
                y: lo.y as f32,
                width: (hi.x - lo.x) as f32,
                height: (hi.y - lo.y) as f32,
            }
        };
        Some(ScopePush::Scissor(scissor))
    }
}

impl From<Rc<Scissor>> for Renderable {
    fn from(c: Rc<Scissor>) -> Self {
        Renderable::Composite(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Cartesian;
    use crate::scale::Scale;

    #[test]
    fn test_domain_box_maps_through_coords() {
        let coords = Cartesian::new(
            Scale::linear([0.0, 10.0], [0.0, 100.0]),
            Scale::linear([0.0, 10.0], [0.0, 200.0]),
        );
        let scissor = Scissor::new(1.0, 2.0, 3.0, 4.0, false, Vec::new());
        let Some(ScopePush::Scissor(scissor_box)) = scissor.scope(coords.as_ref()) else {
            panic!("expected a scissor push");
        };
        assert_eq!(scissor_box.x, 10.0);
        assert_eq!(scissor_box.y, 40.0);
        assert_eq!(scissor_box.width, 30.0);
        assert_eq!(scissor_box.height, 80.0);
    }

    #[test]
    fn test_screen_box_is_verbatim() {
        let coords = Cartesian::new(
            Scale::linear([0.0, 10.0], [0.0, 100.0]),
            Scale::linear([0.0, 10.0], [0.0, 200.0]),
        );
        let scissor = Scissor::new(5.0, 6.0, 7.0, 8.0, true, Vec::new());
        let Some(ScopePush::Scissor(scissor_box)) = scissor.scope(coords.as_ref()) else {
            panic!("expected a scissor push");
        };
        assert_eq!(scissor_box.x, 5.0);
        assert_eq!(scissor_box.width, 7.0);
    }
}
