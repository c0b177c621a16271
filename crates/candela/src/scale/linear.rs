//! Linear domain/range mapping.

use std::cell::Cell;

const LINEAR_WGSL: &str = "
fn to_domain(v: f32, domain: vec2<f32>, range: vec2<f32>) -> f32 {
    let q = (domain.y - domain.x) / (range.y - range.x);
    return domain.x + q * (v - range.x);
}

fn to_range(v: f32, domain: vec2<f32>, range: vec2<f32>) -> f32 {
    let q = (range.y - range.x) / (domain.y - domain.x);
    return range.x + q * (v - domain.x);
}
";

/// A linear scale.
///
/// A zero-width domain or range is not guarded; the division below yields
/// infinity/NaN that propagates into geometry.
#[derive(Debug)]
pub struct LinearScale {
    domain: Cell<[f64; 2]>,
    range: Cell<[f64; 2]>,
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain: Cell::new(domain),
            range: Cell::new(range),
        }
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain.get()
    }

    pub fn set_domain(&self, domain: [f64; 2]) {
        self.domain.set(domain);
    }

    pub fn range(&self) -> [f64; 2] {
        self.range.get()
    }

    pub fn set_range(&self, range: [f64; 2]) {
        self.range.set(range);
    }

    pub fn to_range(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain.get();
        let [r0, r1] = self.range.get();
        r0 + (r1 - r0) / (d1 - d0) * (v - d0)
    }

    pub fn to_domain(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain.get();
        let [r0, r1] = self.range.get();
        d0 + (d1 - d0) / (r1 - r0) * (v - r0)
    }

    pub fn wgsl(&self) -> &str {
        LINEAR_WGSL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_endpoints_and_midpoint() {
        let s = LinearScale::new([0.0, 10.0], [0.0, 500.0]);
        assert_eq!(s.to_range(0.0), 0.0);
        assert_eq!(s.to_range(10.0), 500.0);
        assert_eq!(s.to_range(5.0), 250.0);
        assert_eq!(s.to_domain(250.0), 5.0);
    }

    #[test]
    fn test_roundtrip_within_tolerance() {
        let s = LinearScale::new([-3.0, 17.0], [25.0, 975.0]);
        for i in 0..=20 {
            let v = -3.0 + i as f64;
            assert!((s.to_domain(s.to_range(v)) - v).abs() < 1e-9);
        }
        for i in 0..=19 {
            let v = 25.0 + 50.0 * i as f64;
            assert!((s.to_range(s.to_domain(v)) - v).abs() < 1e-9);
        }
    }

    #[test]
    fn test_inverted_range() {
        // Screen-space y axes commonly run high-to-low.
        let s = LinearScale::new([0.0, 1.0], [100.0, 0.0]);
        assert_eq!(s.to_range(0.0), 100.0);
        assert_eq!(s.to_range(1.0), 0.0);
        assert!((s.to_domain(s.to_range(0.25)) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_mutation_is_visible() {
        let s = LinearScale::new([0.0, 1.0], [0.0, 100.0]);
        s.set_domain([0.0, 2.0]);
        assert_eq!(s.to_range(2.0), 100.0);
    }
}
