//! Logarithmic domain/range mapping.

use std::cell::Cell;

/// A log scale with an arbitrary base.
///
/// The mapping is the linear one performed in `log_base` space:
/// domain values are converted with `ln(v) / ln(base)`, interpolated
/// linearly against the log-converted domain bounds, and (for the
/// inverse) exponentiated back with `base^v`. Non-positive inputs yield
/// NaN or negative infinity and are deliberately not guarded.
#[derive(Debug)]
pub struct LogScale {
    base: f64,
    conversion: f64,
    domain: Cell<[f64; 2]>,
    range: Cell<[f64; 2]>,
    wgsl: String,
}

impl LogScale {
    pub fn new(base: f64, domain: [f64; 2], range: [f64; 2]) -> Self {
        let conversion = 1.0 / base.ln();
        // The device-side pair embeds base and conversion as literals, so
        // the fragment text varies with the base but not with the bounds.
        let wgsl = format!(
            "
fn to_domain(v: f32, domain: vec2<f32>, range: vec2<f32>) -> f32 {{
    let conversion = {conversion:?};
    let log_domain = conversion * vec2<f32>(log(domain.x), log(domain.y));
    let q = (log_domain.y - log_domain.x) / (range.y - range.x);
    let log_value = log_domain.x + q * (v - range.x);
    return pow({base:?}, log_value);
}}

fn to_range(v: f32, domain: vec2<f32>, range: vec2<f32>) -> f32 {{
    let conversion = {conversion:?};
    let log_v = log(v) * conversion;
    let log_domain = conversion * vec2<f32>(log(domain.x), log(domain.y));
    let q = (range.y - range.x) / (log_domain.y - log_domain.x);
    return range.x + q * (log_v - log_domain.x);
}}
"
        );
        Self {
            base,
            conversion,
            domain: Cell::new(domain),
            range: Cell::new(range),
            wgsl,
        }
    }

    pub fn base(&self) -> f64 {
        self.base
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
        let log_v = v.ln() * self.conversion;
        let l0 = d0.ln() * self.conversion;
        let l1 = d1.ln() * self.conversion;
        let q = (r1 - r0) / (l1 - l0);
        r0 + q * (log_v - l0)
    }

    pub fn to_domain(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain.get();
        let [r0, r1] = self.range.get();
        let l0 = d0.ln() * self.conversion;
        let l1 = d1.ln() * self.conversion;
        let q = (l1 - l0) / (r1 - r0);
        self.base.powf(l0 + q * (v - r0))
    }

    pub fn wgsl(&self) -> &str {
        &self.wgsl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decades_map_evenly() {
        let s = LogScale::new(10.0, [1.0, 100.0], [0.0, 100.0]);
        assert!((s.to_range(1.0) - 0.0).abs() < 1e-9);
        assert!((s.to_range(10.0) - 50.0).abs() < 1e-9);
        assert!((s.to_range(100.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_roundtrip_within_tolerance() {
        let s = LogScale::new(10.0, [1.0, 100000.0], [0.0, 640.0]);
        for v in [1.0, 3.7, 10.0, 99.0, 1234.5, 100000.0] {
            let rt = s.to_domain(s.to_range(v));
            assert!((rt - v).abs() / v < 1e-9, "roundtrip of {v} gave {rt}");
        }
        for v in [0.0, 160.0, 320.0, 640.0] {
            let rt = s.to_range(s.to_domain(v));
            assert!((rt - v).abs() < 1e-9);
        }
    }

    #[test]
    fn test_natural_base_roundtrip() {
        let e = std::f64::consts::E;
        let s = LogScale::new(e, [1.0, e * e], [0.0, 2.0]);
        assert!((s.to_range(e) - 1.0).abs() < 1e-12);
        assert!((s.to_domain(2.0) - e * e).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_input_degenerates() {
        let s = LogScale::new(10.0, [1.0, 100.0], [0.0, 100.0]);
        assert!(s.to_range(0.0).is_infinite());
        assert!(s.to_range(-1.0).is_nan());
    }

    #[test]
    fn test_fragment_varies_with_base_not_bounds() {
        let a = LogScale::new(10.0, [1.0, 100.0], [0.0, 100.0]);
        let b = LogScale::new(10.0, [5.0, 500.0], [0.0, 640.0]);
        let c = LogScale::new(2.0, [1.0, 100.0], [0.0, 100.0]);
        assert_eq!(a.wgsl(), b.wgsl());
        assert_ne!(a.wgsl(), c.wgsl());
    }
}
