//! Continuous scales mapping data values to pixels.
//!
//! Both scales extrapolate outside their domain. A domain that collapses to
//! a single value maps every input to the middle of the range.

use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    pub fn apply(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 || !span.is_finite() {
            0.5
        } else {
            (v - d0) / span
        };
        let out = r0 + t * (r1 - r0);
        if out.is_finite() { out } else { r0 }
    }

    /// Like [`apply`](Self::apply), but a missing value lands on the start
    /// of the range.
    pub fn apply_or_start(&self, v: Option<f64>) -> f64 {
        match v {
            Some(v) if v.is_finite() => self.apply(v),
            _ => self.range[0],
        }
    }
}

/// Square-root scale, so that mark *area* grows linearly with the value.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SqrtScale {
    domain: [f64; 2],
    linear: LinearScale,
}

impl SqrtScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain,
            linear: LinearScale::new([signed_sqrt(domain[0]), signed_sqrt(domain[1])], range),
        }
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.linear.range()
    }

    pub fn apply(&self, v: f64) -> f64 {
        self.linear.apply(signed_sqrt(v))
    }

    pub fn apply_or_start(&self, v: Option<f64>) -> f64 {
        self.linear.apply_or_start(v.map(signed_sqrt))
    }
}

fn signed_sqrt(v: f64) -> f64 {
    v.signum() * v.abs().sqrt()
}

#[cfg(test)]
mod tests {
    use super::{LinearScale, SqrtScale};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn linear_maps_endpoints_and_extrapolates() {
        let s = LinearScale::new([0.0, 100.0], [0.0, 500.0]);
        assert!(close(s.apply(0.0), 0.0));
        assert!(close(s.apply(50.0), 250.0));
        assert!(close(s.apply(100.0), 500.0));
        assert!(close(s.apply(-10.0), -50.0));
    }

    #[test]
    fn collapsed_domain_maps_to_midpoint() {
        let s = LinearScale::new([7.0, 7.0], [3.0, 40.0]);
        assert!(close(s.apply(7.0), 21.5));
        let sq = SqrtScale::new([9.0, 9.0], [3.0, 40.0]);
        assert!(close(sq.apply(9.0), 21.5));
    }

    #[test]
    fn missing_values_use_range_start() {
        let s = LinearScale::new([0.0, 10.0], [5.0, 15.0]);
        assert_eq!(s.apply_or_start(None), 5.0);
        assert_eq!(s.apply_or_start(Some(f64::NAN)), 5.0);
        let sq = SqrtScale::new([1.0, 100.0], [3.0, 40.0]);
        assert_eq!(sq.apply_or_start(None), 3.0);
    }

    #[test]
    fn sqrt_scale_is_area_proportional() {
        let s = SqrtScale::new([0.0, 100.0], [0.0, 10.0]);
        assert!(close(s.apply(25.0), 5.0));
        assert!(close(s.apply(100.0), 10.0));
    }
}
