//! Deterministic float handling.
//!
//! Layout output and sort orders must not depend on NaN payloads or the sign
//! of zero, so everything that orders floats goes through these helpers.

use core::cmp::Ordering;

/// Canonicalize a floating-point value for deterministic ordering.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Deterministic total ordering for floats.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

/// Parses a raw cell the way the indicator tables are read: surrounding
/// whitespace is ignored and anything that is not a finite number is
/// treated as missing.
pub fn parse_finite_f64(raw: &str) -> Option<f64> {
    let v: f64 = raw.trim().parse().ok()?;
    v.is_finite().then_some(canonical_f64(v))
}
