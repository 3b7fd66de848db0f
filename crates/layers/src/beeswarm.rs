//! Collision-free one-axis layout.
//!
//! Each record becomes a circle whose x encodes the position attribute and
//! whose area encodes the size attribute. Circles start on their targets and
//! are relaxed towards the centerline while overlaps are pushed apart. A final
//! projection pins every x back onto its target and moves circles vertically
//! into the nearest free slot, so the output never overlaps beyond the
//! configured tolerance and x is exactly the scaled attribute value.
//!
//! The layout is deterministic: no random numbers, and the only dispersion
//! comes from a hash of each record's identity.

use compute::{LinearScale, SqrtScale, Statistics};
use foundation::bounds::{Aabb2, Margins};
use foundation::math::{Vec2, stable_total_cmp_f64};
use runtime::StepBudget;
use scene::{AttributePair, FilteredRecord, Placement};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::grid::CellGrid;

/// Below this per-step movement (pixels) the relaxation counts as settled.
const SETTLE_EPSILON_PX: f64 = 1e-3;

/// Slack for float rounding when a circle is placed exactly touching another.
const CONTACT_EPSILON_PX: f64 = 1e-7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub margins: Margins,
    /// Radius of the smallest size value.
    pub min_radius: f64,
    /// Radius of the largest size value.
    pub max_radius: f64,
    /// Width kept free at the right end of the position axis for the largest
    /// circle.
    pub x_range_inset: f64,
    /// Extra gap required between circles.
    pub collision_padding: f64,
    /// Overlap still accepted as "not colliding".
    pub tolerance: f64,
    pub max_steps: u32,
    pub collision_iterations: u32,
    pub x_strength: f64,
    pub y_strength: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    /// Amplitude of the identity-derived vertical offset at start.
    pub dispersion: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            min_radius: 3.0,
            max_radius: 40.0,
            x_range_inset: 50.0,
            collision_padding: 0.0,
            tolerance: 0.5,
            max_steps: 300,
            collision_iterations: 2,
            x_strength: 1.0,
            y_strength: 1.0,
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
            dispersion: 1.0,
        }
    }
}

impl LayoutConfig {
    /// Inner plot area of a `width` x `height` surface.
    pub fn plot_area(&self, width: f64, height: f64) -> Aabb2 {
        self.margins.inner(width, height)
    }

    fn effective_tolerance(&self) -> f64 {
        if self.tolerance.is_finite() {
            self.tolerance.max(CONTACT_EPSILON_PX * 10.0)
        } else {
            CONTACT_EPSILON_PX * 10.0
        }
    }

    fn effective_padding(&self) -> f64 {
        if self.collision_padding.is_finite() {
            self.collision_padding.max(0.0)
        } else {
            0.0
        }
    }
}

/// Diagnostics of the relaxation phase.
///
/// These describe the state before projection. The returned placements are
/// free of overlap whether or not the relaxation converged; on dense input
/// (many circles sharing an x range) it usually runs out of budget and the
/// projection does all the separating.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LayoutReport {
    /// Relaxation steps executed.
    pub steps: u32,
    /// Whether the relaxation settled before the step budget ran out.
    /// Says nothing about the final placements.
    pub converged: bool,
    /// Largest overlap left by the relaxation, before projection.
    pub relaxed_overlap: f64,
    /// Largest x distance from target left by the relaxation.
    pub relaxed_x_drift: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    /// `placements[i]` belongs to the i-th input record.
    pub placements: Vec<Placement>,
    pub position_scale: LinearScale,
    pub radius_scale: SqrtScale,
    pub report: LayoutReport,
}

#[derive(Debug, Copy, Clone)]
struct Body {
    target_x: f64,
    pos: Vec2,
    radius: f64,
    /// Identity hash in `[-1, 1]`, used for dispersion and tie-breaking.
    seed: f64,
}

/// Lays out `records` inside `area` (inner plot coordinates).
///
/// Scales are derived from exactly these records: the position domain is
/// `[0, max]`, the radius domain the size extent. Missing or non-numeric
/// values fall back to the start of the respective range.
pub fn layout(
    records: &[FilteredRecord<'_>],
    attributes: &AttributePair,
    area: Aabb2,
    config: &LayoutConfig,
) -> Layout {
    let positions: Vec<Option<f64>> = records
        .iter()
        .map(|r| r.record.numeric(&attributes.position))
        .collect();
    let sizes: Vec<Option<f64>> = records
        .iter()
        .map(|r| r.record.numeric(&attributes.size))
        .collect();

    let x_max = Statistics::max(positions.iter().copied()).unwrap_or(0.0);
    let x_end = (area.width() - config.x_range_inset).max(0.0);
    let position_scale = LinearScale::new(
        [0.0, x_max],
        [area.min[0], area.min[0] + x_end],
    );

    let (s_min, s_max) = Statistics::extent(sizes.iter().copied()).unwrap_or((0.0, 0.0));
    let radius_scale = SqrtScale::new([s_min, s_max], [config.min_radius, config.max_radius]);

    let centerline = area.center()[1];
    let mut bodies: Vec<Body> = records
        .iter()
        .zip(positions.iter().zip(&sizes))
        .map(|(rec, (pos, size))| {
            let target_x = position_scale.apply_or_start(*pos);
            let seed = identity_seed(rec);
            Body {
                target_x,
                pos: Vec2::new(target_x, centerline + seed * config.dispersion),
                radius: sanitize_radius(radius_scale.apply_or_start(*size), config),
                seed,
            }
        })
        .collect();

    let report = match bodies.len() {
        0 => LayoutReport {
            steps: 0,
            converged: true,
            relaxed_overlap: 0.0,
            relaxed_x_drift: 0.0,
        },
        1 => {
            bodies[0].pos = Vec2::new(bodies[0].target_x, centerline);
            LayoutReport {
                steps: 1,
                converged: true,
                relaxed_overlap: 0.0,
                relaxed_x_drift: 0.0,
            }
        }
        _ => {
            let report = relax(&mut bodies, centerline, config);
            project(&mut bodies, centerline, config);
            report
        }
    };

    debug!(
        records = bodies.len(),
        steps = report.steps,
        converged = report.converged,
        relaxed_overlap = report.relaxed_overlap,
        relaxed_x_drift = report.relaxed_x_drift,
        "beeswarm layout finished"
    );

    Layout {
        placements: bodies
            .iter()
            .map(|b| Placement {
                x: b.pos.x,
                y: b.pos.y,
                radius: b.radius,
            })
            .collect(),
        position_scale,
        radius_scale,
        report,
    }
}

/// Largest `(r1 + r2) - distance` over all pairs; `<= 0` means no overlap.
///
/// Negative infinity for fewer than two placements.
pub fn max_overlap(placements: &[Placement]) -> f64 {
    let mut worst = f64::NEG_INFINITY;
    for (i, a) in placements.iter().enumerate() {
        for b in &placements[i + 1..] {
            let d = Vec2::new(b.x - a.x, b.y - a.y).length();
            worst = worst.max(a.radius + b.radius - d);
        }
    }
    worst
}

fn relax(bodies: &mut [Body], centerline: f64, config: &LayoutConfig) -> LayoutReport {
    let padding = config.effective_padding();
    let tolerance = config.effective_tolerance();
    let max_radius = bodies.iter().map(|b| b.radius).fold(0.0, f64::max);
    let cell_px = 2.0 * max_radius + padding;

    let mut budget = StepBudget::new(config.max_steps);
    let mut alpha = 1.0_f64;
    let mut steps = 0u32;
    let mut converged = false;

    while budget.try_step() {
        steps += 1;
        alpha *= 1.0 - config.alpha_decay;

        let before: Vec<Vec2> = bodies.iter().map(|b| b.pos).collect();
        for b in bodies.iter_mut() {
            b.pos.x += (b.target_x - b.pos.x) * config.x_strength * alpha;
            b.pos.y += (centerline - b.pos.y) * config.y_strength * alpha;
        }
        for _ in 0..config.collision_iterations.max(1) {
            resolve_collisions(bodies, cell_px, padding);
        }

        let moved = bodies
            .iter()
            .zip(&before)
            .map(|(b, p)| (b.pos - *p).length())
            .fold(0.0, f64::max);
        let overlap = worst_overlap(bodies, cell_px, padding);
        trace!(step = steps, alpha, moved, overlap, "relaxation step");

        if overlap <= tolerance && moved < SETTLE_EPSILON_PX {
            converged = true;
            break;
        }
        if alpha < config.alpha_min {
            break;
        }
    }

    LayoutReport {
        steps,
        converged,
        relaxed_overlap: worst_overlap(bodies, cell_px, padding).max(0.0),
        relaxed_x_drift: bodies
            .iter()
            .map(|b| (b.pos.x - b.target_x).abs())
            .fold(0.0, f64::max),
    }
}

/// One Gauss-Seidel sweep over all overlapping pairs.
///
/// Each pair is pushed apart along the line between the centers until it
/// just touches; the larger circle moves less.
fn resolve_collisions(bodies: &mut [Body], cell_px: f64, padding: f64) {
    let grid = CellGrid::build(bodies.iter().map(|b| b.pos).enumerate(), cell_px);
    for i in 0..bodies.len() {
        let anchor = bodies[i].pos;
        for j in grid.neighbours(anchor) {
            if j <= i {
                continue;
            }
            let (a, b) = (bodies[i], bodies[j]);
            let sep = a.radius + b.radius + padding;
            let delta = b.pos - a.pos;
            let d2 = delta.length_squared();
            if d2 >= sep * sep {
                continue;
            }

            let (normal, dist) = if d2 > 1e-18 {
                let dist = d2.sqrt();
                (delta.scale(1.0 / dist), dist)
            } else {
                (coincident_direction(&a, i, &b, j), 0.0)
            };
            let overlap = sep - dist;

            let ra2 = a.radius * a.radius;
            let rb2 = b.radius * b.radius;
            let share_a = if ra2 + rb2 > 0.0 { rb2 / (ra2 + rb2) } else { 0.5 };

            bodies[i].pos = a.pos - normal.scale(overlap * share_a);
            bodies[j].pos = b.pos + normal.scale(overlap * (1.0 - share_a));
        }
    }
}

/// Direction from `a` to `b` for two circles with the same center.
///
/// Always vertical, so x is untouched.
fn coincident_direction(a: &Body, ai: usize, b: &Body, bi: usize) -> Vec2 {
    let a_first = stable_total_cmp_f64(a.seed, b.seed).then(ai.cmp(&bi)).is_lt();
    if a_first {
        Vec2::new(0.0, 1.0)
    } else {
        Vec2::new(0.0, -1.0)
    }
}

fn worst_overlap(bodies: &[Body], cell_px: f64, padding: f64) -> f64 {
    let grid = CellGrid::build(bodies.iter().map(|b| b.pos).enumerate(), cell_px);
    let mut worst = 0.0_f64;
    for (i, a) in bodies.iter().enumerate() {
        for j in grid.neighbours(a.pos) {
            if j <= i {
                continue;
            }
            let b = &bodies[j];
            let d = (b.pos - a.pos).length();
            worst = worst.max(a.radius + b.radius + padding - d);
        }
    }
    worst
}

/// Pins x to target and slots circles vertically without overlap.
///
/// Circles are placed in order of their relaxed distance from the
/// centerline. Each takes, among the positions where it touches an already
/// placed circle (or its relaxed y, if free), the valid one nearest to its
/// relaxed y. Some candidate is always valid: the one above or below every
/// placed circle in its x range.
fn project(bodies: &mut [Body], centerline: f64, config: &LayoutConfig) {
    let padding = config.effective_padding();
    let mut centerline_order: Vec<usize> = (0..bodies.len()).collect();
    centerline_order.sort_by(|&a, &b| {
        stable_total_cmp_f64(
            (bodies[a].pos.y - centerline).abs(),
            (bodies[b].pos.y - centerline).abs(),
        )
        .then(a.cmp(&b))
    });

    let mut placed: Vec<usize> = Vec::with_capacity(bodies.len());
    for idx in centerline_order {
        let x = bodies[idx].target_x;
        let r = bodies[idx].radius;
        let preferred = bodies[idx].pos.y;

        let blockers: Vec<(f64, f64, f64)> = placed
            .iter()
            .filter_map(|&p| {
                let other = &bodies[p];
                let sep = r + other.radius + padding;
                let dx = other.pos.x - x;
                (dx.abs() < sep).then_some((other.pos.y, sep, dx))
            })
            .collect();

        let mut candidates: Vec<f64> = Vec::with_capacity(blockers.len() * 2 + 1);
        candidates.push(preferred);
        for &(oy, sep, dx) in &blockers {
            let h = (sep * sep - dx * dx).max(0.0).sqrt();
            candidates.push(oy - h);
            candidates.push(oy + h);
        }
        candidates.sort_by(|a, b| {
            stable_total_cmp_f64((a - preferred).abs(), (b - preferred).abs())
                .then(stable_total_cmp_f64(*a, *b))
        });

        let fits = |y: f64| {
            blockers.iter().all(|&(oy, sep, dx)| {
                let dy = y - oy;
                (dx * dx + dy * dy).sqrt() >= sep - CONTACT_EPSILON_PX
            })
        };
        let y = candidates
            .into_iter()
            .find(|&y| fits(y))
            .unwrap_or_else(|| outermost_slot(&blockers, preferred));

        bodies[idx].pos = Vec2::new(x, y);
        placed.push(idx);
    }
}

/// A y beyond every blocker on the side of `preferred`.
///
/// Only reached if rounding rejected every touching candidate.
fn outermost_slot(blockers: &[(f64, f64, f64)], preferred: f64) -> f64 {
    let above = blockers
        .iter()
        .map(|&(oy, sep, _)| oy - sep)
        .fold(preferred, f64::min);
    let below = blockers
        .iter()
        .map(|&(oy, sep, _)| oy + sep)
        .fold(preferred, f64::max);
    if (preferred - above).abs() <= (below - preferred).abs() {
        above - CONTACT_EPSILON_PX
    } else {
        below + CONTACT_EPSILON_PX
    }
}

fn sanitize_radius(r: f64, config: &LayoutConfig) -> f64 {
    if r.is_finite() && r > 0.0 {
        r
    } else if config.min_radius.is_finite() && config.min_radius > 0.0 {
        config.min_radius
    } else {
        1.0
    }
}

/// Stable value in `[-1, 1]` derived from the record's identity.
fn identity_seed(rec: &FilteredRecord<'_>) -> f64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&rec.record.id.index().to_le_bytes());
    hasher.update(rec.record.country.as_bytes());
    let hash = hasher.finalize();
    let mut word = [0u8; 8];
    word.copy_from_slice(&hash.as_bytes()[..8]);
    (u64::from_le_bytes(word) as f64 / u64::MAX as f64) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::{LayoutConfig, layout, max_overlap};
    use catalog::IndicatorRecord;
    use foundation::RecordId;
    use foundation::bounds::Aabb2;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use scene::{AttributePair, FilteredRecord};

    fn record(id: u32, country: &str, gdp: &str, pop: &str) -> IndicatorRecord {
        IndicatorRecord::new(RecordId(id), country, "2000")
            .with_value("GDP", gdp)
            .with_value("Pop", pop)
    }

    fn filtered(records: &[IndicatorRecord]) -> Vec<FilteredRecord<'_>> {
        records
            .iter()
            .map(|record| FilteredRecord {
                record,
                region: "Europe",
            })
            .collect()
    }

    fn area() -> Aabb2 {
        LayoutConfig::default().plot_area(960.0, 500.0)
    }

    fn attrs() -> AttributePair {
        AttributePair::new("GDP", "Pop")
    }

    #[test]
    fn single_record_sits_on_its_target() {
        let recs = [record(0, "Norway", "50000", "4000000")];
        let config = LayoutConfig::default();
        let out = layout(&filtered(&recs), &attrs(), area(), &config);

        assert_eq!(out.placements.len(), 1);
        assert_eq!(out.report.steps, 1);
        let p = out.placements[0];
        // Largest value maps to the end of the usable width.
        assert!((p.x - (860.0 - 50.0)).abs() < 1e-9);
        assert!((p.y - 215.0).abs() < 1e-9);
        // A one-value size domain maps to the middle of the radius range.
        assert!((p.radius - 21.5).abs() < 1e-9);
    }

    #[test]
    fn x_depends_only_on_position_value() {
        let a = [record(0, "Norway", "50000", "4000000")];
        let b = [record(7, "Norway", "50000", "12")];
        let config = LayoutConfig::default();
        let pa = layout(&filtered(&a), &attrs(), area(), &config).placements[0];
        let pb = layout(&filtered(&b), &attrs(), area(), &config).placements[0];
        assert_eq!(pa.x, pb.x);
    }

    #[test]
    fn equal_positions_are_separated_vertically() {
        let recs = [
            record(0, "Norway", "1000", "50"),
            record(1, "Sweden", "1000", "80"),
            record(2, "Kenya", "10", "20"),
        ];
        let config = LayoutConfig::default();
        let out = layout(&filtered(&recs), &attrs(), area(), &config);

        let (a, b) = (out.placements[0], out.placements[1]);
        assert!((a.x - b.x).abs() <= config.tolerance);
        let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
        assert!(d >= a.radius + b.radius - config.tolerance);
        assert!(max_overlap(&out.placements) <= config.tolerance);
    }

    #[test]
    fn missing_values_fall_back_to_range_start() {
        let recs = [
            record(0, "Norway", "n/a", ""),
            record(1, "Sweden", "100", "9"),
            record(2, "Kenya", "50", "1"),
        ];
        let config = LayoutConfig::default();
        let out = layout(&filtered(&recs), &attrs(), area(), &config);
        let p = out.placements[0];
        assert_eq!(p.x, 0.0);
        assert_eq!(p.radius, config.min_radius);
        assert!(out.placements.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn all_missing_sizes_still_have_radius() {
        let recs = [record(0, "A", "1", ""), record(1, "B", "2", "x")];
        let out = layout(&filtered(&recs), &attrs(), area(), &LayoutConfig::default());
        assert!(out.placements.iter().all(|p| p.radius > 0.0));
    }

    #[test]
    fn layout_is_deterministic() {
        let recs: Vec<IndicatorRecord> = (0..30)
            .map(|i| record(i, &format!("C{i}"), &((i % 5) * 100).to_string(), &(i * 7).to_string()))
            .collect();
        let config = LayoutConfig::default();
        let a = layout(&filtered(&recs), &attrs(), area(), &config);
        let b = layout(&filtered(&recs), &attrs(), area(), &config);
        assert_eq!(a, b);
        assert!(max_overlap(&a.placements) <= config.tolerance);
    }

    #[test]
    fn empty_input_yields_empty_layout() {
        let out = layout(&[], &attrs(), area(), &LayoutConfig::default());
        assert!(out.placements.is_empty());
        assert!(out.report.converged);
    }

    #[test]
    fn exhausted_budget_still_separates() {
        let recs: Vec<IndicatorRecord> = (0..12)
            .map(|i| record(i, &format!("C{i}"), "5", "100"))
            .collect();
        let config = LayoutConfig {
            max_steps: 1,
            ..LayoutConfig::default()
        };
        let out = layout(&filtered(&recs), &attrs(), area(), &config);
        assert_eq!(out.report.steps, 1);
        assert!(max_overlap(&out.placements) <= config.tolerance);
        let x0 = out.placements[0].x;
        assert!(out.placements.iter().all(|p| p.x == x0));
    }

    #[test]
    fn dense_stacks_are_separated_without_convergence() {
        let recs: Vec<IndicatorRecord> = (0..200)
            .map(|i| {
                record(
                    i,
                    &format!("C{i}"),
                    &((i % 5) * 10).to_string(),
                    &(1 + i * 37 % 500).to_string(),
                )
            })
            .collect();
        let config = LayoutConfig::default();
        let out = layout(&filtered(&recs), &attrs(), area(), &config);

        assert_eq!(out.placements.len(), 200);
        assert!(out.report.steps <= config.max_steps);
        assert!(max_overlap(&out.placements) <= config.tolerance);
        for (p, rec) in out.placements.iter().zip(&recs) {
            assert!(p.y.is_finite());
            assert_eq!(p.x, out.position_scale.apply_or_start(rec.numeric("GDP")));
        }
    }

    proptest! {
        #[test]
        fn no_pair_overlaps_beyond_tolerance(
            rows in prop::collection::vec(
                (
                    prop_oneof![
                        (0u32..1000).prop_map(|v| v.to_string()),
                        Just(String::new()),
                    ],
                    prop_oneof![
                        (1u32..100_000).prop_map(|v| v.to_string()),
                        Just("n/a".to_string()),
                    ],
                ),
                0..40,
            )
        ) {
            let recs: Vec<IndicatorRecord> = rows
                .iter()
                .enumerate()
                .map(|(i, (gdp, pop))| record(i as u32, &format!("C{i}"), gdp, pop))
                .collect();
            let config = LayoutConfig::default();
            let out = layout(&filtered(&recs), &attrs(), area(), &config);

            prop_assert_eq!(out.placements.len(), recs.len());
            for (i, a) in out.placements.iter().enumerate() {
                prop_assert!(a.x.is_finite() && a.y.is_finite() && a.radius > 0.0);
                prop_assert_eq!(a.x, out.position_scale.apply_or_start(recs[i].numeric("GDP")));
                for b in &out.placements[i + 1..] {
                    let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                    prop_assert!(d >= a.radius + b.radius - config.tolerance);
                }
            }
        }
    }
}
