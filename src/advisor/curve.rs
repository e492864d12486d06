use crate::api::models::HeroRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// Power dimensions tracked per minute. The last two never appear in
/// curves; they exist only as item-effect targets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Fight,
    Pickoff,
    Push,
    Sustain,
    Defense,
    Rosh,
    Scale,
    TowerDamage,
    AntiHeal,
}

/// The seven curve-bearing axes.
pub const CURVE_AXES: [Axis; 7] = [
    Axis::Fight,
    Axis::Pickoff,
    Axis::Push,
    Axis::Sustain,
    Axis::Defense,
    Axis::Rosh,
    Axis::Scale,
];

/// Axes that feed candidate scoring.
pub const SCORING_AXES: [Axis; 5] = [
    Axis::Fight,
    Axis::Pickoff,
    Axis::Push,
    Axis::Rosh,
    Axis::Scale,
];

/// Per-axis control points for minutes {0,10,20,30,40,50}. An axis with
/// missing data stays empty and evaluates to 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    #[serde(default)]
    pub fight: Vec<i32>,
    #[serde(default)]
    pub pickoff: Vec<i32>,
    #[serde(default)]
    pub push: Vec<i32>,
    #[serde(default)]
    pub sustain: Vec<i32>,
    #[serde(default)]
    pub defense: Vec<i32>,
    #[serde(default)]
    pub rosh: Vec<i32>,
    #[serde(default)]
    pub scale: Vec<i32>,
}

impl Curve {
    pub fn axis(&self, axis: Axis) -> &[i32] {
        match axis {
            Axis::Fight => &self.fight,
            Axis::Pickoff => &self.pickoff,
            Axis::Push => &self.push,
            Axis::Sustain => &self.sustain,
            Axis::Defense => &self.defense,
            Axis::Rosh => &self.rosh,
            Axis::Scale => &self.scale,
            Axis::TowerDamage | Axis::AntiHeal => &[],
        }
    }

    /// True when no axis carries a single control point. Call sites that
    /// want a fallback substitute [`default_curve`] themselves.
    pub fn is_empty(&self) -> bool {
        CURVE_AXES.iter().all(|&axis| self.axis(axis).is_empty())
    }
}

/// Interpolated curve value at a minute, rounded to the nearest integer.
///
/// Degenerate inputs use defined fallbacks: an empty sequence is 0 and a
/// single control point is constant. Beyond the last control point the
/// final segment's end value holds.
pub fn value_at(points: &[i32], minute: u32) -> f64 {
    match points.len() {
        0 => 0.0,
        1 => points[0] as f64,
        len => {
            if minute == 0 {
                return points[0] as f64;
            }
            let idx = ((minute / 10) as usize).min(len - 2);
            let a = points[idx] as f64;
            let b = points[idx + 1] as f64;
            let t = ((minute as f64 - idx as f64 * 10.0) / 10.0).clamp(0.0, 1.0);
            (a + (b - a) * t).round()
        }
    }
}

/// Running per-axis value accumulator used for candidate deltas.
pub type AxisDeltas = BTreeMap<Axis, f64>;

/// Evaluate the five scoring axes of a curve at a minute.
pub fn curve_value(curve: &Curve, minute: u32) -> AxisDeltas {
    SCORING_AXES
        .iter()
        .map(|&axis| (axis, value_at(curve.axis(axis), minute)))
        .collect()
}

/// Sum of the five scoring axes in a delta map.
pub fn combat_total(deltas: &AxisDeltas) -> f64 {
    SCORING_AXES
        .iter()
        .map(|axis| deltas.get(axis).copied().unwrap_or(0.0))
        .sum()
}

/// Single-number strength mix used by meta rankings.
pub fn axis_mix(curve: &Curve, minute: u32) -> f64 {
    let v = curve_value(curve, minute);
    let get = |axis: Axis| v.get(&axis).copied().unwrap_or(0.0);
    get(Axis::Fight) * 0.45 + get(Axis::Pickoff) * 0.25 + get(Axis::Push) * 0.25
        + get(Axis::Rosh) * 0.05
}

/// Conservative fallback curve for heroes without profile data.
pub fn default_curve() -> Curve {
    Curve {
        fight: vec![10, 25, 45, 60, 70, 75],
        pickoff: vec![10, 25, 45, 60, 70, 75],
        push: vec![10, 20, 40, 55, 65, 75],
        sustain: vec![5, 15, 30, 45, 60, 70],
        defense: vec![10, 25, 40, 55, 70, 80],
        rosh: vec![5, 10, 20, 35, 50, 60],
        scale: vec![10, 20, 35, 55, 75, 90],
    }
}

/// Default curve with small role biases layered on.
pub fn default_curve_by_role(roles: &[HeroRole]) -> Curve {
    let mut c = default_curve();
    if roles.contains(&HeroRole::Carry) {
        for v in &mut c.scale {
            *v += 8;
        }
    }
    if roles.contains(&HeroRole::Support) {
        for v in &mut c.sustain {
            *v += 6;
        }
    }
    if roles.contains(&HeroRole::Initiator) {
        for v in &mut c.pickoff {
            *v += 10;
        }
        for v in &mut c.fight {
            *v += 6;
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_at_hits_control_points() {
        let points = [10, 25, 45, 60, 70, 75];
        assert_eq!(value_at(&points, 0), 10.0);
        assert_eq!(value_at(&points, 10), 25.0);
        assert_eq!(value_at(&points, 50), 75.0);
    }

    #[test]
    fn value_at_interpolates_between_points() {
        let points = [10, 25, 45, 60, 70, 75];
        // round(25 + (45 - 25) * 0.5)
        assert_eq!(value_at(&points, 15), 35.0);
        assert_eq!(value_at(&points, 23), 51.0);
    }

    #[test]
    fn value_at_holds_past_last_point() {
        let points = [10, 25, 45, 60, 70, 75];
        assert_eq!(value_at(&points, 55), 75.0);
        assert_eq!(value_at(&points, 60), 75.0);
    }

    #[test]
    fn value_at_degenerate_sequences() {
        assert_eq!(value_at(&[], 20), 0.0);
        assert_eq!(value_at(&[42], 20), 42.0);
    }

    #[test]
    fn empty_curve_detection() {
        assert!(Curve::default().is_empty());
        let mut c = Curve::default();
        c.rosh = vec![5];
        assert!(!c.is_empty());
        assert!(!default_curve().is_empty());
    }

    #[test]
    fn value_at_is_monotonic_on_monotonic_segment() {
        let points = [0, 100];
        let mut prev = value_at(&points, 0);
        for m in 1..=10 {
            let cur = value_at(&points, m);
            assert!(cur >= prev);
            prev = cur;
        }
    }

    #[test]
    fn role_biases_stack() {
        let base = default_curve();
        let carry = default_curve_by_role(&[HeroRole::Carry]);
        assert_eq!(carry.scale[0], base.scale[0] + 8);
        assert_eq!(carry.fight, base.fight);

        let init_supp = default_curve_by_role(&[HeroRole::Initiator, HeroRole::Support]);
        assert_eq!(init_supp.pickoff[3], base.pickoff[3] + 10);
        assert_eq!(init_supp.fight[3], base.fight[3] + 6);
        assert_eq!(init_supp.sustain[3], base.sustain[3] + 6);
    }

    #[test]
    fn axis_mix_weights_sum_to_one_sided_estimate() {
        let c = default_curve();
        let v = curve_value(&c, 20);
        let expected = v[&Axis::Fight] * 0.45
            + v[&Axis::Pickoff] * 0.25
            + v[&Axis::Push] * 0.25
            + v[&Axis::Rosh] * 0.05;
        assert!((axis_mix(&c, 20) - expected).abs() < 1e-9);
    }

    #[test]
    fn combat_total_ignores_non_scoring_axes() {
        let mut deltas = curve_value(&default_curve(), 20);
        let before = combat_total(&deltas);
        deltas.insert(Axis::TowerDamage, 18.0);
        assert_eq!(combat_total(&deltas), before);
    }
}
