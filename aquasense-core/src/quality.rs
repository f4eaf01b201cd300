//! Fuzzy water-quality assessment
//!
//! A Mamdani-style rule base rates a sample of pond water from 0 to 100
//! using pH, TDS and turbidity. The score is informational: it is attached
//! to sendable reading sets but never decides whether a set is sent.
//!
//! ## Inference
//!
//! 1. **Fuzzification**: each input gets a membership degree in three
//!    trapezoidal terms (see [`crate::constants::quality`]).
//! 2. **Rule evaluation**: 27 rules cover every term combination. A rule's
//!    firing strength is the minimum of its three memberships.
//! 3. **Defuzzification**: weighted average of the rule scores by strength,
//!    rounded to two decimals.
//!
//! ```rust
//! use aquasense_core::quality::{assess, QualityCategory};
//!
//! let q = assess(7.75, 500.0, 30.0).unwrap();
//! assert_eq!(q.score, 95.0);
//! assert_eq!(q.category, QualityCategory::Excellent);
//! ```

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::constants::quality::{
    MIN_SLOPE_WIDTH, PH_HIGH, PH_LOW, PH_NORMAL, SCORE_EXCELLENT, SCORE_FAIR, SCORE_GOOD,
    SCORE_POOR, TDS_HIGH, TDS_LOW, TDS_MEDIUM, TURBIDITY_CLEAR, TURBIDITY_OPTIMAL,
    TURBIDITY_TURBID,
};

/// Trapezoidal membership function `[a, b, c, d]`
///
/// `a == b` makes a left shoulder (full membership down to −∞), `c == d` a
/// right shoulder (full membership up to +∞).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trapezoid {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
}

impl Trapezoid {
    /// Create from breakpoints
    pub const fn new(points: [f32; 4]) -> Self {
        let [a, b, c, d] = points;
        Self { a, b, c, d }
    }

    /// Membership degree of `x` in `[0, 1]`
    pub fn membership(&self, x: f32) -> f32 {
        let Self { a, b, c, d } = *self;

        if a == b {
            return if x <= c {
                1.0
            } else if x >= d {
                0.0
            } else {
                (d - x) / (d - c).max(MIN_SLOPE_WIDTH)
            };
        }
        if c == d {
            return if x >= b {
                1.0
            } else if x <= a {
                0.0
            } else {
                (x - a) / (b - a).max(MIN_SLOPE_WIDTH)
            };
        }

        if x <= a || x >= d {
            0.0
        } else if x >= b && x <= c {
            1.0
        } else if x < b {
            (x - a) / (b - a)
        } else {
            (d - x) / (d - c)
        }
    }
}

/// pH linguistic term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PhTerm {
    /// Acidic
    Low,
    /// Target band
    Normal,
    /// Alkaline
    High,
}

/// Turbidity linguistic term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TurbidityTerm {
    /// Little plankton
    Clear,
    /// Healthy plankton density
    Optimal,
    /// Murky
    Turbid,
}

/// TDS linguistic term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TdsTerm {
    /// Mineral-poor
    Low,
    /// Target mineral content
    Medium,
    /// Mineral-heavy
    High,
}

const PH_TERMS: [(PhTerm, Trapezoid); 3] = [
    (PhTerm::Low, Trapezoid::new(PH_LOW)),
    (PhTerm::Normal, Trapezoid::new(PH_NORMAL)),
    (PhTerm::High, Trapezoid::new(PH_HIGH)),
];

const TURBIDITY_TERMS: [(TurbidityTerm, Trapezoid); 3] = [
    (TurbidityTerm::Clear, Trapezoid::new(TURBIDITY_CLEAR)),
    (TurbidityTerm::Optimal, Trapezoid::new(TURBIDITY_OPTIMAL)),
    (TurbidityTerm::Turbid, Trapezoid::new(TURBIDITY_TURBID)),
];

const TDS_TERMS: [(TdsTerm, Trapezoid); 3] = [
    (TdsTerm::Low, Trapezoid::new(TDS_LOW)),
    (TdsTerm::Medium, Trapezoid::new(TDS_MEDIUM)),
    (TdsTerm::High, Trapezoid::new(TDS_HIGH)),
];

/// Rule consequents indexed `[ph][turbidity][tds]` in term order
const RULE_SCORES: [[[f32; 3]; 3]; 3] = [
    // pH low
    [[35.0, 40.0, 25.0], [38.0, 45.0, 35.0], [20.0, 30.0, 15.0]],
    // pH normal
    [[55.0, 75.0, 60.0], [72.0, 95.0, 78.0], [50.0, 58.0, 42.0]],
    // pH high
    [[40.0, 52.0, 38.0], [48.0, 68.0, 55.0], [32.0, 40.0, 18.0]],
];

/// Number of rules in the base
pub const RULE_COUNT: usize = 27;

/// Overall rating band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QualityCategory {
    /// Below 30
    Critical,
    /// 30 to 50
    Poor,
    /// 50 to 70
    Fair,
    /// 70 to 85
    Good,
    /// 85 and above
    Excellent,
}

impl QualityCategory {
    /// Band for a defuzzified score
    pub fn from_score(score: f32) -> Self {
        if score >= SCORE_EXCELLENT {
            Self::Excellent
        } else if score >= SCORE_GOOD {
            Self::Good
        } else if score >= SCORE_FAIR {
            Self::Fair
        } else if score >= SCORE_POOR {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    /// Display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

/// Antecedent of one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RuleId {
    /// pH term
    pub ph: PhTerm,
    /// Turbidity term
    pub turbidity: TurbidityTerm,
    /// TDS term
    pub tds: TdsTerm,
}

impl RuleId {
    /// 1-based position in the rule base
    pub fn number(&self) -> u8 {
        self.ph as u8 * 9 + self.turbidity as u8 * 3 + self.tds as u8 + 1
    }

    /// Consequent score
    pub fn score(&self) -> f32 {
        RULE_SCORES[self.ph as usize][self.turbidity as usize][self.tds as usize]
    }
}

/// Result of one assessment
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct QualityAssessment {
    /// Defuzzified score, 0 to 100, two decimals
    pub score: f32,
    /// Band of the score
    pub category: QualityCategory,
    /// Strongest rule, first one on ties
    pub dominant: RuleId,
    /// Firing strength of the dominant rule
    pub dominant_strength: f32,
    /// Number of rules with non-zero strength
    pub active_rules: u8,
}

/// Assess water quality
///
/// Returns `None` when an input is not finite or no rule fires.
pub fn assess(ph: f32, tds_ppm: f32, turbidity_ntu: f32) -> Option<QualityAssessment> {
    if !ph.is_finite() || !tds_ppm.is_finite() || !turbidity_ntu.is_finite() {
        return None;
    }

    let mut weighted = 0.0f32;
    let mut total = 0.0f32;
    let mut active = 0u8;
    let mut dominant: Option<(RuleId, f32)> = None;

    for (ph_term, ph_mf) in PH_TERMS {
        let mu_ph = ph_mf.membership(ph);
        for (turbidity_term, turbidity_mf) in TURBIDITY_TERMS {
            let mu_turbidity = turbidity_mf.membership(turbidity_ntu);
            for (tds_term, tds_mf) in TDS_TERMS {
                let strength = mu_ph.min(mu_turbidity).min(tds_mf.membership(tds_ppm));
                if strength <= 0.0 {
                    continue;
                }

                let rule = RuleId { ph: ph_term, turbidity: turbidity_term, tds: tds_term };
                weighted += strength * rule.score();
                total += strength;
                active += 1;
                if dominant.map_or(true, |(_, best)| strength > best) {
                    dominant = Some((rule, strength));
                }
            }
        }
    }

    let (dominant, dominant_strength) = dominant?;
    let score = libm::roundf(weighted / total * 100.0) / 100.0;
    let category = QualityCategory::from_score(score);

    log_debug!(
        "quality: score {} ({}), rule {} at {}",
        score,
        category.name(),
        dominant.number(),
        dominant_strength
    );

    Some(QualityAssessment {
        score,
        category,
        dominant,
        dominant_strength,
        active_rules: active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn standard_trapezoid() {
        let t = Trapezoid::new(PH_NORMAL);
        assert_eq!(t.membership(7.0), 0.0);
        assert!(approx(t.membership(7.25), 0.5));
        assert_eq!(t.membership(7.75), 1.0);
        assert!(approx(t.membership(8.25), 0.5));
        assert_eq!(t.membership(8.5), 0.0);
    }

    #[test]
    fn shoulders_extend_past_domain() {
        let low = Trapezoid::new(PH_LOW);
        assert_eq!(low.membership(-3.0), 1.0);
        assert_eq!(low.membership(6.5), 1.0);
        assert!(approx(low.membership(6.85), 0.5));
        assert_eq!(low.membership(7.2), 0.0);

        let high = Trapezoid::new(TURBIDITY_TURBID);
        assert_eq!(high.membership(500.0), 1.0);
        assert!(approx(high.membership(50.0), 0.5));
        assert_eq!(high.membership(40.0), 0.0);
    }

    #[test]
    fn ideal_water_is_excellent() {
        let q = assess(7.75, 500.0, 30.0).unwrap();
        assert_eq!(q.score, 95.0);
        assert_eq!(q.category, QualityCategory::Excellent);
        assert_eq!(q.active_rules, 1);
        assert_eq!(q.dominant.number(), 14);
        assert_eq!(q.dominant_strength, 1.0);
    }

    #[test]
    fn acidic_murky_water_is_critical() {
        let q = assess(5.0, 1500.0, 100.0).unwrap();
        assert_eq!(q.score, 15.0);
        assert_eq!(q.category, QualityCategory::Critical);
        assert_eq!(
            q.dominant,
            RuleId { ph: PhTerm::Low, turbidity: TurbidityTerm::Turbid, tds: TdsTerm::High }
        );
        assert_eq!(q.dominant.number(), 9);
    }

    #[test]
    fn boundary_blends_neighbouring_rules() {
        // pH 7.1 is partly low (1/7) and partly normal (1/5).
        let q = assess(7.1, 500.0, 30.0).unwrap();
        assert_eq!(q.active_rules, 2);
        assert!(q.score > 45.0 && q.score < 95.0);
        assert_eq!(q.dominant.ph, PhTerm::Normal);
    }

    #[test]
    fn score_rounded_to_two_decimals() {
        let q = assess(7.1, 500.0, 30.0).unwrap();
        let scaled = q.score * 100.0;
        assert!((scaled - libm::roundf(scaled)).abs() < 1e-2);
    }

    #[test]
    fn non_finite_input_is_unknown() {
        assert!(assess(f32::NAN, 500.0, 30.0).is_none());
        assert!(assess(7.5, f32::INFINITY, 30.0).is_none());
    }

    #[test]
    fn category_bands() {
        assert_eq!(QualityCategory::from_score(85.0), QualityCategory::Excellent);
        assert_eq!(QualityCategory::from_score(84.99), QualityCategory::Good);
        assert_eq!(QualityCategory::from_score(70.0), QualityCategory::Good);
        assert_eq!(QualityCategory::from_score(50.0), QualityCategory::Fair);
        assert_eq!(QualityCategory::from_score(30.0), QualityCategory::Poor);
        assert_eq!(QualityCategory::from_score(29.99), QualityCategory::Critical);
    }

    #[test]
    fn rule_numbers_cover_base() {
        let first = RuleId { ph: PhTerm::Low, turbidity: TurbidityTerm::Clear, tds: TdsTerm::Low };
        let last = RuleId { ph: PhTerm::High, turbidity: TurbidityTerm::Turbid, tds: TdsTerm::High };
        assert_eq!(first.number(), 1);
        assert_eq!(last.number() as usize, RULE_COUNT);
        assert_eq!(last.score(), 18.0);
    }
}
