//! Points policy and accuracy arithmetic.
//!
//! Points depend only on the streak *after* the current correct answer:
//! streaks of 1-2 earn the base award, 3-4 double it, 5 and up triple it.

use serde::{Deserialize, Serialize};

/// Points for a correct answer outside any combo.
pub const BASE_POINTS: u32 = 10;
/// Streak at which the double award starts.
pub const DOUBLE_STREAK: u32 = 3;
/// Streak at which the triple award starts.
pub const TRIPLE_STREAK: u32 = 5;

/// Combo bonus applied to a correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bonus {
    None,
    Double,
    Triple,
}

impl Bonus {
    /// Bonus for the post-increment streak.
    pub fn for_streak(streak: u32) -> Self {
        if streak >= TRIPLE_STREAK {
            Bonus::Triple
        } else if streak >= DOUBLE_STREAK {
            Bonus::Double
        } else {
            Bonus::None
        }
    }

    pub fn multiplier(&self) -> u32 {
        match self {
            Bonus::None => 1,
            Bonus::Double => 2,
            Bonus::Triple => 3,
        }
    }

    pub fn is_combo(&self) -> bool {
        !matches!(self, Bonus::None)
    }
}

/// Points awarded for a correct answer that brought the streak to `streak`.
pub fn points_for_streak(streak: u32) -> u32 {
    BASE_POINTS * Bonus::for_streak(streak).multiplier()
}

/// `correct / answered` as a whole percentage.
///
/// Rounds half away from zero (which for these non-negative inputs is half
/// up), computed exactly in integers: `floor((200c + a) / 2a)`. Returns 0 when
/// nothing was answered.
pub fn accuracy_pct(correct: u32, answered: u32) -> u32 {
    if answered == 0 {
        return 0;
    }
    let c = u64::from(correct.min(answered));
    let a = u64::from(answered);
    ((200 * c + a) / (2 * a)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_by_streak() {
        assert_eq!(points_for_streak(1), 10);
        assert_eq!(points_for_streak(2), 10);
        assert_eq!(points_for_streak(3), 20);
        assert_eq!(points_for_streak(4), 20);
        assert_eq!(points_for_streak(5), 30);
        assert_eq!(points_for_streak(50), 30);
    }

    #[test]
    fn five_in_a_row_totals_ninety() {
        let points: Vec<u32> = (1..=5).map(points_for_streak).collect();
        assert_eq!(points, vec![10, 10, 20, 20, 30]);
        assert_eq!(points.iter().sum::<u32>(), 90);
    }

    #[test]
    fn bonus_tiers() {
        assert_eq!(Bonus::for_streak(0), Bonus::None);
        assert_eq!(Bonus::for_streak(3), Bonus::Double);
        assert_eq!(Bonus::for_streak(5), Bonus::Triple);
        assert!(!Bonus::None.is_combo());
        assert!(Bonus::Double.is_combo());
    }

    #[test]
    fn accuracy_zero_answers() {
        assert_eq!(accuracy_pct(0, 0), 0);
    }

    #[test]
    fn accuracy_exact_values() {
        assert_eq!(accuracy_pct(5, 5), 100);
        assert_eq!(accuracy_pct(0, 4), 0);
        assert_eq!(accuracy_pct(1, 4), 25);
    }

    #[test]
    fn accuracy_rounds_half_up() {
        // 1/8 = 12.5%
        assert_eq!(accuracy_pct(1, 8), 13);
        // 3/8 = 37.5%
        assert_eq!(accuracy_pct(3, 8), 38);
        // 2/3 = 66.67%
        assert_eq!(accuracy_pct(2, 3), 67);
        // 1/3 = 33.33%
        assert_eq!(accuracy_pct(1, 3), 33);
        // 1/200 = 0.5%
        assert_eq!(accuracy_pct(1, 200), 1);
    }

    #[test]
    fn accuracy_never_exceeds_one_hundred() {
        assert_eq!(accuracy_pct(7, 5), 100);
    }
}
