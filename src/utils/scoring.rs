use crate::utils::probability::{format_number, implied_probability_value};
use std::fmt;

/// Goal lines considered for "over" recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GoalLine {
    Half,
    OneAndHalf,
    TwoAndHalf,
    ThreeAndHalf,
}

impl GoalLine {
    /// Map a totals `point` onto one of the canonical lines
    pub fn from_point(point: f64) -> Option<Self> {
        match point {
            p if p == 0.5 => Some(GoalLine::Half),
            p if p == 1.5 => Some(GoalLine::OneAndHalf),
            p if p == 2.5 => Some(GoalLine::TwoAndHalf),
            p if p == 3.5 => Some(GoalLine::ThreeAndHalf),
            _ => None,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            GoalLine::Half => 0.5,
            GoalLine::OneAndHalf => 1.5,
            GoalLine::TwoAndHalf => 2.5,
            GoalLine::ThreeAndHalf => 3.5,
        }
    }

    /// Lower lines are safer and score higher
    fn bonus(&self) -> u32 {
        match self {
            GoalLine::Half => 30,
            GoalLine::OneAndHalf => 20,
            GoalLine::TwoAndHalf => 10,
            GoalLine::ThreeAndHalf => 0,
        }
    }
}

impl fmt::Display for GoalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_number(self.value()))
    }
}

/// An "over" outcome found in some bookmaker's totals market
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverCandidate {
    pub line: GoalLine,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLabel {
    High,
    GoodValue,
    ModerateRisk,
}

impl ConfidenceLabel {
    pub fn for_probability(probability: f64) -> Self {
        if probability >= 70.0 {
            ConfidenceLabel::High
        } else if probability >= 60.0 {
            ConfidenceLabel::GoodValue
        } else {
            ConfidenceLabel::ModerateRisk
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ConfidenceLabel::High => "🔥",
            ConfidenceLabel::GoodValue => "✅",
            ConfidenceLabel::ModerateRisk => "⚠️",
        }
    }
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConfidenceLabel::High => "High Confidence",
            ConfidenceLabel::GoodValue => "Good Value",
            ConfidenceLabel::ModerateRisk => "Moderate Risk",
        };
        f.write_str(text)
    }
}

/// The winning over candidate for an event, with its score and label
#[derive(Debug, Clone, PartialEq)]
pub struct BestOverBet {
    pub line: GoalLine,
    pub price: f64,
    /// Implied probability in percent
    pub probability: f64,
    pub confidence: u32,
    pub label: ConfidenceLabel,
}

impl BestOverBet {
    pub fn recommendation(&self) -> String {
        format!("Over {}", self.line)
    }
}

/// Additive confidence score for an over bet.
///
/// Probability bands reward likely outcomes, the price bands reward odds in
/// the 1.3..=2.0 sweet spot over extreme favourites or long shots, and the
/// line bonus prefers lower lines.
pub fn confidence_score(probability: f64, price: f64, line: GoalLine) -> u32 {
    let probability_points = if probability >= 70.0 {
        40
    } else if probability >= 60.0 {
        30
    } else if probability >= 50.0 {
        20
    } else {
        0
    };

    let price_points = if (1.3..=2.0).contains(&price) {
        30
    } else if price > 1.1 && price < 2.5 {
        20
    } else {
        0
    };

    probability_points + price_points + line.bonus()
}

/// Pick the highest-scoring candidate. Ties go to the candidate seen first.
pub fn select_best_over(candidates: &[OverCandidate]) -> Option<BestOverBet> {
    let mut scored: Vec<BestOverBet> = candidates
        .iter()
        .filter_map(|c| {
            let probability = implied_probability_value(c.price)?;
            Some(BestOverBet {
                line: c.line,
                price: c.price,
                probability,
                confidence: confidence_score(probability, c.price, c.line),
                label: ConfidenceLabel::for_probability(probability),
            })
        })
        .collect();

    // Stable sort keeps encounter order among equal scores
    scored.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    scored.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINES: [GoalLine; 4] = [
        GoalLine::Half,
        GoalLine::OneAndHalf,
        GoalLine::TwoAndHalf,
        GoalLine::ThreeAndHalf,
    ];

    #[test]
    fn test_goal_line_from_point() {
        assert_eq!(GoalLine::from_point(0.5), Some(GoalLine::Half));
        assert_eq!(GoalLine::from_point(3.5), Some(GoalLine::ThreeAndHalf));
        assert_eq!(GoalLine::from_point(2.0), None);
        assert_eq!(GoalLine::from_point(4.5), None);
        assert_eq!(GoalLine::TwoAndHalf.to_string(), "2.5");
    }

    #[test]
    fn test_every_goal_line_round_trips_its_point() {
        let accepted: Vec<f64> = [0.0, 0.5, 1.0, 1.5, 2.5, 3.0, 3.5, 5.5]
            .into_iter()
            .filter(|p| GoalLine::from_point(*p).is_some())
            .collect();
        assert_eq!(accepted, vec![0.5, 1.5, 2.5, 3.5]);

        for point in accepted {
            assert_eq!(GoalLine::from_point(point).map(|l| l.value()), Some(point));
        }
    }

    #[test]
    fn test_confidence_score_components() {
        // 1.25 -> 80%: 40 + 20 (outside sweet spot) + 30
        assert_eq!(confidence_score(80.0, 1.25, GoalLine::Half), 90);
        // 1.5 -> 66.7%: 30 + 30 + 20
        assert_eq!(confidence_score(100.0 / 1.5, 1.5, GoalLine::OneAndHalf), 80);
        // 1.9 -> 52.6%: 20 + 30 + 10
        assert_eq!(confidence_score(100.0 / 1.9, 1.9, GoalLine::TwoAndHalf), 60);
        // 3.0 -> 33.3%: 0 + 0 + 0
        assert_eq!(confidence_score(100.0 / 3.0, 3.0, GoalLine::ThreeAndHalf), 0);
        // 1.05 -> 95%: 40 + 0 + 30
        assert_eq!(confidence_score(100.0 / 1.05, 1.05, GoalLine::Half), 70);
    }

    #[test]
    fn test_score_monotonic_in_line() {
        for probability in [30.0, 55.0, 65.0, 75.0] {
            for price in [1.05, 1.2, 1.5, 2.2, 3.0] {
                for pair in LINES.windows(2) {
                    assert!(
                        confidence_score(probability, price, pair[0])
                            >= confidence_score(probability, price, pair[1])
                    );
                }
            }
        }
    }

    #[test]
    fn test_score_monotonic_in_probability() {
        let probabilities = [10.0, 49.9, 50.0, 59.9, 60.0, 69.9, 70.0, 99.0];
        for line in LINES {
            for price in [1.05, 1.5, 2.2, 3.0] {
                for pair in probabilities.windows(2) {
                    assert!(
                        confidence_score(pair[1], price, line)
                            >= confidence_score(pair[0], price, line)
                    );
                }
            }
        }
    }

    #[test]
    fn test_score_prefers_sweet_spot_prices() {
        for line in LINES {
            let sweet = confidence_score(60.0, 1.5, line);
            let near = confidence_score(60.0, 2.3, line);
            let far = confidence_score(60.0, 3.0, line);
            assert!(sweet >= near && near >= far);
            assert_eq!(confidence_score(60.0, 1.3, line), sweet);
            assert_eq!(confidence_score(60.0, 2.0, line), sweet);
            assert_eq!(confidence_score(60.0, 1.1, line), far);
            assert_eq!(confidence_score(60.0, 2.5, line), far);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(ConfidenceLabel::for_probability(70.0), ConfidenceLabel::High);
        assert_eq!(ConfidenceLabel::for_probability(65.0), ConfidenceLabel::GoodValue);
        assert_eq!(ConfidenceLabel::for_probability(59.99), ConfidenceLabel::ModerateRisk);
        assert_eq!(ConfidenceLabel::High.to_string(), "High Confidence");
    }

    #[test]
    fn test_select_best_over() {
        let candidates = [
            OverCandidate { line: GoalLine::TwoAndHalf, price: 1.9 },
            OverCandidate { line: GoalLine::OneAndHalf, price: 1.35 },
            OverCandidate { line: GoalLine::Half, price: 1.05 },
        ];
        let best = select_best_over(&candidates).unwrap();
        // 1.35 -> 74%: 40 + 30 + 20 = 90 beats 0.5 @ 1.05 (70)
        assert_eq!(best.line, GoalLine::OneAndHalf);
        assert_eq!(best.confidence, 90);
        assert_eq!(best.label, ConfidenceLabel::High);
        assert_eq!(best.recommendation(), "Over 1.5");
    }

    #[test]
    fn test_select_best_over_ties_go_to_first_seen() {
        let candidates = [
            OverCandidate { line: GoalLine::TwoAndHalf, price: 1.95 },
            OverCandidate { line: GoalLine::TwoAndHalf, price: 1.8 },
        ];
        // Both score 20 + 30 + 10
        let best = select_best_over(&candidates).unwrap();
        assert_eq!(best.price, 1.95);

        let reversed = [candidates[1], candidates[0]];
        assert_eq!(select_best_over(&reversed).unwrap().price, 1.8);
    }

    #[test]
    fn test_select_best_over_empty() {
        assert!(select_best_over(&[]).is_none());
        let invalid = [OverCandidate { line: GoalLine::Half, price: -1.0 }];
        assert!(select_best_over(&invalid).is_none());
    }
}
