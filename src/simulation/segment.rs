//! Latent customer segments and their hidden response to the coupon.
use crate::errors::UpliftError;
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Segment {
    /// Buys anyway.
    SureThing,
    /// Never buys.
    LostCause,
    /// Buys mostly when given the coupon.
    Persuadable,
    /// Buys less when given the coupon.
    SleepingDog,
}

/// Conversion probability of a segment in each arm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseProbabilities {
    pub control: f64,
    pub treatment: f64,
}

impl ResponseProbabilities {
    /// Probability matching the realized treatment.
    #[inline]
    pub fn for_treatment(&self, treated: bool) -> f64 {
        if treated {
            self.treatment
        } else {
            self.control
        }
    }

    pub fn uplift(&self) -> f64 {
        self.treatment - self.control
    }
}

impl Segment {
    pub const ALL: [Segment; 4] = [
        Segment::SureThing,
        Segment::LostCause,
        Segment::Persuadable,
        Segment::SleepingDog,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Segment::SureThing => "Sure Thing",
            Segment::LostCause => "Lost Cause",
            Segment::Persuadable => "Persuadable",
            Segment::SleepingDog => "Sleeping Dog",
        }
    }

    pub fn response(&self) -> ResponseProbabilities {
        match self {
            Segment::SureThing => ResponseProbabilities {
                control: 0.9,
                treatment: 0.9,
            },
            Segment::LostCause => ResponseProbabilities {
                control: 0.01,
                treatment: 0.01,
            },
            Segment::Persuadable => ResponseProbabilities {
                control: 0.1,
                treatment: 0.8,
            },
            Segment::SleepingDog => ResponseProbabilities {
                control: 0.7,
                treatment: 0.2,
            },
        }
    }

    /// Design effect of the coupon on this segment.
    pub fn true_uplift(&self) -> f64 {
        self.response().uplift()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Segment {
    type Err = UpliftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        Segment::ALL
            .iter()
            .find(|seg| seg.name().replace(' ', "").eq_ignore_ascii_case(&key))
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = Segment::ALL.iter().map(|s| s.name()).collect();
                UpliftError::ParseString(s.to_string(), "Segment".to_string(), items_to_strings(&names))
            })
    }
}

/// Features the segment rules look at.
#[derive(Debug, Clone, Copy)]
pub struct SegmentInputs {
    pub recency: u32,
    pub frequency: u32,
    pub age: u32,
    pub income: f64,
}

pub type SegmentRule = (fn(&SegmentInputs) -> bool, Segment);

/// Evaluated top to bottom; the first matching rule wins, so a loyal customer who is
/// also young and low income stays a `SureThing`.
pub const SEGMENT_RULES: [SegmentRule; 3] = [
    (is_loyal, Segment::SureThing),
    (is_dormant, Segment::LostCause),
    (is_young_low_income, Segment::Persuadable),
];

fn is_loyal(x: &SegmentInputs) -> bool {
    x.frequency > 15
}

fn is_dormant(x: &SegmentInputs) -> bool {
    x.recency > 300
}

fn is_young_low_income(x: &SegmentInputs) -> bool {
    x.age < 30 && x.income < 60000.0
}

/// Segment of anything no rule matches.
pub const DEFAULT_SEGMENT: Segment = Segment::SleepingDog;

pub fn assign_segment(recency: u32, frequency: u32, age: u32, income: f64) -> Segment {
    let inputs = SegmentInputs {
        recency,
        frequency,
        age,
        income,
    };
    SEGMENT_RULES
        .iter()
        .find(|(rule, _)| rule(&inputs))
        .map(|(_, segment)| *segment)
        .unwrap_or(DEFAULT_SEGMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_priority() {
        // Matches all three rules; the first wins.
        assert_eq!(assign_segment(350, 18, 20, 10000.0), Segment::SureThing);
        // Dormant and young/low income: dormancy wins.
        assert_eq!(assign_segment(301, 15, 20, 10000.0), Segment::LostCause);
        assert_eq!(assign_segment(300, 15, 29, 59999.0), Segment::Persuadable);
        assert_eq!(assign_segment(300, 15, 30, 10000.0), Segment::SleepingDog);
        assert_eq!(assign_segment(10, 1, 25, 60000.0), Segment::SleepingDog);
    }

    #[test]
    fn test_negative_income_is_still_low_income() {
        assert_eq!(assign_segment(10, 5, 20, -5000.0), Segment::Persuadable);
    }

    #[test]
    fn test_response_pairs() {
        assert_eq!(Segment::SureThing.true_uplift(), 0.0);
        assert_eq!(Segment::LostCause.true_uplift(), 0.0);
        assert!((Segment::Persuadable.true_uplift() - 0.7).abs() < 1e-12);
        assert!((Segment::SleepingDog.true_uplift() + 0.5).abs() < 1e-12);
        assert_eq!(Segment::Persuadable.response().for_treatment(true), 0.8);
        assert_eq!(Segment::Persuadable.response().for_treatment(false), 0.1);
    }

    #[test]
    fn test_segment_names_round_trip() {
        for seg in Segment::ALL {
            assert_eq!(seg.to_string().parse::<Segment>().unwrap(), seg);
        }
        assert_eq!("sleepingdog".parse::<Segment>().unwrap(), Segment::SleepingDog);
        assert!("Whale".parse::<Segment>().is_err());
    }
}
