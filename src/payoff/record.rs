use super::Condition;
use crate::OptionIndex;
use crate::Points;
use serde::Deserialize;
use serde::Serialize;

/// Inputs and result of one participant's payoff in one round.
/// Retained so every payoff can be recomputed from the session seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffRecord {
    pub condition: Condition,
    pub choice: Option<OptionIndex>,
    pub frequency: usize,
    pub mean: Points,
    pub noise: Points,
    pub payoff: Points,
    pub paid: bool,
    /// Mean payoff over the responders of this participant's group.
    pub team_mean: Option<Points>,
}

impl PayoffRecord {
    /// Record for a participant who sat the round out.
    pub fn absent(condition: Condition) -> Self {
        Self {
            condition,
            choice: None,
            frequency: 0,
            mean: 0.0,
            noise: 0.0,
            payoff: 0.0,
            paid: false,
            team_mean: None,
        }
    }
}
