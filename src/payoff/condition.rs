use crate::Points;
use serde::Deserialize;
use serde::Serialize;

/// Payoff model selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Reward of an option is split among everyone who chose it.
    #[default]
    Distributive,
    /// Everyone choosing an option draws its full reward independently.
    Additive,
}

impl Condition {
    /// Expected share of `mean` for one of `frequency` participants on the same option.
    pub fn share(&self, mean: Points, frequency: usize) -> Points {
        debug_assert!(frequency > 0, "a chooser counts toward its own option");
        match self {
            Self::Distributive if frequency > 1 => mean / frequency as Points,
            Self::Distributive => mean,
            Self::Additive => mean,
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Distributive => write!(f, "distributive"),
            Self::Additive => write!(f, "additive"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn distributive_divides_by_frequency() {
        assert_eq!(Condition::Distributive.share(100.0, 1), 100.0);
        assert_eq!(Condition::Distributive.share(100.0, 2), 50.0);
        assert_eq!(Condition::Distributive.share(90.0, 3), 30.0);
    }
    #[test]
    fn additive_ignores_frequency() {
        assert_eq!(Condition::Additive.share(100.0, 1), 100.0);
        assert_eq!(Condition::Additive.share(100.0, 4), 100.0);
    }
}
