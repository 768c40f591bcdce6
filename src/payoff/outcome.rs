use super::*;
use crate::OptionIndex;
use crate::Points;
use crate::Slot;

/// Result of settling one group's choices for one round.
/// Vectors are aligned to the choice vector the outcome was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    condition: Condition,
    choices: Vec<Option<OptionIndex>>,
    means: Vec<Points>,
    payoffs: Vec<Points>,
    noises: Vec<Points>,
    frequencies: Vec<usize>,
    paid: bool,
}

impl Outcome {
    /// Settles a round, paying nobody when fewer than `quorum` responded.
    pub fn settle<N>(
        choices: &[Option<OptionIndex>],
        means: &[Points],
        condition: Condition,
        quorum: usize,
        noise: &mut N,
    ) -> Self
    where
        N: Noise,
    {
        match Self::responders_of(choices) >= quorum {
            true => Self::compute(choices, means, condition, noise),
            false => Self::zeroed(choices, means, condition),
        }
    }
    /// Computes payoffs unconditionally.
    /// One noise draw is consumed per responder, in slot order.
    pub fn compute<N>(
        choices: &[Option<OptionIndex>],
        means: &[Points],
        condition: Condition,
        noise: &mut N,
    ) -> Self
    where
        N: Noise,
    {
        let choices = Self::sanitize(choices, means.len());
        let frequencies = Self::tally(&choices, means.len());
        let mut noises = vec![0.0; choices.len()];
        let mut payoffs = vec![0.0; choices.len()];
        for (slot, choice) in choices.iter().enumerate() {
            if let Some(i) = *choice {
                let share = condition.share(means[i], frequencies[i]);
                let eps = noise.draw();
                noises[slot] = eps;
                payoffs[slot] = Self::round(share + eps);
            }
        }
        Self {
            condition,
            choices,
            means: means.to_vec(),
            payoffs,
            noises,
            frequencies,
            paid: true,
        }
    }
    /// All-zero payoffs that still report what was chosen.
    pub fn zeroed(choices: &[Option<OptionIndex>], means: &[Points], condition: Condition) -> Self {
        let choices = Self::sanitize(choices, means.len());
        let frequencies = Self::tally(&choices, means.len());
        Self {
            condition,
            means: means.to_vec(),
            payoffs: vec![0.0; choices.len()],
            noises: vec![0.0; choices.len()],
            choices,
            frequencies,
            paid: false,
        }
    }
    /// Count of participants per option.
    pub fn tally(choices: &[Option<OptionIndex>], options: usize) -> Vec<usize> {
        let mut frequencies = vec![0; options];
        choices
            .iter()
            .flatten()
            .filter(|i| **i < options)
            .for_each(|i| frequencies[*i] += 1);
        frequencies
    }
    /// Floors at zero and rounds to hundredths of a point.
    pub fn round(x: Points) -> Points {
        (x.max(0.0) * 100.0).round() / 100.0
    }
    fn responders_of(choices: &[Option<OptionIndex>]) -> usize {
        choices.iter().filter(|c| c.is_some()).count()
    }
    fn sanitize(choices: &[Option<OptionIndex>], options: usize) -> Vec<Option<OptionIndex>> {
        choices
            .iter()
            .map(|c| {
                debug_assert!(c.is_none_or(|i| i < options), "option out of range");
                c.filter(|i| *i < options)
            })
            .collect()
    }
}

impl Outcome {
    pub fn condition(&self) -> Condition {
        self.condition
    }
    pub fn payoffs(&self) -> &[Points] {
        &self.payoffs
    }
    pub fn frequencies(&self) -> &[usize] {
        &self.frequencies
    }
    pub fn payoff(&self, slot: Slot) -> Points {
        self.payoffs.get(slot).copied().unwrap_or(0.0)
    }
    /// Whether the round met its quorum and paid out.
    pub fn paid(&self) -> bool {
        self.paid
    }
    pub fn responders(&self) -> usize {
        Self::responders_of(&self.choices)
    }
    /// Sum of payoffs over responders only.
    pub fn team_total(&self) -> Points {
        self.choices
            .iter()
            .zip(self.payoffs.iter())
            .filter(|(c, _)| c.is_some())
            .map(|(_, p)| p)
            .sum()
    }
    /// Mean payoff over responders; None when nobody responded.
    pub fn team_mean(&self) -> Option<Points> {
        match self.responders() {
            0 => None,
            n => Some(self.team_total() / n as Points),
        }
    }
    /// Audit record for the participant at `slot`.
    pub fn record(&self, slot: Slot) -> PayoffRecord {
        let choice = self.choices.get(slot).copied().flatten();
        PayoffRecord {
            condition: self.condition,
            choice,
            frequency: choice.map(|i| self.frequencies[i]).unwrap_or(0),
            mean: choice.map(|i| self.means[i]).unwrap_or(0.0),
            noise: self.noises.get(slot).copied().unwrap_or(0.0),
            payoff: self.payoff(slot),
            paid: self.paid,
            team_mean: self.team_mean(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: Points = 4.0 * 5.0;

    #[test]
    fn frequencies_count_choices() {
        let choices = [Some(0), Some(0), Some(1), None];
        assert_eq!(Outcome::tally(&choices, 3), vec![2, 1, 0]);
    }
    #[test]
    fn distributive_splits_reward() {
        let choices = [Some(0), Some(0), Some(1)];
        let means = [100.0, 100.0, 100.0];
        let ref mut noise = Gaussian::seeded(11, 5.0);
        let outcome = Outcome::settle(&choices, &means, Condition::Distributive, 2, noise);
        assert!(outcome.paid());
        assert_eq!(outcome.frequencies(), &[2, 1, 0]);
        assert!((outcome.payoff(0) - 50.0).abs() < TOLERANCE);
        assert!((outcome.payoff(1) - 50.0).abs() < TOLERANCE);
        assert!((outcome.payoff(2) - 100.0).abs() < TOLERANCE);
    }
    #[test]
    fn silent_distributive_is_exact() {
        let choices = [Some(0), Some(0), Some(1)];
        let means = [100.0, 100.0, 100.0];
        let outcome = Outcome::compute(&choices, &means, Condition::Distributive, &mut Silent);
        assert_eq!(outcome.payoffs(), &[50.0, 50.0, 100.0]);
    }
    #[test]
    fn additive_does_not_divide() {
        let choices = [Some(2), Some(2), Some(2)];
        let means = [10.0, 20.0, 60.0];
        let outcome = Outcome::compute(&choices, &means, Condition::Additive, &mut Silent);
        assert_eq!(outcome.payoffs(), &[60.0, 60.0, 60.0]);
    }
    #[test]
    fn below_quorum_pays_zero() {
        let choices = [Some(0), None];
        let means = [100.0, 100.0];
        let ref mut noise = Gaussian::seeded(5, 5.0);
        let outcome = Outcome::settle(&choices, &means, Condition::Distributive, 2, noise);
        assert!(!outcome.paid());
        assert_eq!(outcome.payoffs(), &[0.0, 0.0]);
        assert_eq!(outcome.frequencies(), &[1, 0]);
    }
    #[test]
    fn payoffs_are_floored_and_rounded() {
        assert_eq!(Outcome::round(-3.2), 0.0);
        assert_eq!(Outcome::round(12.345678), 12.35);
        assert_eq!(Outcome::round(7.0), 7.0);
        let choices = [Some(0); 4];
        let means = [1.0];
        let ref mut noise = Gaussian::seeded(9, 50.0);
        let outcome = Outcome::compute(&choices, &means, Condition::Distributive, noise);
        for p in outcome.payoffs() {
            assert!(*p >= 0.0);
            assert_eq!((*p * 100.0).round() / 100.0, *p);
        }
    }
    #[test]
    fn nulls_excluded_from_team_aggregate() {
        let choices = [Some(0), None, Some(1)];
        let means = [40.0, 20.0];
        let outcome = Outcome::compute(&choices, &means, Condition::Distributive, &mut Silent);
        assert_eq!(outcome.payoff(1), 0.0);
        assert_eq!(outcome.team_total(), 60.0);
        assert_eq!(outcome.team_mean(), Some(30.0));
        let none = Outcome::compute(&[None, None], &means, Condition::Additive, &mut Silent);
        assert_eq!(none.team_mean(), None);
    }
    #[test]
    fn responder_frequency_at_least_one() {
        let choices = [Some(1), Some(3), Some(1), None, Some(0)];
        let means = [10.0; 4];
        let outcome = Outcome::compute(&choices, &means, Condition::Distributive, &mut Silent);
        for (slot, choice) in choices.iter().enumerate() {
            let record = outcome.record(slot);
            match choice {
                Some(_) => assert!(record.frequency >= 1),
                None => assert_eq!(record.frequency, 0),
            }
        }
    }
    #[test]
    fn fixed_seed_reproduces_outcome() {
        let choices = [Some(0), Some(1), Some(1), None];
        let means = [30.0, 70.0];
        let a = Outcome::compute(&choices, &means, Condition::Distributive, &mut Gaussian::seeded(99, 3.0));
        let b = Outcome::compute(&choices, &means, Condition::Distributive, &mut Gaussian::seeded(99, 3.0));
        assert_eq!(a, b);
    }
    #[test]
    fn record_carries_inputs() {
        let choices = [Some(0), Some(0)];
        let means = [80.0];
        let outcome = Outcome::compute(&choices, &means, Condition::Distributive, &mut Silent);
        let record = outcome.record(1);
        assert_eq!(record.choice, Some(0));
        assert_eq!(record.frequency, 2);
        assert_eq!(record.mean, 80.0);
        assert_eq!(record.payoff, 40.0);
        assert_eq!(record.team_mean, Some(40.0));
        assert_eq!(record.condition, Condition::Distributive);
    }
}
