use super::Stage;
use super::TimerKind;
use crate::OptionIndex;
use crate::Round;
use crate::Slot;
use crate::network::Refusal;

/// A signal the room refuses. The room state is left untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    #[error("unknown participant P{0}")]
    UnknownParticipant(Slot),
    #[error("P{0} is not active")]
    Inactive(Slot),
    #[error("{signal} not accepted during {stage}")]
    WrongStage { signal: &'static str, stage: Stage },
    #[error("P{0} already joined")]
    AlreadyJoined(Slot),
    #[error("P{0} already chose this round")]
    DuplicateChoice(Slot),
    #[error("option {option} outside 0..{options}")]
    InvalidOption { option: OptionIndex, options: usize },
    #[error("P{0} sits this round out")]
    SittingOut(Slot),
    #[error("ballot refused: {0}")]
    Ballot(#[from] Refusal),
    #[error("malformed message: {0}")]
    Malformed(String),
}

impl ProtocolError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownParticipant(_) => "E101",
            Self::Inactive(_) => "E102",
            Self::WrongStage { .. } => "E103",
            Self::AlreadyJoined(_) => "E104",
            Self::DuplicateChoice(_) => "E105",
            Self::InvalidOption { .. } => "E106",
            Self::SittingOut(_) => "E107",
            Self::Ballot(_) => "E108",
            Self::Malformed(_) => "E109",
        }
    }
}

/// Invalid room parameters. Fatal: the room is never created.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("group bounds invalid: min {min}, max {max}")]
    GroupBounds { min: usize, max: usize },
    #[error("response quorum {quorum} must lie in 1..={max}")]
    Quorum { quorum: usize, max: usize },
    #[error("at least one option is required")]
    NoOptions,
    #[error("at least one round is required")]
    NoRounds,
    #[error("at least one reward environment is required")]
    NoEnvironments,
    #[error("environment {index} has {len} means for {options} options")]
    EnvironmentShape {
        index: usize,
        len: usize,
        options: usize,
    },
    #[error("mean reward {mean} in environment {index} is not a finite non-negative number")]
    MeanReward { index: usize, mean: f64 },
    #[error("noise sd {0} is not a finite non-negative number")]
    Noise(f64),
    #[error("network density {0} outside [0, 1]")]
    Density(f64),
    #[error("{0} must be positive")]
    Timing(&'static str),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::GroupBounds { .. } => "E501",
            Self::Quorum { .. } => "E502",
            Self::NoOptions => "E503",
            Self::NoRounds => "E504",
            Self::NoEnvironments => "E505",
            Self::EnvironmentShape { .. } => "E506",
            Self::MeanReward { .. } => "E507",
            Self::Noise(_) => "E508",
            Self::Density(_) => "E509",
            Self::Timing(_) => "E510",
        }
    }
}

/// Every abnormal condition a room reports, each with a stable telemetry code.
/// Only [`Fault::Configuration`] is fatal; the rest are resolved in place.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Fault {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("{missing} response(s) missing at {kind}")]
    TimeoutExpired { kind: TimerKind, missing: usize },
    #[error("{present} present, {required} required")]
    QuorumNotMet { present: usize, required: usize },
    #[error("P{slot} disconnected during round {round}")]
    DisconnectDuringRound { slot: Slot, round: Round },
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl Fault {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Protocol(e) => e.code(),
            Self::TimeoutExpired { .. } => "E200",
            Self::QuorumNotMet { .. } => "E300",
            Self::DisconnectDuringRound { .. } => "E400",
            Self::Configuration(e) => e.code(),
        }
    }
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
    /// Emits the fault to the log under its code.
    pub fn report(&self, room: &impl std::fmt::Display) {
        match self.is_fatal() {
            true => log::error!("[room {}] {} {}", room, self.code(), self),
            false => log::warn!("[room {}] {} {}", room, self.code(), self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn codes_are_stable_and_distinct() {
        let faults = [
            Fault::from(ProtocolError::UnknownParticipant(0)),
            Fault::from(ProtocolError::Ballot(Refusal::NotPaired(1))),
            Fault::TimeoutExpired {
                kind: TimerKind::RoundTimeout,
                missing: 1,
            },
            Fault::QuorumNotMet {
                present: 1,
                required: 2,
            },
            Fault::DisconnectDuringRound { slot: 0, round: 3 },
            Fault::from(ConfigError::NoOptions),
        ];
        let codes = faults.iter().map(Fault::code).collect::<Vec<_>>();
        assert_eq!(codes, vec!["E101", "E108", "E200", "E300", "E400", "E503"]);
    }
    #[test]
    fn only_configuration_is_fatal() {
        assert!(Fault::from(ConfigError::NoRounds).is_fatal());
        assert!(!Fault::from(ProtocolError::Inactive(0)).is_fatal());
        assert!(!Fault::DisconnectDuringRound { slot: 0, round: 0 }.is_fatal());
    }
}
