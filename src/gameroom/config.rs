use super::ConfigError;
use super::TimerConfig;
use crate::Points;
use crate::Round;
use crate::network::Topology;
use crate::payoff::Condition;
use crate::payoff::Environments;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

/// What happens when disconnects leave fewer than the minimum group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degrade {
    /// Keep playing with whoever is left.
    #[default]
    ContinueSmaller,
    /// Close the session for everyone.
    EarlyExit,
}

/// Pairing variant settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub topology: Topology,
    /// Rounds between ostracism votes. Zero disables voting.
    pub ostracism_every: Round,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            topology: Topology::Complete,
            ostracism_every: 1,
        }
    }
}

/// Parameters of one room. Validated once, at room creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub min_group_size: usize,
    pub max_group_size: usize,
    pub response_quorum: usize,
    pub rounds: Round,
    pub option_count: usize,
    pub condition: Condition,
    /// Per-option mean rewards; the active table switches every `rounds_per_environment`.
    pub environments: Vec<Vec<Points>>,
    pub rounds_per_environment: Round,
    pub noise_sd: Points,
    /// Seed of the payoff noise. Derived from the room id when absent.
    pub seed: Option<u64>,
    /// Seconds.
    pub wait_deadline: u64,
    /// Seconds.
    pub round_timeout: u64,
    /// Seconds.
    pub vote_timeout: u64,
    /// Pause at a readiness barrier between rounds.
    pub round_break: bool,
    pub degrade: Degrade,
    pub waiting_bonus_per_sec: Points,
    pub network: Option<NetworkConfig>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_group_size: crate::MIN_GROUP_SIZE,
            max_group_size: crate::MAX_GROUP_SIZE,
            response_quorum: crate::RESPONSE_QUORUM,
            rounds: crate::ROUNDS,
            option_count: crate::OPTION_COUNT,
            condition: Condition::Distributive,
            environments: vec![vec![crate::MEAN_REWARD; crate::OPTION_COUNT]],
            rounds_per_environment: crate::ROUNDS,
            noise_sd: crate::NOISE_SD,
            seed: None,
            wait_deadline: crate::WAIT_DEADLINE,
            round_timeout: crate::ROUND_TIMEOUT,
            vote_timeout: crate::VOTE_TIMEOUT,
            round_break: true,
            degrade: Degrade::ContinueSmaller,
            waiting_bonus_per_sec: crate::WAITING_BONUS_PER_SEC,
            network: None,
        }
    }
}

impl RoomConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_group_size == 0 || self.min_group_size > self.max_group_size {
            return Err(ConfigError::GroupBounds {
                min: self.min_group_size,
                max: self.max_group_size,
            });
        }
        if self.response_quorum == 0 || self.response_quorum > self.max_group_size {
            return Err(ConfigError::Quorum {
                quorum: self.response_quorum,
                max: self.max_group_size,
            });
        }
        if self.option_count == 0 {
            return Err(ConfigError::NoOptions);
        }
        if self.rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.environments.is_empty() {
            return Err(ConfigError::NoEnvironments);
        }
        for (index, table) in self.environments.iter().enumerate() {
            if table.len() != self.option_count {
                return Err(ConfigError::EnvironmentShape {
                    index,
                    len: table.len(),
                    options: self.option_count,
                });
            }
            if let Some(mean) = table.iter().find(|m| !m.is_finite() || **m < 0.0) {
                return Err(ConfigError::MeanReward { index, mean: *mean });
            }
        }
        if !self.noise_sd.is_finite() || self.noise_sd < 0.0 {
            return Err(ConfigError::Noise(self.noise_sd));
        }
        if let Some(Topology::Random { density }) = self.network.map(|n| n.topology) {
            if !(0.0..=1.0).contains(&density) {
                return Err(ConfigError::Density(density));
            }
        }
        if self.wait_deadline == 0 {
            return Err(ConfigError::Timing("wait_deadline"));
        }
        if self.round_timeout == 0 {
            return Err(ConfigError::Timing("round_timeout"));
        }
        if self.vote_timeout == 0 {
            return Err(ConfigError::Timing("vote_timeout"));
        }
        if self.rounds_per_environment == 0 {
            return Err(ConfigError::Timing("rounds_per_environment"));
        }
        Ok(())
    }
    pub fn environments(&self) -> Environments {
        Environments::new(self.environments.clone(), self.rounds_per_environment)
    }
    pub fn timers(&self) -> TimerConfig {
        TimerConfig {
            wait: Duration::from_secs(self.wait_deadline),
            round: Duration::from_secs(self.round_timeout),
            vote: Duration::from_secs(self.vote_timeout),
        }
    }
    /// Reads a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config = serde_json::from_str::<Self>(json)?;
        config.validate()?;
        Ok(config)
    }
}
