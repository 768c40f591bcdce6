use serde::Serialize;
use std::time::Duration;

/// Deadlines a room schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    WaitDeadline,
    RoundTimeout,
    VoteTimeout,
}

impl TimerKind {
    const ALL: [Self; 3] = [Self::WaitDeadline, Self::RoundTimeout, Self::VoteTimeout];
    fn index(&self) -> usize {
        match self {
            Self::WaitDeadline => 0,
            Self::RoundTimeout => 1,
            Self::VoteTimeout => 2,
        }
    }
    pub fn all() -> [Self; 3] {
        Self::ALL
    }
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitDeadline => write!(f, "wait deadline"),
            Self::RoundTimeout => write!(f, "round timeout"),
            Self::VoteTimeout => write!(f, "vote timeout"),
        }
    }
}

/// Timer durations, in the units a room config uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerConfig {
    pub wait: Duration,
    pub round: Duration,
    pub vote: Duration,
}

impl TimerConfig {
    pub fn duration(&self, kind: TimerKind) -> Duration {
        match kind {
            TimerKind::WaitDeadline => self.wait,
            TimerKind::RoundTimeout => self.round,
            TimerKind::VoteTimeout => self.vote,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_secs(crate::WAIT_DEADLINE),
            round: Duration::from_secs(crate::ROUND_TIMEOUT),
            vote: Duration::from_secs(crate::VOTE_TIMEOUT),
        }
    }
}

/// Epoch bookkeeping for the room's timers.
/// Every arm or disarm bumps the epoch, so a firing whose token is no longer
/// current belongs to a stage the room has already left.
#[derive(Debug, Default)]
pub struct Timers {
    epochs: [u64; 3],
    armed: [bool; 3],
}

impl Timers {
    /// Arms `kind` and returns the token its firing must carry.
    pub fn arm(&mut self, kind: TimerKind) -> u64 {
        let i = kind.index();
        self.epochs[i] += 1;
        self.armed[i] = true;
        self.epochs[i]
    }
    /// Disarms `kind`. Returns whether it was armed.
    pub fn disarm(&mut self, kind: TimerKind) -> bool {
        let i = kind.index();
        let was = self.armed[i];
        self.epochs[i] += 1;
        self.armed[i] = false;
        was
    }
    /// Consumes a firing. True only for the current epoch of an armed timer.
    pub fn fire(&mut self, kind: TimerKind, epoch: u64) -> bool {
        let i = kind.index();
        match self.armed[i] && self.epochs[i] == epoch {
            true => {
                self.armed[i] = false;
                true
            }
            false => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn fires_once_for_current_epoch() {
        let mut timers = Timers::default();
        let epoch = timers.arm(TimerKind::RoundTimeout);
        assert!(timers.fire(TimerKind::RoundTimeout, epoch));
        assert!(!timers.fire(TimerKind::RoundTimeout, epoch));
    }
    #[test]
    fn rearm_invalidates_old_token() {
        let mut timers = Timers::default();
        let old = timers.arm(TimerKind::RoundTimeout);
        let new = timers.arm(TimerKind::RoundTimeout);
        assert!(!timers.fire(TimerKind::RoundTimeout, old));
        assert!(timers.fire(TimerKind::RoundTimeout, new));
    }
    #[test]
    fn disarm_invalidates_token() {
        let mut timers = Timers::default();
        let epoch = timers.arm(TimerKind::VoteTimeout);
        assert!(timers.disarm(TimerKind::VoteTimeout));
        assert!(!timers.disarm(TimerKind::VoteTimeout));
        assert!(!timers.fire(TimerKind::VoteTimeout, epoch));
    }
    #[test]
    fn kinds_are_independent() {
        let mut timers = Timers::default();
        let wait = timers.arm(TimerKind::WaitDeadline);
        timers.arm(TimerKind::RoundTimeout);
        timers.disarm(TimerKind::RoundTimeout);
        assert!(timers.fire(TimerKind::WaitDeadline, wait));
    }
}
