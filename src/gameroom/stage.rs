use serde::Deserialize;
use serde::Serialize;

/// Room-level stage. Transitions only through [`Stage::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FirstWaiting,
    ComprehensionTest,
    SecondWaiting,
    MainTask,
    RoundBoundary,
    ResultFeedback,
    Finished,
}

/// Synchronization points participants signal before a stage can close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Barrier {
    Comprehension,
    RoundReady,
    Feedback,
}

/// What happened that may move the room forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Enough participants joined before the deadline.
    GroupFilled,
    /// The waiting deadline passed first.
    DeadlineElapsed,
    /// Every active participant signalled the current barrier.
    BarrierClosed,
    /// A main-task round was paid out.
    RoundFinalized { last: bool, pause: bool },
    /// The session ends now, whatever the stage.
    Exit,
}

impl Stage {
    /// The barrier that closes this stage, if it is closed by one.
    pub fn barrier(&self) -> Option<Barrier> {
        match self {
            Self::ComprehensionTest => Some(Barrier::Comprehension),
            Self::SecondWaiting => Some(Barrier::RoundReady),
            Self::RoundBoundary => Some(Barrier::RoundReady),
            Self::ResultFeedback => Some(Barrier::Feedback),
            Self::FirstWaiting => None,
            Self::MainTask => None,
            Self::Finished => None,
        }
    }
    /// The stage `trigger` leads to, or None if it is not a legal move from here.
    pub fn next(self, trigger: Trigger) -> Option<Self> {
        use Trigger::*;
        match (self, trigger) {
            (Self::Finished, _) => None,
            (_, Exit) => Some(Self::Finished),
            (Self::FirstWaiting, GroupFilled | DeadlineElapsed) => Some(Self::ComprehensionTest),
            (Self::ComprehensionTest, BarrierClosed) => Some(Self::SecondWaiting),
            (Self::SecondWaiting, BarrierClosed) => Some(Self::MainTask),
            (Self::MainTask, RoundFinalized { last: true, .. }) => Some(Self::ResultFeedback),
            (Self::MainTask, RoundFinalized { pause: true, .. }) => Some(Self::RoundBoundary),
            (Self::MainTask, RoundFinalized { .. }) => Some(Self::MainTask),
            (Self::RoundBoundary, BarrierClosed) => Some(Self::MainTask),
            (Self::ResultFeedback, BarrierClosed) => Some(Self::Finished),
            (Self::FirstWaiting, _) => None,
            (Self::ComprehensionTest, _) => None,
            (Self::SecondWaiting, _) => None,
            (Self::MainTask, _) => None,
            (Self::RoundBoundary, _) => None,
            (Self::ResultFeedback, _) => None,
        }
    }
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstWaiting => write!(f, "first_waiting"),
            Self::ComprehensionTest => write!(f, "comprehension_test"),
            Self::SecondWaiting => write!(f, "second_waiting"),
            Self::MainTask => write!(f, "main_task"),
            Self::RoundBoundary => write!(f, "round_boundary"),
            Self::ResultFeedback => write!(f, "result_feedback"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

impl Barrier {
    /// Name of the client message that signals this barrier.
    pub fn signal(&self) -> &'static str {
        match self {
            Self::Comprehension => "comprehension_passed",
            Self::RoundReady => "round_ready",
            Self::Feedback => "scene_complete",
        }
    }
}

impl std::fmt::Display for Barrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Comprehension => write!(f, "comprehension"),
            Self::RoundReady => write!(f, "round_ready"),
            Self::Feedback => write!(f, "feedback"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn happy_path() {
        let mut stage = Stage::FirstWaiting;
        for (trigger, expected) in [
            (Trigger::GroupFilled, Stage::ComprehensionTest),
            (Trigger::BarrierClosed, Stage::SecondWaiting),
            (Trigger::BarrierClosed, Stage::MainTask),
            (Trigger::RoundFinalized { last: false, pause: false }, Stage::MainTask),
            (Trigger::RoundFinalized { last: false, pause: true }, Stage::RoundBoundary),
            (Trigger::BarrierClosed, Stage::MainTask),
            (Trigger::RoundFinalized { last: true, pause: true }, Stage::ResultFeedback),
            (Trigger::BarrierClosed, Stage::Finished),
        ] {
            stage = stage.next(trigger).unwrap();
            assert_eq!(stage, expected);
        }
    }
    #[test]
    fn illegal_moves_are_refused() {
        assert_eq!(Stage::FirstWaiting.next(Trigger::BarrierClosed), None);
        assert_eq!(Stage::MainTask.next(Trigger::BarrierClosed), None);
        assert_eq!(Stage::ComprehensionTest.next(Trigger::GroupFilled), None);
        assert_eq!(Stage::Finished.next(Trigger::Exit), None);
    }
    #[test]
    fn exit_from_anywhere() {
        for stage in [
            Stage::FirstWaiting,
            Stage::ComprehensionTest,
            Stage::SecondWaiting,
            Stage::MainTask,
            Stage::RoundBoundary,
            Stage::ResultFeedback,
        ] {
            assert_eq!(stage.next(Trigger::Exit), Some(Stage::Finished));
        }
    }
    #[test]
    fn barriers_by_stage() {
        assert_eq!(Stage::ComprehensionTest.barrier(), Some(Barrier::Comprehension));
        assert_eq!(Stage::RoundBoundary.barrier(), Some(Barrier::RoundReady));
        assert_eq!(Stage::MainTask.barrier(), None);
    }
}
