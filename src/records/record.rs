use crate::Points;
use crate::Round;
use crate::Slot;
use crate::SubjectId;
use crate::payoff::PayoffRecord;
use serde::Deserialize;
use serde::Serialize;

/// How a session came to an end for a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Played every round and saw the feedback.
    Completed,
    /// The group shrank below its minimum and the room closed early.
    EarlyExit,
    /// Nobody was left to play.
    Abandoned,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::EarlyExit => write!(f, "early_exit"),
            Self::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// One participant's result in one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub room: String,
    pub round: Round,
    pub slot: Slot,
    pub subject: SubjectId,
    pub partner: Option<Slot>,
    pub chosen_at: Option<u64>,
    pub reaction_ms: Option<u64>,
    pub timed_out: bool,
    pub recorded_at: u64,
    pub payoff: PayoffRecord,
}

/// One participant's totals at teardown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub room: String,
    pub slot: Slot,
    pub subject: SubjectId,
    pub total: Points,
    pub waiting_bonus: Points,
    pub rounds_answered: u32,
    pub rounds_played: Round,
    pub reason: EndReason,
    pub recorded_at: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Round(RoundRecord),
    Summary(SummaryRecord),
}

impl Record {
    pub fn room(&self) -> &str {
        match self {
            Self::Round(r) => &r.room,
            Self::Summary(s) => &s.room,
        }
    }
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<RoundRecord> for Record {
    fn from(record: RoundRecord) -> Self {
        Self::Round(record)
    }
}

impl From<SummaryRecord> for Record {
    fn from(record: SummaryRecord) -> Self {
        Self::Summary(record)
    }
}
