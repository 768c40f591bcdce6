use super::*;
use crate::OptionIndex;
use crate::Points;
use crate::Round;
use crate::Slot;
use crate::SubjectId;
use crate::network::Assignment;
use crate::network::Vote;
use crate::payoff::Condition;
use crate::records::EndReason;
use serde::Deserialize;
use serde::Serialize;

/// Messages a client sends over its connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        subject_id: SubjectId,
        #[serde(default)]
        session_id: Option<String>,
    },
    ComprehensionPassed,
    RoundReady {
        #[serde(default)]
        task_type: Option<String>,
    },
    ChoiceMade {
        #[serde(default)]
        option: Option<OptionIndex>,
        #[serde(default)]
        timed_out: bool,
        #[serde(default)]
        reaction_time_ms: Option<u64>,
    },
    OstracismVote {
        partner: Slot,
        vote: Vote,
    },
    SceneComplete {
        #[serde(default)]
        scene_id: Option<String>,
    },
    Disconnect,
}

impl ClientMessage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::ComprehensionPassed => "comprehension_passed",
            Self::RoundReady { .. } => "round_ready",
            Self::ChoiceMade { .. } => "choice_made",
            Self::OstracismVote { .. } => "ostracism_vote",
            Self::SceneComplete { .. } => "scene_complete",
            Self::Disconnect => "disconnect",
        }
    }
}

/// How a session is being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Whole room shares one reward pool.
    Grouped,
    /// Pairs drawn each round over the network.
    Paired,
    /// Degraded: everyone plays alone.
    Individual,
}

/// Why a connection was not seated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoyReason {
    /// The waiting room already closed or is full.
    Closed,
    /// The session this subject belonged to is over.
    Concluded,
}

/// Group parameters announced at session start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub size: usize,
    pub mode: Mode,
    pub condition: Condition,
    pub options: usize,
    pub rounds: Round,
}

/// Totals shown to a participant at the end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalSummary {
    pub reason: EndReason,
    pub total: Points,
    pub waiting_bonus: Points,
    pub rounds_answered: u32,
    pub rounds_played: Round,
}

/// Messages sent from server to client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Joined {
        room: String,
        slot: Slot,
        stage: Stage,
    },
    Decoy {
        reason: DecoyReason,
    },
    Rejected {
        code: String,
        reason: String,
    },
    StageProgress {
        stage: Stage,
        k: usize,
        n: usize,
    },
    SessionStarted {
        group: GroupInfo,
    },
    AllReady {
        next_stage: Stage,
    },
    PairingAssigned {
        round: Round,
        assignment: Assignment,
    },
    RoundResult {
        round: Round,
        payoffs: Vec<Points>,
        frequencies: Vec<usize>,
        paid: bool,
    },
    NetworkSummary {
        edges_removed: usize,
        density: f64,
        isolated: Vec<Slot>,
    },
    SessionEnded {
        summary: FinalSummary,
    },
}

impl ServerMessage {
    pub fn rejected(error: &ProtocolError) -> Self {
        Self::Rejected {
            code: error.code().to_string(),
            reason: error.to_string(),
        }
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::error!("failed to serialize server message: {}", e);
            String::from("{}")
        })
    }
}
