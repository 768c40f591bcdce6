use super::*;
use crate::Slot;
use crate::records::Record;
use std::time::Duration;

/// Side effects requested by the coordinator, carried out by the room task.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Unicast(Slot, ServerMessage),
    Broadcast(ServerMessage),
    Arm {
        kind: TimerKind,
        epoch: u64,
        after: Duration,
    },
    Disarm(TimerKind),
    Persist(Record),
    /// The session is over; the room task may exit.
    Close,
}
