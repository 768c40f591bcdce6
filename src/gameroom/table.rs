use super::*;
use crate::Slot;
use tokio::sync::mpsc::UnboundedSender;

/// One connection's claim on a slot. A later connection for the same slot
/// gets a higher generation and supersedes this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    pub slot: Slot,
    pub generation: u64,
}

/// Connection state of a room: one outbox per seated slot.
/// Separates transport lifecycle from participant bookkeeping.
#[derive(Debug, Default)]
pub struct Table {
    senders: Vec<Option<(u64, UnboundedSender<ServerMessage>)>>,
    generation: u64,
}

impl Table {
    /// Attaches an outbox to `slot`, superseding any earlier connection.
    pub fn sit(&mut self, slot: Slot, sender: UnboundedSender<ServerMessage>) -> Seat {
        if slot >= self.senders.len() {
            self.senders.resize(slot + 1, None);
        }
        self.generation += 1;
        if self.senders[slot].is_some() {
            log::debug!("[table] P{} superseded by connection #{}", slot, self.generation);
        }
        self.senders[slot] = Some((self.generation, sender));
        Seat {
            slot,
            generation: self.generation,
        }
    }
    /// Whether `seat` is still the live connection of its slot.
    pub fn holds(&self, seat: Seat) -> bool {
        self.senders
            .get(seat.slot)
            .and_then(|s| s.as_ref())
            .is_some_and(|(generation, _)| *generation == seat.generation)
    }
    /// Detaches the outbox of `seat`. Superseded seats leave nothing behind.
    pub fn leave(&mut self, seat: Seat) -> bool {
        match self.holds(seat) {
            true => {
                self.senders[seat.slot] = None;
                true
            }
            false => false,
        }
    }
    pub fn sender(&self, slot: Slot) -> Option<&UnboundedSender<ServerMessage>> {
        self.senders
            .get(slot)
            .and_then(|s| s.as_ref())
            .map(|(_, sender)| sender)
    }
    /// Sends a message to one participant.
    pub fn unicast(&self, slot: Slot, message: ServerMessage) {
        match self.sender(slot).map(|outbox| outbox.send(message)) {
            Some(Ok(())) => log::trace!("[table] unicast to P{}", slot),
            Some(Err(e)) => log::warn!("[table] unicast to P{} failed: {:?}", slot, e.0),
            None => log::debug!("[table] unicast to P{}: not connected", slot),
        }
    }
    /// Sends a message to every connected participant.
    pub fn broadcast(&self, message: ServerMessage) {
        log::trace!("[table] broadcast {:?}", message);
        self.senders.iter().enumerate().for_each(|(i, sender)| {
            if let Some((_, outbox)) = sender {
                if let Err(e) = outbox.send(message.clone()) {
                    log::warn!("[table] broadcast to P{} failed: {:?}", i, e.0);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;
    #[test]
    fn sit_and_leave() {
        let mut table = Table::default();
        let (tx, _rx) = unbounded_channel();
        let seat = table.sit(2, tx);
        assert_eq!(seat.slot, 2);
        assert!(table.holds(seat));
        assert!(table.sender(2).is_some());
        assert!(table.leave(seat));
        assert!(table.sender(2).is_none());
        assert!(!table.leave(seat));
    }
    #[test]
    fn later_connection_supersedes() {
        let mut table = Table::default();
        let (old_tx, mut old_rx) = unbounded_channel();
        let (new_tx, mut new_rx) = unbounded_channel();
        let old = table.sit(0, old_tx);
        let new = table.sit(0, new_tx);
        assert!(new.generation > old.generation);
        assert!(!table.holds(old));
        assert!(!table.leave(old));
        assert!(table.holds(new));
        let message = ServerMessage::Decoy {
            reason: DecoyReason::Closed,
        };
        table.unicast(0, message.clone());
        assert_eq!(new_rx.try_recv().ok(), Some(message));
        assert!(matches!(
            old_rx.try_recv(),
            Err(tokio::sync::mpsc::error::TryRecvError::Disconnected)
        ));
    }
    #[test]
    fn broadcast_reaches_every_seat() {
        let mut table = Table::default();
        let (tx0, mut rx0) = unbounded_channel();
        let (tx1, mut rx1) = unbounded_channel();
        table.sit(0, tx0);
        table.sit(1, tx1);
        let message = ServerMessage::Decoy {
            reason: DecoyReason::Closed,
        };
        table.broadcast(message.clone());
        table.unicast(1, message.clone());
        assert_eq!(rx0.try_recv().ok(), Some(message.clone()));
        assert!(rx0.try_recv().is_err());
        assert_eq!(rx1.try_recv().ok(), Some(message.clone()));
        assert_eq!(rx1.try_recv().ok(), Some(message));
    }
}
