use super::*;
use crate::ID;
use crate::SubjectId;
use crate::records::Recorder;
use crate::records::dispatch;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Everything a room task accepts through its mailbox.
#[derive(Debug)]
pub enum Command {
    /// Seat or reattach a subject; its messages go to `outbox`.
    Join {
        subject: SubjectId,
        outbox: UnboundedSender<ServerMessage>,
        reply: oneshot::Sender<Result<Seat, DecoyReason>>,
    },
    /// A decoded client message from one connection.
    Signal { seat: Seat, message: ClientMessage },
    /// A scheduled deadline fired.
    Timeout { kind: TimerKind, epoch: u64 },
    /// Report the room's status.
    Inspect { reply: oneshot::Sender<RoomStatus> },
}

/// Imperative shell around a [`Coordinator`].
///
/// Owns the mailbox, the connection table, and the spawned timer tasks.
/// Commands are handled strictly one at a time; after each, the effects the
/// coordinator queued are carried out in order.
pub struct Room {
    id: ID<Self>,
    coordinator: Coordinator,
    table: Table,
    timers: HashMap<TimerKind, AbortHandle>,
    recorder: Arc<dyn Recorder>,
    inbox: UnboundedReceiver<Command>,
    mailbox: UnboundedSender<Command>,
    closed: bool,
}

impl Room {
    /// Creates a room and the sender that feeds its mailbox.
    pub fn new(
        id: ID<Self>,
        config: RoomConfig,
        recorder: Arc<dyn Recorder>,
    ) -> Result<(Self, UnboundedSender<Command>), ConfigError> {
        let coordinator = Coordinator::new(id, config)?;
        let (mailbox, inbox) = unbounded_channel();
        let room = Self {
            id,
            coordinator,
            table: Table::default(),
            timers: HashMap::new(),
            recorder,
            inbox,
            mailbox: mailbox.clone(),
            closed: false,
        };
        Ok((room, mailbox))
    }
    pub fn id(&self) -> ID<Self> {
        self.id
    }
    /// Processes commands until the session ends, then signals `done`.
    pub async fn run(mut self, done: oneshot::Sender<ID<Self>>) {
        log::debug!("[room {}] running", self.id);
        let effects = self.coordinator.drain();
        self.execute(effects);
        while !self.closed {
            match self.inbox.recv().await {
                Some(command) => self.handle(command),
                None => break,
            }
        }
        self.timers.drain().for_each(|(_, timer)| timer.abort());
        log::info!("[room {}] closed", self.id);
        let _ = done.send(self.id);
    }
    fn handle(&mut self, command: Command) {
        match command {
            Command::Join {
                subject,
                outbox,
                reply,
            } => {
                let seating = match self.coordinator.join(&subject, Instant::now()) {
                    Admission::Seated(slot) | Admission::Rejoined(slot) => {
                        Ok(self.table.sit(slot, outbox))
                    }
                    Admission::Decoy(reason) => Err(reason),
                };
                let _ = reply.send(seating);
            }
            Command::Signal { seat, message } if !self.table.holds(seat) => {
                log::debug!(
                    "[room {}] ignored {} from superseded connection of P{}",
                    self.id,
                    message.name(),
                    seat.slot
                );
            }
            Command::Signal { seat, message } => {
                if let ClientMessage::Disconnect = message {
                    self.table.leave(seat);
                }
                let _ = self.coordinator.apply(seat.slot, message);
            }
            Command::Timeout { kind, epoch } => {
                self.coordinator.on_timer(kind, epoch, Instant::now())
            }
            Command::Inspect { reply } => {
                let _ = reply.send(self.coordinator.status());
            }
        }
        let effects = self.coordinator.drain();
        self.execute(effects);
    }
    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Unicast(slot, message) => self.table.unicast(slot, message),
                Effect::Broadcast(message) => self.table.broadcast(message),
                Effect::Arm { kind, epoch, after } => self.schedule(kind, epoch, after),
                Effect::Disarm(kind) => self.cancel(kind),
                Effect::Persist(record) => dispatch(&self.recorder, record),
                Effect::Close => self.closed = true,
            }
        }
    }
    fn schedule(&mut self, kind: TimerKind, epoch: u64, after: std::time::Duration) {
        let mailbox = self.mailbox.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = mailbox.send(Command::Timeout { kind, epoch });
        });
        if let Some(stale) = self.timers.insert(kind, task.abort_handle()) {
            stale.abort();
        }
    }
    fn cancel(&mut self, kind: TimerKind) {
        if let Some(timer) = self.timers.remove(&kind) {
            timer.abort();
        }
    }
}
