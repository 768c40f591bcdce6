use crate::ID;
use crate::SubjectId;
use crate::gameroom::*;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// Handle to communicate with a running room.
/// Cheap to clone; every call goes through the room's mailbox.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    id: ID<Room>,
    mailbox: UnboundedSender<Command>,
}

impl RoomHandle {
    pub fn new(id: ID<Room>, mailbox: UnboundedSender<Command>) -> Self {
        Self { id, mailbox }
    }
    pub fn id(&self) -> ID<Room> {
        self.id
    }
    /// Asks the room to seat `subject`, delivering its messages to `outbox`.
    pub async fn join(
        &self,
        subject: SubjectId,
        outbox: UnboundedSender<ServerMessage>,
    ) -> anyhow::Result<Result<Seat, DecoyReason>> {
        let (reply, seating) = oneshot::channel();
        self.mailbox
            .send(Command::Join {
                subject,
                outbox,
                reply,
            })
            .map_err(|_| anyhow::anyhow!("room {} is closed", self.id))?;
        Ok(seating.await?)
    }
    /// Forwards a decoded client message from the connection holding `seat`.
    pub fn signal(&self, seat: Seat, message: ClientMessage) -> anyhow::Result<()> {
        self.mailbox
            .send(Command::Signal { seat, message })
            .map_err(|_| anyhow::anyhow!("room {} is closed", self.id))
    }
    pub async fn status(&self) -> anyhow::Result<RoomStatus> {
        let (reply, status) = oneshot::channel();
        self.mailbox
            .send(Command::Inspect { reply })
            .map_err(|_| anyhow::anyhow!("room {} is closed", self.id))?;
        Ok(status.await?)
    }
}
