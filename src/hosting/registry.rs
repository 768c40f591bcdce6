use super::*;
use crate::ID;
use crate::SubjectId;
use crate::gameroom::*;
use crate::records::Recorder;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// Where a connection ended up after asking to join.
#[derive(Debug, Clone)]
pub enum Placement {
    Seated { room: RoomHandle, seat: Seat },
    Decoy(DecoyReason),
}

/// Owns every live room and routes joins to them.
///
/// New subjects fill the current lobby room until it closes, after which a
/// fresh one is opened. Known subjects are routed back to the room they were
/// seated in. Each room is its own task, so rooms never contend with one
/// another; the registry locks only guard the maps.
pub struct Registry {
    config: RoomConfig,
    recorder: Arc<dyn Recorder>,
    rooms: RwLock<HashMap<ID<Room>, RoomHandle>>,
    subjects: RwLock<HashMap<SubjectId, ID<Room>>>,
    lobby: Mutex<Option<ID<Room>>>,
}

impl Registry {
    /// Validates the room template up front; a bad config never opens a room.
    pub fn new(config: RoomConfig, recorder: Arc<dyn Recorder>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            recorder,
            rooms: RwLock::new(HashMap::new()),
            subjects: RwLock::new(HashMap::new()),
            lobby: Mutex::new(None),
        })
    }
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }
}

impl Registry {
    /// Opens a new room, spawns its task, and schedules its removal once it closes.
    pub async fn open(self: &Arc<Self>) -> anyhow::Result<ID<Room>> {
        let id = ID::default();
        let (room, mailbox) = Room::new(id, self.config.clone(), self.recorder.clone())?;
        let (done_tx, done_rx) = oneshot::channel();
        self.rooms
            .write()
            .await
            .insert(id, RoomHandle::new(id, mailbox));
        tokio::spawn(room.run(done_tx));
        let registry = self.clone();
        tokio::spawn(async move {
            let _ = done_rx.await;
            let _ = registry.close(id).await;
            log::info!("[registry] room {} cleaned up", id);
        });
        log::debug!("[registry] opened room {}", id);
        Ok(id)
    }
    /// Removes a room. Its subjects stay on file for [`crate::SUBJECT_RETENTION`]
    /// seconds so late reconnects see a concluded session, then are forgotten.
    pub async fn close(self: &Arc<Self>, id: ID<Room>) -> anyhow::Result<()> {
        let mut lobby = self.lobby.lock().await;
        if *lobby == Some(id) {
            *lobby = None;
        }
        self.rooms
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| anyhow::anyhow!("room {} not found", id))?;
        let registry = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(crate::SUBJECT_RETENTION)).await;
            registry.forget(id).await;
        });
        Ok(())
    }
    /// Drops every subject routed to room `id`.
    async fn forget(&self, id: ID<Room>) {
        let mut subjects = self.subjects.write().await;
        let before = subjects.len();
        subjects.retain(|_, room| *room != id);
        log::debug!("[registry] forgot {} subjects of room {}", before - subjects.len(), id);
    }
    pub async fn handle(&self, id: ID<Room>) -> Option<RoomHandle> {
        self.rooms.read().await.get(&id).cloned()
    }
    pub async fn room_of(&self, subject: &str) -> Option<ID<Room>> {
        self.subjects.read().await.get(subject).copied()
    }
    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }
    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
    /// Status of every live room.
    pub async fn statuses(&self) -> Vec<RoomStatus> {
        let handles = self.rooms.read().await.values().cloned().collect::<Vec<_>>();
        let mut statuses = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.status().await {
                Ok(status) => statuses.push(status),
                Err(e) => log::debug!("[registry] room {} unavailable: {}", handle.id(), e),
            }
        }
        statuses.sort_by(|a, b| a.room.cmp(&b.room));
        statuses
    }
}

impl Registry {
    /// Places a subject. `session` names the room a reconnecting client was in;
    /// without it the subject's own history is consulted.
    pub async fn join(
        self: &Arc<Self>,
        subject: SubjectId,
        session: Option<String>,
        outbox: UnboundedSender<ServerMessage>,
    ) -> anyhow::Result<Placement> {
        let known = match session.as_deref().map(ID::<Room>::try_from) {
            Some(Ok(id)) => Some(id),
            Some(Err(e)) => {
                log::debug!("[registry] ignoring session id from {}: {}", subject, e);
                self.room_of(&subject).await
            }
            None => self.room_of(&subject).await,
        };
        if let Some(id) = known {
            match self.handle(id).await {
                None => return Ok(Placement::Decoy(DecoyReason::Concluded)),
                Some(room) => match room.join(subject.clone(), outbox.clone()).await {
                    Ok(Ok(seat)) => {
                        self.subjects.write().await.insert(subject, id);
                        return Ok(Placement::Seated { room, seat });
                    }
                    Ok(Err(DecoyReason::Concluded)) | Err(_) => {
                        return Ok(Placement::Decoy(DecoyReason::Concluded));
                    }
                    Ok(Err(DecoyReason::Closed)) => {}
                },
            }
        }
        self.enter_lobby(subject, outbox).await
    }
    /// Seats a new subject in the lobby room, opening a fresh one if it has closed.
    async fn enter_lobby(
        self: &Arc<Self>,
        subject: SubjectId,
        outbox: UnboundedSender<ServerMessage>,
    ) -> anyhow::Result<Placement> {
        let mut lobby = self.lobby.lock().await;
        for _ in 0..2 {
            let id = match *lobby {
                Some(id) => id,
                None => {
                    let id = self.open().await?;
                    *lobby = Some(id);
                    id
                }
            };
            let Some(room) = self.handle(id).await else {
                *lobby = None;
                continue;
            };
            match room.join(subject.clone(), outbox.clone()).await {
                Ok(Ok(seat)) => {
                    self.subjects.write().await.insert(subject, id);
                    return Ok(Placement::Seated { room, seat });
                }
                Ok(Err(DecoyReason::Concluded)) => {
                    return Ok(Placement::Decoy(DecoyReason::Concluded));
                }
                Ok(Err(DecoyReason::Closed)) | Err(_) => {
                    log::debug!("[registry] lobby {} closed", id);
                    *lobby = None;
                }
            }
        }
        Ok(Placement::Decoy(DecoyReason::Closed))
    }
}
