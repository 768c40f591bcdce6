use super::*;
use crate::gameroom::*;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;

impl Registry {
    /// Spawns the WebSocket bridge for one connection.
    ///
    /// The first text frame must be a join. Once seated, inbound frames are
    /// decoded and forwarded to the room, room messages are written back, and
    /// the room hears a disconnect when the socket goes away.
    pub async fn bridge(
        self: &Arc<Self>,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) -> anyhow::Result<()> {
        let registry = self.clone();
        actix_web::rt::spawn(async move {
            let (outbox, mut inbox) = unbounded_channel::<ServerMessage>();
            let placement = loop {
                match stream.next().await {
                    Some(Ok(actix_ws::Message::Text(text))) => match Protocol::decode(&text) {
                        Ok(ClientMessage::Join {
                            subject_id,
                            session_id,
                        }) => break registry.join(subject_id, session_id, outbox).await,
                        Ok(other) => {
                            let e = ProtocolError::Malformed(format!("expected join, got {}", other.name()));
                            if session.text(ServerMessage::rejected(&e).to_json()).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            if session.text(ServerMessage::rejected(&e).to_json()).await.is_err() {
                                return;
                            }
                        }
                    },
                    Some(Ok(actix_ws::Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            return;
                        }
                    }
                    Some(Ok(actix_ws::Message::Close(_))) => return,
                    Some(Err(_)) => return,
                    None => return,
                    _ => continue,
                }
            };
            let (room, seat) = match placement {
                Ok(Placement::Seated { room, seat }) => (room, seat),
                Ok(Placement::Decoy(reason)) => {
                    log::debug!("[bridge] decoy ({:?})", reason);
                    let _ = session.text(ServerMessage::Decoy { reason }.to_json()).await;
                    let _ = session.close(None).await;
                    return;
                }
                Err(e) => {
                    log::error!("[bridge] join failed: {}", e);
                    let _ = session.close(None).await;
                    return;
                }
            };
            log::debug!("[bridge {}] P{} connected (#{})", room.id(), seat.slot, seat.generation);
            'sesh: loop {
                tokio::select! {
                    biased;
                    msg = inbox.recv() => match msg {
                        Some(message) => if session.text(Protocol::encode(&message)).await.is_err() { break 'sesh },
                        None => break 'sesh,
                    },
                    msg = stream.next() => match msg {
                        Some(Ok(actix_ws::Message::Text(text))) => match Protocol::decode(&text) {
                            Ok(message) => if room.signal(seat, message).is_err() { break 'sesh },
                            Err(e) => if session.text(ServerMessage::rejected(&e).to_json()).await.is_err() { break 'sesh },
                        },
                        Some(Ok(actix_ws::Message::Ping(bytes))) => if session.pong(&bytes).await.is_err() { break 'sesh },
                        Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                        Some(Err(_)) => break 'sesh,
                        None => break 'sesh,
                        _ => continue 'sesh,
                    },
                }
            }
            let _ = room.signal(seat, ClientMessage::Disconnect);
            let _ = session.close(None).await;
            log::debug!("[bridge {}] P{} disconnected (#{})", room.id(), seat.slot, seat.generation);
        });
        Ok(())
    }
}
