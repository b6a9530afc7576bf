//! Realtime broadcast of state changes to connected dashboards.
//!
//! The broadcaster is constructed once at startup and handed to handlers
//! through shared state; nothing here is ambient or process-global. Delivery
//! is fire-and-forget and at-most-once: clients that are disconnected or
//! lagging simply miss events.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::state::AppState;

/// Events pushed to dashboards after state changes. Serialized as
/// `{"event": "...", "data": {...}}` text frames.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RealtimeEvent {
    #[serde(rename_all = "camelCase")]
    TicketUpdated {
        ticket_id: i64,
        status: Option<String>,
        priority: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    TicketStatusUpdated { ticket_id: i64, status: String },
    ActivityUpdate { activity: serde_json::Value },
}

#[derive(Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<RealtimeEvent>,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to every connected client. A send error only means
    /// nobody is listening, which is fine.
    pub fn publish(&self, event: RealtimeEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// GET /ws - upgrade a dashboard connection and stream events to it.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let broadcaster = state.broadcaster.clone();
    ws.on_upgrade(move |socket| client_loop(socket, broadcaster))
}

async fn client_loop(socket: WebSocket, broadcaster: Broadcaster) {
    let mut rx = broadcaster.subscribe();
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        let Ok(frame) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if sink.send(Message::Text(frame)).await.is_err() {
                            break;
                        }
                    }
                    // Lagged clients skip missed events rather than disconnect.
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        debug!("ws client lagged, skipped {} events", missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Inbound frames are ignored; the socket is push-only.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ticket_updated_frame_shape() {
        let event = RealtimeEvent::TicketUpdated {
            ticket_id: 5,
            status: None,
            priority: None,
        };
        let frame = serde_json::to_value(&event).unwrap();
        assert_eq!(frame["event"], "ticket_updated");
        assert_eq!(frame["data"]["ticketId"], 5);
        assert_eq!(frame["data"]["status"], json!(null));
        assert_eq!(frame["data"]["priority"], json!(null));
    }

    #[test]
    fn status_updated_frame_shape() {
        let event = RealtimeEvent::TicketStatusUpdated {
            ticket_id: 12,
            status: "resolved".to_string(),
        };
        let frame = serde_json::to_value(&event).unwrap();
        assert_eq!(frame["event"], "ticket_status_updated");
        assert_eq!(frame["data"]["ticketId"], 12);
        assert_eq!(frame["data"]["status"], "resolved");
    }

    #[tokio::test]
    async fn publish_reaches_subscribers() {
        let broadcaster = Broadcaster::new(16);
        let mut rx = broadcaster.subscribe();

        broadcaster.publish(RealtimeEvent::TicketStatusUpdated {
            ticket_id: 1,
            status: "closed".to_string(),
        });

        let event = rx.recv().await.unwrap();
        match event {
            RealtimeEvent::TicketStatusUpdated { ticket_id, status } => {
                assert_eq!(ticket_id, 1);
                assert_eq!(status, "closed");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let broadcaster = Broadcaster::new(16);
        broadcaster.publish(RealtimeEvent::ActivityUpdate {
            activity: json!({"type": "response_sent"}),
        });
        assert_eq!(broadcaster.receiver_count(), 0);
    }
}
