// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `relaydesk serve` command implementation.
//!
//! The serve loop consumes inbound protocol events from a channel fed by a
//! transport adapter and drives the dispatcher, isolating each handler
//! invocation's failure at the dispatch boundary.

use std::sync::Arc;

use relaydesk_config::RelaydeskConfig;
use relaydesk_core::{IncomingEvent, KeyRequestEvent, RelaydeskError, RoomInfo, RoomKeyEvent};
use relaydesk_dispatch::Dispatcher;
use relaydesk_storage::SqliteRepository;
use tokio::sync::mpsc;
use tracing::{error, info};

/// One unit of work delivered by a transport adapter.
pub enum ServeEvent {
    /// An event arrived in a room.
    Room {
        room: RoomInfo,
        event: IncomingEvent,
    },
    /// A session key arrived.
    RoomKey(RoomKeyEvent),
    /// Another device requested keys.
    KeyRequest(KeyRequestEvent),
    /// The bot was invited to a room.
    Invite { event_id: String, room_id: String },
}

/// Drive the dispatcher from an event stream until the stream closes.
///
/// No single handler failure stops the loop; errors are logged and the next
/// event is processed.
pub async fn event_loop(dispatcher: Arc<Dispatcher>, mut rx: mpsc::Receiver<ServeEvent>) {
    while let Some(event) = rx.recv().await {
        let result = match event {
            ServeEvent::Room { room, event } => dispatcher.dispatch(&room, &event).await,
            ServeEvent::RoomKey(key_event) => dispatcher.on_room_key(&key_event).await,
            ServeEvent::KeyRequest(request) => dispatcher.on_key_request(&request).await,
            ServeEvent::Invite { event_id, room_id } => {
                dispatcher.on_invite(&event_id, &room_id).await
            }
        };
        if let Err(e) = result {
            error!(error = %e, "event handler failed");
        }
    }
    info!("event stream closed, shutting down");
}

/// Run the `relaydesk serve` command.
pub async fn run_serve(config: &RelaydeskConfig) -> Result<(), RelaydeskError> {
    if config.rooms.management_room_id.is_none() {
        return Err(RelaydeskError::Config(
            "rooms.management_room_id must be set before serving".to_string(),
        ));
    }

    let repo = SqliteRepository::open(&config.storage.database_path).await?;
    info!(
        database = %config.storage.database_path,
        "storage ready"
    );
    repo.close().await?;

    // Transport adapters (homeserver session, sync loop, encryption) are
    // wired in by the embedding deployment; this build ships none.
    Err(RelaydeskError::Config(
        "no transport adapter is available in this build".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use relaydesk_core::{EventKind, EventMeta};
    use relaydesk_test_utils::{MemoryRepository, MockTransport};

    fn dm_room(room_id: &str) -> RoomInfo {
        RoomInfo {
            room_id: room_id.to_string(),
            name: None,
            display_name: "Empty Room".to_string(),
            canonical_alias: None,
            creator: "@alice:example.org".to_string(),
            is_named: false,
            is_group: false,
        }
    }

    #[tokio::test]
    async fn event_loop_processes_and_survives_failures() {
        let transport = Arc::new(MockTransport::new("@relaydesk:example.org"));
        let repo = Arc::new(MemoryRepository::new());
        let mut config = RelaydeskConfig::default();
        config.rooms.management_room_id = Some("!mgmt:example.org".to_string());
        let dispatcher = Arc::new(Dispatcher::new(transport.clone(), repo, config));

        let (tx, rx) = mpsc::channel(8);
        let loop_handle = tokio::spawn(event_loop(dispatcher, rx));

        // A redaction with no recorded pair logs and continues.
        tx.send(ServeEvent::Room {
            room: dm_room("!dm:example.org"),
            event: IncomingEvent {
                meta: EventMeta {
                    event_id: "$r1".to_string(),
                    sender: "@alice:example.org".to_string(),
                    server_ts_ms: Utc::now().timestamp_millis(),
                },
                kind: EventKind::Redaction {
                    redacts: "$missing".to_string(),
                    reason: None,
                },
            },
        })
        .await
        .unwrap();

        tx.send(ServeEvent::Room {
            room: dm_room("!dm:example.org"),
            event: IncomingEvent {
                meta: EventMeta {
                    event_id: "$m1".to_string(),
                    sender: "@alice:example.org".to_string(),
                    server_ts_ms: Utc::now().timestamp_millis(),
                },
                kind: EventKind::Text {
                    body: "hello".to_string(),
                },
            },
        })
        .await
        .unwrap();

        drop(tx);
        loop_handle.await.unwrap();

        assert_eq!(transport.sent_to("!mgmt:example.org").len(), 1);
    }
}
