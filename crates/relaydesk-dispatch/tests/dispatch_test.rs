// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end dispatch behavior against the mock transport and the
//! in-memory repository.

use std::sync::Arc;

use chrono::Utc;
use relaydesk_config::RelaydeskConfig;
use relaydesk_core::{
    EventKind, EventMeta, IncomingEvent, Membership, Repository, RoomInfo,
    RoomKeyEvent, TicketStatus,
};
use relaydesk_dispatch::{Dispatcher, Ticket, TicketCache};
use relaydesk_test_utils::{MemoryRepository, MockTransport};

const BOT: &str = "@relaydesk:example.org";
const MGMT: &str = "!mgmt:example.org";
const LOG: &str = "!log:example.org";

fn config() -> RelaydeskConfig {
    let mut cfg = RelaydeskConfig::default();
    cfg.rooms.management_room_id = Some(MGMT.to_string());
    cfg.rooms.logging_room_id = Some(LOG.to_string());
    cfg
}

fn setup() -> (Arc<MockTransport>, Arc<MemoryRepository>, Dispatcher) {
    setup_with(config())
}

fn setup_with(cfg: RelaydeskConfig) -> (Arc<MockTransport>, Arc<MemoryRepository>, Dispatcher) {
    let transport = Arc::new(MockTransport::new(BOT));
    let repo = Arc::new(MemoryRepository::new());
    let dispatcher = Dispatcher::new(transport.clone(), repo.clone(), cfg);
    (transport, repo, dispatcher)
}

fn named_room(room_id: &str, name: &str) -> RoomInfo {
    RoomInfo {
        room_id: room_id.to_string(),
        name: Some(name.to_string()),
        display_name: name.to_string(),
        canonical_alias: None,
        creator: BOT.to_string(),
        is_named: true,
        is_group: true,
    }
}

fn dm_room(room_id: &str, creator: &str) -> RoomInfo {
    RoomInfo {
        room_id: room_id.to_string(),
        name: None,
        display_name: "Empty Room".to_string(),
        canonical_alias: None,
        creator: creator.to_string(),
        is_named: false,
        is_group: false,
    }
}

fn text(event_id: &str, sender: &str, body: &str) -> IncomingEvent {
    IncomingEvent {
        meta: EventMeta {
            event_id: event_id.to_string(),
            sender: sender.to_string(),
            server_ts_ms: Utc::now().timestamp_millis(),
        },
        kind: EventKind::Text {
            body: body.to_string(),
        },
    }
}

fn membership(
    event_id: &str,
    sender: &str,
    m: Membership,
    prev: Option<Membership>,
) -> IncomingEvent {
    IncomingEvent {
        meta: EventMeta {
            event_id: event_id.to_string(),
            sender: sender.to_string(),
            server_ts_ms: Utc::now().timestamp_millis(),
        },
        kind: EventKind::Membership {
            membership: m,
            prev_membership: prev,
        },
    }
}

#[tokio::test]
async fn duplicate_event_produces_no_second_side_effect() {
    let (transport, _repo, dispatcher) = setup();
    let room = dm_room("!dm:example.org", "@alice:example.org");
    let event = text("$e1", "@alice:example.org", "hello");

    dispatcher.dispatch(&room, &event).await.unwrap();
    let after_first = transport.sent_messages().len();
    assert!(after_first > 0);

    dispatcher.dispatch(&room, &event).await.unwrap();
    assert_eq!(transport.sent_messages().len(), after_first);
}

#[tokio::test]
async fn stale_event_never_reaches_a_handler() {
    let (transport, repo, dispatcher) = setup();
    let room = dm_room("!dm:example.org", "@alice:example.org");
    let mut event = text("$old", "@alice:example.org", "hello");
    event.meta.server_ts_ms = Utc::now().timestamp_millis() - 301_000;

    dispatcher.dispatch(&room, &event).await.unwrap();
    assert!(transport.sent_messages().is_empty());
    assert!(repo.get_user("@alice:example.org").await.unwrap().is_none());
}

#[tokio::test]
async fn event_at_the_age_boundary_is_processed() {
    let (transport, _repo, dispatcher) = setup();
    let room = dm_room("!dm:example.org", "@alice:example.org");
    let mut event = text("$boundary", "@alice:example.org", "hello");
    // A hair under the cutoff so scheduling delay cannot tip it over.
    event.meta.server_ts_ms = Utc::now().timestamp_millis() - 299_000;

    dispatcher.dispatch(&room, &event).await.unwrap();
    assert!(!transport.sent_messages().is_empty());
}

#[tokio::test]
async fn logging_room_events_are_never_acted_on() {
    let (transport, _repo, dispatcher) = setup();
    let room = named_room(LOG, "Audit");
    let event = text("$audit", "@alice:example.org", "hello");

    dispatcher.dispatch(&room, &event).await.unwrap();
    assert!(transport.sent_messages().is_empty());
}

#[tokio::test]
async fn own_events_are_ignored() {
    let (transport, _repo, dispatcher) = setup();
    let room = dm_room("!dm:example.org", "@alice:example.org");
    let event = text("$self", BOT, "relay of a relay");

    dispatcher.dispatch(&room, &event).await.unwrap();
    assert!(transport.sent_messages().is_empty());
}

#[tokio::test]
async fn user_message_without_ticket_goes_to_management() {
    let (transport, repo, dispatcher) = setup();
    let room = dm_room("!dm:example.org", "@alice:example.org");

    dispatcher
        .dispatch(&room, &text("$m1", "@alice:example.org", "I need help"))
        .await
        .unwrap();

    let user = repo.get_user("@alice:example.org").await.unwrap().unwrap();
    let to_mgmt = transport.sent_to(MGMT);
    assert_eq!(to_mgmt.len(), 1);
    assert!(to_mgmt[0].body.contains(&user.anon_id));
    assert!(to_mgmt[0].body.contains("I need help"));
}

#[tokio::test]
async fn user_message_with_ticket_relays_into_ticket_room() {
    let (transport, repo, dispatcher) = setup();

    repo.create_user("@alice:example.org", "SwiftHeron42")
        .await
        .unwrap();
    let ticket_id = repo.create_ticket("SwiftHeron42", "Billing").await.unwrap();
    repo.set_ticket_room_id(ticket_id, "!ticket:example.org")
        .await
        .unwrap();
    repo.set_user_current_ticket("SwiftHeron42", Some(ticket_id))
        .await
        .unwrap();
    transport.add_room(named_room(
        "!ticket:example.org",
        &format!("Ticket #{ticket_id} (Billing)"),
    ));

    let room = dm_room("!dm:example.org", "@alice:example.org");
    dispatcher
        .dispatch(&room, &text("$m1", "@alice:example.org", "any update?"))
        .await
        .unwrap();

    let relayed = transport.sent_to("!ticket:example.org");
    assert_eq!(relayed.len(), 1);
    assert_eq!(relayed[0].body, "SwiftHeron42: any update?");
    // The origin/relay pair is recorded for redaction relay.
    let pair = repo.get_related("$m1").await.unwrap().unwrap();
    assert_eq!(pair.0, relayed[0].event_id);
    assert_eq!(pair.1, "!ticket:example.org");
}

#[tokio::test]
async fn edited_message_fallback_prefix_is_stripped() {
    let (transport, repo, dispatcher) = setup();

    repo.create_user("@alice:example.org", "SwiftHeron42")
        .await
        .unwrap();
    let ticket_id = repo.create_ticket("SwiftHeron42", "Billing").await.unwrap();
    repo.set_ticket_room_id(ticket_id, "!ticket:example.org")
        .await
        .unwrap();
    repo.set_user_current_ticket("SwiftHeron42", Some(ticket_id))
        .await
        .unwrap();
    transport.add_room(named_room(
        "!ticket:example.org",
        &format!("Ticket #{ticket_id} (Billing)"),
    ));

    let room = dm_room("!dm:example.org", "@alice:example.org");
    dispatcher
        .dispatch(&room, &text("$edit1", "@alice:example.org", " * corrected text"))
        .await
        .unwrap();

    let relayed = transport.sent_to("!ticket:example.org");
    assert_eq!(relayed.len(), 1);
    assert_eq!(relayed[0].body, "SwiftHeron42: corrected text");
}

#[tokio::test]
async fn staff_message_in_ticket_room_relays_to_user() {
    let (transport, repo, dispatcher) = setup();

    repo.create_user("@alice:example.org", "SwiftHeron42")
        .await
        .unwrap();
    repo.set_user_room("@alice:example.org", Some("!dm:example.org"))
        .await
        .unwrap();
    let ticket_id = repo.create_ticket("SwiftHeron42", "Billing").await.unwrap();
    repo.set_ticket_room_id(ticket_id, "!ticket:example.org")
        .await
        .unwrap();

    let ticket_room = named_room(
        "!ticket:example.org",
        &format!("Ticket #{ticket_id} (Billing)"),
    );
    dispatcher
        .dispatch(
            &ticket_room,
            &text("$s1", "@staff:example.org", "on it, checking now"),
        )
        .await
        .unwrap();

    let relayed = transport.sent_to("!dm:example.org");
    assert_eq!(relayed.len(), 1);
    assert_eq!(relayed[0].body, "on it, checking now");
}

#[tokio::test]
async fn redaction_follows_the_recorded_pair() {
    let (transport, repo, dispatcher) = setup();
    repo.put_event_pair("$origin", "$relayed", "!target:example.org")
        .await
        .unwrap();

    let room = dm_room("!dm:example.org", "@alice:example.org");
    let event = IncomingEvent {
        meta: EventMeta {
            event_id: "$redact1".to_string(),
            sender: "@alice:example.org".to_string(),
            server_ts_ms: Utc::now().timestamp_millis(),
        },
        kind: EventKind::Redaction {
            redacts: "$origin".to_string(),
            reason: Some("typo".to_string()),
        },
    };
    dispatcher.dispatch(&room, &event).await.unwrap();

    let redactions = transport.sent_redactions();
    assert_eq!(redactions.len(), 1);
    assert_eq!(redactions[0].room_id, "!target:example.org");
    assert_eq!(redactions[0].event_id, "$relayed");
    assert_eq!(redactions[0].reason.as_deref(), Some("typo"));
}

#[tokio::test]
async fn unresolvable_redaction_sends_nothing() {
    let (transport, _repo, dispatcher) = setup();
    let room = dm_room("!dm:example.org", "@alice:example.org");
    let event = IncomingEvent {
        meta: EventMeta {
            event_id: "$redact1".to_string(),
            sender: "@alice:example.org".to_string(),
            server_ts_ms: Utc::now().timestamp_millis(),
        },
        kind: EventKind::Redaction {
            redacts: "$unknown".to_string(),
            reason: None,
        },
    };
    dispatcher.dispatch(&room, &event).await.unwrap();
    assert!(transport.sent_redactions().is_empty());
}

#[tokio::test]
async fn bot_join_sets_up_creator_and_welcomes_once() {
    let mut cfg = config();
    cfg.bot.welcome_message = Some("Hi, describe your issue.".to_string());
    let (transport, repo, dispatcher) = setup_with(cfg);

    let room = dm_room("!dm:example.org", "@alice:example.org");
    dispatcher
        .dispatch(&room, &membership("$j1", BOT, Membership::Join, None))
        .await
        .unwrap();

    let user = repo.get_user("@alice:example.org").await.unwrap().unwrap();
    assert_eq!(user.room_id.as_deref(), Some("!dm:example.org"));
    let welcomes = transport.sent_to("!dm:example.org");
    assert_eq!(welcomes.len(), 1);
    assert_eq!(welcomes[0].body, "Hi, describe your issue.");
    assert_eq!(transport.sent_to(MGMT).len(), 1);

    // A repeated join (profile update style, prev join) does nothing.
    dispatcher
        .dispatch(
            &room,
            &membership("$j2", BOT, Membership::Join, Some(Membership::Join)),
        )
        .await
        .unwrap();
    assert_eq!(transport.sent_to("!dm:example.org").len(), 1);
}

#[tokio::test]
async fn member_leaving_comms_room_clears_pointer() {
    let (_transport, repo, dispatcher) = setup();
    repo.create_user("@alice:example.org", "SwiftHeron42")
        .await
        .unwrap();
    repo.set_user_room("@alice:example.org", Some("!dm:example.org"))
        .await
        .unwrap();

    let room = dm_room("!dm:example.org", "@alice:example.org");
    dispatcher
        .dispatch(
            &room,
            &membership(
                "$l1",
                "@alice:example.org",
                Membership::Leave,
                Some(Membership::Join),
            ),
        )
        .await
        .unwrap();

    let user = repo.get_user("@alice:example.org").await.unwrap().unwrap();
    assert!(user.room_id.is_none());
}

#[tokio::test]
async fn pending_tasks_flush_in_order_on_invite() {
    let (transport, repo, dispatcher) = setup();

    repo.create_user("@alice:example.org", "SwiftHeron42")
        .await
        .unwrap();
    let ticket_id = repo.create_ticket("SwiftHeron42", "Billing").await.unwrap();
    repo.set_ticket_room_id(ticket_id, "!ticket:example.org")
        .await
        .unwrap();
    repo.set_user_current_ticket("SwiftHeron42", Some(ticket_id))
        .await
        .unwrap();
    // The ticket room is not in the transport's view yet, so sends defer.

    let dm = dm_room("!dm:example.org", "@alice:example.org");
    dispatcher
        .dispatch(&dm, &text("$m1", "@alice:example.org", "first"))
        .await
        .unwrap();
    dispatcher
        .dispatch(&dm, &text("$m2", "@alice:example.org", "second"))
        .await
        .unwrap();
    assert!(transport.sent_to("!ticket:example.org").is_empty());
    assert_eq!(dispatcher.pending().queued("!ticket:example.org").await, 2);

    // An invite observed in the ticket room flushes the queue.
    let ticket_room = named_room(
        "!ticket:example.org",
        &format!("Ticket #{ticket_id} (Billing)"),
    );
    dispatcher
        .dispatch(
            &ticket_room,
            &membership("$inv1", BOT, Membership::Invite, None),
        )
        .await
        .unwrap();

    let relayed = transport.sent_to("!ticket:example.org");
    assert_eq!(relayed.len(), 2);
    assert_eq!(relayed[0].body, "SwiftHeron42: first");
    assert_eq!(relayed[1].body, "SwiftHeron42: second");
    assert_eq!(dispatcher.pending().queued("!ticket:example.org").await, 0);

    // A second invite finds nothing to flush.
    dispatcher
        .dispatch(
            &ticket_room,
            &membership("$inv2", BOT, Membership::Invite, None),
        )
        .await
        .unwrap();
    assert_eq!(transport.sent_to("!ticket:example.org").len(), 2);
}

#[tokio::test]
async fn decryption_failure_stores_and_requests_key() {
    let (transport, repo, dispatcher) = setup();
    let room = dm_room("!dm:example.org", "@alice:example.org");
    let event = IncomingEvent {
        meta: EventMeta {
            event_id: "$enc1".to_string(),
            sender: "@alice:example.org".to_string(),
            server_ts_ms: Utc::now().timestamp_millis(),
        },
        kind: EventKind::Encrypted {
            session_id: "sess-1".to_string(),
            payload: serde_json::json!({"type": "m.room.encrypted"}),
        },
    };

    dispatcher.dispatch(&room, &event).await.unwrap();

    assert_eq!(repo.encrypted_event_count(), 1);
    assert_eq!(transport.key_requests(), vec!["sess-1".to_string()]);
    // Unnamed room: the failure is surfaced to management.
    assert_eq!(transport.sent_to(MGMT).len(), 1);
}

#[tokio::test]
async fn outstanding_key_request_is_tolerated() {
    let (transport, repo, dispatcher) = setup();
    transport.set_key_already_requested(true);
    let room = named_room("!group:example.org", "Watercooler");
    let event = IncomingEvent {
        meta: EventMeta {
            event_id: "$enc1".to_string(),
            sender: "@alice:example.org".to_string(),
            server_ts_ms: Utc::now().timestamp_millis(),
        },
        kind: EventKind::Encrypted {
            session_id: "sess-1".to_string(),
            payload: serde_json::json!({}),
        },
    };

    dispatcher.dispatch(&room, &event).await.unwrap();
    assert_eq!(repo.encrypted_event_count(), 1);
    // Named room: no management noise.
    assert!(transport.sent_to(MGMT).is_empty());
}

#[tokio::test]
async fn room_key_replays_exactly_once() {
    let (transport, repo, dispatcher) = setup();
    let room = dm_room("!dm:example.org", "@alice:example.org");
    transport.add_room(room.clone());

    let encrypted = IncomingEvent {
        meta: EventMeta {
            event_id: "$enc1".to_string(),
            sender: "@alice:example.org".to_string(),
            server_ts_ms: Utc::now().timestamp_millis(),
        },
        kind: EventKind::Encrypted {
            session_id: "sess-1".to_string(),
            payload: serde_json::json!({"type": "m.room.encrypted"}),
        },
    };
    dispatcher.dispatch(&room, &encrypted).await.unwrap();
    assert_eq!(repo.encrypted_event_count(), 1);
    let mgmt_before = transport.sent_to(MGMT).len();

    // The plaintext carries the same event id as the encrypted envelope.
    transport.set_decrypt_result("$enc1", text("$enc1", "@alice:example.org", "secret hello"));

    dispatcher
        .on_room_key(&RoomKeyEvent {
            sender: "@alice:example.org".to_string(),
            session_id: "sess-1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(repo.encrypted_event_count(), 0);
    let mgmt_after = transport.sent_to(MGMT);
    assert_eq!(mgmt_after.len(), mgmt_before + 1);
    assert!(mgmt_after.last().unwrap().body.contains("secret hello"));

    // A duplicate key event for the same session finds no work.
    dispatcher
        .on_room_key(&RoomKeyEvent {
            sender: "@alice:example.org".to_string(),
            session_id: "sess-1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(transport.sent_to(MGMT).len(), mgmt_before + 1);
}

#[tokio::test]
async fn undecryptable_record_is_left_in_place_on_replay() {
    let (transport, repo, dispatcher) = setup();
    let room = dm_room("!dm:example.org", "@alice:example.org");
    transport.add_room(room.clone());

    let encrypted = IncomingEvent {
        meta: EventMeta {
            event_id: "$enc1".to_string(),
            sender: "@alice:example.org".to_string(),
            server_ts_ms: Utc::now().timestamp_millis(),
        },
        kind: EventKind::Encrypted {
            session_id: "sess-1".to_string(),
            payload: serde_json::json!({}),
        },
    };
    dispatcher.dispatch(&room, &encrypted).await.unwrap();

    // No decrypt result registered: decryption still fails during replay.
    dispatcher
        .on_room_key(&RoomKeyEvent {
            sender: "@alice:example.org".to_string(),
            session_id: "sess-1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(repo.encrypted_event_count(), 1);
}

#[tokio::test]
async fn close_command_evicts_ticket_from_cache() {
    let repo = MemoryRepository::new();
    let cache = TicketCache::new();

    let mut ticket = Ticket::create(&repo, &cache, "SwiftHeron42", "Billing")
        .await
        .unwrap();
    let id = ticket.record.id;
    assert!(cache.get(id).await.is_some());

    ticket
        .set_status(&repo, &cache, TicketStatus::Closed)
        .await
        .unwrap();
    assert!(cache.get(id).await.is_none());

    // Lookup after eviction re-derives from the store.
    let reloaded = Ticket::get_existing(&repo, &cache, id).await.unwrap().unwrap();
    assert_eq!(reloaded.record.status, TicketStatus::Closed);
}

#[tokio::test]
async fn claim_is_idempotent() {
    let repo = MemoryRepository::new();
    let cache = TicketCache::new();
    let ticket = Ticket::create(&repo, &cache, "SwiftHeron42", "Billing")
        .await
        .unwrap();

    ticket.claim(&repo, "@staff:example.org").await.unwrap();
    ticket.claim(&repo, "@staff:example.org").await.unwrap();

    assert_eq!(
        repo.assigned_staff(ticket.record.id).await.unwrap(),
        vec!["@staff:example.org".to_string()]
    );
}

#[tokio::test]
async fn claim_command_assigns_staff_sender() {
    let (transport, repo, dispatcher) = setup();
    repo.add_staff("@staff:example.org").await.unwrap();
    repo.create_user("@alice:example.org", "SwiftHeron42")
        .await
        .unwrap();
    let ticket_id = repo.create_ticket("SwiftHeron42", "Billing").await.unwrap();
    let ticket_room = named_room(
        "!ticket:example.org",
        &format!("Ticket #{ticket_id} (Billing)"),
    );

    dispatcher
        .dispatch(&ticket_room, &text("$c1", "@staff:example.org", "!rd claim"))
        .await
        .unwrap();

    assert_eq!(
        repo.assigned_staff(ticket_id).await.unwrap(),
        vec!["@staff:example.org".to_string()]
    );
    let replies = transport.sent_to("!ticket:example.org");
    assert!(replies.iter().any(|m| m.body.contains("claimed")));
}

#[tokio::test]
async fn commands_are_staff_only() {
    let (transport, repo, dispatcher) = setup();
    repo.create_user("@alice:example.org", "SwiftHeron42")
        .await
        .unwrap();
    let ticket_id = repo.create_ticket("SwiftHeron42", "Billing").await.unwrap();
    let ticket_room = named_room(
        "!ticket:example.org",
        &format!("Ticket #{ticket_id} (Billing)"),
    );

    dispatcher
        .dispatch(&ticket_room, &text("$c1", "@rando:example.org", "!rd close"))
        .await
        .unwrap();

    assert!(repo.assigned_staff(ticket_id).await.unwrap().is_empty());
    assert_eq!(
        repo.get_ticket(ticket_id).await.unwrap().unwrap().status,
        TicketStatus::Open
    );
    let replies = transport.sent_to("!ticket:example.org");
    assert!(replies.iter().any(|m| m.body.contains("Only staff")));
}

#[tokio::test]
async fn open_command_creates_ticket_and_room() {
    let (transport, repo, dispatcher) = setup();
    repo.add_staff("@staff:example.org").await.unwrap();
    repo.create_user("@alice:example.org", "SwiftHeron42")
        .await
        .unwrap();

    let mgmt_room = named_room(MGMT, "Management");
    dispatcher
        .dispatch(
            &mgmt_room,
            &text("$c1", "@staff:example.org", "!rd open SwiftHeron42 Billing issue"),
        )
        .await
        .unwrap();

    let user = repo.get_user("@alice:example.org").await.unwrap().unwrap();
    let ticket_id = user.current_ticket_id.expect("ticket assigned");
    let ticket = repo.get_ticket(ticket_id).await.unwrap().unwrap();
    assert_eq!(ticket.ticket_name, "Billing issue");

    let created = transport.created_rooms();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].1, format!("Ticket #{ticket_id} (Billing issue)"));
    assert_eq!(ticket.ticket_room_id.as_deref(), Some(created[0].0.as_str()));
    // The acting staff member is invited into the fresh ticket room.
    assert_eq!(
        transport.invites(),
        vec![(created[0].0.clone(), "@staff:example.org".to_string())]
    );
}

#[tokio::test]
async fn mention_only_room_blocks_unmentioned_relay() {
    let mut cfg = config();
    cfg.rooms.mention_only_always_for_named = true;
    let (transport, repo, dispatcher) = setup_with(cfg);

    repo.create_user("@alice:example.org", "SwiftHeron42")
        .await
        .unwrap();
    repo.set_user_room("@alice:example.org", Some("!dm:example.org"))
        .await
        .unwrap();
    let ticket_id = repo.create_ticket("SwiftHeron42", "Billing").await.unwrap();
    let ticket_room = named_room(
        "!ticket:example.org",
        &format!("Ticket #{ticket_id} (Billing)"),
    );

    dispatcher
        .dispatch(&ticket_room, &text("$s1", "@staff:example.org", "internal note"))
        .await
        .unwrap();
    assert!(transport.sent_to("!dm:example.org").is_empty());

    dispatcher
        .dispatch(
            &ticket_room,
            &text("$s2", "@staff:example.org", &format!("{BOT} please relay this")),
        )
        .await
        .unwrap();
    assert_eq!(transport.sent_to("!dm:example.org").len(), 1);
}

#[tokio::test]
async fn invite_entry_joins_the_room() {
    let (transport, _repo, dispatcher) = setup();
    dispatcher.on_invite("$inv1", "!new:example.org").await.unwrap();
    assert_eq!(transport.joined_rooms(), vec!["!new:example.org".to_string()]);
}

#[tokio::test]
async fn redelivered_invite_joins_only_once() {
    let (transport, _repo, dispatcher) = setup();
    dispatcher.on_invite("$inv1", "!new:example.org").await.unwrap();
    dispatcher.on_invite("$inv1", "!new:example.org").await.unwrap();
    assert_eq!(transport.joined_rooms(), vec!["!new:example.org".to_string()]);
}

#[tokio::test]
async fn third_party_invite_does_not_flush_pending() {
    let (transport, repo, dispatcher) = setup();

    repo.create_user("@alice:example.org", "SwiftHeron42")
        .await
        .unwrap();
    let ticket_id = repo.create_ticket("SwiftHeron42", "Billing").await.unwrap();
    repo.set_ticket_room_id(ticket_id, "!ticket:example.org")
        .await
        .unwrap();
    repo.set_user_current_ticket("SwiftHeron42", Some(ticket_id))
        .await
        .unwrap();

    let dm = dm_room("!dm:example.org", "@alice:example.org");
    dispatcher
        .dispatch(&dm, &text("$m1", "@alice:example.org", "deferred"))
        .await
        .unwrap();
    assert_eq!(dispatcher.pending().queued("!ticket:example.org").await, 1);

    // Someone else inviting into the room says nothing about the bot's own
    // room setup being finished.
    let ticket_room = named_room(
        "!ticket:example.org",
        &format!("Ticket #{ticket_id} (Billing)"),
    );
    dispatcher
        .dispatch(
            &ticket_room,
            &membership("$inv1", "@staff:example.org", Membership::Invite, None),
        )
        .await
        .unwrap();
    assert!(transport.sent_to("!ticket:example.org").is_empty());
    assert_eq!(dispatcher.pending().queued("!ticket:example.org").await, 1);

    dispatcher
        .dispatch(
            &ticket_room,
            &membership("$inv2", BOT, Membership::Invite, None),
        )
        .await
        .unwrap();
    assert_eq!(transport.sent_to("!ticket:example.org").len(), 1);
}

#[tokio::test]
async fn chat_command_opens_room_and_relays_both_ways() {
    let (transport, repo, dispatcher) = setup();
    repo.add_staff("@staff:example.org").await.unwrap();
    repo.create_user("@alice:example.org", "SwiftHeron42")
        .await
        .unwrap();

    let mgmt_room = named_room(MGMT, "Management");
    dispatcher
        .dispatch(
            &mgmt_room,
            &text("$c1", "@staff:example.org", "!rd chat SwiftHeron42"),
        )
        .await
        .unwrap();

    let created = transport.created_rooms();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].1, "chat-SwiftHeron42");
    let chat_room_id = created[0].0.clone();

    let chat = repo.get_chat(&chat_room_id).await.unwrap().unwrap();
    assert_eq!(chat.anon_id, "SwiftHeron42");
    let user = repo.get_user("@alice:example.org").await.unwrap().unwrap();
    assert_eq!(user.current_chat_room_id.as_deref(), Some(chat_room_id.as_str()));

    // User side: no current ticket, so the message routes to the chat room.
    let dm = dm_room("!dm:example.org", "@alice:example.org");
    dispatcher
        .dispatch(&dm, &text("$u1", "@alice:example.org", "hello there"))
        .await
        .unwrap();
    let to_chat = transport.sent_to(&chat_room_id);
    assert_eq!(to_chat.len(), 1);
    assert_eq!(to_chat[0].body, "SwiftHeron42: hello there");

    // Staff side: a reply in the chat room reaches the user's comms room.
    let chat_room = named_room(&chat_room_id, "chat-SwiftHeron42");
    dispatcher
        .dispatch(&chat_room, &text("$s1", "@staff:example.org", "hi, how can we help?"))
        .await
        .unwrap();
    let to_user = transport.sent_to("!dm:example.org");
    assert_eq!(to_user.len(), 1);
    assert_eq!(to_user[0].body, "hi, how can we help?");
}

#[tokio::test]
async fn failed_relay_send_is_tolerated() {
    let (transport, repo, dispatcher) = setup();

    repo.create_user("@alice:example.org", "SwiftHeron42")
        .await
        .unwrap();
    let ticket_id = repo.create_ticket("SwiftHeron42", "Billing").await.unwrap();
    repo.set_ticket_room_id(ticket_id, "!ticket:example.org")
        .await
        .unwrap();
    repo.set_user_current_ticket("SwiftHeron42", Some(ticket_id))
        .await
        .unwrap();
    transport.add_room(named_room(
        "!ticket:example.org",
        &format!("Ticket #{ticket_id} (Billing)"),
    ));
    transport.set_fail_sends(true);

    let dm = dm_room("!dm:example.org", "@alice:example.org");
    dispatcher
        .dispatch(&dm, &text("$m1", "@alice:example.org", "hello"))
        .await
        .unwrap();

    assert!(transport.sent_messages().is_empty());
    assert!(repo.get_related("$m1").await.unwrap().is_none());
}
