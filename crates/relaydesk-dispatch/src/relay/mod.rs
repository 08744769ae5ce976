// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-kind relay handlers. Each is constructed with its event context and
//! exposes a single asynchronous `process` operation; outcomes are signaled
//! through logs and outbound messages.

pub mod call;
pub mod media;
pub mod redaction;
pub mod text;

pub use call::CallRelay;
pub use media::MediaRelay;
pub use redaction::RedactionRelay;
pub use text::TextRelay;

use relaydesk_core::{EventMeta, RelaydeskError, RoomInfo};
use tracing::{debug, warn};

use crate::dispatcher::Dispatcher;
use crate::entities::{Ticket, User};
use crate::resolver::{is_mention_only, RequiredState, RoomState, RoomType};

/// Route a rendered message body according to the room's classification.
///
/// Ticket and chat rooms relay toward the owning user's communications room;
/// a user room relays toward the user's current ticket or chat room, falling
/// back to a management notification when neither exists. The origin and
/// relayed event ids are recorded as a pair so redactions can follow.
pub(crate) async fn deliver(
    ctx: &Dispatcher,
    room: &RoomInfo,
    meta: &EventMeta,
    body: &str,
) -> Result<(), RelaydeskError> {
    let mut state = RoomState::new(&ctx.config.rooms, room, meta);
    match state.room_type {
        RoomType::Management | RoomType::Logging => {
            debug!(room_id = %room.room_id, "no relay from this room");
            Ok(())
        }
        RoomType::Ticket => {
            if !state
                .resolve(
                    RequiredState::Ticket,
                    ctx.repo.as_ref(),
                    &ctx.ticket_cache,
                    ctx.transport.as_ref(),
                    ctx.config.rooms.management_room_id.as_deref(),
                )
                .await?
            {
                return Ok(());
            }
            if mention_gate_blocks(ctx, room, body) {
                return Ok(());
            }
            let anon_id = state.ticket.as_ref().map(|t| t.record.anon_id.clone());
            relay_to_owner(ctx, &state, meta, anon_id.as_deref(), body).await
        }
        RoomType::Chat => {
            if !state
                .resolve(
                    RequiredState::Chat,
                    ctx.repo.as_ref(),
                    &ctx.ticket_cache,
                    ctx.transport.as_ref(),
                    ctx.config.rooms.management_room_id.as_deref(),
                )
                .await?
            {
                return Ok(());
            }
            if mention_gate_blocks(ctx, room, body) {
                return Ok(());
            }
            let anon_id = state.chat.as_ref().map(|c| c.record.anon_id.clone());
            relay_to_owner(ctx, &state, meta, anon_id.as_deref(), body).await
        }
        RoomType::User => {
            if !state
                .resolve(
                    RequiredState::UserRoom,
                    ctx.repo.as_ref(),
                    &ctx.ticket_cache,
                    ctx.transport.as_ref(),
                    ctx.config.rooms.management_room_id.as_deref(),
                )
                .await?
            {
                return Ok(());
            }
            relay_from_user(ctx, &mut state, meta, body).await
        }
    }
}

/// Mention-only rooms relay only when the bot's user id appears in the body.
fn mention_gate_blocks(ctx: &Dispatcher, room: &RoomInfo, body: &str) -> bool {
    if is_mention_only(&ctx.config.rooms, room) && !body.contains(ctx.transport.user_id()) {
        debug!(room_id = %room.room_id, "mention-only room, bot not mentioned");
        return true;
    }
    false
}

/// Staff-side relay: deliver the body into the owning user's communications
/// room.
async fn relay_to_owner(
    ctx: &Dispatcher,
    state: &RoomState<'_>,
    meta: &EventMeta,
    anon_id: Option<&str>,
    body: &str,
) -> Result<(), RelaydeskError> {
    let Some(anon_id) = anon_id else {
        return Ok(());
    };
    let Some(user) = User::get_by_anon_id(ctx.repo.as_ref(), anon_id).await? else {
        ctx.notify_management(&format!(
            "Cannot relay a message for {}: no user found for {anon_id}.",
            state.for_room
        ))
        .await;
        return Ok(());
    };
    let Some(target) = user.record.room_id.clone() else {
        ctx.notify_management(&format!(
            "Cannot relay a message for {}: {anon_id} has no open communications room.",
            state.for_room
        ))
        .await;
        return Ok(());
    };
    send_and_record(ctx, &target, &meta.event_id, body.to_string()).await
}

/// User-side relay: deliver toward the current ticket room or chat room,
/// falling back to a management notification.
async fn relay_from_user(
    ctx: &Dispatcher,
    state: &mut RoomState<'_>,
    meta: &EventMeta,
    body: &str,
) -> Result<(), RelaydeskError> {
    let Some(user) = state.user.as_mut() else {
        return Ok(());
    };
    // The room a user writes from becomes their communications room.
    if user.record.room_id.is_none() {
        user.set_room(ctx.repo.as_ref(), Some(&state.room.room_id))
            .await?;
    }

    let anon_id = user.record.anon_id.clone();
    let sender = if ctx.config.bot.anonymise_senders {
        anon_id.clone()
    } else {
        meta.sender.clone()
    };
    let rendered = format!("{sender}: {body}");

    let ticket =
        Ticket::owner_current_ticket(ctx.repo.as_ref(), &ctx.ticket_cache, &anon_id).await?;
    if let Some(target) = ticket.and_then(|t| t.record.ticket_room_id) {
        // A freshly created ticket room may not have finished its secure
        // channel setup; defer the send until the room is observed ready.
        if ctx.transport.room_info(&target).is_none() {
            let transport = ctx.transport.clone();
            let repo = ctx.repo.clone();
            let origin = meta.event_id.clone();
            let target_clone = target.clone();
            ctx.pending
                .defer(&target, "relay user message", move || {
                    Box::pin(async move {
                        let relayed = transport.send_text(&target_clone, &rendered, false).await?;
                        repo.put_event_pair(&origin, &relayed, &target_clone).await
                    })
                })
                .await;
            return Ok(());
        }
        return send_and_record(ctx, &target, &meta.event_id, rendered).await;
    }

    if let Some(chat_room) = user.record.current_chat_room_id.clone() {
        return send_and_record(ctx, &chat_room, &meta.event_id, rendered).await;
    }

    ctx.notify_management(&format!("New message from {anon_id}: {body}"))
        .await;
    Ok(())
}

async fn send_and_record(
    ctx: &Dispatcher,
    target: &str,
    origin_event_id: &str,
    body: String,
) -> Result<(), RelaydeskError> {
    match ctx.transport.send_text(target, &body, false).await {
        Ok(relayed_event_id) => {
            ctx.repo
                .put_event_pair(origin_event_id, &relayed_event_id, target)
                .await
        }
        Err(e) => {
            warn!(room_id = target, error = %e, "failed to relay message");
            Ok(())
        }
    }
}
