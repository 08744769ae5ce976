// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff commands. Parsing is deliberately small: the interesting work is
//! the hand-off into the entity layer.

use relaydesk_core::{EventMeta, RelaydeskError, RoomInfo, TicketStatus};
use tracing::debug;

use crate::dispatcher::Dispatcher;
use crate::entities::{Chat, Ticket, User};
use crate::resolver::{RequiredState, RoomState};

pub(crate) async fn execute(
    ctx: &Dispatcher,
    room: &RoomInfo,
    meta: &EventMeta,
    body: &str,
) -> Result<(), RelaydeskError> {
    let rest = body
        .strip_prefix(&ctx.config.bot.command_prefix)
        .unwrap_or(body)
        .trim();
    let mut parts = rest.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(());
    };

    if ctx.repo.get_staff(&meta.sender).await?.is_none() {
        notice(ctx, &room.room_id, "Only staff can use commands.").await;
        return Ok(());
    }

    match command {
        "claim" => claim(ctx, room, meta).await,
        "close" => close(ctx, room, meta).await,
        "open" => {
            let anon_id = parts.next().map(|s| s.to_string());
            let name = parts.collect::<Vec<_>>().join(" ");
            open(ctx, room, meta, anon_id.as_deref(), &name).await
        }
        "chat" => chat(ctx, room, meta, parts.next()).await,
        other => {
            debug!(sender = %meta.sender, command = other, "unknown command");
            notice(ctx, &room.room_id, &format!("Unknown command: {other}")).await;
            Ok(())
        }
    }
}

/// Assign the sender to the ticket bound to the current room.
async fn claim(
    ctx: &Dispatcher,
    room: &RoomInfo,
    meta: &EventMeta,
) -> Result<(), RelaydeskError> {
    let mut state = RoomState::new(&ctx.config.rooms, room, meta);
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
    let ticket = state.ticket.as_ref().unwrap();
    ticket.claim(ctx.repo.as_ref(), &meta.sender).await?;
    notice(
        ctx,
        &room.room_id,
        &format!("Ticket #{} claimed.", ticket.record.id),
    )
    .await;
    Ok(())
}

/// Close the ticket bound to the current room and clear the owner's current
/// ticket pointer.
async fn close(
    ctx: &Dispatcher,
    room: &RoomInfo,
    meta: &EventMeta,
) -> Result<(), RelaydeskError> {
    let mut state = RoomState::new(&ctx.config.rooms, room, meta);
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
    let ticket = state.ticket.as_mut().unwrap();
    ticket
        .set_status(ctx.repo.as_ref(), &ctx.ticket_cache, TicketStatus::Closed)
        .await?;

    if let Some(mut user) =
        User::get_by_anon_id(ctx.repo.as_ref(), &ticket.record.anon_id).await?
        && user.record.current_ticket_id == Some(ticket.record.id)
    {
        user.set_current_ticket(ctx.repo.as_ref(), None).await?;
    }

    notice(
        ctx,
        &room.room_id,
        &format!("Ticket #{} closed.", ticket.record.id),
    )
    .await;
    ctx.notify_management(&format!("Ticket #{} closed.", ticket.record.id))
        .await;
    Ok(())
}

/// Open a new ticket for a user, create its room, and invite the sender.
async fn open(
    ctx: &Dispatcher,
    room: &RoomInfo,
    meta: &EventMeta,
    anon_id: Option<&str>,
    name: &str,
) -> Result<(), RelaydeskError> {
    let mut state = RoomState::new(&ctx.config.rooms, room, meta);
    if !state
        .resolve(
            RequiredState::Management,
            ctx.repo.as_ref(),
            &ctx.ticket_cache,
            ctx.transport.as_ref(),
            ctx.config.rooms.management_room_id.as_deref(),
        )
        .await?
    {
        return Ok(());
    }
    let (Some(anon_id), false) = (anon_id, name.is_empty()) else {
        notice(ctx, &room.room_id, "Usage: open <anonymized id> <ticket name>").await;
        return Ok(());
    };
    let Some(mut user) = User::get_by_anon_id(ctx.repo.as_ref(), anon_id).await? else {
        notice(ctx, &room.room_id, &format!("No user known as {anon_id}.")).await;
        return Ok(());
    };

    let mut ticket =
        Ticket::create(ctx.repo.as_ref(), &ctx.ticket_cache, anon_id, name).await?;
    user.set_current_ticket(ctx.repo.as_ref(), Some(ticket.record.id))
        .await?;
    let room_id = ticket
        .create_room(ctx.transport.as_ref(), ctx.repo.as_ref(), &ctx.ticket_cache, &[])
        .await?;
    ticket
        .invite_to_room(ctx.transport.as_ref(), &meta.sender)
        .await?;

    notice(
        ctx,
        &room.room_id,
        &format!(
            "Ticket #{} ({name}) opened for {anon_id} in {room_id}.",
            ticket.record.id
        ),
    )
    .await;
    Ok(())
}

/// Open a standing anonymized chat with a user, outside any ticket.
async fn chat(
    ctx: &Dispatcher,
    room: &RoomInfo,
    meta: &EventMeta,
    anon_id: Option<&str>,
) -> Result<(), RelaydeskError> {
    let mut state = RoomState::new(&ctx.config.rooms, room, meta);
    if !state
        .resolve(
            RequiredState::Management,
            ctx.repo.as_ref(),
            &ctx.ticket_cache,
            ctx.transport.as_ref(),
            ctx.config.rooms.management_room_id.as_deref(),
        )
        .await?
    {
        return Ok(());
    }
    let Some(anon_id) = anon_id else {
        notice(ctx, &room.room_id, "Usage: chat <anonymized id>").await;
        return Ok(());
    };
    let Some(mut user) = User::get_by_anon_id(ctx.repo.as_ref(), anon_id).await? else {
        notice(ctx, &room.room_id, &format!("No user known as {anon_id}.")).await;
        return Ok(());
    };

    let room_id = ctx
        .transport
        .create_room(&format!("chat-{anon_id}"), &[meta.sender.clone()])
        .await?;
    Chat::create(ctx.repo.as_ref(), &room_id, anon_id).await?;
    user.set_current_chat_room(ctx.repo.as_ref(), Some(&room_id))
        .await?;

    notice(
        ctx,
        &room.room_id,
        &format!("Chat with {anon_id} opened in {room_id}."),
    )
    .await;
    Ok(())
}

async fn notice(ctx: &Dispatcher, room_id: &str, text: &str) {
    if let Err(e) = ctx.transport.send_text(room_id, text, true).await {
        tracing::warn!(room_id = room_id, error = %e, "failed to send command reply");
    }
}
