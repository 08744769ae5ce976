// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text message relay.

use relaydesk_core::{EventMeta, RelaydeskError, RoomInfo};

use crate::commands;
use crate::dispatcher::Dispatcher;

pub struct TextRelay<'a> {
    ctx: &'a Dispatcher,
    room: &'a RoomInfo,
    meta: &'a EventMeta,
    body: &'a str,
}

impl<'a> TextRelay<'a> {
    pub fn new(
        ctx: &'a Dispatcher,
        room: &'a RoomInfo,
        meta: &'a EventMeta,
        body: &'a str,
    ) -> Self {
        Self { ctx, room, meta, body }
    }

    pub async fn process(self) -> Result<(), RelaydeskError> {
        // Edited messages arrive with a " * " fallback prefix.
        let body = self.body.strip_prefix(" * ").unwrap_or(self.body);
        // Leading "!message " escapes command parsing for a literal relay.
        if let Some(rest) = body.strip_prefix("!message ") {
            return super::deliver(self.ctx, self.room, self.meta, rest).await;
        }
        if body.starts_with(&self.ctx.config.bot.command_prefix) {
            return commands::execute(self.ctx, self.room, self.meta, body).await;
        }
        super::deliver(self.ctx, self.room, self.meta, body).await
    }
}
